//! Sheetlab - drive the spreadsheet engine from commands or a script

use anyhow::Context;
use sheetlab::{load_config, load_grid, run_script};
use sheetlab_core::Document;
use std::env;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: sheetlab [OPTIONS] [SCRIPT]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [SCRIPT]                  File of commands, one per line (default: stdin)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <CMD>       Run one command (can be repeated)");
    eprintln!("  -g, --grid <FILE>         Seed cells from a TOML grid file");
    eprintln!("  --config <FILE>           Engine config (default: <config dir>/sheetlab/config.toml)");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Set SHEETLAB_LOG (e.g. debug) to see engine logs on stderr.");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SHEETLAB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut script_path: Option<PathBuf> = None;
    let mut commands: Vec<String> = Vec::new();
    let mut grid_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a command");
                    std::process::exit(1);
                }
                commands.push(args[i].to_string());
            }
            "-g" | "--grid" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --grid requires a file path");
                    std::process::exit(1);
                }
                grid_file = Some(PathBuf::from(&args[i]));
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if script_path.is_none() {
                    script_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    init_tracing();

    let (config, warnings) = load_config(config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    if let Err(e) = run(&config, grid_file, script_path, commands) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(
    config: &sheetlab_core::EngineConfig,
    grid_file: Option<PathBuf>,
    script_path: Option<PathBuf>,
    commands: Vec<String>,
) -> anyhow::Result<()> {
    let mut doc = match grid_file {
        Some(path) => load_grid(&path, config)?,
        None => Document::new(config)?,
    };

    let script = if !commands.is_empty() {
        commands.join("\n")
    } else if let Some(path) = script_path {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read script {}", path.display()))?
    } else {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read commands from stdin")?;
        input
    };

    let stdout = std::io::stdout();
    run_script(&mut doc, script.lines(), &mut stdout.lock())?;
    Ok(())
}
