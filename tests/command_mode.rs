//! Integration tests for command mode (-c/--command flag)

use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sheetlab"))
        // Tests must be deterministic and not depend on a user's ~/.config/sheetlab/config.toml.
        .arg("--config")
        .arg("/nonexistent/sheetlab-test-config.toml")
        .args(args)
        .env_remove("SHEETLAB_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn commands(lines: &[&str]) -> Vec<String> {
    lines.iter().flat_map(|line| ["-c".to_string(), line.to_string()]).collect()
}

fn run_commands(lines: &[&str]) -> (String, String, i32) {
    let args = commands(lines);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_command(&args)
}

#[test]
fn test_literal_number() {
    let (stdout, _, code) = run_commands(&["set A1 10", "value A1"]);
    assert_eq!(stdout, "10\n10.0\n");
    assert_eq!(code, 0);
}

#[test]
fn test_reference_and_propagation() {
    let (stdout, _, code) = run_commands(&[
        "set A1 10",
        "set A2 20",
        "set B1 =A1+A2",
        "set A1 5",
        "get B1",
    ]);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["10", "20", "30", "5", "25"]);
    assert_eq!(code, 0);
}

#[test]
fn test_log_records_one_recalc() {
    let (stdout, _, code) = run_commands(&["set A1 10", "set B1 =A1*2", "set A1 5", "log"]);
    assert_eq!(code, 0);
    let log: serde_json::Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    let entries = log.as_array().unwrap();
    let recalcs: Vec<_> = entries.iter().filter(|e| e["type"] == "recalc").collect();
    assert_eq!(recalcs.len(), 1);
    assert_eq!(recalcs[0]["affectedCells"], serde_json::json!(["B1"]));
    assert_eq!(entries[0]["type"], "recalc");
    assert_eq!(entries[1]["type"], "edit-commit");
}

#[test]
fn test_sum_ranges() {
    let (stdout, _, code) = run_commands(&[
        "set A1 1",
        "set A2 2",
        "set A3 3",
        "set B1 =SUM(A1:A3)",
        "set B2 =SUM(A3:A1)",
    ]);
    assert_eq!(stdout.lines().skip(3).collect::<Vec<_>>(), vec!["6", "0"]);
    assert_eq!(code, 0);
}

#[test]
fn test_malformed_formula_shows_error() {
    let (stdout, _, code) = run_commands(&["set A1 =A1+", "set B1 =1/0", "expect A1=#ERR B1=#ERR"]);
    assert_eq!(stdout, "#ERR\n#ERR\n");
    assert_eq!(code, 0);
}

#[test]
fn test_cycle_does_not_hang() {
    let (stdout, stderr, code) = run_commands(&["set A1 =B1", "set B1 =A1", "get A1", "get B1"]);
    assert_eq!(stdout.lines().skip(2).collect::<Vec<_>>(), vec!["#ERR", "#ERR"]);
    assert!(stderr.contains("circular reference"));
    assert_eq!(code, 0);
}

#[test]
fn test_failed_expectation_exit_code() {
    let (_, stderr, code) = run_commands(&["set A1 2", "expect A1=3"]);
    assert!(stderr.contains("Error: line 2: Expectation failed"));
    assert_eq!(code, 1);
}

#[test]
fn test_unknown_command() {
    let (_, stderr, code) = run_commands(&["frobnicate A1"]);
    assert!(stderr.contains("Unknown command: frobnicate"));
    assert_eq!(code, 1);
}

#[test]
fn test_out_of_bounds_cell() {
    let (_, stderr, code) = run_commands(&["set Z99 1"]);
    assert!(stderr.contains("Invalid cell reference"));
    assert_eq!(code, 1);
}

#[test]
fn test_script_file_and_grid_seed() {
    use std::fs;

    let dir = std::env::temp_dir().join(format!("sheetlab-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let grid = dir.join("grid.toml");
    let script = dir.join("lesson.txt");
    fs::write(&grid, "[cells]\nA1 = \"10\"\nA2 = 20\nB1 = \"=A1+A2\"\n").unwrap();
    fs::write(&script, "# change a precedent\nset A1 5\n\nget B1\ndeps A2\n").unwrap();

    let (stdout, _, code) = run_command(&["-g", grid.to_str().unwrap(), script.to_str().unwrap()]);
    assert_eq!(stdout, "5\n25\nB1\n");
    assert_eq!(code, 0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_config_resizes_grid() {
    use std::fs;

    let dir = std::env::temp_dir().join(format!("sheetlab-config-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let config = dir.join("config.toml");
    fs::write(&config, "columns = 26\nrows = 99\n").unwrap();

    let (stdout, _, code) = run_command(&[
        "--config",
        config.to_str().unwrap(),
        "-c",
        "set Z99 7",
        "-c",
        "move 5 5",
    ]);
    assert_eq!(stdout, "7\nF6\n");
    assert_eq!(code, 0);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_edit_mode_round_trip() {
    let (stdout, _, code) = run_commands(&["click B2", "type =4*5", "mode", "cancel", "mode", "get B2"]);
    assert_eq!(stdout, "Edit\nReady\n\n");
    assert_eq!(code, 0);
}
