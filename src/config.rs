//! Loading the engine config and grid seed files.

use directories::ProjectDirs;
use serde::Deserialize;
use sheetlab_core::{CellId, Document, EngineConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CommandError, Result};

const MAX_CONFIG_FILE_BYTES: u64 = 64 * 1024;
const MAX_GRID_FILE_BYTES: u64 = 1024 * 1024;

/// Load the engine config from `config_file`, or from the per-user config
/// directory when none is given. Problems never abort startup: they come back
/// as warnings alongside the default config.
pub fn load_config(config_file: Option<&PathBuf>) -> (EngineConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (EngineConfig::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (EngineConfig::default(), warnings);
    }

    let parsed = match read_capped(&path, MAX_CONFIG_FILE_BYTES) {
        Ok(content) => match toml::from_str::<EngineConfig>(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(err);
            None
        }
    };

    match parsed {
        Some(config) => match config.validate() {
            Ok(()) => (config, warnings),
            Err(err) => {
                warnings.push(format!("Ignoring {}: {}", path.display(), err));
                (EngineConfig::default(), warnings)
            }
        },
        None => (EngineConfig::default(), warnings),
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetlab")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

fn read_capped(path: &Path, max_bytes: u64) -> std::result::Result<String, String> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > max_bytes => Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            max_bytes
        )),
        Ok(_) => std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {}", path.display(), err)),
        Err(err) => Err(format!(
            "Failed to read metadata for {}: {}",
            path.display(),
            err
        )),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridFile {
    #[serde(default)]
    cells: BTreeMap<String, toml::Value>,
}

/// Build a document from a grid seed file:
///
/// ```toml
/// [cells]
/// A1 = "10"
/// A2 = 20
/// B1 = "=A1+A2"
/// ```
pub fn load_grid(path: &Path, config: &EngineConfig) -> Result<Document> {
    let grid_error = |message: String| CommandError::Grid {
        path: path.display().to_string(),
        message,
    };

    let content = read_capped(path, MAX_GRID_FILE_BYTES).map_err(grid_error)?;
    let file: GridFile = toml::from_str(&content).map_err(|err| grid_error(err.to_string()))?;
    parse_grid(&file, config).map_err(grid_error)
}

fn parse_grid(file: &GridFile, config: &EngineConfig) -> std::result::Result<Document, String> {
    let bounds = config.bounds().map_err(|err| err.to_string())?;
    let mut cells: Vec<(CellId, String)> = Vec::with_capacity(file.cells.len());
    for (name, raw) in &file.cells {
        let cell = CellId::parse(name.trim(), &bounds)
            .ok_or_else(|| format!("Invalid cell reference: {}", name))?;
        let formula = match raw {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(n) => n.to_string(),
            toml::Value::Float(n) => n.to_string(),
            other => return Err(format!("{}: unsupported value {}", name, other)),
        };
        cells.push((cell, formula));
    }
    Document::with_cells(config, cells.iter().map(|(cell, f)| (*cell, f.as_str())))
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> std::result::Result<Document, String> {
        let file: GridFile = toml::from_str(content).map_err(|e| e.to_string())?;
        parse_grid(&file, &EngineConfig::default())
    }

    #[test]
    fn test_grid_accepts_strings_and_numbers() {
        let doc = parse("[cells]\nA1 = \"10\"\nA2 = 20\nB1 = \"=A1+A2\"\nC1 = 1.5\n").unwrap();
        let b1: CellId = "B1".parse().unwrap();
        let c1: CellId = "C1".parse().unwrap();
        assert_eq!(doc.display(&b1), "30");
        assert_eq!(doc.display(&c1), "1.5");
    }

    #[test]
    fn test_grid_rejects_bad_cells_and_values() {
        assert!(parse("[cells]\nZ1 = \"1\"\n").unwrap_err().contains("Z1"));
        assert!(parse("[cells]\nA1 = true\n").unwrap_err().contains("unsupported"));
        assert!(parse("[rows]\n").is_err());
    }

    #[test]
    fn test_missing_explicit_config_warns() {
        let path = PathBuf::from("/nonexistent/sheetlab/config.toml");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, EngineConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not found"));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let dir = std::env::temp_dir().join(format!("sheetlab-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("config.toml");
        std::fs::write(&path, "columns = 30\n").unwrap();
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, EngineConfig::default());
        assert!(warnings[0].starts_with("Ignoring"));

        std::fs::write(&path, "columns = 4\nrows = 5\n").unwrap();
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty());
        assert_eq!((config.columns, config.rows, config.log_capacity), (4, 5, 50));

        std::fs::write(&path, "colour = \"red\"\n").unwrap();
        let (_, warnings) = load_config(Some(&path));
        assert!(warnings[0].starts_with("Failed to parse"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
