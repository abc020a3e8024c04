//! Configuration file loading.
//!
//! ```toml
//! [sheet]
//! max_rows = 1000
//! max_cols = 26
//! ```

use directories::ProjectDirs;
use serde::Deserialize;
use sheetcell_core::SheetConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sheet: SheetConfig,
}

/// Load the configuration from `config_file`, or from the user config dir.
///
/// Problems never abort startup: they come back as warnings next to the defaults.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    match read_config(&path) {
        Ok(config) => (config, warnings),
        Err(warning) => {
            warnings.push(warning);
            (Config::default(), warnings)
        }
    }
}

fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    parse_config(&content).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetcell")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_parse_sheet_limits() {
        let config = parse_config("[sheet]\nmax_rows = 100\nmax_cols = 3\n").unwrap();
        assert_eq!(
            config.sheet,
            SheetConfig {
                max_rows: 100,
                max_cols: 3
            }
        );
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = parse_config("[sheet]\nmax_cols = 3\n").unwrap();
        assert_eq!(config.sheet.max_cols, 3);
        assert_eq!(config.sheet.max_rows, SheetConfig::default().max_rows);
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(parse_config("[sheet]\nmax_rows = \"many\"\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let path = PathBuf::from("/nonexistent/sheetcell/config.toml");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not found"));
    }

    #[test]
    fn test_user_config_path_is_deterministic() {
        // None only when no home directory is available.
        let path = user_config_path();
        assert_eq!(path, user_config_path());
        if let Some(path) = path {
            assert_eq!(path.file_name(), Some(OsStr::new("config.toml")));
            assert!(
                path.components()
                    .any(|c| c.as_os_str().to_string_lossy().contains("sheetcell"))
            );
        }
    }
}
