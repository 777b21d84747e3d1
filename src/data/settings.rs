use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from a YAML file. A missing file yields defaults;
    /// nothing is ever written back.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("failed to parse YAML from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_from(&tmp.path().join("absent.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_from_reads_server_url() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dotcal.yaml");
        fs::write(&path, "server_url: http://calendar.example:9001\n").unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.server_url, "http://calendar.example:9001");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dotcal.yaml");
        fs::write(&path, "server_url: [not, a, string").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
