// YAML configuration for the dashstore CLI

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::query::DEFAULT_LIMIT;

const CONFIG_DIR: &str = "dashstore";
const CONFIG_FILE: &str = "dashstore.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page size for listings that give no valid `limit`
    pub default_limit: usize,
    /// Start from the built-in demo users and posts when no seed dir is set
    pub demo_data: bool,
    /// Directory with `users.jsonl` and `posts.jsonl` to start from
    pub seed_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            demo_data: true,
            seed_dir: None,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `{config_dir}/dashstore/dashstore.yml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;

        info!(file = ?path, "Loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(eyre!("default_limit must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_limit, 10);
        assert!(config.demo_data);
        assert!(config.seed_dir.is_none());
    }

    #[test]
    fn test_from_file_partial() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dashstore.yml");
        fs::write(&path, "default_limit: 25\nseed_dir: /tmp/seed\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.default_limit, 25);
        assert!(config.demo_data);
        assert_eq!(config.seed_dir, Some(PathBuf::from("/tmp/seed")));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(temp.path().join("nope.yml").as_path())).is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dashstore.yml");
        fs::write(&path, "default_limit: 0\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dashstore.yml");
        fs::write(&path, "default_limit: [oops\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
