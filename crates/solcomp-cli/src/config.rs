//! CLI configuration

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use solcomp::SolcConfig;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CliConfig {
    /// Compiler pipeline settings
    pub compiler: SolcConfig,

    /// Etherscan API key used by `name`
    pub etherscan_api_key: Option<String>,

    /// Etherscan API endpoint override
    pub etherscan_endpoint: Option<String>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            tracing::debug!(path = %config_path.display(), "Loaded configuration");
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("solcomp").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert!(config.etherscan_api_key.is_none());
        assert_eq!(config.compiler, SolcConfig::default());
    }

    #[test]
    fn test_load_missing_config() {
        // Should return default config when file doesn't exist
        let config = CliConfig::load(Some("/nonexistent/path/config.toml")).unwrap();
        assert!(config.etherscan_api_key.is_none());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
etherscan_api_key = "KEY"

[compiler]
storage_root = "/var/cache/solcomp"

[compiler.retry]
max_attempts = 3
"#,
        )
        .unwrap();

        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.etherscan_api_key.as_deref(), Some("KEY"));
        assert_eq!(
            config.compiler.storage_root,
            PathBuf::from("/var/cache/solcomp")
        );
        assert_eq!(config.compiler.retry.max_attempts, 3);
        assert_eq!(config.compiler.retry.delay_ms, 100);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "compiler = 3").unwrap();

        let err = CliConfig::load(path.to_str()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
