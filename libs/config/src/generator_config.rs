//! Generator Configuration Module
//!
//! Layered configuration for the `callgate` generator: built-in defaults,
//! then a TOML file, then `CALLGATE_*` environment variables.
//!
//! ```toml
//! registry_path = "config/registry.toml"
//! denylist_path = "config/denylist.toml"
//! output_dir = "generated"
//! networks = ["mainnet", "base"]
//! fan_out = 4
//! ```
//!
//! `CALLGATE_NETWORKS=mainnet,base` and `CALLGATE_FAN_OUT=8` override the file.

use anyhow::{ensure, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use types::NetworkId;

/// Configuration file read when no path is given; optional
pub const DEFAULT_CONFIG_PATH: &str = "config/callgate.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "CALLGATE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub registry_path: PathBuf,
    pub denylist_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Networks to generate; empty means every registry network
    pub networks: Vec<String>,
    pub fan_out: usize,
    pub solidity_pragma: String,
    pub license: String,
    pub log_level: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("config/registry.toml"),
            denylist_path: None,
            output_dir: PathBuf::from("generated"),
            networks: Vec::new(),
            fan_out: 4,
            solidity_pragma: "^0.8.25".to_string(),
            license: "MIT".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load with `CALLGATE_*` environment overrides
    ///
    /// An explicit `path` must exist; the default path is skipped when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let file = match path {
            Some(path) => {
                info!("Loading generator config: {:?}", path);
                File::from(path).required(true)
            }
            None => {
                debug!("Looking for optional config at {}", DEFAULT_CONFIG_PATH);
                File::with_name(DEFAULT_CONFIG_PATH).required(false)
            }
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("networks"),
            )
            .build()
            .context("Failed to build configuration")?;

        let mut loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        loaded.expand_paths()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Expand `~` and `$VAR` in every path
    pub fn expand_paths(&mut self) -> Result<()> {
        self.registry_path =
            expand(&self.registry_path).context("Failed to expand registry path")?;
        self.output_dir =
            expand(&self.output_dir).context("Failed to expand output directory")?;
        if let Some(denylist) = &self.denylist_path {
            self.denylist_path =
                Some(expand(denylist).context("Failed to expand denylist path")?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.fan_out >= 2,
            "fan_out must be at least 2, got {}",
            self.fan_out
        );
        ensure!(
            !self.solidity_pragma.trim().is_empty(),
            "solidity_pragma must not be empty"
        );
        ensure!(!self.license.trim().is_empty(), "license must not be empty");
        self.network_ids()?;
        Ok(())
    }

    /// Configured target networks, validated
    pub fn network_ids(&self) -> Result<Vec<NetworkId>> {
        self.networks
            .iter()
            .map(|name| {
                NetworkId::new(name).with_context(|| format!("Bad entry in networks: {name:?}"))
            })
            .collect()
    }
}

fn expand(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("callgate.toml");

        let config_content = r#"
registry_path = "/srv/callgate/registry.toml"
denylist_path = "/srv/callgate/denylist.toml"
output_dir = "/tmp/callgate-out"
networks = ["mainnet", "Base"]
fan_out = 8
log_level = "debug"
"#;

        fs::write(&config_path, config_content).unwrap();

        let config =
            GeneratorConfig::load_with_prefix(Some(&config_path), "CALLGATE_TEST_FILE").unwrap();

        assert_eq!(config.registry_path, PathBuf::from("/srv/callgate/registry.toml"));
        assert_eq!(
            config.denylist_path,
            Some(PathBuf::from("/srv/callgate/denylist.toml"))
        );
        assert_eq!(config.fan_out, 8);
        assert_eq!(config.log_level, "debug");
        // Untouched fields keep their defaults
        assert_eq!(config.solidity_pragma, "^0.8.25");
        assert_eq!(
            config.network_ids().unwrap(),
            [NetworkId::new("mainnet").unwrap(), NetworkId::new("base").unwrap()]
        );
    }

    #[test]
    fn test_environment_override() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("callgate.toml");
        fs::write(&config_path, "fan_out = 3\nnetworks = [\"mainnet\"]\n").unwrap();

        std::env::set_var("CALLGATE_TEST_ENV_FAN_OUT", "6");
        std::env::set_var("CALLGATE_TEST_ENV_NETWORKS", "arbitrum,base");
        let config =
            GeneratorConfig::load_with_prefix(Some(&config_path), "CALLGATE_TEST_ENV").unwrap();
        std::env::remove_var("CALLGATE_TEST_ENV_FAN_OUT");
        std::env::remove_var("CALLGATE_TEST_ENV_NETWORKS");

        assert_eq!(config.fan_out, 6);
        assert_eq!(config.networks, ["arbitrum", "base"]);
    }

    #[test]
    fn test_invalid_fan_out_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("callgate.toml");
        fs::write(&config_path, "fan_out = 1\n").unwrap();

        let err = GeneratorConfig::load_with_prefix(Some(&config_path), "CALLGATE_TEST_FANOUT")
            .unwrap_err();
        assert!(err.to_string().contains("fan_out"));
    }

    #[test]
    fn test_invalid_network_name_rejected() {
        let config = GeneratorConfig {
            networks: vec!["mainnet".to_string(), "main\"net".to_string()],
            ..GeneratorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("Invalid network id"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let result = GeneratorConfig::load_with_prefix(Some(&missing), "CALLGATE_TEST_MISSING");
        assert!(result.is_err());
    }

    #[test]
    fn test_paths_are_expanded() {
        std::env::set_var("CALLGATE_TEST_ROOT", "/opt/callgate");
        let mut config = GeneratorConfig {
            registry_path: PathBuf::from("$CALLGATE_TEST_ROOT/registry.toml"),
            denylist_path: Some(PathBuf::from("${CALLGATE_TEST_ROOT}/denylist.toml")),
            ..GeneratorConfig::default()
        };
        config.expand_paths().unwrap();

        assert_eq!(config.registry_path, PathBuf::from("/opt/callgate/registry.toml"));
        assert_eq!(
            config.denylist_path,
            Some(PathBuf::from("/opt/callgate/denylist.toml"))
        );
        assert_eq!(config.output_dir, PathBuf::from("generated"));
    }
}
