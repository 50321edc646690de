//! Registry and denylist snapshot loading

use crate::generator_config::GeneratorConfig;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;
use types::{Denylist, Registry};

/// Read-only inputs of one generator run
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub registry: Registry,
    pub denylist: Denylist,
}

impl Snapshot {
    pub fn load(config: &GeneratorConfig) -> Result<Self> {
        Ok(Self {
            registry: load_registry(&config.registry_path)?,
            denylist: load_denylist(config.denylist_path.as_deref())?,
        })
    }
}

pub fn load_registry(path: &Path) -> Result<Registry> {
    let registry: Registry = read_toml(path, "registry")?;
    let entities: usize = registry
        .families
        .values()
        .map(|family| family.entities.len())
        .sum();
    info!(
        "Loaded registry {:?}: {} network(s), {} family(ies), {} entity(ies)",
        path,
        registry.networks.len(),
        registry.families.len(),
        entities
    );
    Ok(registry)
}

/// An absent path means nothing is denylisted
pub fn load_denylist(path: Option<&Path>) -> Result<Denylist> {
    match path {
        Some(path) => {
            let denylist: Denylist = read_toml(path, "denylist")?;
            info!(
                "Loaded denylist {:?}: {} family rule(s), {} entity rule(s)",
                path,
                denylist.families.len(),
                denylist.entities.len()
            );
            Ok(denylist)
        }
        None => Ok(Denylist::default()),
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse {what} file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;
    use types::NetworkId;

    const REGISTRY: &str = r#"
[networks.mainnet]
chain_id = 1

[families.maker]
routing = "shared_gateway"

[[families.maker.entities]]
name = "MakerFlash"
fork_id = 0
callback = "onFlashLoan(address,address,uint256,uint256,bytes)"
scheme = { kind = "allowlist" }
addresses = { mainnet = "0x60744434d6339a6B27d73d9Eda62b6F66a0a04FA" }
"#;

    #[test]
    fn test_load_snapshot() {
        let dir = tempdir().unwrap();
        let registry_path = dir.path().join("registry.toml");
        let denylist_path = dir.path().join("denylist.toml");
        fs::write(&registry_path, REGISTRY).unwrap();
        fs::write(&denylist_path, "[entities]\nMakerFlash = [\"mainnet\"]\n").unwrap();

        let config = GeneratorConfig {
            registry_path,
            denylist_path: Some(denylist_path),
            ..GeneratorConfig::default()
        };
        let snapshot = Snapshot::load(&config).unwrap();

        assert_eq!(snapshot.registry.families["maker"].entities.len(), 1);
        assert!(snapshot
            .denylist
            .excludes("maker", "MakerFlash", &NetworkId::new("mainnet").unwrap()));
    }

    #[test]
    fn test_missing_denylist_means_empty() {
        assert_eq!(load_denylist(None).unwrap(), Denylist::default());
    }

    #[test]
    fn test_bad_selector_is_reported_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        fs::write(&path, REGISTRY.replace("onFlashLoan(", "onFlashLoan (")).unwrap();

        let err = load_registry(&path).unwrap_err();
        assert!(format!("{err:#}").contains("registry.toml"));
    }

    #[test]
    fn test_missing_registry_file() {
        let err = load_registry(&PathBuf::from("/nonexistent/registry.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read registry file"));
    }
}
