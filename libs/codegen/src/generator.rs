//! Batch generation across networks
//!
//! Networks are generated one after another with no shared state. A
//! [`GenerationError`] aborts only the network it belongs to; the remaining
//! networks still produce artifacts and the entry library lists the
//! successful ones only.

use crate::emitter::{
    emit_common, emit_entry, emit_network, Artifact, EmitOptions, NetworkArtifacts,
};
use crate::error::GenerationError;
use crate::plan::NetworkPlan;
use crate::tree::DEFAULT_FAN_OUT;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use types::{Denylist, NetworkId, Registry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub fan_out: usize,
    pub emit: EmitOptions,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            emit: EmitOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFailure {
    pub network: NetworkId,
    pub error: GenerationError,
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub common: Artifact,
    pub networks: Vec<NetworkArtifacts>,
    pub entry: Artifact,
    pub failures: Vec<NetworkFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Common file, every network's files, then the entry library
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        std::iter::once(&self.common)
            .chain(self.networks.iter().flat_map(|network| &network.artifacts))
            .chain(std::iter::once(&self.entry))
    }
}

/// Generator over an injected, read-only registry snapshot
pub struct Generator<'a> {
    registry: &'a Registry,
    denylist: &'a Denylist,
    options: GeneratorOptions,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a Registry, denylist: &'a Denylist, options: GeneratorOptions) -> Self {
        Self {
            registry,
            denylist,
            options,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Requested networks, or every registry network when none are requested
    ///
    /// Repeated requests are dropped, keeping first-seen order.
    pub fn targets(&self, requested: &[NetworkId]) -> Vec<NetworkId> {
        if requested.is_empty() {
            return self.registry.network_ids().cloned().collect();
        }
        let mut seen = HashSet::new();
        requested
            .iter()
            .filter(|network| seen.insert(*network))
            .cloned()
            .collect()
    }

    /// Resolve, group, build trees and encode checks for one network
    pub fn plan_network(&self, network: &NetworkId) -> Result<NetworkPlan, GenerationError> {
        let deployments = self.registry.resolve(network, self.denylist)?;
        debug!(
            "Resolved {} deployment(s) on {} (chain id {})",
            deployments.deployments.len(),
            network,
            deployments.info.chain_id
        );
        NetworkPlan::build(&deployments, self.denylist, self.options.fan_out)
    }

    pub fn generate_network(
        &self,
        network: &NetworkId,
    ) -> Result<NetworkArtifacts, GenerationError> {
        let plan = self.plan_network(network)?;
        let artifacts = emit_network(&plan, &self.options.emit);
        info!(
            "Generated {} artifact(s) for {}: {} group(s), max depth {}",
            artifacts.artifacts.len(),
            network,
            plan.group_count(),
            plan.max_depth()
        );
        Ok(artifacts)
    }

    pub fn generate(&self, targets: &[NetworkId]) -> GenerationReport {
        let mut networks = Vec::new();
        let mut failures = Vec::new();

        for network in targets {
            match self.generate_network(network) {
                Ok(artifacts) => networks.push(artifacts),
                Err(error) => {
                    warn!("Skipping {}: {}", network, error);
                    failures.push(NetworkFailure {
                        network: network.clone(),
                        error,
                    });
                }
            }
        }

        GenerationReport {
            common: emit_common(&self.options.emit),
            entry: emit_entry(&networks, &self.options.emit),
            networks,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::net;
    use types::RegistryError;

    const SNAPSHOT: &str = r#"
[networks.mainnet]
chain_id = 1

[networks.base]
chain_id = 8453

[families.pools]

[[families.pools.entities]]
name = "Pool"
fork_id = 0
callback = "uniswapV3SwapCallback(int256,int256,bytes)"
scheme = { kind = "allowlist" }
addresses = { mainnet = "0x1F98431c8aD98523631AE4a59f267346ea31F984" }
"#;

    #[test]
    fn test_failed_network_does_not_stop_the_batch() {
        let registry: Registry = toml::from_str(SNAPSHOT).unwrap();
        let denylist = Denylist::default();
        let generator = Generator::new(&registry, &denylist, GeneratorOptions::default());

        let targets = generator.targets(&[]);
        assert_eq!(targets, [net("base"), net("mainnet")]);

        let report = generator.generate(&targets);
        assert!(!report.is_success());
        assert_eq!(report.networks.len(), 1);
        assert_eq!(report.networks[0].network.as_str(), "mainnet");
        assert!(matches!(
            report.failures[0].error,
            GenerationError::Registry(RegistryError::MissingAddress { .. })
        ));
        assert!(!report.entry.contents.contains("BaseCallbackAuth"));
        assert!(report.entry.contents.contains("MainnetCallbackAuth"));
    }

    #[test]
    fn test_report_artifact_order() {
        let registry: Registry = toml::from_str(SNAPSHOT).unwrap();
        let denylist = Denylist::default().exclude_entity("Pool", net("base"));
        let generator = Generator::new(&registry, &denylist, GeneratorOptions::default());

        let report = generator.generate(&generator.targets(&[]));
        assert!(report.is_success());
        let paths: Vec<_> = report.artifacts().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "CallbackAuthCommon.sol",
                "base/BaseCallbackAuth.sol",
                "mainnet/MainnetPoolsCallbacks.sol",
                "mainnet/MainnetCallbackAuth.sol",
                "CallbackAuthEntry.sol",
            ]
        );
    }

    #[test]
    fn test_invalid_fan_out_is_reported_per_network() {
        let registry: Registry = toml::from_str(SNAPSHOT).unwrap();
        let denylist = Denylist::default().exclude_entity("Pool", net("base"));
        let options = GeneratorOptions {
            fan_out: 1,
            ..GeneratorOptions::default()
        };
        let generator = Generator::new(&registry, &denylist, options);

        let report = generator.generate(&[net("mainnet")]);
        assert_eq!(
            report.failures[0].error,
            GenerationError::InvalidFanOut { fan_out: 1 }
        );
    }

    #[test]
    fn test_repeated_targets_generate_once() {
        let registry: Registry = toml::from_str(SNAPSHOT).unwrap();
        let denylist = Denylist::default();
        let generator = Generator::new(&registry, &denylist, GeneratorOptions::default());

        let targets = generator.targets(&[net("mainnet"), net("base"), net("mainnet")]);
        assert_eq!(targets, [net("mainnet"), net("base")]);

        let report = generator.generate(&generator.targets(&[net("mainnet"), net("mainnet")]));
        assert_eq!(report.networks.len(), 1);
        assert_eq!(
            report
                .entry
                .contents
                .matches("import \"./mainnet/MainnetCallbackAuth.sol\";")
                .count(),
            1
        );
    }
}
