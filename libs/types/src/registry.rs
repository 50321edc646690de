//! Registry snapshot and per-network resolution
//!
//! The snapshot is declared per protocol family, with each entity carrying
//! one address per network it is deployed on:
//!
//! ```toml
//! [networks.mainnet]
//! chain_id = 1
//!
//! [families.uniswap_v3]
//! routing = "direct"
//!
//! [[families.uniswap_v3.entities]]
//! name = "UniswapV3"
//! fork_id = 0
//! callback = "uniswapV3SwapCallback(int256,int256,bytes)"
//! scheme = { kind = "derived_pair", code_fingerprint = "0xe34f...", salt = "pair_fee" }
//! addresses = { mainnet = "0x1F98431c8aD98523631AE4a59f267346ea31F984" }
//! ```
//!
//! [`Registry::resolve`] flattens this into the deployments of one network,
//! honouring the [`Denylist`] before requiring an address.

use crate::deployment::{
    AuthenticationScheme, CallbackRouting, DispatchSelector, ForkId, ProtocolDeployment,
};
use crate::errors::RegistryError;
use crate::network::{NetworkId, NetworkInfo};
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Read-only registry snapshot injected into the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub networks: BTreeMap<NetworkId, NetworkInfo>,
    #[serde(default)]
    pub families: BTreeMap<String, ProtocolFamily>,
}

/// Deployments sharing one callback convention
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolFamily {
    #[serde(default)]
    pub routing: CallbackRouting,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}

/// One protocol entity with its addresses across networks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub fork_id: ForkId,
    pub callback: DispatchSelector,
    pub scheme: AuthenticationScheme,
    #[serde(default)]
    pub addresses: BTreeMap<NetworkId, Address>,
}

/// Networks a family or an entity is explicitly not generated for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denylist {
    #[serde(default)]
    pub families: BTreeMap<String, BTreeSet<NetworkId>>,
    #[serde(default)]
    pub entities: BTreeMap<String, BTreeSet<NetworkId>>,
}

impl Denylist {
    #[must_use]
    pub fn exclude_family(mut self, family: &str, network: NetworkId) -> Self {
        self.families
            .entry(family.to_string())
            .or_default()
            .insert(network);
        self
    }

    #[must_use]
    pub fn exclude_entity(mut self, entity: &str, network: NetworkId) -> Self {
        self.entities
            .entry(entity.to_string())
            .or_default()
            .insert(network);
        self
    }

    pub fn excludes(&self, family: &str, entity: &str, network: &NetworkId) -> bool {
        let listed = |table: &BTreeMap<String, BTreeSet<NetworkId>>, key: &str| {
            table.get(key).is_some_and(|networks| networks.contains(network))
        };
        listed(&self.families, family) || listed(&self.entities, entity)
    }
}

/// Every deployment that applies to one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkDeployments {
    pub network: NetworkId,
    pub info: NetworkInfo,
    /// Routing of each family with at least one deployment on the network
    pub families: BTreeMap<String, CallbackRouting>,
    pub deployments: Vec<ProtocolDeployment>,
}

impl Registry {
    pub fn network_ids(&self) -> impl Iterator<Item = &NetworkId> {
        self.networks.keys()
    }

    /// Flatten the snapshot into the deployments of `network`
    ///
    /// Denylisted entities are skipped before their address is looked up, so
    /// an entity that is simply not deployed on a network must be denylisted
    /// there rather than left without an address.
    pub fn resolve(
        &self,
        network: &NetworkId,
        denylist: &Denylist,
    ) -> Result<NetworkDeployments, RegistryError> {
        let info = self
            .networks
            .get(network)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownNetwork {
                network: network.clone(),
            })?;

        let mut seen = HashSet::new();
        let mut families = BTreeMap::new();
        let mut deployments = Vec::new();

        for (family_name, family) in &self.families {
            for entity in &family.entities {
                if denylist.excludes(family_name, &entity.name, network) {
                    continue;
                }

                let address = *entity.addresses.get(network).ok_or_else(|| {
                    RegistryError::MissingAddress {
                        network: network.clone(),
                        family: family_name.clone(),
                        entity: entity.name.clone(),
                    }
                })?;

                if !seen.insert(entity.name.as_str()) {
                    return Err(RegistryError::DuplicateEntity {
                        network: network.clone(),
                        entity: entity.name.clone(),
                    });
                }

                families.insert(family_name.clone(), family.routing);
                deployments.push(ProtocolDeployment {
                    entity_name: entity.name.clone(),
                    family: family_name.clone(),
                    fork_id: entity.fork_id,
                    address,
                    verification: entity.scheme.clone(),
                    dispatch_selector: entity.callback.clone(),
                });
            }
        }

        Ok(NetworkDeployments {
            network: network.clone(),
            info,
            families,
            deployments,
        })
    }
}
