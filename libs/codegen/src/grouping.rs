//! Selector grouping
//!
//! Partitions one network's deployments by callback selector. A group may
//! span several protocol families (a Uniswap V2 fork and a Solidly fork both
//! calling `hook(...)`), in which case fork ids must be unique and range
//! compatible across all of them, and the families must agree on routing.

use crate::error::GenerationError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use types::{
    CallbackRouting, Denylist, DispatchSelector, ForkId, NetworkDeployments, NetworkId,
    ProtocolDeployment,
};

/// Fork ids below this value follow the low-range convention
pub const LOW_FORK_RANGE_END: u8 = 0x40;

/// Fork ids at or above this value follow the high-range convention
pub const HIGH_FORK_RANGE_START: u8 = 0x80;

/// Deployments sharing one dispatch selector on one network
///
/// Never empty; entries are sorted ascending by fork id with no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionGroup {
    selector: DispatchSelector,
    /// Distinct member families, sorted by name
    families: Vec<String>,
    routing: CallbackRouting,
    entries: Vec<ProtocolDeployment>,
}

impl DecisionGroup {
    fn from_members(
        deployments: &NetworkDeployments,
        selector: DispatchSelector,
        mut entries: Vec<ProtocolDeployment>,
    ) -> Result<Self, GenerationError> {
        let network = &deployments.network;
        entries.sort_by_key(|deployment| deployment.fork_id);

        if let Some(pair) = entries.windows(2).find(|pair| pair[0].fork_id == pair[1].fork_id) {
            return Err(GenerationError::DuplicateForkId {
                network: network.clone(),
                selector: selector.to_string(),
                fork_id: pair[0].fork_id,
                first: pair[0].entity_name.clone(),
                second: pair[1].entity_name.clone(),
            });
        }

        if let (Some(lowest), Some(highest)) = (entries.first(), entries.last()) {
            if lowest.fork_id.0 < LOW_FORK_RANGE_END && highest.fork_id.0 >= HIGH_FORK_RANGE_START
            {
                return Err(GenerationError::IncompatibleForkRanges {
                    network: network.clone(),
                    selector: selector.to_string(),
                    low: lowest.entity_name.clone(),
                    low_fork: lowest.fork_id,
                    high: highest.entity_name.clone(),
                    high_fork: highest.fork_id,
                    low_end: LOW_FORK_RANGE_END,
                    high_start: HIGH_FORK_RANGE_START,
                });
            }
        }

        let families: Vec<String> = entries
            .iter()
            .map(|deployment| deployment.family.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let routing_of = |family: &str| {
            deployments
                .families
                .get(family)
                .copied()
                .unwrap_or_default()
        };
        let routing = routing_of(families[0].as_str());
        if let Some(other) = families.iter().find(|family| routing_of(family.as_str()) != routing) {
            return Err(GenerationError::RoutingConflict {
                network: network.clone(),
                selector: selector.to_string(),
                first: families[0].clone(),
                second: other.clone(),
            });
        }

        Ok(Self {
            selector,
            families,
            routing,
            entries,
        })
    }

    pub fn selector(&self) -> &DispatchSelector {
        &self.selector
    }

    /// Family whose verification module hosts the group: the first by name
    pub fn family(&self) -> &str {
        &self.families[0]
    }

    pub fn families(&self) -> &[String] {
        &self.families
    }

    pub fn routing(&self) -> CallbackRouting {
        self.routing
    }

    pub fn entries(&self) -> &[ProtocolDeployment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a built group
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fork_ids(&self) -> impl Iterator<Item = ForkId> + '_ {
        self.entries.iter().map(|deployment| deployment.fork_id)
    }

    pub fn contains(&self, fork_id: ForkId) -> bool {
        self.entries
            .binary_search_by_key(&fork_id, |deployment| deployment.fork_id)
            .is_ok()
    }

    /// A single member is authenticated without any fork id dispatch
    pub fn is_direct(&self) -> bool {
        self.entries.len() == 1
    }
}

/// Decision groups of one network, ordered by selector
pub type SelectorGroups = BTreeMap<DispatchSelector, DecisionGroup>;

/// Group `deployments` by dispatch selector
///
/// Denylisted deployments are dropped first. Fails when a group repeats a
/// fork id, mixes fork ids from the low and high ranges, or joins families
/// with different callback routing.
pub fn group_by_selector(
    deployments: &NetworkDeployments,
    denylist: &Denylist,
) -> Result<SelectorGroups, GenerationError> {
    let network: &NetworkId = &deployments.network;
    let mut buckets: BTreeMap<DispatchSelector, Vec<ProtocolDeployment>> = BTreeMap::new();

    for deployment in &deployments.deployments {
        if denylist.excludes(&deployment.family, &deployment.entity_name, network) {
            debug!(
                "Skipping {} on {}: denylisted",
                deployment.entity_name, network
            );
            continue;
        }
        buckets
            .entry(deployment.dispatch_selector.clone())
            .or_default()
            .push(deployment.clone());
    }

    buckets
        .into_iter()
        .map(|(selector, members)| {
            let group = DecisionGroup::from_members(deployments, selector.clone(), members)?;
            debug!(
                "Grouped {} deployment(s) of {} under {} on {}",
                group.len(),
                group.families().join(", "),
                group.selector(),
                network
            );
            Ok((selector, group))
        })
        .collect()
}
