//! Per-network generation plan
//!
//! ```text
//! NetworkDeployments ─→ group_by_selector ─→ DecisionGroup ─┬→ DecisionTree
//!                                                           └→ EncodedCheck[]
//!                                   ↓
//!           NetworkPlan { FamilyPlan { GroupPlan { group, tree, checks } } }
//! ```
//!
//! The plan is everything the emitters need and nothing more: emission never
//! fails once a plan exists. [`GroupPlan::authenticate`] evaluates a group
//! exactly the way the rendered Solidity does, so authentication behaviour is
//! testable without a Solidity toolchain.

use crate::error::{AuthError, GenerationError};
use crate::gateway::GatewayState;
use crate::grouping::{group_by_selector, DecisionGroup};
use crate::naming::{aggregator_contract, authenticate_fn, module_contract, network_prefix};
use crate::scheme::{encode_group, expected_subject, CallerCheck, EncodedCheck, PairKey};
use crate::tree::DecisionTree;
use ethers_core::types::Address;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use types::{
    CallbackRouting, Denylist, DispatchSelector, ForkId, NetworkDeployments, NetworkId,
    NetworkInfo, ProtocolDeployment,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    group: DecisionGroup,
    tree: DecisionTree,
    checks: Vec<EncodedCheck>,
}

impl GroupPlan {
    pub fn new(
        network: &NetworkId,
        group: DecisionGroup,
        fan_out: usize,
    ) -> Result<Self, GenerationError> {
        let tree = DecisionTree::build(&group, fan_out)?;
        let checks = encode_group(network, &group)?;
        debug!(
            "Planned {} on {}: {} member(s), depth {}",
            group.selector(),
            network,
            group.len(),
            tree.depth()
        );
        Ok(Self {
            group,
            tree,
            checks,
        })
    }

    pub fn group(&self) -> &DecisionGroup {
        &self.group
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    /// One check per group entry, same order
    pub fn checks(&self) -> &[EncodedCheck] {
        &self.checks
    }

    pub fn uses_tokens(&self) -> bool {
        self.checks.iter().any(|check| check.check.uses_tokens())
    }

    /// Evaluate the group's verifier for `subject`
    pub fn authenticate(
        &self,
        subject: Address,
        fork_id: ForkId,
        pair: &PairKey,
    ) -> Result<&ProtocolDeployment, AuthError> {
        let deployment = &self.group.entries()[self.tree.resolve(fork_id)?];
        if expected_subject(deployment, pair) != subject {
            return Err(AuthError::UntrustedCaller { caller: subject });
        }
        Ok(deployment)
    }

    /// Shared-gateway callback: authenticate the forwarded identifier, then
    /// consume the gate
    pub fn authenticate_gated(
        &self,
        gate: &mut GatewayState,
        forwarded: Address,
        fork_id: ForkId,
        pair: &PairKey,
    ) -> Result<&ProtocolDeployment, AuthError> {
        let deployment = self.authenticate(forwarded, fork_id, pair)?;
        gate.consume()?;
        Ok(deployment)
    }
}

/// Groups of one protocol family; rendered as one verification module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyPlan {
    pub name: String,
    pub routing: CallbackRouting,
    pub groups: Vec<GroupPlan>,
}

impl FamilyPlan {
    pub fn is_gated(&self) -> bool {
        self.routing == CallbackRouting::SharedGateway
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlan {
    pub network: NetworkId,
    pub info: NetworkInfo,
    /// Sorted by family name
    pub families: Vec<FamilyPlan>,
}

impl NetworkPlan {
    pub fn build(
        deployments: &NetworkDeployments,
        denylist: &Denylist,
        fan_out: usize,
    ) -> Result<Self, GenerationError> {
        let network = &deployments.network;
        let mut families: BTreeMap<String, Vec<GroupPlan>> = BTreeMap::new();

        for group in group_by_selector(deployments, denylist)?.into_values() {
            let family = group.family().to_string();
            let plan = GroupPlan::new(network, group, fan_out)?;
            families.entry(family).or_default().push(plan);
        }

        let families = families
            .into_iter()
            .map(|(name, groups)| FamilyPlan {
                routing: deployments
                    .families
                    .get(&name)
                    .copied()
                    .unwrap_or_default(),
                name,
                groups,
            })
            .collect();

        let plan = Self {
            network: network.clone(),
            info: deployments.info.clone(),
            families,
        };
        plan.check_identifiers()?;
        Ok(plan)
    }

    /// Every contract, verifier, constant and override name the network
    /// emits shares one Solidity scope once the aggregator inherits the
    /// modules, so each must come from exactly one source
    fn check_identifiers(&self) -> Result<(), GenerationError> {
        let prefix = self.contract_prefix();
        let mut claimed: HashMap<String, String> = HashMap::new();
        let mut claim = |identifier: String, source: String| match claimed.entry(identifier) {
            Entry::Occupied(existing) => Err(GenerationError::IdentifierCollision {
                network: self.network.clone(),
                identifier: existing.key().clone(),
                first: existing.get().clone(),
                second: source,
            }),
            Entry::Vacant(slot) => {
                slot.insert(source);
                Ok(())
            }
        };

        claim(aggregator_contract(&prefix), format!("network '{}'", self.network))?;
        for family in &self.families {
            claim(
                module_contract(&prefix, &family.name),
                format!("family '{}'", family.name),
            )?;
        }

        for (family, group) in self.groups() {
            let selector = group.group().selector();
            claim(
                authenticate_fn(selector),
                format!("selector {selector}"),
            )?;
            for check in group.checks() {
                let source = format!("entity '{}' of family '{}'", check.entity, family.name);
                for constant in &check.constants {
                    claim(constant.name.clone(), source.clone())?;
                }
                if let CallerCheck::Override { function, .. } = &check.check {
                    claim(function.clone(), source)?;
                }
            }
        }
        Ok(())
    }

    /// Prefix shared by the network's generated contract names
    pub fn contract_prefix(&self) -> String {
        network_prefix(&self.network, &self.info)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&FamilyPlan, &GroupPlan)> {
        self.families
            .iter()
            .flat_map(|family| family.groups.iter().map(move |group| (family, group)))
    }

    pub fn group(&self, selector: &DispatchSelector) -> Option<&GroupPlan> {
        self.groups()
            .map(|(_, group)| group)
            .find(|group| group.group().selector() == selector)
    }

    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    /// Deepest decision tree on the network, 0 when there are no groups
    pub fn max_depth(&self) -> usize {
        self.groups()
            .map(|(_, group)| group.tree().depth())
            .max()
            .unwrap_or(0)
    }

    pub fn has_gated_families(&self) -> bool {
        self.families.iter().any(FamilyPlan::is_gated)
    }
}
