//! Fixture builders shared by unit tests

use crate::grouping::{group_by_selector, DecisionGroup};
use ethers_core::types::Address;
use ethers_core::utils::keccak256;
use std::collections::BTreeMap;
use types::{
    AuthenticationScheme, CallbackRouting, Denylist, DispatchSelector, ForkId, NetworkDeployments,
    NetworkId, NetworkInfo, ProtocolDeployment,
};

pub(crate) const SWAP_CALLBACK: &str = "uniswapV3SwapCallback(int256,int256,bytes)";

pub(crate) fn net(name: &str) -> NetworkId {
    NetworkId::new(name).unwrap()
}

/// Stable, distinct address per entity name
pub(crate) fn address_of(entity: &str) -> Address {
    Address::from_slice(&keccak256(entity.as_bytes())[12..])
}

pub(crate) fn allowlisted(
    entity: &str,
    family: &str,
    fork: u8,
    signature: &str,
) -> ProtocolDeployment {
    ProtocolDeployment {
        entity_name: entity.to_string(),
        family: family.to_string(),
        fork_id: ForkId(fork),
        address: address_of(entity),
        verification: AuthenticationScheme::Allowlist,
        dispatch_selector: DispatchSelector::from_signature(signature).unwrap(),
    }
}

/// Wrap deployments as a `mainnet` snapshot with every family routed directly
pub(crate) fn deployments_for(deployments: Vec<ProtocolDeployment>) -> NetworkDeployments {
    let families: BTreeMap<String, CallbackRouting> = deployments
        .iter()
        .map(|deployment| (deployment.family.clone(), CallbackRouting::Direct))
        .collect();

    NetworkDeployments {
        network: net("mainnet"),
        info: NetworkInfo {
            chain_id: 1,
            display_name: None,
        },
        families,
        deployments,
    }
}

/// Single allowlisted group with one member per fork id
pub(crate) fn group_of(forks: &[u8]) -> DecisionGroup {
    let members = forks
        .iter()
        .map(|fork| allowlisted(&format!("Fork{fork}"), "test", *fork, SWAP_CALLBACK))
        .collect();

    group_by_selector(&deployments_for(members), &Denylist::default())
        .unwrap()
        .into_values()
        .next()
        .unwrap()
}
