//! Solidity emitters
//!
//! One emitter per artifact kind, all rendering from a validated
//! [`NetworkPlan`](crate::plan::NetworkPlan) through [`SolidityWriter`]:
//!
//! ```text
//! CallbackAuthCommon.sol                      errors, derivation helpers, CallbackGateway
//! <network>/<Network><Family>Callbacks.sol    constants + one verifier per selector group
//! <network>/<Network>CallbackAuth.sol         aggregator dispatching on the selector
//! CallbackAuthEntry.sol                       creation code lookup by network name
//! ```
//!
//! Emission performs no validation and cannot fail.

mod aggregator;
mod common;
mod entry;
mod module;
pub mod writer;

pub use aggregator::emit_aggregator;
pub use common::{emit_common, COMMON_FILE};
pub use entry::{emit_entry, ENTRY_FILE};
pub use module::emit_module;
pub use writer::SolidityWriter;

use crate::naming::aggregator_contract;
use crate::plan::NetworkPlan;
use std::fmt;
use types::NetworkId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Common,
    VerificationModule,
    Aggregator,
    Entry,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Common => "common",
            Self::VerificationModule => "verification module",
            Self::Aggregator => "aggregator",
            Self::Entry => "entry",
        };
        f.write_str(name)
    }
}

/// Generated source file, path relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: String,
    pub kind: ArtifactKind,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub pragma: String,
    pub license: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            pragma: "^0.8.25".to_string(),
            license: "MIT".to_string(),
        }
    }
}

/// Every artifact of one successfully planned network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkArtifacts {
    pub network: NetworkId,
    /// Name of the aggregating contract, referenced by the entry library
    pub aggregator: String,
    /// Verification modules first, aggregator last
    pub artifacts: Vec<Artifact>,
}

impl NetworkArtifacts {
    pub fn aggregator_path(&self) -> String {
        format!("{}/{}.sol", self.network, self.aggregator)
    }
}

pub fn emit_network(plan: &NetworkPlan, options: &EmitOptions) -> NetworkArtifacts {
    let mut artifacts: Vec<Artifact> = plan
        .families
        .iter()
        .map(|family| emit_module(plan, family, options))
        .collect();
    artifacts.push(emit_aggregator(plan, options));

    NetworkArtifacts {
        network: plan.network.clone(),
        aggregator: aggregator_contract(&plan.contract_prefix()),
        artifacts,
    }
}

/// License, banner and pragma shared by every file
fn header(w: &mut SolidityWriter, options: &EmitOptions) {
    w.line(format!("// SPDX-License-Identifier: {}", options.license))
        .line("// Generated by callgate. Do not edit.")
        .line(format!("pragma solidity {};", options.pragma))
        .blank();
}
