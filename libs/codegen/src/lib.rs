//! # Callgate Code Generator
//!
//! ## Purpose
//!
//! Generates the Solidity that decides whether a callback arriving at a
//! trading contract (swap callback, flash-loan hook) really comes from a
//! trusted pool or vault. For each network the registry is grouped by
//! callback selector, each group is turned into a balanced decision tree over
//! fork ids, and every leaf compares the subject address against the
//! deployment's authentication scheme.
//!
//! ## Integration Points
//!
//! - **Input Sources**: `types::Registry` snapshot and `Denylist`, injected read-only
//! - **Output Destinations**: [`Artifact`] source texts written by the `callgate` CLI
//! - **Simulation**: [`GroupPlan::authenticate`] mirrors the emitted checks in Rust
//!
//! ## Architecture Role
//!
//! ```text
//! Registry ──resolve──→ NetworkDeployments
//!                              ↓
//!                     [group_by_selector]  → DuplicateForkId / IncompatibleForkRanges
//!                              ↓
//!                     [DecisionTree::build] + [encode_group]
//!                              ↓
//!                          NetworkPlan
//!                              ↓
//!             [emitter] → modules, aggregator, entry, common
//! ```
//!
//! A failing network never blocks the others; see [`Generator::generate`].

pub mod emitter;
pub mod error;
pub mod gateway;
pub mod generator;
pub mod grouping;
pub mod naming;
pub mod plan;
pub mod scheme;
pub mod tree;

#[cfg(test)]
mod testing;

pub use emitter::{Artifact, ArtifactKind, EmitOptions, NetworkArtifacts};
pub use error::{AuthError, GenerationError};
pub use gateway::GatewayState;
pub use generator::{GenerationReport, Generator, GeneratorOptions, NetworkFailure};
pub use grouping::{group_by_selector, DecisionGroup, SelectorGroups};
pub use plan::{FamilyPlan, GroupPlan, NetworkPlan};
pub use scheme::{expected_subject, PairKey};
pub use tree::{DecisionTree, DispatchNode, DEFAULT_FAN_OUT};
