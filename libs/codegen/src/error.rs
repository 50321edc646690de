//! Generation-time and authentication-time errors
//!
//! [`GenerationError`] is raised while building one network's output and
//! aborts that network only. [`AuthError`] describes the failures the emitted
//! verification logic reverts with; the simulator in [`crate::plan`] returns
//! the same values so the decision logic can be tested without Solidity.

use ethers_core::types::Address;
use thiserror::Error;
use types::{ForkId, NetworkId, RegistryError};

/// Configuration-data defects that stop generation for a network
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Two deployments in one (network, selector) group share a fork id
    #[error("Duplicate fork id {fork_id} on {network} for {selector}: '{first}' and '{second}'")]
    DuplicateForkId {
        network: NetworkId,
        selector: String,
        fork_id: ForkId,
        first: String,
        second: String,
    },

    /// Low-range and high-range fork id conventions mixed in one group
    #[error("Incompatible fork ranges on {network} for {selector}: '{low}' (fork {low_fork}) is below {low_end:#04x} while '{high}' (fork {high_fork}) is at or above {high_start:#04x}")]
    IncompatibleForkRanges {
        network: NetworkId,
        selector: String,
        low: String,
        low_fork: ForkId,
        high: String,
        high_fork: ForkId,
        low_end: u8,
        high_start: u8,
    },

    /// Families sharing a callback selector disagree on routing
    #[error("Selector {selector} on {network} is shared by families '{first}' and '{second}' with different callback routing")]
    RoutingConflict {
        network: NetworkId,
        selector: String,
        first: String,
        second: String,
    },

    /// Two sources map to the same generated Solidity identifier
    #[error("Generated identifier '{identifier}' on {network} is produced by both {first} and {second}")]
    IdentifierCollision {
        network: NetworkId,
        identifier: String,
        first: String,
        second: String,
    },

    /// More than one custom override in a single decision group
    #[error("Multiple custom overrides on {network} for {selector}: '{first}' and '{second}' (at most one per group)")]
    MultipleOverridesUnsupported {
        network: NetworkId,
        selector: String,
        first: String,
        second: String,
    },

    /// Decision trees need at least two branches per level
    #[error("Invalid fan-out {fan_out}: decision trees need at least 2 branches per level")]
    InvalidFanOut { fan_out: usize },
}

/// Failures of the emitted caller-authentication path
///
/// All of them are terminal for the transaction they occur in.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unknown fork id {fork_id}: not present in the decision tree")]
    UnknownForkId { fork_id: ForkId },

    #[error("Untrusted caller {caller:#x}")]
    UntrustedCaller { caller: Address },

    #[error("Gateway not open: callback was not solicited by this contract")]
    GatewayNotOpen,

    #[error("Gateway already open: an outbound call is already in flight")]
    GatewayAlreadyOpen,
}
