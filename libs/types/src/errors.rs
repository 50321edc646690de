//! Error types for registry resolution and signature validation
//!
//! Every variant names the offending network and entity so a malformed
//! registry can be fixed upstream without re-running with extra logging.

use crate::network::NetworkId;
use thiserror::Error;

/// Configuration-data defects found while resolving a registry snapshot
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Target network is not declared under `[networks]`
    #[error("Unknown network '{network}': not declared in the registry snapshot")]
    UnknownNetwork { network: NetworkId },

    /// Two deployments on the same network share an entity name
    #[error("Duplicate entity '{entity}' on {network}: entity names must be unique per network")]
    DuplicateEntity { network: NetworkId, entity: String },

    /// Entity is neither deployed on the network nor denylisted for it
    #[error("Missing address for '{entity}' (family {family}) on {network}: add an address or denylist the entity")]
    MissingAddress {
        network: NetworkId,
        family: String,
        entity: String,
    },

    /// Network id cannot be used in generated paths and identifiers
    #[error("Invalid network id '{name}': {reason}")]
    InvalidNetworkId { name: String, reason: &'static str },

    /// Callback signature is not a canonical Solidity function signature
    #[error("Invalid callback signature '{signature}': {reason}")]
    InvalidSignature {
        signature: String,
        reason: &'static str,
    },
}
