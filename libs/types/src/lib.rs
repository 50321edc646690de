//! # Callgate Registry Model
//!
//! ## Purpose
//!
//! Pure data definitions for the protocol registry consumed by the callback
//! authentication generator: networks, protocol families, deployments, and
//! the schemes used to prove that a callback came from a trusted pool or
//! vault. The only logic here is snapshot resolution (denylist, missing
//! addresses, duplicate entities) and selector computation.
//!
//! ## Integration Points
//!
//! - **Input Sources**: TOML registry and denylist snapshots loaded by `callgate-config`
//! - **Output Destinations**: `codegen` grouping, decision trees and emitters
//! - **Primitives**: `ethers-core` addresses, hashes and keccak selectors
//!
//! ## Architecture Role
//!
//! ```text
//! registry.toml ─┐
//!                ├→ [Registry::resolve] → NetworkDeployments → codegen
//! denylist.toml ─┘         ↓
//!                  RegistryError (UnknownNetwork, MissingAddress, DuplicateEntity)
//! ```

pub mod deployment;
pub mod errors;
pub mod network;
pub mod registry;

pub use deployment::{
    AuthenticationScheme, CallbackRouting, DispatchSelector, ForkId, OverrideProcedure,
    ProtocolDeployment, SaltLayout,
};
pub use errors::RegistryError;
pub use network::{NetworkId, NetworkInfo};
pub use registry::{Denylist, EntityRecord, NetworkDeployments, ProtocolFamily, Registry};

/// Re-exported so downstream crates share one primitive type set
pub use ethers_core::types::{Address, H256};
