//! # Callgate Configuration
//!
//! Generator settings and the registry snapshot they point at.
//!
//! ## Features
//!
//! - **Layered settings**: defaults, `config/callgate.toml`, `CALLGATE_*` environment
//! - **Snapshot loading**: registry and denylist TOML parsed into `types` models
//!
//! ## Usage
//!
//! ```rust,no_run
//! use callgate_config::{GeneratorConfig, Snapshot};
//!
//! let config = GeneratorConfig::load(None)?;
//! let snapshot = Snapshot::load(&config)?;
//! println!("{} networks", snapshot.registry.networks.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod generator_config;
pub mod snapshot;

pub use generator_config::{GeneratorConfig, DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use snapshot::{load_denylist, load_registry, Snapshot};
