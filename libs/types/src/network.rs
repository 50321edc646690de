//! Network identifiers and per-network registry metadata

use crate::errors::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercase network name used as the key everywhere (`mainnet`, `bnb-chain`)
///
/// Restricted to `[a-z0-9_-]` so the id can be embedded in generated paths
/// and string literals as is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(name: &str) -> Result<Self, RegistryError> {
        let invalid = |reason| RegistryError::InvalidNetworkId {
            name: name.to_string(),
            reason,
        };

        let normalized = name.to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(invalid("network ids must not be empty"));
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(invalid("only letters, digits, '-' and '_' are allowed"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for NetworkId {
    type Err = RegistryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::new(name)
    }
}

impl TryFrom<String> for NetworkId {
    type Error = RegistryError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(&name)
    }
}

impl TryFrom<&str> for NetworkId {
    type Error = RegistryError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<NetworkId> for String {
    fn from(id: NetworkId) -> Self {
        id.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry metadata for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Name used in generated contract identifiers; defaults to the
    /// PascalCase form of the network id
    #[serde(default)]
    pub display_name: Option<String>,
}
