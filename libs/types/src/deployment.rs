//! Protocol deployments and the schemes used to authenticate their callers
//!
//! A [`ProtocolDeployment`] is one pool factory, vault or pool registered on
//! one network. Its [`AuthenticationScheme`] says how a callback caller is
//! proven to belong to it:
//!
//! ```text
//! DerivedPair      caller == CREATE2(factory, salt(token0, token1[, stable | fee]), init hash)
//! Allowlist        caller == address
//! CustomOverride   caller accepted by a procedure from a closed table
//! ```

use crate::errors::RegistryError;
use ethers_core::types::{Address, H256};
use ethers_core::utils::id;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Distinguishes protocol variants that share one dispatch selector
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ForkId(pub u8);

impl fmt::Display for ForkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback entry point identified by its canonical Solidity signature
///
/// Equality, ordering and hashing use only the 4-byte selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DispatchSelector {
    signature: String,
    selector: [u8; 4],
}

impl DispatchSelector {
    /// Parse `name(type,type,...)` and compute its keccak selector
    pub fn from_signature(signature: &str) -> Result<Self, RegistryError> {
        let invalid = |reason| RegistryError::InvalidSignature {
            signature: signature.to_string(),
            reason,
        };

        if signature.chars().any(char::is_whitespace) {
            return Err(invalid("canonical signatures contain no whitespace"));
        }
        let open = signature
            .find('(')
            .ok_or_else(|| invalid("missing argument list"))?;
        if !signature.ends_with(')') {
            return Err(invalid("argument list must close the signature"));
        }

        let name = &signature[..open];
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
            Some(_) => return Err(invalid("function name must start with a letter, '_' or '$'")),
            None => return Err(invalid("empty function name")),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
            return Err(invalid("function name must be a Solidity identifier"));
        }

        Ok(Self {
            signature: signature.to_string(),
            selector: id(signature),
        })
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    /// Function name without the argument list
    pub fn name(&self) -> &str {
        self.signature
            .split_once('(')
            .map_or(self.signature.as_str(), |(name, _)| name)
    }

    /// `0x`-prefixed selector, e.g. `0xfa461e33`
    pub fn hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }
}

impl PartialEq for DispatchSelector {
    fn eq(&self, other: &Self) -> bool {
        self.selector == other.selector
    }
}

impl Eq for DispatchSelector {}

impl PartialOrd for DispatchSelector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DispatchSelector {
    fn cmp(&self, other: &Self) -> Ordering {
        self.selector.cmp(&other.selector)
    }
}

impl Hash for DispatchSelector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.selector.hash(state);
    }
}

impl TryFrom<String> for DispatchSelector {
    type Error = RegistryError;

    fn try_from(signature: String) -> Result<Self, Self::Error> {
        Self::from_signature(&signature)
    }
}

impl From<DispatchSelector> for String {
    fn from(selector: DispatchSelector) -> Self {
        selector.signature
    }
}

impl fmt::Display for DispatchSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.signature, self.hex())
    }
}

/// How the CREATE2 salt is built from the canonically ordered token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltLayout {
    /// `keccak256(abi.encodePacked(token0, token1))`
    Pair,
    /// `keccak256(abi.encodePacked(token0, token1, stable))`
    PairStable,
    /// `keccak256(abi.encode(token0, token1, uint24 fee))`
    PairFee,
}

/// Closed table of verification procedures that don't fit plain derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideProcedure {
    /// EIP-1167 clone of `implementation`, deployed by the factory with a
    /// stable-flag salt
    CloneDeterministic { implementation: Address },
    /// CREATE2 from a pool deployer that is not the registered factory
    SeparateDeployer {
        deployer: Address,
        code_fingerprint: H256,
        salt: SaltLayout,
    },
}

impl OverrideProcedure {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CloneDeterministic { .. } => "clone_deterministic",
            Self::SeparateDeployer { .. } => "separate_deployer",
        }
    }

    /// Secondary address the procedure derives from
    pub fn target(&self) -> Address {
        match self {
            Self::CloneDeterministic { implementation } => *implementation,
            Self::SeparateDeployer { deployer, .. } => *deployer,
        }
    }

    pub fn code_fingerprint(&self) -> Option<H256> {
        match self {
            Self::CloneDeterministic { .. } => None,
            Self::SeparateDeployer {
                code_fingerprint, ..
            } => Some(*code_fingerprint),
        }
    }
}

/// How a callback caller is proven to be a trusted pool or vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthenticationScheme {
    /// Caller is recomputed from the factory, the token pair and the init
    /// code hash
    DerivedPair {
        code_fingerprint: H256,
        salt: SaltLayout,
    },
    /// Caller must be the registered address itself
    Allowlist,
    /// Protocol-specific procedure
    CustomOverride { procedure: OverrideProcedure },
}

impl AuthenticationScheme {
    pub fn is_override(&self) -> bool {
        matches!(self, Self::CustomOverride { .. })
    }

    pub fn stable_flag_supported(&self) -> bool {
        match self {
            Self::DerivedPair { salt, .. } => *salt == SaltLayout::PairStable,
            Self::CustomOverride {
                procedure: OverrideProcedure::CloneDeterministic { .. },
            } => true,
            Self::CustomOverride {
                procedure: OverrideProcedure::SeparateDeployer { salt, .. },
            } => *salt == SaltLayout::PairStable,
            Self::Allowlist => false,
        }
    }
}

/// Whether the callback's immediate caller is the party being authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackRouting {
    /// The pool or vault calls back directly
    #[default]
    Direct,
    /// A shared dispatcher calls back; the forwarded identifier is
    /// authenticated and the gateway flag must be open
    SharedGateway,
}

/// One deployed pool, factory or vault on one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolDeployment {
    pub entity_name: String,
    pub family: String,
    pub fork_id: ForkId,
    pub address: Address,
    pub verification: AuthenticationScheme,
    pub dispatch_selector: DispatchSelector,
}
