//! Authentication scheme encoder
//!
//! Two halves that must agree bit for bit:
//!
//! - **Derivation**: the Rust mirror of every caller check
//!   ([`expected_subject`]), used by the simulator and by the known-pool
//!   tests.
//! - **Encoding**: the structured IR ([`EncodedCheck`]) the emitter renders
//!   into Solidity constants and comparisons.
//!
//! Tokens are always put in canonical (numeric address) order before the
//! salt is computed, so a pair authenticates identically in either order.

use crate::error::GenerationError;
use crate::grouping::DecisionGroup;
use crate::naming::{constant_name, override_fn};
use ethers_core::abi::{self, Token};
use ethers_core::types::{Address, H256, U256};
use ethers_core::utils::{get_create2_address_from_hash, keccak256};
use hex_literal::hex;
use types::{
    AuthenticationScheme, ForkId, NetworkId, OverrideProcedure, ProtocolDeployment, SaltLayout,
};

/// EIP-1167 minimal proxy creation code before the implementation address
pub const CLONE_PREFIX: [u8; 20] = hex!("3d602d80600a3d3981f3363d3d373d3d3d363d73");

/// EIP-1167 minimal proxy creation code after the implementation address
pub const CLONE_SUFFIX: [u8; 15] = hex!("5af43d82803e903d91602b57fd5bf3");

/// Callback-time pair metadata the subject is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub token_a: Address,
    pub token_b: Address,
    /// Fee tier in hundredths of a bip (`uint24` on chain)
    pub fee: u32,
    pub stable: bool,
}

impl PairKey {
    pub fn new(token_a: Address, token_b: Address) -> Self {
        Self {
            token_a,
            token_b,
            fee: 0,
            stable: false,
        }
    }

    #[must_use]
    pub fn with_fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    #[must_use]
    pub fn with_stable(mut self, stable: bool) -> Self {
        self.stable = stable;
        self
    }

    /// `(token0, token1)` with `token0 < token1`
    pub fn sorted(&self) -> (Address, Address) {
        if self.token_a < self.token_b {
            (self.token_a, self.token_b)
        } else {
            (self.token_b, self.token_a)
        }
    }
}

/// CREATE2 salt for `pair` under `layout`
pub fn pair_salt(layout: SaltLayout, pair: &PairKey) -> H256 {
    let (token0, token1) = pair.sorted();
    let preimage = match layout {
        SaltLayout::Pair => [token0.as_bytes(), token1.as_bytes()].concat(),
        SaltLayout::PairStable => [
            token0.as_bytes(),
            token1.as_bytes(),
            &[u8::from(pair.stable)][..],
        ]
        .concat(),
        SaltLayout::PairFee => abi::encode(&[
            Token::Address(token0),
            Token::Address(token1),
            Token::Uint(U256::from(pair.fee & 0x00ff_ffff)),
        ]),
    };
    H256(keccak256(preimage))
}

/// Pool address CREATE2-deployed by `factory` for `pair`
pub fn derive_address(
    factory: Address,
    code_fingerprint: H256,
    layout: SaltLayout,
    pair: &PairKey,
) -> Address {
    get_create2_address_from_hash(factory, pair_salt(layout, pair), code_fingerprint)
}

/// Address of an EIP-1167 clone of `implementation` deployed with CREATE2
pub fn predict_clone(implementation: Address, salt: H256, deployer: Address) -> Address {
    let init_code = [
        CLONE_PREFIX.as_slice(),
        implementation.as_bytes(),
        CLONE_SUFFIX.as_slice(),
    ]
    .concat();
    get_create2_address_from_hash(deployer, salt, keccak256(init_code))
}

/// The only address `deployment` accepts as a callback subject for `pair`
pub fn expected_subject(deployment: &ProtocolDeployment, pair: &PairKey) -> Address {
    match &deployment.verification {
        AuthenticationScheme::DerivedPair {
            code_fingerprint,
            salt,
        } => derive_address(deployment.address, *code_fingerprint, *salt, pair),
        AuthenticationScheme::Allowlist => deployment.address,
        AuthenticationScheme::CustomOverride { procedure } => match procedure {
            OverrideProcedure::CloneDeterministic { implementation } => predict_clone(
                *implementation,
                pair_salt(SaltLayout::PairStable, pair),
                deployment.address,
            ),
            OverrideProcedure::SeparateDeployer {
                deployer,
                code_fingerprint,
                salt,
            } => derive_address(*deployer, *code_fingerprint, *salt, pair),
        },
    }
}

/// Solidity body of an override function, emitted verbatim
///
/// In scope: `subject`, `factory`, `target`, `initHash`, `token0`, `token1`,
/// `fee`, `stable`.
pub fn override_snippet(procedure: &OverrideProcedure) -> &'static str {
    match procedure {
        OverrideProcedure::CloneDeterministic { .. } => concat!(
            "        bytes32 salt = keccak256(abi.encodePacked(token0, token1, stable));\n",
            "        return subject == predictClone(target, salt, factory);\n",
        ),
        OverrideProcedure::SeparateDeployer { salt, .. } => match salt {
            SaltLayout::Pair => {
                "        return subject == derivePair(target, initHash, token0, token1);\n"
            }
            SaltLayout::PairStable => {
                "        return subject == derivePairStable(target, initHash, token0, token1, stable);\n"
            }
            SaltLayout::PairFee => {
                "        return subject == derivePairFee(target, initHash, token0, token1, fee);\n"
            }
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantValue {
    Address(Address),
    Bytes32(H256),
}

/// Named compile-time constant of a verification module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub value: ConstantValue,
}

/// Comparison rendered at a decision-tree leaf; fields name constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerCheck {
    Derived {
        factory: String,
        init_hash: String,
        salt: SaltLayout,
    },
    Allowlist {
        address: String,
    },
    Override {
        function: String,
        factory: String,
        target: String,
        init_hash: Option<String>,
        snippet: &'static str,
    },
}

impl CallerCheck {
    /// Whether the check reads the ordered token pair
    pub fn uses_tokens(&self) -> bool {
        !matches!(self, Self::Allowlist { .. })
    }
}

/// One deployment's constants and leaf comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCheck {
    pub entity: String,
    pub fork_id: ForkId,
    pub constants: Vec<Constant>,
    pub check: CallerCheck,
}

pub fn encode_deployment(deployment: &ProtocolDeployment) -> EncodedCheck {
    let entity = deployment.entity_name.as_str();
    let named = |suffix: &str, value| Constant {
        name: constant_name(entity, suffix),
        value,
    };

    let (constants, check) = match &deployment.verification {
        AuthenticationScheme::DerivedPair {
            code_fingerprint,
            salt,
        } => {
            let factory = named("FACTORY", ConstantValue::Address(deployment.address));
            let init_hash = named("INIT_HASH", ConstantValue::Bytes32(*code_fingerprint));
            let check = CallerCheck::Derived {
                factory: factory.name.clone(),
                init_hash: init_hash.name.clone(),
                salt: *salt,
            };
            (vec![factory, init_hash], check)
        }
        AuthenticationScheme::Allowlist => {
            let address = named("ADDRESS", ConstantValue::Address(deployment.address));
            let check = CallerCheck::Allowlist {
                address: address.name.clone(),
            };
            (vec![address], check)
        }
        AuthenticationScheme::CustomOverride { procedure } => {
            let factory = named("FACTORY", ConstantValue::Address(deployment.address));
            let target = named("OVERRIDE_TARGET", ConstantValue::Address(procedure.target()));
            let init_hash = procedure
                .code_fingerprint()
                .map(|hash| named("INIT_HASH", ConstantValue::Bytes32(hash)));
            let check = CallerCheck::Override {
                function: override_fn(entity),
                factory: factory.name.clone(),
                target: target.name.clone(),
                init_hash: init_hash.as_ref().map(|constant| constant.name.clone()),
                snippet: override_snippet(procedure),
            };
            let constants = [Some(factory), Some(target), init_hash]
                .into_iter()
                .flatten()
                .collect();
            (constants, check)
        }
    };

    EncodedCheck {
        entity: entity.to_string(),
        fork_id: deployment.fork_id,
        constants,
        check,
    }
}

/// Encode every member of `group`, in group order
///
/// At most one member may use a custom override.
pub fn encode_group(
    network: &NetworkId,
    group: &DecisionGroup,
) -> Result<Vec<EncodedCheck>, GenerationError> {
    let mut overrides = group
        .entries()
        .iter()
        .filter(|deployment| deployment.verification.is_override());
    if let (Some(first), Some(second)) = (overrides.next(), overrides.next()) {
        return Err(GenerationError::MultipleOverridesUnsupported {
            network: network.clone(),
            selector: group.selector().to_string(),
            first: first.entity_name.clone(),
            second: second.entity_name.clone(),
        });
    }

    Ok(group.entries().iter().map(encode_deployment).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_by_selector;
    use crate::testing::{allowlisted, deployments_for, SWAP_CALLBACK};
    use ethers_core::types::H160;
    use types::{Denylist, DispatchSelector};

    const USDC: Address = H160(hex!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
    const WETH: Address = H160(hex!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"));

    fn deployment(
        entity: &str,
        address: Address,
        verification: AuthenticationScheme,
    ) -> ProtocolDeployment {
        ProtocolDeployment {
            entity_name: entity.to_string(),
            family: "test".to_string(),
            fork_id: ForkId(0),
            address,
            verification,
            dispatch_selector: DispatchSelector::from_signature(SWAP_CALLBACK).unwrap(),
        }
    }

    #[test]
    fn test_uniswap_v2_usdc_weth() {
        let factory = H160(hex!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f"));
        let init_hash = H256(hex!(
            "96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f"
        ));
        let pair = derive_address(factory, init_hash, SaltLayout::Pair, &PairKey::new(WETH, USDC));
        assert_eq!(pair, H160(hex!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc")));
    }

    #[test]
    fn test_uniswap_v3_usdc_weth_005() {
        let factory = H160(hex!("1F98431c8aD98523631AE4a59f267346ea31F984"));
        let init_hash = H256(hex!(
            "e34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54"
        ));
        let key = PairKey::new(USDC, WETH).with_fee(500);
        let pool = derive_address(factory, init_hash, SaltLayout::PairFee, &key);
        assert_eq!(pool, H160(hex!("88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640")));
    }

    #[test]
    fn test_stable_flag_changes_salt() {
        let volatile = PairKey::new(USDC, WETH);
        let stable = volatile.with_stable(true);
        assert_ne!(
            pair_salt(SaltLayout::PairStable, &volatile),
            pair_salt(SaltLayout::PairStable, &stable)
        );
        // Layouts that ignore the flag
        assert_eq!(
            pair_salt(SaltLayout::Pair, &volatile),
            pair_salt(SaltLayout::Pair, &stable)
        );
    }

    #[test]
    fn test_clone_prediction_uses_factory_as_deployer() {
        let factory = Address::repeat_byte(0x11);
        let implementation = Address::repeat_byte(0x22);
        let subject = deployment(
            "Aerodrome",
            factory,
            AuthenticationScheme::CustomOverride {
                procedure: OverrideProcedure::CloneDeterministic { implementation },
            },
        );
        let key = PairKey::new(USDC, WETH).with_stable(true);

        let expected = predict_clone(
            implementation,
            pair_salt(SaltLayout::PairStable, &key),
            factory,
        );
        assert_eq!(expected_subject(&subject, &key), expected);
        assert_ne!(
            expected,
            predict_clone(implementation, pair_salt(SaltLayout::PairStable, &key), implementation)
        );
    }

    #[test]
    fn test_encode_derived_pair() {
        let hash = H256::repeat_byte(0xab);
        let encoded = encode_deployment(&deployment(
            "UniswapV3",
            Address::repeat_byte(1),
            AuthenticationScheme::DerivedPair {
                code_fingerprint: hash,
                salt: SaltLayout::PairFee,
            },
        ));

        let names: Vec<_> = encoded.constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["UNISWAP_V3_FACTORY", "UNISWAP_V3_INIT_HASH"]);
        assert_eq!(encoded.constants[1].value, ConstantValue::Bytes32(hash));
        assert!(encoded.check.uses_tokens());
    }

    #[test]
    fn test_encode_separate_deployer_override() {
        let deployer = Address::repeat_byte(0x41);
        let encoded = encode_deployment(&deployment(
            "PancakeSwapV3",
            Address::repeat_byte(0x0b),
            AuthenticationScheme::CustomOverride {
                procedure: OverrideProcedure::SeparateDeployer {
                    deployer,
                    code_fingerprint: H256::repeat_byte(0x6c),
                    salt: SaltLayout::PairFee,
                },
            },
        ));

        match encoded.check {
            CallerCheck::Override {
                function,
                init_hash,
                snippet,
                ..
            } => {
                assert_eq!(function, "_isPancakeSwapV3Trusted");
                assert_eq!(init_hash.as_deref(), Some("PANCAKE_SWAP_V3_INIT_HASH"));
                assert!(snippet.contains("derivePairFee(target, initHash"));
            }
            other => panic!("unexpected check {other:?}"),
        }
        assert!(encoded
            .constants
            .iter()
            .any(|c| c.value == ConstantValue::Address(deployer)));
    }

    #[test]
    fn test_allowlist_ignores_tokens() {
        let check = encode_deployment(&allowlisted("Vault", "test", 0, SWAP_CALLBACK));
        assert_eq!(
            check.check,
            CallerCheck::Allowlist {
                address: "VAULT_ADDRESS".to_string()
            }
        );
        assert!(!check.check.uses_tokens());
    }

    #[test]
    fn test_second_override_in_group_is_rejected() {
        let clone = |entity: &str, fork: u8| {
            let mut d = deployment(
                entity,
                Address::repeat_byte(fork + 1),
                AuthenticationScheme::CustomOverride {
                    procedure: OverrideProcedure::CloneDeterministic {
                        implementation: Address::repeat_byte(0x99),
                    },
                },
            );
            d.fork_id = ForkId(fork);
            d
        };
        let network = deployments_for(vec![
            clone("CloneA", 0),
            allowlisted("Plain", "test", 1, SWAP_CALLBACK),
            clone("CloneB", 2),
        ]);
        let groups = group_by_selector(&network, &Denylist::default()).unwrap();
        let group = groups.values().next().unwrap();

        let err = encode_group(&network.network, group).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::MultipleOverridesUnsupported { ref first, ref second, .. }
                if first == "CloneA" && second == "CloneB"
        ));
    }
}
