//! Solidity identifier conventions for generated artifacts

use types::{DispatchSelector, NetworkId, NetworkInfo};

/// `bnb-chain` → `BnbChain`, `uniswap_v3` → `UniswapV3`
pub fn pascal_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    guard_leading_digit(out)
}

/// `UniswapV3` → `UNISWAP_V3`, `PancakeSwapV3` → `PANCAKE_SWAP_V3`
pub fn screaming_snake(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut prev: Option<char> = None;
    for c in raw.chars() {
        if !c.is_ascii_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev = None;
            continue;
        }
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
            && !out.ends_with('_')
        {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
        prev = Some(c);
    }
    let trimmed = out.trim_end_matches('_').to_string();
    guard_leading_digit(trimmed)
}

fn guard_leading_digit(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Per-group verifier, e.g. `_authenticateUniswapV3SwapCallback`
pub fn authenticate_fn(selector: &DispatchSelector) -> String {
    let name = selector.name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("_authenticate{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "_authenticate".to_string(),
    }
}

pub fn override_fn(entity: &str) -> String {
    format!("_is{}Trusted", pascal_case(entity))
}

pub fn constant_name(entity: &str, suffix: &str) -> String {
    format!("{}_{suffix}", screaming_snake(entity))
}

/// Leading part of every contract name on a network: the display name when
/// one is registered, otherwise the network id
pub fn network_prefix(network: &NetworkId, info: &NetworkInfo) -> String {
    pascal_case(info.display_name.as_deref().unwrap_or(network.as_str()))
}

pub fn module_contract(prefix: &str, family: &str) -> String {
    format!("{prefix}{}Callbacks", pascal_case(family))
}

pub fn aggregator_contract(prefix: &str) -> String {
    format!("{prefix}CallbackAuth")
}
