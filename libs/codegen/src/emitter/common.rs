use super::{header, Artifact, ArtifactKind, EmitOptions, SolidityWriter};
use crate::scheme::{CLONE_PREFIX, CLONE_SUFFIX};

pub const COMMON_FILE: &str = "CallbackAuthCommon.sol";

/// Errors, address derivation helpers and the gateway base contract
pub fn emit_common(options: &EmitOptions) -> Artifact {
    let mut w = SolidityWriter::new();
    header(&mut w, options);

    w.line("error UnknownForkId(uint8 forkId);")
        .line("error UntrustedCaller(address caller);")
        .line("error GatewayNotOpen();")
        .line("error GatewayAlreadyOpen();")
        .blank();

    w.open("function create2Address(address deployer, bytes32 salt, bytes32 initHash) pure returns (address)")
        .line("return address(uint160(uint256(keccak256(abi.encodePacked(bytes1(0xff), deployer, salt, initHash)))));")
        .close()
        .blank();

    w.open("function derivePair(address factory, bytes32 initHash, address token0, address token1) pure returns (address)")
        .line("return create2Address(factory, keccak256(abi.encodePacked(token0, token1)), initHash);")
        .close()
        .blank();

    w.open("function derivePairStable(address factory, bytes32 initHash, address token0, address token1, bool stable) pure returns (address)")
        .line("return create2Address(factory, keccak256(abi.encodePacked(token0, token1, stable)), initHash);")
        .close()
        .blank();

    w.open("function derivePairFee(address factory, bytes32 initHash, address token0, address token1, uint24 fee) pure returns (address)")
        .line("return create2Address(factory, keccak256(abi.encode(token0, token1, fee)), initHash);")
        .close()
        .blank();

    w.open("function predictClone(address implementation, bytes32 salt, address deployer) pure returns (address)")
        .line("bytes memory initCode = abi.encodePacked(")
        .line(format!("    hex\"{}\",", hex::encode(CLONE_PREFIX)))
        .line("    implementation,")
        .line(format!("    hex\"{}\"", hex::encode(CLONE_SUFFIX)))
        .line(");")
        .line("return create2Address(deployer, salt, keccak256(initCode));")
        .close()
        .blank();

    w.line("/// One-shot flag set before an outbound request and consumed by the solicited callback")
        .open("abstract contract CallbackGateway")
        .line("bool private _gatewayOpen;")
        .blank()
        .open("function _openGateway() internal")
        .line("if (_gatewayOpen) revert GatewayAlreadyOpen();")
        .line("_gatewayOpen = true;")
        .close()
        .blank()
        .open("function _consumeGateway() internal")
        .line("if (!_gatewayOpen) revert GatewayNotOpen();")
        .line("_gatewayOpen = false;")
        .close()
        .close();

    Artifact {
        path: COMMON_FILE.to_string(),
        kind: ArtifactKind::Common,
        contents: w.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_declares_errors_and_helpers() {
        let artifact = emit_common(&EmitOptions::default());
        let src = &artifact.contents;

        assert!(src.starts_with("// SPDX-License-Identifier: MIT\n"));
        assert!(src.contains("pragma solidity ^0.8.25;"));
        for symbol in [
            "error UnknownForkId(uint8 forkId);",
            "error UntrustedCaller(address caller);",
            "error GatewayNotOpen();",
            "error GatewayAlreadyOpen();",
            "function derivePairFee(",
            "function predictClone(",
            "abstract contract CallbackGateway {",
        ] {
            assert!(src.contains(symbol), "missing {symbol}");
        }
        assert!(src.contains("hex\"3d602d80600a3d3981f3363d3d373d3d3d363d73\""));
    }

    #[test]
    fn test_custom_license_and_pragma() {
        let options = EmitOptions {
            pragma: "0.8.28".to_string(),
            license: "BUSL-1.1".to_string(),
        };
        let src = emit_common(&options).contents;
        assert!(src.starts_with("// SPDX-License-Identifier: BUSL-1.1\n"));
        assert!(src.contains("pragma solidity 0.8.28;"));
    }
}
