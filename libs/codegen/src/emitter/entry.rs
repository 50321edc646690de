use super::{header, Artifact, ArtifactKind, EmitOptions, NetworkArtifacts, SolidityWriter};

pub const ENTRY_FILE: &str = "CallbackAuthEntry.sol";

/// Library selecting a network's aggregator creation code by name
///
/// Only networks passed in are reachable; anything else reverts
/// `UnknownNetwork`.
pub fn emit_entry(networks: &[NetworkArtifacts], options: &EmitOptions) -> Artifact {
    let mut w = SolidityWriter::new();
    header(&mut w, options);
    for network in networks {
        w.line(format!("import \"./{}\";", network.aggregator_path()));
    }
    if !networks.is_empty() {
        w.blank();
    }

    w.open("library CallbackAuthEntry")
        .line("error UnknownNetwork(string network);")
        .blank()
        .open("function creationCode(string memory network) internal pure returns (bytes memory)");

    if !networks.is_empty() {
        w.line("bytes32 key = keccak256(bytes(network));");
    }
    for network in networks {
        w.open(format!("if (key == keccak256(bytes(\"{}\")))", network.network))
            .line(format!("return type({}).creationCode;", network.aggregator))
            .close();
    }
    w.line("revert UnknownNetwork(network);").close().close();

    Artifact {
        path: ENTRY_FILE.to_string(),
        kind: ArtifactKind::Entry,
        contents: w.finish(),
    }
}
