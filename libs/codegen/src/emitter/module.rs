use super::common::COMMON_FILE;
use super::{header, Artifact, ArtifactKind, EmitOptions, SolidityWriter};
use crate::naming::{authenticate_fn, module_contract};
use crate::plan::{FamilyPlan, GroupPlan, NetworkPlan};
use crate::scheme::{CallerCheck, ConstantValue, EncodedCheck};
use crate::tree::DispatchNode;
use ethers_core::utils::to_checksum;
use types::SaltLayout;

const OVERRIDE_PARAMS: [&str; 8] = [
    "address subject",
    "address factory",
    "address target",
    "bytes32 initHash",
    "address token0",
    "address token1",
    "uint24 fee",
    "bool stable",
];

/// Verification module for one family on one network
pub fn emit_module(plan: &NetworkPlan, family: &FamilyPlan, options: &EmitOptions) -> Artifact {
    let contract = module_contract(&plan.contract_prefix(), &family.name);
    let mut w = SolidityWriter::new();
    header(&mut w, options);
    w.line(format!("import \"../{COMMON_FILE}\";")).blank();

    let declaration = if family.is_gated() {
        format!("abstract contract {contract} is CallbackGateway")
    } else {
        format!("abstract contract {contract}")
    };
    w.open(declaration);

    let checks = family.groups.iter().flat_map(|group| group.checks());
    for constant in checks.clone().flat_map(|check| &check.constants) {
        w.line(render_constant(&constant.name, &constant.value));
    }

    for check in checks {
        if let CallerCheck::Override {
            function, snippet, ..
        } = &check.check
        {
            w.blank().line(format!("function {function}("));
            for (i, param) in OVERRIDE_PARAMS.iter().enumerate() {
                let separator = if i + 1 < OVERRIDE_PARAMS.len() { "," } else { "" };
                w.line(format!("    {param}{separator}"));
            }
            w.open(") private pure returns (bool)").raw(snippet).close();
        }
    }

    for group in &family.groups {
        w.blank();
        render_verifier(&mut w, group, family.is_gated());
    }
    w.close();

    Artifact {
        path: format!("{}/{contract}.sol", plan.network),
        kind: ArtifactKind::VerificationModule,
        contents: w.finish(),
    }
}

fn render_constant(name: &str, value: &ConstantValue) -> String {
    match value {
        ConstantValue::Address(address) => {
            format!("address internal constant {name} = {};", to_checksum(address, None))
        }
        ConstantValue::Bytes32(hash) => format!(
            "bytes32 internal constant {name} = 0x{};",
            hex::encode(hash.as_bytes())
        ),
    }
}

fn render_verifier(w: &mut SolidityWriter, group: &GroupPlan, gated: bool) {
    let mutability = if gated { "internal" } else { "internal pure" };
    w.line(format!("/// {}", group.group().selector()))
        .open(format!(
            "function {}(address subject, uint8 forkId, address tokenA, address tokenB, uint24 fee, bool stable) {mutability}",
            authenticate_fn(group.group().selector())
        ));

    if group.uses_tokens() {
        w.line("(address token0, address token1) = tokenA < tokenB ? (tokenA, tokenB) : (tokenB, tokenA);");
    }
    render_node(w, group.tree().root(), group.checks());

    if gated {
        w.line("_consumeGateway();");
    }
    w.close();
}

fn render_node(w: &mut SolidityWriter, node: &DispatchNode, checks: &[EncodedCheck]) {
    match node {
        DispatchNode::Direct { entry } => render_check(w, &checks[*entry]),
        DispatchNode::Leaf { fork_id, entry } => {
            w.line(format!("if (forkId != {fork_id}) revert UnknownForkId(forkId);"));
            render_check(w, &checks[*entry]);
        }
        DispatchNode::Match { arms } => {
            for (i, arm) in arms.iter().enumerate() {
                let guard = format!("if (forkId == {})", arm.fork_id);
                if i == 0 {
                    w.open(guard);
                } else {
                    w.reopen(format!("else {guard}"));
                }
                render_check(w, &checks[arm.entry]);
            }
            w.reopen("else")
                .line("revert UnknownForkId(forkId);")
                .close();
        }
        DispatchNode::Ranges { branches } => {
            for (i, branch) in branches.iter().enumerate() {
                let guard = match branch.upper {
                    Some(upper) => format!("if (forkId <= {upper})"),
                    None => String::new(),
                };
                match (i, guard.is_empty()) {
                    (0, _) => w.open(guard),
                    (_, true) => w.reopen("else"),
                    (_, false) => w.reopen(format!("else {guard}")),
                };
                render_node(w, &branch.node, checks);
            }
            w.close();
        }
    }
}

fn render_check(w: &mut SolidityWriter, encoded: &EncodedCheck) {
    let condition = match &encoded.check {
        CallerCheck::Derived {
            factory,
            init_hash,
            salt,
        } => {
            let derived = match salt {
                SaltLayout::Pair => format!("derivePair({factory}, {init_hash}, token0, token1)"),
                SaltLayout::PairStable => {
                    format!("derivePairStable({factory}, {init_hash}, token0, token1, stable)")
                }
                SaltLayout::PairFee => {
                    format!("derivePairFee({factory}, {init_hash}, token0, token1, fee)")
                }
            };
            format!("subject != {derived}")
        }
        CallerCheck::Allowlist { address } => format!("subject != {address}"),
        CallerCheck::Override {
            function,
            factory,
            target,
            init_hash,
            ..
        } => format!(
            "!{function}(subject, {factory}, {target}, {}, token0, token1, fee, stable)",
            init_hash.as_deref().unwrap_or("bytes32(0)")
        ),
    };
    w.line(format!("// {} (fork {})", encoded.entity, encoded.fork_id))
        .line(format!("if ({condition}) revert UntrustedCaller(subject);"));
}
