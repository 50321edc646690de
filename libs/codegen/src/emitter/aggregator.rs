use super::common::COMMON_FILE;
use super::{header, Artifact, ArtifactKind, EmitOptions, SolidityWriter};
use crate::naming::{aggregator_contract, authenticate_fn, module_contract};
use crate::plan::NetworkPlan;

const DISPATCH_SIGNATURE: &str = "_authenticateCallback(bytes4 selector, address caller, address forwarded, uint8 forkId, address tokenA, address tokenB, uint24 fee, bool stable)";

/// Network contract inheriting every family module and routing by selector
pub fn emit_aggregator(plan: &NetworkPlan, options: &EmitOptions) -> Artifact {
    let prefix = plan.contract_prefix();
    let contract = aggregator_contract(&prefix);
    let modules: Vec<String> = plan
        .families
        .iter()
        .map(|family| module_contract(&prefix, &family.name))
        .collect();

    let mut w = SolidityWriter::new();
    header(&mut w, options);
    w.line(format!("import \"../{COMMON_FILE}\";"));
    for module in &modules {
        w.line(format!("import \"./{module}.sol\";"));
    }
    w.blank();

    if modules.is_empty() {
        w.open(format!("contract {contract}"))
            .line("/// No protocol is enabled on this network")
            .open(format!("function {DISPATCH_SIGNATURE} internal pure"))
            .line("revert UntrustedCaller(caller);")
            .close()
            .close();
    } else {
        let mutability = if plan.has_gated_families() {
            "internal"
        } else {
            "internal pure"
        };
        w.open(format!("contract {contract} is {}", modules.join(", ")))
            .open(format!("function {DISPATCH_SIGNATURE} {mutability}"));

        for (i, (family, group)) in plan.groups().enumerate() {
            let guard = format!("if (selector == bytes4({}))", group.group().selector().hex());
            if i == 0 {
                w.open(guard);
            } else {
                w.reopen(format!("else {guard}"));
            }
            let subject = if family.is_gated() { "forwarded" } else { "caller" };
            w.line(format!(
                "{}({subject}, forkId, tokenA, tokenB, fee, stable);",
                authenticate_fn(group.group().selector())
            ));
        }
        w.reopen("else")
            .line("revert UntrustedCaller(caller);")
            .close()
            .close()
            .close();
    }

    Artifact {
        path: format!("{}/{contract}.sol", plan.network),
        kind: ArtifactKind::Aggregator,
        contents: w.finish(),
    }
}
