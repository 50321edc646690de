//! `callgate` - callback authentication generator
//!
//! ```text
//! callgate generate [--config P] [--network N]... [--output DIR] [--fan-out K]
//! callgate check    [--config P] [--network N]...
//! ```

use anyhow::{bail, Context, Result};
use callgate_config::{GeneratorConfig, Snapshot};
use clap::{Args, Parser, Subcommand};
use codegen::{EmitOptions, Generator, GeneratorOptions};
use std::path::PathBuf;

#[macro_use]
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "callgate")]
#[command(about = "Generate callback authentication contracts from a protocol registry")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and write Solidity artifacts
    Generate(GenerateArgs),
    /// Resolve, group and plan every network without writing anything
    Check(TargetArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Generator config file (default: config/callgate.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Network to process; repeat for several (default: configured list, else all)
    #[arg(short, long = "network")]
    networks: Vec<String>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    targets: TargetArgs,
    /// Output directory for generated sources
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Branches per decision-tree level
    #[arg(long)]
    fan_out: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            let mut config = load_config(&args.targets)?;
            if let Some(output) = args.output {
                config.output_dir = output;
            }
            if let Some(fan_out) = args.fan_out {
                config.fan_out = fan_out;
            }
            config.validate()?;
            logging::init(&config.log_level, cli.json_logs)?;
            generate(&config)
        }
        Commands::Check(args) => {
            let config = load_config(&args)?;
            logging::init(&config.log_level, cli.json_logs)?;
            check(&config)
        }
    }
}

fn load_config(args: &TargetArgs) -> Result<GeneratorConfig> {
    let mut config =
        GeneratorConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if !args.networks.is_empty() {
        config.networks = args.networks.clone();
    }
    Ok(config)
}

fn generator_options(config: &GeneratorConfig) -> GeneratorOptions {
    GeneratorOptions {
        fan_out: config.fan_out,
        emit: EmitOptions {
            pragma: config.solidity_pragma.clone(),
            license: config.license.clone(),
        },
    }
}

fn generate(config: &GeneratorConfig) -> Result<()> {
    let snapshot = Snapshot::load(config)?;
    let generator = Generator::new(
        &snapshot.registry,
        &snapshot.denylist,
        generator_options(config),
    );
    let targets = generator.targets(&config.network_ids()?);

    log_generate!(
        "Generating {} network(s) with fan-out {} into {:?}",
        targets.len(),
        config.fan_out,
        config.output_dir
    );
    let report = generator.generate(&targets);

    let written = output::write_artifacts(&config.output_dir, report.artifacts())?;
    log_write!("Wrote {} file(s) to {:?}", written, config.output_dir);

    for network in &report.networks {
        log_success!("{}: {} artifact(s)", network.network, network.artifacts.len());
    }
    for failure in &report.failures {
        log_error!("{}: {}", failure.network, failure.error);
    }

    if !report.is_success() {
        bail!(
            "{} of {} network(s) failed to generate",
            report.failures.len(),
            targets.len()
        );
    }
    Ok(())
}

fn check(config: &GeneratorConfig) -> Result<()> {
    let snapshot = Snapshot::load(config)?;
    let generator = Generator::new(
        &snapshot.registry,
        &snapshot.denylist,
        generator_options(config),
    );
    let targets = generator.targets(&config.network_ids()?);

    log_check!("Checking {} network(s)", targets.len());
    let mut failed = 0;
    for network in &targets {
        match generator.plan_network(network) {
            Ok(plan) => {
                if plan.families.is_empty() {
                    log_warning!(
                        "{}: no protocol enabled, the aggregator would always revert",
                        network
                    );
                }
                log_network!(
                    "{} (chain id {}): {} family(ies), {} group(s), max depth {}",
                    network,
                    plan.info.chain_id,
                    plan.families.len(),
                    plan.group_count(),
                    plan.max_depth()
                );
            }
            Err(error) => {
                log_error!("{}: {}", network, error);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} network(s) failed the check", failed, targets.len());
    }
    log_success!("All {} network(s) passed", targets.len());
    Ok(())
}
