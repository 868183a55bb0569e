//! evade_sim - Headless scenario runner for the evasion engine

mod scenario;
mod simulation;
mod world;

use anyhow::{Context, Result};
use clap::Parser;
use evade_core::config::{self, EngineConstants};
use evade_core::{EvasionEngine, ThreatCatalog};
use scenario::Scenario;
use simulation::Simulation;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::filter::EnvFilter;

/// Run a scripted encounter through the evasion engine
#[derive(Parser)]
#[command(name = "evade_sim")]
#[command(about = "Headless scenario runner for the evasion engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario file (TOML). Runs the bundled sample when omitted.
    scenario: Option<PathBuf>,

    /// Counter vocabulary to use instead of the bundled one
    #[arg(long)]
    counters: Option<PathBuf>,

    /// Effect catalog to use instead of the bundled one
    #[arg(long)]
    effects: Option<PathBuf>,

    /// Log filter, e.g. "evade_core=debug"
    #[arg(long)]
    log: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Override the scenario's dropped-order seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => Scenario::sample().context("loading bundled scenario")?,
    };
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }

    let vocabulary = match &cli.counters {
        Some(path) => config::load_vocabulary(path)
            .with_context(|| format!("loading counters {}", path.display()))?,
        None => config::default_vocabulary(),
    };
    let records = match &cli.effects {
        Some(path) => config::load_effect_records(path)
            .with_context(|| format!("loading effects {}", path.display()))?,
        None => config::default_effect_records(),
    };

    let base = config::effect_parameters(&records);
    let catalog: ThreatCatalog = config::build_catalog(&records, &vocabulary, &base)?;
    let params = scenario.parameters(base);
    let constants: EngineConstants = scenario.constants.clone();

    tracing::info!(
        scenario = %scenario.name,
        effects = catalog.len(),
        counters = vocabulary.len(),
        reaction_budget = constants.reaction_budget_total(),
        "starting simulation"
    );

    let engine = EvasionEngine::new(Arc::new(catalog), Arc::new(vocabulary), constants)
        .context("invalid engine constants")?;
    let report = Simulation::new(scenario, engine, params).run();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Scenario: {} ({} ticks)", report.scenario, report.ticks);
    for event in &report.events {
        println!("  [{:6.3}s] {}", event.time(), event.describe());
    }
    println!(
        "Counters used: {}  Avoided: {}  Hits taken: {}",
        report.counters_used(),
        report.avoided(),
        report.hits()
    );
    Ok(())
}

/// Log to stderr. `--log` wins over RUST_LOG.
fn init_logging(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::INFO.into())
            .from_env_lossy(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
