use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use housing_abm::{logger, run_simulation, Config, CsvReport};

/// Agent-based housing market simulation.
#[derive(Parser, Debug)]
#[command(name = "housing-sim", version, about)]
struct Cli {
    /// TOML file overriding any default parameter
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (overrides the config file)
    #[arg(short, long)]
    ticks: Option<usize>,

    /// Random seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Sale log, one row per settled sale
    #[arg(short, long, default_value = "results.csv")]
    output: PathBuf,

    /// Optional per-tick summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Log bids, sales and per-person valuations
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines instead of the compact format
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;
    tracing::debug!("config: {:?}", config);

    let output = run_simulation(config).context("simulation aborted")?;

    let mut sales = CsvReport::create(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    sales.write_all(&output.sales)?;
    let rows = sales.rows();
    sales.finish()?;
    tracing::info!(rows, path = %cli.output.display(), "sale log written");

    if let Some(path) = &cli.summary {
        let mut summary = CsvReport::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        summary.write_all(&output.ticks)?;
        summary.finish()?;
        tracing::info!(path = %path.display(), "tick summary written");
    }

    if let Some(last) = output.ticks.last() {
        println!(
            "Steps: {}  Sales: {}  Avg: {:.0}  P/H: {}/{}",
            output.ticks.len(),
            output.sales.len(),
            last.average_price,
            last.population,
            last.homes
        );
    }
    Ok(())
}
