// ecosim — headless runner for the predator/prey/grass simulation.
//
// Builds a `TickEngine` from the default config or a JSON file, runs it for
// a fixed number of ticks, and writes the population log (see
// `population_log.rs`). Verbosity comes from `RUST_LOG`, e.g.
// `RUST_LOG=ecosim_sim=debug` for per-tick tallies.
//
// `--dump-config` prints the effective config (after `--seed`) and exits, so
// `ecosim --dump-config > my.json` gives a complete file to edit.

mod population_log;

use anyhow::{Context, Result};
use clap::Parser;
use ecosim_sim::{EcoConfig, TickEngine};
use population_log::PopulationLog;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ecosim")]
#[command(about = "Run a predator/prey/grass simulation and log the populations")]
struct Cli {
    /// Path to a config file (JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config's seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Where to write the population log (CSV).
    #[arg(long, default_value = "pop_log.csv")]
    log: PathBuf,

    /// Stop early once both herbivores and predators are gone.
    #[arg(long)]
    stop_on_extinction: bool,

    /// Log a population line every N ticks (0 = never).
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn load_config(path: &Path) -> Result<EcoConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    EcoConfig::from_json(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EcoConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let mut engine = TickEngine::new(config).context("failed to create the world")?;
    let file = File::create(&cli.log)
        .with_context(|| format!("failed to create log {}", cli.log.display()))?;
    let mut pop_log = PopulationLog::new(BufWriter::new(file))?;

    let mut last = engine.observe();
    pop_log.record(&last)?;
    for _ in 0..cli.ticks {
        last = engine.step()?;
        pop_log.record(&last)?;
        if cli.report_every > 0 && last.tick() % cli.report_every == 0 {
            log::info!(
                "tick {}: {} herbivores, {} predators, {} grass",
                last.tick(),
                last.herbivores(),
                last.predators(),
                last.grass()
            );
        }
        if cli.stop_on_extinction && last.is_extinct() {
            log::info!("all animals gone at tick {}; stopping early", last.tick());
            break;
        }
    }
    engine.stop();

    let rows = pop_log.rows();
    pop_log
        .finish()
        .with_context(|| format!("failed to flush log {}", cli.log.display()))?;
    println!(
        "ran {} ticks: {} herbivores, {} predators, {} grass; {} rows written to {}",
        last.tick(),
        last.herbivores(),
        last.predators(),
        last.grass(),
        rows,
        cli.log.display()
    );
    Ok(())
}
