//! # VCU Scenario Simulator
//!
//! Replays a TOML scenario through the vigilance unit core and reports the
//! outputs at the end of every phase. Uses factory timing unless a
//! configuration file is given.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;
use vcu_common::config::ConfigError;
use vcu_core::config::{load_config, LoadedConfig, Timing};
use vcu_core::cycle::Engine;
use vcu_core::scenario::Scenario;

/// VCU Simulator: scenario replay for the vigilance unit core
#[derive(Parser, Debug)]
#[command(name = "vcu_sim")]
#[command(version)]
#[command(about = "Replay input scenarios through the cab vigilance unit core")]
struct Args {
    /// Scenario TOML with one `[[phase]]` table per constant-input interval.
    scenario: PathBuf,

    /// Engine configuration TOML (factory timing when omitted).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log the transition journal after the run.
    #[arg(long)]
    journal: bool,

    /// Enable verbose logging (DEBUG level, overrides the config file).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs and phase summaries in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Loaded before tracing so the file's log level applies; errors are reported by run().
    let loaded = args.config.as_deref().map(load_config).transpose();
    let level = match &loaded {
        _ if args.verbose => Level::DEBUG,
        Ok(Some(loaded)) => loaded.config.shared.log_level.into(),
        _ => Level::INFO,
    };
    setup_tracing(&args, level);

    info!("VCU simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args, loaded) {
        error!("FATAL: {e}");
        process::exit(1);
    }
}

fn run(
    args: &Args,
    loaded: Result<Option<LoadedConfig>, ConfigError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let timing = match loaded? {
        Some(loaded) => {
            info!(
                path = ?args.config,
                service = %loaded.config.shared.service_name,
                "Config loaded"
            );
            loaded.timing
        }
        None => Timing::FACTORY,
    };

    let scenario = Scenario::load(&args.scenario)?;
    info!(
        "Scenario '{}': {} phases, {:?}",
        scenario.name,
        scenario.phases.len(),
        scenario.duration()
    );

    let mut engine = Engine::with_timing(timing);
    for summary in scenario.run(&mut engine) {
        if args.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            info!(
                phase = %summary.phase,
                cycle = summary.end_cycle,
                mode = ?summary.mode,
                vigilance = ?summary.vigilance_state,
                speed_limit = ?summary.speed_limit_state,
                brake = summary.penalty_brake,
                warning = summary.visible_warning,
                transitions = summary.transitions,
                "Phase complete"
            );
        }
    }

    if args.journal {
        let journal = engine.journal();
        info!(
            "Journal: {} entries ({} dropped)",
            journal.len(),
            journal.dropped()
        );
        for entry in journal.iter() {
            if args.json {
                println!("{}", serde_json::to_string(entry)?);
            } else {
                info!(cycle = entry.cycle, "{}", entry.describe());
            }
        }
    }

    let stats = engine.stats();
    info!(
        samples = stats.samples,
        transitions = stats.transitions,
        penalties = stats.penalty_applications,
        "Simulation complete"
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
