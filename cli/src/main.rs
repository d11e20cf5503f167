//! `markersmooth` CLI: scenario runs, replay export and offline evaluation.

mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use sim::replay::{load_replay, save_replay, ReplayLog};
use sim::runner::{evaluate, run_scenario, RunReport};
use sim::scenarios::{Scenario, ScenarioKind};
use smoother_core::{bank::BankConfig, DeviceClass, Sensitivity};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "markersmooth", about = "Marker pose smoothing CLI")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sensitivity preset (low, medium, high); overrides the config file
    #[arg(long, global = true)]
    sensitivity: Option<Sensitivity>,

    /// Device profile (desktop, constrained); overrides the config file
    #[arg(long, global = true)]
    device: Option<DeviceClass>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario and report smoothing metrics.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the recorded tracker frames
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Evaluate a previously recorded tracker session.
    Replay {
        /// Path to replay JSON file
        input: PathBuf,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let bank_config = file_config.bank_config(cli.sensitivity, cli.device)?;
    tracing::debug!(?bank_config, "configuration resolved");

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            output,
            save_replay: save_path,
        } => {
            run(scenario, seed, bank_config, output.as_deref(), save_path.as_deref())?;
        }
        Commands::Replay { input, output } => {
            replay(&input, bank_config, output.as_deref())?;
        }
    }

    Ok(())
}

fn run(
    kind: ScenarioKind,
    seed: u64,
    bank_config: BankConfig,
    output_path: Option<&Path>,
    replay_path: Option<&Path>,
) -> Result<()> {
    let mut scenario = Scenario::build(kind, seed);
    println!(
        "Running scenario '{}' (seed={}, duration={:.0}s, {} markers)...",
        scenario.name,
        seed,
        scenario.duration,
        scenario.targets.len()
    );

    let targets = scenario.targets.iter().map(|t| t.id).collect();
    let (report, frames) = run_scenario(&mut scenario, bank_config);
    print_report(&report);

    if let Some(rpath) = replay_path {
        let log = ReplayLog {
            scenario_name: scenario.name.clone(),
            seed,
            frame_dt: scenario.frame_dt,
            duration: scenario.duration,
            targets,
            frames,
        };
        save_replay(&log, rpath)?;
        println!("Replay saved to {}", rpath.display());
    }

    if let Some(opath) = output_path {
        write_report(&report, opath)?;
    }

    Ok(())
}

fn replay(input: &Path, bank_config: BankConfig, output_path: Option<&Path>) -> Result<()> {
    let log = load_replay(input)?;
    println!(
        "Replaying '{}' ({} frames)...",
        log.scenario_name,
        log.frames.len()
    );

    let report = evaluate(&log.scenario_name, log.seed, &log.targets, &log.frames, bank_config);
    print_report(&report);

    if let Some(opath) = output_path {
        write_report(&report, opath)?;
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    let m = &report.total;
    println!(
        "Done: {} frames, {} emitted, {} rejected, {} acquisitions, {} confirmed losses, smoothing={}us, elapsed={:.3}s",
        report.frames,
        m.n_emitted,
        m.n_rejected(),
        report.acquisitions,
        report.confirmed_losses,
        report.processing_us,
        report.elapsed_s,
    );
    for t in &report.per_target {
        println!(
            "  {}: rmse pos={:.4} rot={:.4}, jitter raw={:.5} smooth={:.5} (x{:.1})",
            t.target,
            t.metrics.rmse_position(),
            t.metrics.rmse_rotation(),
            t.metrics.raw_jitter(),
            t.metrics.smooth_jitter(),
            t.metrics.jitter_reduction(),
        );
    }
}

fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::json!({
        "scenario": report.scenario,
        "seed": report.seed,
        "frames": report.frames,
        "elapsed_s": report.elapsed_s,
        "processing_us": report.processing_us,
        "rmse_position": report.total.rmse_position(),
        "rmse_rotation": report.total.rmse_rotation(),
        "jitter_reduction": report.total.jitter_reduction(),
        "report": report,
    });
    std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    println!("Metrics saved to {}", path.display());
    Ok(())
}
