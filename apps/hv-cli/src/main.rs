use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDateTime;
use hv_app::{
    AppError, AppResult, OfflineSources, PlantRunner, RunPaths, RunProgressEvent, RunStage,
    RunSummary, check_config, config_dir, load_config, load_state, select_entries, summarize,
};
use hv_sim::{Clock, ManualClock, SystemClock};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hv-cli")]
#[command(about = "HVAC plant emulator for controller testing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plant configuration and compile its models
    Validate {
        /// Path to the plant YAML file
        config_path: PathBuf,
    },
    /// Run the plant until the configured horizon
    Run {
        /// Path to the plant YAML file
        config_path: PathBuf,
        /// Override the run horizon in hours
        #[arg(long)]
        horizon_hours: Option<u64>,
        /// Replay on a simulated clock starting at this local time
        /// ("YYYY-MM-DD HH:MM") instead of waiting on the wall clock
        #[arg(long)]
        replay_from: Option<String>,
    },
    /// Print the persisted operating snapshot
    ShowState {
        /// Path to the plant YAML file
        config_path: PathBuf,
        /// Only show keys containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            horizon_hours,
            replay_from,
        } => cmd_run(&config_path, horizon_hours, replay_from.as_deref()),
        Commands::ShowState {
            config_path,
            filter,
        } => cmd_show_state(&config_path, filter.as_deref()),
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = load_config(config_path)?;
    check_config(&config)?;
    let summary = summarize(&config);
    println!("✓ Configuration is valid");
    println!("  Name: {}", summary.name);
    println!("  Building model: {}", summary.building_model);
    println!(
        "  Step: {} s, horizon: {} h",
        summary.step_period_s, summary.horizon_hours
    );
    println!("  Snapshot: {}", summary.snapshot_path);
    println!(
        "  Forecast feed: {}, dust feed: {}",
        fed(summary.forecast_fed),
        fed(summary.dust_fed)
    );
    println!("  Initial overrides: {}", summary.initial_overrides);
    Ok(())
}

fn fed(yes: bool) -> &'static str {
    if yes { "replay" } else { "none" }
}

fn parse_start(text: &str) -> AppResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
        .map_err(|e| AppError::Config(format!("--replay-from '{text}': {e}")))
}

fn cmd_run(
    config_path: &Path,
    horizon_hours: Option<u64>,
    replay_from: Option<&str>,
) -> AppResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(hours) = horizon_hours {
        config.timing.horizon_hours = hours;
    }
    check_config(&config)?;

    let base = config_dir(config_path);
    let sources = OfflineSources::from_config(&config.sources, &base)?;
    let paths = RunPaths::from_config(&config.storage, &base);
    println!(
        "Running plant '{}' for {} h ({} s steps)",
        config.name, config.timing.horizon_hours, config.timing.step_period_s
    );
    let horizon_s = config.timing.horizon_hours * 3600;
    let mut runner = PlantRunner::new(
        config,
        paths,
        sources.forecast,
        sources.dust,
        sources.controller,
    )?;

    let clock: Box<dyn Clock> = match replay_from {
        Some(text) => Box::new(ManualClock::new(parse_start(text)?)),
        None => Box::new(SystemClock::new()),
    };

    let mut last_emit: Option<Instant> = None;
    let summary = runner.run(
        clock,
        Some(&mut |event: RunProgressEvent| {
            let due = last_emit.is_none_or(|t| t.elapsed().as_millis() >= 100);
            if event.stage != RunStage::Stepped || due {
                render_cli_progress(&event, horizon_s);
                last_emit = Some(Instant::now());
            }
        }),
    )?;
    clear_progress_line();
    print_run_summary(&summary);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent, horizon_s: u64) {
    match event.stage {
        RunStage::Stepped => {
            let fraction = if horizon_s > 0 {
                (event.total_seconds as f64 / horizon_s as f64).min(1.0)
            } else {
                1.0
            };
            let width = 28usize;
            let filled = ((fraction * width as f64).round() as usize).min(width);
            print!(
                "\r[{}{}] {:>6.2}%  t={}s  ticks={}  stores={}  read_failures={}",
                "#".repeat(filled),
                "-".repeat(width - filled),
                fraction * 100.0,
                event.total_seconds,
                event.counters.ticks,
                event.counters.stores,
                event.counters.read_failures,
            );
            let _ = io::stdout().flush();
        }
        RunStage::Stored => {}
        stage => {
            clear_progress_line();
            match &event.message {
                Some(msg) => println!("  {:?} at {} s: {}", stage, event.total_seconds, msg),
                None => println!("  {:?} at {} s", stage, event.total_seconds),
            }
        }
    }
}

fn print_run_summary(summary: &RunSummary) {
    let c = &summary.counters;
    println!("✓ Horizon reached at {} s", summary.snapshot.run_seconds);
    println!("  Ticks: {}", c.ticks);
    println!("  Stores: {} ({} failed)", c.stores, c.store_failures);
    println!(
        "  Controller: {} read failures, {} write failures",
        c.read_failures, c.write_failures
    );
    println!("  Corrected values: {}", c.corrected_values);
    println!("  History: {}", summary.history_path.display());
    let s = &summary.snapshot;
    println!(
        "  Room {:.2} °C, supply {:.2} °C, outdoor {:.2} °C, CO2 {:.0} ppm",
        s.temp_rm, s.temp_su, s.temp, s.air_q
    );
}

fn cmd_show_state(config_path: &Path, filter: Option<&str>) -> AppResult<()> {
    let config = load_config(config_path)?;
    let paths = RunPaths::from_config(&config.storage, &config_dir(config_path));
    let Some(state) = load_state(&paths)? else {
        println!("No stored snapshot at {}", paths.snapshot.display());
        return Ok(());
    };

    println!(
        "Snapshot {} ({:.2} h into the run)",
        paths.snapshot.display(),
        state.run_hours()
    );
    if !state.report.unknown.is_empty() {
        println!("  Ignored keys: {}", state.report.unknown.join(", "));
    }
    if !state.report.malformed.is_empty() {
        println!("  Malformed lines: {}", state.report.malformed.len());
    }
    for (key, value) in select_entries(&state.snapshot, filter) {
        println!("  {:<12} {}", key, value);
    }
    Ok(())
}
