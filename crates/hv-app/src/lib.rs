//! Application service layer for the HVAC plant emulator.
//!
//! Turns a validated configuration into a running plant: compiles the models,
//! wires the offline feeds and controller, and drives the wall-clock loop with
//! snapshot recovery and periodic storage.

pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;
pub mod runtime_compile;
pub mod sources;

pub use error::{AppError, AppResult};
pub use progress::{RunCounters, RunProgressEvent, RunStage};
pub use project_service::{ConfigSummary, check_config, config_dir, load_config, summarize};
pub use query::{StateView, load_state, select_entries};
pub use run_service::{PlantRunner, RunPaths, RunSummary};
pub use runtime_compile::{compile_step, initial_snapshot};
pub use sources::{OfflineSources, Unfed};

use std::path::Path;

use hv_controls::LoopbackController;
use hv_sim::Clock;

/// Build a runner for the configuration at `config_path` using the offline
/// sources it names.
pub fn offline_runner(config_path: &Path) -> AppResult<PlantRunner<LoopbackController>> {
    let config = load_config(config_path)?;
    let base = config_dir(config_path);
    let sources = OfflineSources::from_config(&config.sources, &base)?;
    let paths = RunPaths::from_config(&config.storage, &base);
    PlantRunner::new(config, paths, sources.forecast, sources.dust, sources.controller)
}

/// Load, wire and run until the horizon.
pub fn run_offline(
    config_path: &Path,
    clock: Box<dyn Clock>,
    progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunSummary> {
    offline_runner(config_path)?.run(clock, progress_cb)
}
