//! Wall-clock plant run: recovery, the stepping loop and periodic storage.

use std::path::{Path, PathBuf};

use hv_ambient::{AmbientEstimator, DustSource, ForecastSource};
use hv_controls::{ControlCommands, ControlSignal, ControllerLink};
use hv_project::schema::{PlantConfig, StorageDef};
use hv_results::{HistoryLog, Recovery, SnapshotStore};
use hv_sim::{Cadence, Clock, OperatingSnapshot, Scheduler, SimulationStep, write_requests};
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::progress::{RunCounters, RunProgressEvent, RunStage};
use crate::runtime_compile::{compile_estimator, compile_step, initial_snapshot, scheduler_options};
use crate::sources::resolve;

/// Where a run keeps its files.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    pub snapshot: PathBuf,
    pub history_dir: PathBuf,
    pub history_prefix: String,
}

impl RunPaths {
    pub fn from_config(def: &StorageDef, base_dir: &Path) -> Self {
        Self {
            snapshot: resolve(base_dir, &def.snapshot_path),
            history_dir: resolve(base_dir, &def.history_dir),
            history_prefix: def.history_prefix.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub snapshot: OperatingSnapshot,
    pub counters: RunCounters,
    pub recovery: Recovery,
    pub history_path: PathBuf,
}

fn emit(progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>, event: RunProgressEvent) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(event);
    }
}

pub struct PlantRunner<L: ControllerLink> {
    config: PlantConfig,
    paths: RunPaths,
    step: SimulationStep,
    estimator: AmbientEstimator,
    forecast: Box<dyn ForecastSource>,
    dust: Box<dyn DustSource>,
    link: L,
}

impl<L: ControllerLink> PlantRunner<L> {
    pub fn new(
        config: PlantConfig,
        paths: RunPaths,
        forecast: Box<dyn ForecastSource>,
        dust: Box<dyn DustSource>,
        link: L,
    ) -> AppResult<Self> {
        Ok(Self {
            step: compile_step(&config)?,
            estimator: compile_estimator(&config),
            config,
            paths,
            forecast,
            dust,
            link,
        })
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn estimator(&self) -> &AmbientEstimator {
        &self.estimator
    }

    /// Defaults, then configured overrides, then the controller's current
    /// values, then the persisted snapshot.
    fn recover(&mut self) -> AppResult<(OperatingSnapshot, Recovery)> {
        let mut snap = initial_snapshot(&self.config)?;
        match self.link.read_controls(&ControlSignal::STARTUP) {
            Ok(readings) => {
                let applied = snap.apply_readings(&readings);
                info!(applied, "seeded snapshot from controller");
            }
            Err(err) => warn!(error = %err, "initial controller read failed, using defaults"),
        }
        let recovery = SnapshotStore::new(&self.paths.snapshot).recover(&mut snap)?;
        self.step.prepare(&mut snap);
        Ok((snap, recovery))
    }

    fn read_commands(&mut self, last: &ControlCommands, counters: &mut RunCounters) -> ControlCommands {
        match self.link.read_controls(&ControlSignal::COMMANDS) {
            Ok(readings) => ControlCommands::from(&readings).fill_from(last),
            Err(err) => {
                counters.read_failures += 1;
                warn!(error = %err, "controller read failed, reusing last commands");
                last.clone()
            }
        }
    }

    /// Run until the horizon is reached.
    pub fn run(
        &mut self,
        clock: Box<dyn Clock>,
        mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
    ) -> AppResult<RunSummary> {
        let started = clock.now();
        let history = HistoryLog::stamped(
            &self.paths.history_dir,
            &self.paths.history_prefix,
            started,
        );
        let store = SnapshotStore::new(&self.paths.snapshot);
        let mut counters = RunCounters::default();

        let (mut snap, recovery) = self.recover()?;
        let offset = if snap.run_seconds.is_finite() && snap.run_seconds > 0.0 {
            snap.run_seconds as u64
        } else {
            0
        };
        let stage = match recovery {
            Recovery::Loaded(_) => RunStage::Recovered,
            Recovery::Bootstrapped => RunStage::Bootstrapped,
        };
        emit(
            &mut progress_cb,
            RunProgressEvent::stage(stage, offset, &counters),
        );

        let timing = &self.config.timing;
        let mut forecast_timer = Cadence::immediate(timing.forecast_refresh_s, offset);
        let mut dust_timer = Cadence::immediate(timing.dust_refresh_s, offset);
        let mut store_timer = Cadence::new(timing.store_period_s, offset);
        let mut scheduler = Scheduler::new(clock, scheduler_options(timing), offset)?;
        info!(
            name = %self.config.name,
            model = self.step.building_model().name(),
            offset_s = offset,
            horizon_h = timing.horizon_hours,
            "plant run started"
        );

        let mut last_cmd = ControlCommands::default();
        while let Some(tick) = scheduler.wait_for_tick() {
            let total = tick.total_seconds;
            let mut refreshed = false;
            if forecast_timer.due(total) {
                let replaced = self.estimator.refresh_forecasts(self.forecast.as_mut());
                refreshed = true;
                emit(
                    &mut progress_cb,
                    RunProgressEvent::at_tick(RunStage::ForecastRefreshed, &tick, &counters)
                        .with_message(format!("{replaced} series replaced")),
                );
            }
            if dust_timer.due(total) {
                let replaced = self.estimator.refresh_dust(self.dust.as_mut());
                refreshed = true;
                emit(
                    &mut progress_cb,
                    RunProgressEvent::at_tick(RunStage::DustRefreshed, &tick, &counters)
                        .with_message(if replaced { "replaced" } else { "kept" }),
                );
            }

            let now = scheduler.clock().now();
            let report = self.estimator.estimate(now);
            if refreshed {
                let degraded = report.degraded();
                if !degraded.is_empty() {
                    warn!(?degraded, "outdoor estimate degraded");
                }
            }

            let cmd = self.read_commands(&last_cmd, &mut counters);
            let corrected = self
                .step
                .advance(&mut snap, &report.conditions, &cmd, now, tick.dt_hours);
            counters.corrected_values += corrected.len() as u64;
            snap.run_seconds = total as f64;
            last_cmd = cmd;

            if let Err(err) = self.link.write_controls(&write_requests(&snap)) {
                counters.write_failures += 1;
                warn!(error = %err, "controller write failed");
            }

            counters.ticks += 1;
            debug!(
                hours = tick.hours,
                second = tick.second_of_hour,
                temp_rm = snap.temp_rm,
                "step done"
            );

            if store_timer.due(total) {
                let stored = store
                    .save(&snap)
                    .and_then(|()| history.append(now, &snap));
                match stored {
                    Ok(()) => {
                        counters.stores += 1;
                        emit(
                            &mut progress_cb,
                            RunProgressEvent::at_tick(RunStage::Stored, &tick, &counters),
                        );
                    }
                    Err(err) => {
                        counters.store_failures += 1;
                        warn!(error = %err, "snapshot store failed");
                    }
                }
            }

            emit(
                &mut progress_cb,
                RunProgressEvent::at_tick(RunStage::Stepped, &tick, &counters),
            );
            scheduler.finish_step();
        }

        if let Err(err) = store.save(&snap) {
            counters.store_failures += 1;
            warn!(error = %err, "final snapshot store failed");
        }
        emit(
            &mut progress_cb,
            RunProgressEvent::stage(RunStage::HorizonReached, scheduler.total_seconds(), &counters),
        );
        info!(
            ticks = counters.ticks,
            stores = counters.stores,
            run_seconds = snap.run_seconds,
            "plant run finished"
        );

        Ok(RunSummary {
            snapshot: snap,
            counters,
            recovery,
            history_path: history.path().to_path_buf(),
        })
    }
}
