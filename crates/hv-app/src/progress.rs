use hv_sim::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Recovered,
    Bootstrapped,
    ForecastRefreshed,
    DustRefreshed,
    Stepped,
    Stored,
    HorizonReached,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub ticks: u64,
    pub stores: u64,
    pub read_failures: u64,
    pub write_failures: u64,
    pub store_failures: u64,
    pub corrected_values: u64,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub total_seconds: u64,
    pub message: Option<String>,
    pub counters: RunCounters,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, total_seconds: u64, counters: &RunCounters) -> Self {
        Self {
            stage,
            total_seconds,
            message: None,
            counters: counters.clone(),
        }
    }

    pub fn at_tick(stage: RunStage, tick: &Tick, counters: &RunCounters) -> Self {
        Self::stage(stage, tick.total_seconds, counters)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
