//! Read-only views of a run's persisted state.

use hv_results::{LoadReport, SnapshotStore};
use hv_sim::OperatingSnapshot;

use crate::error::AppResult;
use crate::run_service::RunPaths;

#[derive(Debug, Clone)]
pub struct StateView {
    pub snapshot: OperatingSnapshot,
    pub report: LoadReport,
}

impl StateView {
    pub fn run_hours(&self) -> f64 {
        self.snapshot.run_seconds / 3600.0
    }
}

/// The stored snapshot, or `None` when no run has stored one yet.
pub fn load_state(paths: &RunPaths) -> AppResult<Option<StateView>> {
    let store = SnapshotStore::new(&paths.snapshot);
    if !store.exists() {
        return Ok(None);
    }
    let mut snapshot = OperatingSnapshot::default();
    let report = store.load_into(&mut snapshot)?;
    Ok(Some(StateView { snapshot, report }))
}

/// Snapshot entries whose key contains `filter`, in persistence order.
pub fn select_entries(snapshot: &OperatingSnapshot, filter: Option<&str>) -> Vec<(&'static str, String)> {
    snapshot
        .entries()
        .into_iter()
        .filter(|(key, _)| filter.is_none_or(|f| key.contains(f)))
        .map(|(key, value)| (key, value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_selects_keys() {
        let snap = OperatingSnapshot::default();
        let temps = select_entries(&snap, Some("temp"));
        assert_eq!(temps.len(), 7);
        assert_eq!(temps[0], ("temp", "10".to_string()));
        assert_eq!(select_entries(&snap, None).len(), OperatingSnapshot::KEYS.len());
    }
}
