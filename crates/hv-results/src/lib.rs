//! hv-results: operating snapshot persistence and history logging.

pub mod history;
pub mod store;

pub use history::{HistoryLog, format_history_line, history_file_name};
pub use store::{LoadReport, Recovery, SnapshotStore, format_snapshot, parse_snapshot};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
