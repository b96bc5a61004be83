//! Error types for control operations.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while configuring control primitives.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Unknown signal name.
    #[error("Unknown signal: {name}")]
    UnknownSignal { name: String },
}

/// Errors from the controller link. Reads and writes are best effort; the
/// caller keeps the previous values on any of these.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinkError {
    #[error("Controller timed out during {operation}")]
    Timeout { operation: &'static str },

    #[error("Controller connection failed: {message}")]
    Connection { message: String },

    #[error("Controller returned status {status}")]
    Status { status: u16 },

    #[error("Malformed controller response: {message}")]
    Malformed { message: String },
}
