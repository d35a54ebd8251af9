//! There are two types errors, (i) fatal errors, and (ii) non-fatal errors.
//! Fatal errors, or `FatalError`s, are raised before any rows are generated or transactions run and end the process.
//! Non-fatal errors are returned by transaction executions and are recorded as aborted or failed.
use serde::{Deserialize, Serialize};
use std::error;
use std::fmt;

/// Represents a fatal error.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub enum FatalError {
    /// Configuration option has an invalid value.
    InvalidConfiguration(String),

    /// Row producer constructed with a negative row count.
    InvalidRowCount(i64),

    /// Duration string could not be parsed.
    InvalidDuration(String),

    /// Table not part of the schema.
    UnknownTable(String),

    /// A worker thread panicked.
    WorkerPanicked,
}

/// Represents a non-fatal error.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub enum NonFatalError {
    /// Transaction could not be serialized.
    SerializationFailure(String),

    /// Lock could not be acquired.
    LockNotAvailable(String),

    /// Transaction chosen as a deadlock victim.
    Deadlock(String),

    /// Row does not exist in table.
    RowNotFound(String, String),

    /// Anything else.
    Unexpected(String),
}

impl NonFatalError {
    /// Returns `true` if the error is an expected concurrency conflict.
    pub fn is_abort(&self) -> bool {
        use NonFatalError::*;
        matches!(
            self,
            SerializationFailure(_) | LockNotAvailable(_) | Deadlock(_)
        )
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use FatalError::*;
        match *self {
            InvalidConfiguration(ref reason) => write!(f, "invalid configuration: {}", reason),
            InvalidRowCount(count) => write!(f, "invalid: row count {}", count),
            InvalidDuration(ref s) => write!(f, "invalid: duration {}", s),
            UnknownTable(ref name) => write!(f, "not found: table {}", name),
            WorkerPanicked => write!(f, "worker thread panicked"),
        }
    }
}

impl fmt::Display for NonFatalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use NonFatalError::*;
        match *self {
            SerializationFailure(ref reason) => write!(f, "serialization failure: {}", reason),
            LockNotAvailable(ref reason) => write!(f, "lock not available: {}", reason),
            Deadlock(ref reason) => write!(f, "deadlock: {}", reason),
            RowNotFound(ref key, ref table) => {
                write!(f, "not found: row {} in table {}", key, table)
            }
            Unexpected(ref reason) => write!(f, "unexpected: {}", reason),
        }
    }
}

impl error::Error for FatalError {}

impl error::Error for NonFatalError {}
