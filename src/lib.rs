pub mod common;

pub mod settings;

pub mod storage;

pub mod workloads;

/// Error handling approach: boxing errors.
/// Pros: simple and allows original errors to be preserved.
/// Cons: the underlying error type is only know at runtime and is not statically determined.
///
/// Box converts any type that implements the Error trait into the trait object Box<Error> using From.
///
/// Per-transaction errors on the benchmark path are not boxed, see `NonFatalError`, so they can be
/// classified into aborted or failed without downcasting.
pub type TpccError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias.
pub type Result<T> = std::result::Result<T, TpccError>;
