//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing using `LOG_FORMAT` and `RUST_LOG`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

pub use tracing::LogFormat;

/// Subscriber configuration (filters, formatting).
pub mod tracing;
