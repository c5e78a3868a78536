//! Process-wide logging setup.

/// Tracing subscriber configuration.
pub mod tracing;

/// Initialize structured logging with the default `info` filter.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init_with_default("info");
}
