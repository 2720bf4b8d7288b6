//! Tracing/logging setup shared by every process that hosts the accounting
//! domain.

pub mod config;
pub mod tracing;

pub use config::{LogFormat, ObservabilityConfig};

/// Initialize process-wide observability from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&ObservabilityConfig::from_env());
}

/// Like [`init`], but with explicit configuration and surfacing the error when
/// a global subscriber is already installed.
pub fn try_init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    tracing::try_init(config)
}
