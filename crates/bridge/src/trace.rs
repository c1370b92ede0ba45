//! Logging setup. Unlike the controller this is derived from, there is no
//! HTTP surface to instrument and no OpenTelemetry exporter configured, just
//! an `EnvFilter` seeded from `RUST_LOG` and the configured log level, and a
//! `fmt` layer on stdout.

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Installs the global subscriber. `log_level` is used only when `RUST_LOG`
/// is unset, so an operator's explicit env var always wins.
pub fn init(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(log_level.to_lowercase())
    };

    let fmt = tracing_subscriber::fmt::Layer::default();
    Registry::default().with(filter).with(fmt).init();

    Ok(())
}
