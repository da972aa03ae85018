//! Logging/tracing initialization used by the CLI binary.
//!
//! Trimmed down from the teacher's `observability.rs`: that module wires an
//! OTLP exporter through `opentelemetry`/`tracing-opentelemetry` because the
//! teacher ships a network-facing GraphQL service with spans worth
//! exporting. This crate has no such service and no counterpart in
//! SPEC_FULL.md's ambient stack beyond "structured logging" — so only the
//! `EnvFilter` + fmt layer half survives (see DESIGN.md).

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a global `tracing` subscriber: an `EnvFilter` (defaulting to
/// `info` when `RUST_LOG` is unset) plus the standard fmt layer.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
