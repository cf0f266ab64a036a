//! Prometheus wiring: the global recorder plus the `/metrics` route.
//!
//! Counter and gauge descriptions live next to the code that emits them
//! (see `ingest::ensure_metrics_described`); this module only installs the
//! recorder and renders the exposition text.

use anyhow::Context;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the process-global Prometheus recorder. Call once at startup,
/// before anything emits a metric.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("installing prometheus recorder")
}

/// Router fragment serving the exposition text at `/metrics`; merge it into
/// the main app router.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}
