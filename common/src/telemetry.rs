//! Provides helper functions for initializing log and trace collection and publication.
use anyhow::Result;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace, Resource};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter, Registry};

const SERVICE_NAME: &str = "elasticsearch-operator";

/// Initialize logging, and tracing when an OTLP endpoint is provided.
///
/// Both the log and trace filters default to INFO and honor `RUST_LOG`.
pub fn init(otlp_endpoint: Option<String>) -> Result<()> {
    let telemetry = match otlp_endpoint {
        Some(endpoint) => {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .tonic()
                        .with_endpoint(endpoint),
                )
                .with_trace_config(trace::config().with_resource(Resource::new(vec![
                    KeyValue::new("hostname", hostname()),
                    KeyValue::new("service.name", SERVICE_NAME),
                ])))
                .install_batch(runtime::Tokio)?;
            let otlp_filter = EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env()?;
            Some(
                tracing_opentelemetry::layer()
                    .with_tracer(tracer)
                    .with_filter(otlp_filter),
            )
        }
        None => None,
    };

    let log_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    let logger = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .compact()
        .with_filter(log_filter);

    let collector = Registry::default().with(telemetry).with(logger);

    tracing::subscriber::set_global_default(collector)?;

    Ok(())
}

/// Flush any pending spans to the exporter.
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}

fn hostname() -> String {
    gethostname::gethostname()
        .into_string()
        .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
}
