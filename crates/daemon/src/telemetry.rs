//! OpenTelemetry export (behind the `telemetry` feature)

use crate::logging::BoxedLayer;
use anyhow::Result;

/// Tracing layer exporting spans over OTLP, if configured
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4318)
/// - `OTEL_SERVICE_NAME`: Service name (default: coldline-server)
pub fn otel_layer() -> Result<Option<BoxedLayer>> {
    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok(None);
    };

    #[cfg(feature = "telemetry")]
    let layer = Some(otel_layer_impl(endpoint)?);

    #[cfg(not(feature = "telemetry"))]
    let layer = {
        // Subscriber is not installed yet
        eprintln!(
            "OTEL_EXPORTER_OTLP_ENDPOINT={} ignored: built without the 'telemetry' feature",
            endpoint
        );
        None
    };

    Ok(layer)
}

#[cfg(feature = "telemetry")]
fn otel_layer_impl(endpoint: String) -> Result<BoxedLayer> {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use tracing_subscriber::Layer;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "coldline-server".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()?;

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
}
