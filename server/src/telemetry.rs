//! Logging setup.
//!
//! Console output is always on and filtered by `RUST_LOG` (default `info`).
//! Builds with the `otel` feature additionally export traces and logs over
//! OTLP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set and reachable.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn init_console() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(not(feature = "otel"))]
pub fn init_telemetry() {
    init_console();

    if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        tracing::warn!(
            "OTEL_EXPORTER_OTLP_ENDPOINT={} ignored; rebuild with --features otel to export",
            endpoint
        );
    }
}

#[cfg(feature = "otel")]
pub fn init_telemetry() {
    use std::env;

    let Ok(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        init_console();
        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return;
    };

    if !otel::is_reachable(&endpoint) {
        init_console();
        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return;
    }

    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "recipe-server".to_string());

    match otel::layers(&endpoint, &service_name) {
        Ok((trace_layer, log_layer)) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer())
                .with(trace_layer)
                .with(log_layer)
                .init();

            tracing::info!(
                "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );
        }
        Err(e) => {
            init_console();
            tracing::warn!("Failed to set up OTLP export to {}: {}", endpoint, e);
        }
    }
}

#[cfg(feature = "otel")]
mod otel {
    use std::net::{TcpStream, ToSocketAddrs};
    use std::time::Duration;

    use opentelemetry::trace::TracerProvider;
    use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
    use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
    use opentelemetry_sdk::logs::{SdkLogger, SdkLoggerProvider};
    use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
    use tracing_opentelemetry::OpenTelemetryLayer;
    use tracing_subscriber::registry::LookupSpan;

    /// Quick TCP check so a missing collector doesn't stall every export.
    pub fn is_reachable(endpoint: &str) -> bool {
        let host_port = endpoint
            .trim_start_matches("http://")
            .trim_start_matches("https://");

        host_port
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
            .unwrap_or(false)
    }

    pub fn layers<S>(
        endpoint: &str,
        service_name: &str,
    ) -> Result<
        (
            OpenTelemetryLayer<S, SdkTracer>,
            OpenTelemetryTracingBridge<SdkLoggerProvider, SdkLogger>,
        ),
        ExporterBuildError,
    >
    where
        S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    {
        let resource = opentelemetry_sdk::Resource::builder()
            .with_service_name(service_name.to_string())
            .build();

        let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?;

        let trace_provider = SdkTracerProvider::builder()
            .with_batch_exporter(trace_exporter)
            .with_resource(resource.clone())
            .build();

        let tracer = trace_provider.tracer("recipe-server");
        opentelemetry::global::set_tracer_provider(trace_provider);

        let log_exporter = opentelemetry_otlp::LogExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .build()?;

        let log_provider = SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource)
            .build();

        Ok((
            tracing_opentelemetry::layer().with_tracer(tracer),
            OpenTelemetryTracingBridge::new(&log_provider),
        ))
    }
}
