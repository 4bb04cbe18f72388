use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracerProvider, Tracer};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Environment-driven logging settings.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySettings {
    /// `LOG_FORMAT=json` switches the fmt layer to flattened JSON lines.
    pub json: bool,
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`, enables span export when set.
    pub otlp_endpoint: Option<String>,
}

impl TelemetrySettings {
    pub fn from_env() -> Self {
        Self {
            json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

/// RAII guard that flushes and shuts down the tracer provider on drop.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to shutdown tracer provider: {e}");
        }
    }
}

/// Installs the global subscriber for `service_name`.
///
/// `RUST_LOG` controls filtering (default `info`). Hold the returned guard for
/// the lifetime of the process so buffered spans get exported.
///
/// # Panics
///
/// Panics if the OTLP exporter cannot be built from the configured endpoint.
pub fn init_telemetry(service_name: &str) -> TelemetryGuard {
    init_with(service_name, TelemetrySettings::from_env())
}

pub fn init_with(service_name: &str, settings: TelemetrySettings) -> TelemetryGuard {
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if settings.json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (otel_layer, provider) = match settings.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let (layer, provider) = build_otel_layer(service_name, endpoint);
            (Some(layer), Some(provider))
        }
        None => (None, None),
    };

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    TelemetryGuard { provider }
}

fn build_otel_layer<S>(
    service_name: &str,
    endpoint: &str,
) -> (
    tracing_opentelemetry::OpenTelemetryLayer<S, Tracer>,
    SdkTracerProvider,
)
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
{
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .expect("Failed to build OTLP span exporter");

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder()
                .with_service_name(service_name.to_owned())
                .build(),
        )
        .build();

    opentelemetry::global::set_tracer_provider(provider.clone());
    let tracer = provider.tracer(service_name.to_owned());

    (tracing_opentelemetry::layer().with_tracer(tracer), provider)
}
