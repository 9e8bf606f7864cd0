//! Logging and `OpenTelemetry` trace export.
//!
//! Console logging is always on. Spans are additionally exported over OTLP
//! when any `OTEL_EXPORTER_OTLP_*` variable is set. Only available with the
//! `telemetry` feature.

use std::env;
use std::time::Duration;

use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use opentelemetry::trace::{Status, TracerProvider};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_semantic_conventions::{
    SCHEMA_URL,
    attribute::{DEPLOYMENT_ENVIRONMENT_NAME, SERVICE_VERSION},
};
use sourcify_chains::Mode;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::Span;
use tracing_opentelemetry::{OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// OTLP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OtlpProtocol {
    Http,
    Grpc,
}

impl OtlpProtocol {
    /// `None` when no OTLP exporter is configured.
    fn from_env() -> Option<Self> {
        let configured = [
            "OTEL_EXPORTER_OTLP_ENDPOINT",
            "OTEL_EXPORTER_OTLP_HEADERS",
            "OTEL_EXPORTER_OTLP_PROTOCOL",
        ]
        .iter()
        .any(|key| env::var_os(key).is_some());
        configured.then(|| match env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref() {
            Ok("grpc") => Self::Grpc,
            _ => Self::Http,
        })
    }
}

fn env_or(key: &str, fallback: Option<&Value>) -> Option<Value> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Value::from)
        .or_else(|| fallback.cloned())
}

/// Service identity reported with exported spans.
///
/// `OTEL_SERVICE_NAME`, `OTEL_SERVICE_VERSION` and `OTEL_SERVICE_DEPLOYMENT`
/// take precedence over the values set here.
#[derive(Debug, Default)]
pub struct Telemetry {
    name: Option<Value>,
    version: Option<Value>,
    deployment: Option<Value>,
}

impl Telemetry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<Value>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<Value>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Report `mode` as the deployment environment.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        let name = if mode.is_production() {
            "production"
        } else {
            "development"
        };
        self.deployment = Some(name.into());
        self
    }

    fn resource(&self) -> Resource {
        let mut builder = Resource::builder();
        if let Some(name) = env_or("OTEL_SERVICE_NAME", self.name.as_ref()) {
            builder = builder.with_service_name(name);
        }
        let attributes: Vec<KeyValue> = [
            (SERVICE_VERSION, env_or("OTEL_SERVICE_VERSION", self.version.as_ref())),
            (
                DEPLOYMENT_ENVIRONMENT_NAME,
                env_or("OTEL_SERVICE_DEPLOYMENT", self.deployment.as_ref()),
            ),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| KeyValue::new(key, value)))
        .collect();
        if !attributes.is_empty() {
            builder = builder.with_schema_url(attributes, SCHEMA_URL);
        }
        builder.build()
    }

    fn tracer_provider(&self, protocol: OtlpProtocol) -> Option<SdkTracerProvider> {
        let exporter = match protocol {
            OtlpProtocol::Http => opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .build(),
            OtlpProtocol::Grpc => opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .build(),
        };
        let exporter = match exporter {
            Ok(exporter) => exporter,
            Err(error) => {
                eprintln_exporter_error(&error);
                return None;
            }
        };
        Some(
            SdkTracerProvider::builder()
                .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
                .with_resource(self.resource())
                .with_batch_exporter(exporter)
                .build(),
        )
    }

    /// Install the global subscriber.
    ///
    /// The returned guard flushes pending spans when dropped.
    pub fn register(self) -> TelemetryGuard {
        let protocol = OtlpProtocol::from_env();
        let tracer_provider = protocol.and_then(|p| self.tracer_provider(p));
        let otel_layer = tracer_provider
            .as_ref()
            .map(|provider| OpenTelemetryLayer::new(provider.tracer(env!("CARGO_PKG_NAME"))));

        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(tracing_subscriber::fmt::layer())
            .with(otel_layer)
            .init();

        match (protocol, &tracer_provider) {
            (Some(protocol), Some(_)) => tracing::info!(?protocol, "OTLP trace export enabled"),
            (Some(protocol), None) => tracing::warn!(?protocol, "OTLP exporter unavailable"),
            (None, _) => tracing::debug!("OTLP not configured, console logging only"),
        }

        TelemetryGuard { tracer_provider }
    }
}

// The subscriber is not installed yet when the exporter is built.
#[allow(clippy::print_stderr)]
fn eprintln_exporter_error(error: &impl std::fmt::Display) {
    eprintln!("failed to build OTLP span exporter: {error}");
}

/// Flushes and shuts down the tracer provider on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = &self.tracer_provider
            && let Err(err) = provider.shutdown()
        {
            tracing::error!(?err, "tracer provider shutdown error");
        }
    }
}

/// Request tracing layer produced by [`TelemetryGuard::http_tracing`].
pub type HttpTraceLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, HttpMakeSpan, DefaultOnRequest, HttpOnResponse>;

impl TelemetryGuard {
    /// Per-request spans named after the matched route.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn http_tracing(&self) -> HttpTraceLayer {
        TraceLayer::new_for_http()
            .make_span_with(HttpMakeSpan)
            .on_response(HttpOnResponse)
    }
}

/// Names spans by route template, so `/chains/1` and `/chains/10` share one.
#[derive(Clone, Copy, Debug)]
pub struct HttpMakeSpan;

impl<B> MakeSpan<B> for HttpMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map_or_else(|| request.uri().path(), MatchedPath::as_str);
        tracing::info_span!(
            "http_request",
            otel.kind = "server",
            otel.name = %format!("{} {route}", request.method()),
            method = %request.method(),
            uri = %request.uri(),
            status = tracing::field::Empty,
        )
    }
}

/// Records the status on the request span and logs latency.
#[derive(Clone, Copy, Debug)]
pub struct HttpOnResponse;

impl<B> OnResponse<B> for HttpOnResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        span.record("status", status.as_u16());
        if status.is_server_error() {
            span.set_status(Status::error(status.canonical_reason().unwrap_or("unknown")));
        } else {
            span.set_status(Status::Ok);
        }
        tracing::info!(status = status.as_u16(), elapsed_ms = latency.as_millis(), "response");
    }
}
