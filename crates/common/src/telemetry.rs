use crate::Environment;
use crate::logging::{env_filter, fmt_layer};
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    propagation::TraceContextPropagator,
    trace::{Sampler, SdkTracerProvider},
};
use opentelemetry_semantic_conventions::attribute::{SERVICE_NAME, SERVICE_VERSION};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

/// Where and how often to ship spans and metrics.
#[derive(Debug, Clone)]
pub struct OtlpSettings {
    pub service: String,
    pub endpoint: String,
    pub environment: Environment,
    pub metric_interval: Duration,
}

impl OtlpSettings {
    pub fn new(service: impl Into<String>, endpoint: impl Into<String>, environment: Environment) -> Self {
        Self {
            service: service.into(),
            endpoint: endpoint.into(),
            environment,
            metric_interval: Duration::from_secs(10),
        }
    }

    fn resource(&self) -> Resource {
        Resource::builder()
            .with_attributes([
                KeyValue::new(SERVICE_NAME, self.service.clone()),
                KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
                KeyValue::new(DEPLOYMENT_ENVIRONMENT, self.environment.as_str()),
            ])
            .build()
    }

    fn tracer_provider(&self, resource: Resource) -> anyhow::Result<SdkTracerProvider> {
        let exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.endpoint.as_str())
            .build()?;

        Ok(SdkTracerProvider::builder()
            .with_resource(resource)
            .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
            .with_batch_exporter(exporter)
            .build())
    }

    fn meter_provider(&self, resource: Resource) -> anyhow::Result<SdkMeterProvider> {
        let exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(self.endpoint.as_str())
            .build()?;
        let reader = PeriodicReader::builder(exporter)
            .with_interval(self.metric_interval)
            .build();

        Ok(SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader)
            .build())
    }
}

/// Exporting providers, flushed when dropped. Installing one also installs the
/// global subscriber, in place of [`crate::setup_logging`].
pub struct TelemetryGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl TelemetryGuard {
    /// Needs a Tokio runtime for the batch exporters.
    pub fn install(settings: &OtlpSettings) -> anyhow::Result<Self> {
        let resource = settings.resource();
        let tracer_provider = settings.tracer_provider(resource.clone())?;
        let meter_provider = settings.meter_provider(resource)?;

        global::set_text_map_propagator(TraceContextPropagator::new());
        global::set_tracer_provider(tracer_provider.clone());
        global::set_meter_provider(meter_provider.clone());

        tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_opentelemetry::layer().with_tracer(global::tracer(settings.service.clone())))
            .with(fmt_layer(settings.environment))
            .init();

        tracing::info!(
            service = %settings.service,
            endpoint = %settings.endpoint,
            interval_secs = settings.metric_interval.as_secs(),
            "OTLP export enabled"
        );

        Ok(Self {
            tracer_provider,
            meter_provider,
        })
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let results = [
            ("traces", self.tracer_provider.shutdown()),
            ("metrics", self.meter_provider.shutdown()),
        ];
        for (signal, result) in results {
            if let Err(e) = result {
                eprintln!("OTLP {signal} shutdown failed: {e:?}");
            }
        }
    }
}
