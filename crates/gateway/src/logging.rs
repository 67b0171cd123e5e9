use crate::config::GatewayConfig;
use common::{OtlpSettings, TelemetryGuard};

/// Service name on exported spans and the gateway's meter.
pub const SERVICE_NAME: &str = "food-detection-gateway";

/// OTLP export when an endpoint is configured, local logging otherwise.
///
/// The returned guard must stay alive for the lifetime of the process.
pub fn setup_logging(config: &GatewayConfig) -> anyhow::Result<Option<TelemetryGuard>> {
    match config.otel_endpoint.as_deref() {
        Some(endpoint) => {
            let settings = OtlpSettings::new(SERVICE_NAME, endpoint, config.environment);
            Ok(Some(TelemetryGuard::install(&settings)?))
        }
        None => {
            common::setup_logging(config.environment);
            Ok(None)
        }
    }
}
