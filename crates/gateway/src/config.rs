use crate::labeler::DetectLabelsParams;
use common::{env_or, env_parse_or};
use detection::LabelReducer;
use std::env;
use std::path::PathBuf;

pub use common::Environment;

/// Decoded image size cap (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub addr: String,
    pub staging_dir: PathBuf,
    pub bucket: String,
    pub detector_url: String,
    pub detector_timeout_ms: u64,
    pub max_labels: u32,
    pub min_confidence: f64,
    pub max_image_bytes: usize,
    pub extra_excluded_labels: Vec<String>,
    pub otel_endpoint: Option<String>,
}

impl GatewayConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let addr = env_or("GATEWAY_ADDR", "0.0.0.0:8080");

        let staging_dir = PathBuf::from(env_or("GATEWAY_STAGING_DIR", "/tmp/food-detection"));

        let bucket = env_or("GATEWAY_BUCKET", "food-recognition-images");

        let detector_url = env_or(
            "GATEWAY_DETECTOR_URL",
            "http://127.0.0.1:9000/detect-labels",
        );

        let detector_timeout_ms = env_parse_or("GATEWAY_DETECTOR_TIMEOUT_MS", 30_000);

        let max_labels = env_parse_or("GATEWAY_MAX_LABELS", 10);

        let min_confidence = env_parse_or("GATEWAY_MIN_CONFIDENCE", 60.0);

        let max_image_bytes = env_parse_or("GATEWAY_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES);

        let extra_excluded_labels = env::var("GATEWAY_EXTRA_EXCLUDED_LABELS")
            .map(|s| parse_label_list(&s))
            .unwrap_or_default();

        let otel_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            environment,
            addr,
            staging_dir,
            bucket,
            detector_url,
            detector_timeout_ms,
            max_labels,
            min_confidence,
            max_image_bytes,
            extra_excluded_labels,
            otel_endpoint,
        })
    }

    pub fn detect_params(&self) -> DetectLabelsParams {
        DetectLabelsParams {
            max_labels: self.max_labels,
            min_confidence: self.min_confidence,
        }
    }

    /// Default generic-label set plus any configured extras.
    pub fn reducer(&self) -> LabelReducer {
        LabelReducer::default().with_excluded(self.extra_excluded_labels.iter().cloned())
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            addr: "127.0.0.1:0".to_string(),
            staging_dir: PathBuf::from("/tmp/food-detection-test"),
            bucket: "test-bucket".to_string(),
            detector_url: "http://127.0.0.1:9000/detect-labels".to_string(),
            detector_timeout_ms: 1_000,
            max_labels: 10,
            min_confidence: 60.0,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            extra_excluded_labels: Vec::new(),
            otel_endpoint: None,
        }
    }
}

/// Comma-separated label names, blanks ignored.
fn parse_label_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
