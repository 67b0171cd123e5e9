use crate::config::GatewayConfig;
use crate::labeler::{DetectLabelsParams, LabelDetector};
use crate::logging::SERVICE_NAME;
use crate::metrics::GatewayMetrics;
use crate::staging::ImageStore;
use detection::LabelReducer;
use std::sync::Arc;

pub struct AppState<S, D> {
    pub store: Arc<S>,
    pub detector: Arc<D>,
    pub reducer: Arc<LabelReducer>,
    pub params: DetectLabelsParams,
    pub max_image_bytes: usize,
    pub metrics: GatewayMetrics,
}

// Derive would demand `S: Clone` and `D: Clone`.
impl<S, D> Clone for AppState<S, D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            detector: Arc::clone(&self.detector),
            reducer: Arc::clone(&self.reducer),
            params: self.params,
            max_image_bytes: self.max_image_bytes,
            metrics: self.metrics.clone(),
        }
    }
}

impl<S: ImageStore, D: LabelDetector> AppState<S, D> {
    pub fn new(store: S, detector: D, config: &GatewayConfig) -> Self {
        Self {
            store: Arc::new(store),
            detector: Arc::new(detector),
            reducer: Arc::new(config.reducer()),
            params: config.detect_params(),
            max_image_bytes: config.max_image_bytes,
            metrics: GatewayMetrics::new(SERVICE_NAME),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
