use anyhow::Context;
use gateway::{
    AppState, FsImageStore, GatewayConfig, HttpLabelDetector, logging::setup_logging, router,
    run_server,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;

    let _telemetry = setup_logging(&config)?;

    tracing::info!(config = ?config, "Loaded configuration");

    let store = FsImageStore::new(&config.staging_dir, &config.bucket);
    let detector = HttpLabelDetector::new(
        &config.detector_url,
        Duration::from_millis(config.detector_timeout_ms),
    )
    .context("failed to build detection client")?;

    let state = AppState::new(store, detector, &config);
    tracing::info!(
        detector = state.detector.endpoint(),
        excluded_labels = state.reducer.excluded_len(),
        max_labels = config.max_labels,
        min_confidence = config.min_confidence,
        "Gateway ready"
    );

    run_server(&config.addr, router(state)).await
}
