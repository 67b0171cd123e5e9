use crate::error::GatewayError;
use crate::labeler::LabelDetector;
use crate::staging::{ImageStore, StagedGuard};
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use detection::DetectionResult;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Deserialize)]
struct DetectRequest {
    image_b64: String,
}

/// `POST /detect`: stage the image, detect labels, clean up, reduce.
#[tracing::instrument(skip_all, fields(body_bytes = body.len()))]
pub async fn detect_food<S: ImageStore, D: LabelDetector>(
    State(state): State<AppState<S, D>>,
    body: Bytes,
) -> Result<Json<DetectionResult>, GatewayError> {
    let started = Instant::now();

    let result = process(&state, &body).await;

    match &result {
        Ok(detection) => {
            state.metrics.record("ok", started.elapsed());
            tracing::info!(
                best_guess = detection.best_guess.as_deref().unwrap_or("-"),
                foods = detection.foods.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Detection complete"
            );
        }
        Err(e) => {
            state.metrics.record(e.outcome(), started.elapsed());
            match (e, e.details()) {
                (GatewayError::PayloadTooLarge { size, limit }, _) => {
                    tracing::warn!(size, limit, "Rejected oversized image")
                }
                (_, Some(details)) => {
                    tracing::error!(error = %e, details = %details, "Detection request failed")
                }
                (_, None) => tracing::warn!(error = %e, "Rejected detection request"),
            }
        }
    }

    result.map(Json)
}

async fn process<S: ImageStore, D: LabelDetector>(
    state: &AppState<S, D>,
    body: &[u8],
) -> Result<DetectionResult, GatewayError> {
    let image = decode_image(body, state.max_image_bytes)?;

    let staged = state.store.put(image).await?;
    let staged = StagedGuard::new(Arc::clone(&state.store), staged);

    let detected = state.detector.detect_labels(staged.image(), &state.params).await;
    staged.release().await;

    let labels = detected?;
    Ok(state.reducer.reduce(&labels))
}

/// Parse `{"image_b64": ...}` and decode it, enforcing the size cap on the
/// decoded bytes.
pub fn decode_image(body: &[u8], max_image_bytes: usize) -> Result<Vec<u8>, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::MissingBody);
    }

    let request: DetectRequest =
        serde_json::from_slice(body).map_err(|_| GatewayError::BadRequest)?;

    let image = STANDARD
        .decode(request.image_b64.trim())
        .map_err(|_| GatewayError::BadRequest)?;

    if image.len() > max_image_bytes {
        return Err(GatewayError::PayloadTooLarge {
            size: image.len(),
            limit: max_image_bytes,
        });
    }

    Ok(image)
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
