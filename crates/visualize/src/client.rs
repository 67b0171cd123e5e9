use crate::error::VisualizeError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use detection::DetectionResult;
use serde_json::json;
use std::time::Duration;

/// Blocking client for the gateway's `/detect` endpoint.
pub struct DetectionClient {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl DetectionClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, VisualizeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Post the raw image bytes, base64-encoded, and decode the result leniently.
    pub fn detect(&self, image: &[u8]) -> Result<DetectionResult, VisualizeError> {
        let body = json!({ "image_b64": STANDARD.encode(image) });

        let response = self.client.post(&self.api_url).json(&body).send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(VisualizeError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
