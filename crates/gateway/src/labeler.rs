//! Client for the label-detection service.

use crate::staging::StagedImage;
use detection::RawLabel;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelDetectionError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Detection service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Invalid detection response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectLabelsParams {
    pub max_labels: u32,
    pub min_confidence: f64,
}

impl Default for DetectLabelsParams {
    fn default() -> Self {
        Self {
            max_labels: 10,
            min_confidence: 60.0,
        }
    }
}

pub trait LabelDetector: Send + Sync + 'static {
    fn detect_labels(
        &self,
        image: &StagedImage,
        params: &DetectLabelsParams,
    ) -> impl Future<Output = Result<Vec<RawLabel>, LabelDetectionError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsRequest {
    pub image: ImageRef,
    pub max_labels: u32,
    pub min_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageRef {
    pub s3_object: S3Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Object {
    pub bucket: String,
    pub name: String,
}

/// A missing or null `Labels` field reads as no labels; malformed entries are
/// dropped without losing their siblings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectLabelsResponse {
    #[serde(default, deserialize_with = "detection::deserialize_raw_labels")]
    pub labels: Vec<RawLabel>,
}

impl DetectLabelsRequest {
    pub fn new(image: &StagedImage, params: &DetectLabelsParams) -> Self {
        Self {
            image: ImageRef {
                s3_object: S3Object {
                    bucket: image.bucket.clone(),
                    name: image.key.clone(),
                },
            },
            max_labels: params.max_labels,
            min_confidence: params.min_confidence,
        }
    }
}

/// Posts `DetectLabels`-shaped JSON to a configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpLabelDetector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLabelDetector {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LabelDetectionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LabelDetector for HttpLabelDetector {
    async fn detect_labels(
        &self,
        image: &StagedImage,
        params: &DetectLabelsParams,
    ) -> Result<Vec<RawLabel>, LabelDetectionError> {
        let request = DetectLabelsRequest::new(image, params);

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LabelDetectionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: DetectLabelsResponse = serde_json::from_slice(&bytes)
            .map_err(|e| LabelDetectionError::InvalidResponse(e.to_string()))?;

        let labels = parsed.labels;
        tracing::debug!(key = %image.key, labels = labels.len(), "Detection service responded");
        Ok(labels)
    }
}
