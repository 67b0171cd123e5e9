use crate::labeler::LabelDetectionError;
use crate::staging::StagingError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

const MIB: usize = 1024 * 1024;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing body")]
    MissingBody,

    #[error("Bad request")]
    BadRequest,

    #[error("Image too large (max {}MB)", .limit / MIB)]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Image staging failed")]
    Staging(#[from] StagingError),

    #[error("Label detection failed")]
    Detection(#[from] LabelDetectionError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingBody | GatewayError::BadRequest => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Staging(_) | GatewayError::Detection(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Underlying cause, reported only for server-side failures.
    pub fn details(&self) -> Option<String> {
        match self {
            GatewayError::Staging(e) => Some(e.to_string()),
            GatewayError::Detection(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Metric label for the request outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::MissingBody | GatewayError::BadRequest => "bad_request",
            GatewayError::PayloadTooLarge { .. } => "too_large",
            GatewayError::Staging(_) => "staging_failed",
            GatewayError::Detection(_) => "detection_failed",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        assert_eq!(GatewayError::MissingBody.to_string(), "Missing body");
        assert_eq!(GatewayError::BadRequest.to_string(), "Bad request");

        let err = GatewayError::PayloadTooLarge {
            size: 11 * MIB,
            limit: 10 * MIB,
        };
        assert_eq!(
            err.to_string(),
            "Image too large (max 10MB)",
            "Limit should be reported in whole megabytes"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::MissingBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::PayloadTooLarge { size: 2, limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );

        let err: GatewayError = StagingError::Poisoned.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_details_only_for_server_failures() {
        assert!(GatewayError::BadRequest.details().is_none());

        let err: GatewayError =
            StagingError::Io(io::Error::new(io::ErrorKind::StorageFull, "disk full")).into();
        assert_eq!(err.to_string(), "Image staging failed");
        assert_eq!(err.details().as_deref(), Some("IO error: disk full"));

        let err: GatewayError = LabelDetectionError::InvalidResponse("eof".to_string()).into();
        assert_eq!(err.to_string(), "Label detection failed");
        assert_eq!(
            err.details().as_deref(),
            Some("Invalid detection response: eof")
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(GatewayError::MissingBody.outcome(), "bad_request");
        assert_eq!(
            GatewayError::PayloadTooLarge { size: 2, limit: 1 }.outcome(),
            "too_large"
        );
        let err: GatewayError = LabelDetectionError::InvalidResponse(String::new()).into();
        assert_eq!(err.outcome(), "detection_failed");
    }
}
