use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisualizeError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Request to detection API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Detection API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid detection response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid font {path}")]
    Font { path: PathBuf },
}
