pub mod config;
pub mod error;
pub mod handler;
pub mod labeler;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod staging;
pub mod state;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use labeler::{DetectLabelsParams, HttpLabelDetector, LabelDetectionError, LabelDetector};
pub use server::{router, run_server};
pub use staging::{
    FsImageStore, ImageStore, MemoryImageStore, StagedGuard, StagedImage, StagingError,
};
pub use state::AppState;
