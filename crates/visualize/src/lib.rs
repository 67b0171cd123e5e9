//! Command-line visualizer for the food-detection API.
//!
//! Posts an image to the gateway, projects the returned boxes into pixel
//! space and writes an annotated PNG.

pub mod args;
pub mod client;
pub mod error;
pub mod render;

pub use args::Args;
pub use client::DetectionClient;
pub use error::VisualizeError;
pub use render::{RenderSummary, Renderer};

use detection::{DetectionResult, project};
use image::ImageFormat;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub struct VisualizeOutcome {
    pub result: DetectionResult,
    pub summary: RenderSummary,
    pub output: PathBuf,
}

/// Run one detection round trip and save the annotated image.
pub fn run(args: &Args) -> Result<VisualizeOutcome, VisualizeError> {
    let bytes = std::fs::read(&args.image).map_err(|source| VisualizeError::Read {
        path: args.image.clone(),
        source,
    })?;
    let mut image = image::load_from_memory(&bytes)?.to_rgb8();

    let renderer = match &args.font {
        Some(path) => Renderer::from_font_file(path)?,
        None => Renderer::from_system_fonts(),
    };

    let client = DetectionClient::new(&args.api_url, Duration::from_secs(args.timeout_secs))?;
    tracing::info!(image = %args.image.display(), api_url = %args.api_url, "Requesting detection");
    let result = client.detect(&bytes)?;

    let overlay = project(
        &result,
        f64::from(image.width()),
        f64::from(image.height()),
    );
    let summary = renderer.render(&mut image, &overlay);

    let output = args.output_path();
    image.save_with_format(&output, ImageFormat::Png)?;

    tracing::info!(
        best_guess = result.best_guess.as_deref().unwrap_or("-"),
        foods = result.foods.len(),
        boxes = summary.boxes,
        output = %output.display(),
        "Saved annotated image"
    );

    Ok(VisualizeOutcome {
        result,
        summary,
        output,
    })
}
