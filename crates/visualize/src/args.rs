use clap::Parser;
use std::path::{Path, PathBuf};

/// Send an image to the food-detection API and save an annotated copy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Image file to analyse
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Detection endpoint, e.g. http://localhost:8080/detect
    #[arg(long, value_name = "URL")]
    pub api_url: String,

    /// Annotated PNG path [default: <IMAGE stem>.annotated.png]
    #[arg(long, value_name = "PNG")]
    pub output: Option<PathBuf>,

    /// TTF/OTF font for labels; common system fonts are tried otherwise
    #[arg(long, value_name = "TTF")]
    pub font: Option<PathBuf>,

    /// Request timeout
    #[arg(long, default_value = "60", value_name = "SECONDS")]
    pub timeout_secs: u64,
}

impl Args {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.image))
    }
}

/// `<dir>/<stem>.annotated.png`, next to the input.
pub fn default_output_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("{stem}.annotated.png"))
}
