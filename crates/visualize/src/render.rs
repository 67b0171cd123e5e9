//! Overlay rendering onto RGB images.

use crate::error::VisualizeError;
use ab_glyph::{FontVec, PxScale};
use detection::{Anchor, NO_FOOD_MESSAGE, OverlayPrimitive, PixelRect};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_THICKNESS: i32 = 2;
const LABEL_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_BACKGROUND_ALPHA: f32 = 0.7;
const LABEL_FONT_SIZE: f32 = 16.0;
const LABEL_PADDING: i32 = 2;
const BANNER_FONT_SIZE: f32 = 22.0;
const BANNER_MARGIN: i32 = 8;

/// Tried in order when no font is given explicitly.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub boxes: usize,
    pub labels: usize,
    pub banner: bool,
}

/// Draws overlay primitives; text is skipped when no font is available.
pub struct Renderer {
    font: Option<FontVec>,
}

impl Renderer {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font }
    }

    pub fn without_font() -> Self {
        Self { font: None }
    }

    pub fn from_font_file(path: &Path) -> Result<Self, VisualizeError> {
        Ok(Self::new(Some(load_font(path)?)))
    }

    pub fn from_system_fonts() -> Self {
        let font = SYSTEM_FONT_PATHS
            .iter()
            .map(Path::new)
            .filter(|path| path.is_file())
            .find_map(|path| match load_font(path) {
                Ok(font) => {
                    tracing::debug!(font = %path.display(), "Using system font");
                    Some(font)
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unusable font");
                    None
                }
            });

        if font.is_none() {
            tracing::warn!("No usable font found, labels will not be drawn (use --font)");
        }
        Self::new(font)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn render(&self, image: &mut RgbImage, overlay: &[OverlayPrimitive]) -> RenderSummary {
        let mut summary = RenderSummary::default();

        for primitive in overlay {
            if draw_box(image, &primitive.rect_pixels) {
                summary.boxes += 1;
            }
            if let Some(font) = &self.font {
                draw_label(image, font, &primitive.label_text, primitive.anchor);
                summary.labels += 1;
            }
        }

        if overlay.is_empty() {
            if let Some(font) = &self.font {
                draw_banner(image, font, NO_FOOD_MESSAGE);
                summary.banner = true;
            }
        }

        summary
    }
}

fn load_font(path: &Path) -> Result<FontVec, VisualizeError> {
    let bytes = std::fs::read(path).map_err(|source| VisualizeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| VisualizeError::Font {
        path: path.to_path_buf(),
    })
}

/// Returns false for boxes that round to nothing.
fn draw_box(image: &mut RgbImage, rect: &PixelRect) -> bool {
    let x = rect.x.round() as i32;
    let y = rect.y.round() as i32;
    let width = rect.width.round() as i32;
    let height = rect.height.round() as i32;

    if width < 1 || height < 1 {
        return false;
    }

    // Thickness grows inward; hollow rects clip to the canvas.
    for t in 0..BOX_THICKNESS {
        let (w, h) = (width - 2 * t, height - 2 * t);
        if w < 1 || h < 1 {
            break;
        }
        let outline = Rect::at(x + t, y + t).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(image, outline, BOX_COLOR);
    }
    true
}

/// Text baseline sits on the anchor, like a plot annotation.
fn draw_label(image: &mut RgbImage, font: &FontVec, text: &str, anchor: Anchor) {
    let scale = PxScale::from(LABEL_FONT_SIZE);
    let (text_w, text_h) = text_size(scale, font, text);
    let background_w = text_w as i32 + 2 * LABEL_PADDING;
    let background_h = text_h as i32 + 2 * LABEL_PADDING;

    let x = anchor.x.round() as i32;
    let y = (anchor.y.round() as i32 - background_h).max(0);

    blend_rect(
        image,
        x,
        y,
        background_w,
        background_h,
        LABEL_BACKGROUND,
        LABEL_BACKGROUND_ALPHA,
    );
    draw_text_mut(
        image,
        BOX_COLOR,
        x + LABEL_PADDING,
        y + LABEL_PADDING,
        scale,
        font,
        text,
    );
}

fn draw_banner(image: &mut RgbImage, font: &FontVec, text: &str) {
    let scale = PxScale::from(BANNER_FONT_SIZE);
    let (text_w, text_h) = text_size(scale, font, text);
    let background_w = text_w as i32 + 2 * BANNER_MARGIN;
    let background_h = text_h as i32 + BANNER_MARGIN;

    let x = ((image.width() as i32 - background_w) / 2).max(0);
    let y = BANNER_MARGIN;

    blend_rect(
        image,
        x,
        y,
        background_w,
        background_h,
        LABEL_BACKGROUND,
        LABEL_BACKGROUND_ALPHA,
    );
    draw_text_mut(
        image,
        BOX_COLOR,
        x + BANNER_MARGIN,
        y + BANNER_MARGIN / 2,
        scale,
        font,
        text,
    );
}

/// Alpha-blend a solid colour over the clipped rectangle.
fn blend_rect(
    image: &mut RgbImage,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: Rgb<u8>,
    alpha: f32,
) {
    let x0 = x.clamp(0, image.width() as i32) as u32;
    let y0 = y.clamp(0, image.height() as i32) as u32;
    let x1 = x.saturating_add(width).clamp(0, image.width() as i32) as u32;
    let y1 = y.saturating_add(height).clamp(0, image.height() as i32) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            let pixel = image.get_pixel_mut(px, py);
            for c in 0..3 {
                let blended = pixel[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
                pixel[c] = blended.round() as u8;
            }
        }
    }
}
