use crate::types::{BoxEntry, DetectionResult};
use serde::Serialize;

/// Upward offset of a label relative to its box, in pixels.
pub const LABEL_OFFSET_PX: f64 = 6.0;

/// What a caller shows when a projection comes back empty.
pub const NO_FOOD_MESSAGE: &str = "No recognized food in this image";

/// Rectangle in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

/// One drawable box with its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayPrimitive {
    pub rect_pixels: PixelRect,
    pub label_text: String,
    pub anchor: Anchor,
}

/// Denormalize every box of `result` into pixel space.
///
/// Output follows `foods` order, then `boxes` order. An empty output means no
/// food entry carried a box; the caller decides how to present that.
/// `image_width` and `image_height` must be positive.
pub fn project(result: &DetectionResult, image_width: f64, image_height: f64) -> Vec<OverlayPrimitive> {
    debug_assert!(
        image_width > 0.0 && image_height > 0.0,
        "image dimensions must be positive"
    );

    result
        .foods
        .iter()
        .flat_map(|food| {
            food.boxes
                .iter()
                .map(move |b| primitive(&food.name, b, image_width, image_height))
        })
        .collect()
}

fn primitive(name: &str, entry: &BoxEntry, image_width: f64, image_height: f64) -> OverlayPrimitive {
    let rect_pixels = PixelRect {
        x: entry.left * image_width,
        y: entry.top * image_height,
        width: entry.width * image_width,
        height: entry.height * image_height,
    };

    let anchor = Anchor {
        x: rect_pixels.x,
        y: (rect_pixels.y - LABEL_OFFSET_PX).max(0.0),
    };

    OverlayPrimitive {
        rect_pixels,
        label_text: label_text(name, entry.confidence),
        anchor,
    }
}

fn label_text(name: &str, confidence: Option<f64>) -> String {
    match confidence {
        Some(c) => format!("{name} ({c:.1}%)"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FoodEntry;

    fn single_box_result(name: &str, entry: BoxEntry) -> DetectionResult {
        DetectionResult {
            best_guess: Some(name.to_string()),
            foods: vec![FoodEntry {
                name: name.to_string(),
                confidence: 90.0,
                boxes: vec![entry],
            }],
        }
    }

    fn entry(left: f64, top: f64, width: f64, height: f64, confidence: Option<f64>) -> BoxEntry {
        BoxEntry {
            left,
            top,
            width,
            height,
            confidence,
        }
    }

    #[test]
    fn test_box_scaled_to_pixel_space() {
        let result = single_box_result("Pizza", entry(0.5, 0.5, 0.1, 0.1, Some(90.9)));

        let overlay = project(&result, 200.0, 100.0);

        assert_eq!(overlay.len(), 1);
        let rect = overlay[0].rect_pixels;
        assert!((rect.x - 100.0).abs() < 1e-9, "x incorrect: {}", rect.x);
        assert!((rect.y - 50.0).abs() < 1e-9, "y incorrect: {}", rect.y);
        assert!((rect.width - 20.0).abs() < 1e-9, "width incorrect: {}", rect.width);
        assert!((rect.height - 10.0).abs() < 1e-9, "height incorrect: {}", rect.height);
        assert!((overlay[0].anchor.y - 44.0).abs() < 1e-9);
        assert_eq!(overlay[0].anchor.x, rect.x);
    }

    #[test]
    fn test_anchor_clamped_at_top_edge() {
        for height in [1.0, 50.0, 4000.0] {
            let result = single_box_result("Soup", entry(0.2, 0.0, 0.3, 0.3, Some(70.0)));

            let overlay = project(&result, 640.0, height);

            assert_eq!(overlay[0].anchor.y, 0.0, "Anchor must not leave the frame");
        }
    }

    #[test]
    fn test_anchor_clamped_near_top_edge() {
        // 0.01 * 300 = 3px, less than the 6px offset
        let result = single_box_result("Soup", entry(0.2, 0.01, 0.3, 0.3, Some(70.0)));

        let overlay = project(&result, 300.0, 300.0);

        assert_eq!(overlay[0].anchor.y, 0.0);
    }

    #[test]
    fn test_label_text_with_confidence() {
        let result = single_box_result("Pizza", entry(0.1, 0.1, 0.1, 0.1, Some(90.94)));

        let overlay = project(&result, 100.0, 100.0);

        assert_eq!(overlay[0].label_text, "Pizza (90.9%)");
    }

    #[test]
    fn test_label_text_without_confidence() {
        let result = single_box_result("Pizza", entry(0.1, 0.1, 0.1, 0.1, None));

        let overlay = project(&result, 100.0, 100.0);

        assert_eq!(overlay[0].label_text, "Pizza");
    }

    #[test]
    fn test_empty_foods_yield_empty_projection() {
        let overlay = project(&DetectionResult::default(), 640.0, 480.0);

        assert!(overlay.is_empty());
    }

    #[test]
    fn test_foods_without_boxes_yield_empty_projection() {
        let result = DetectionResult {
            best_guess: Some("Bread".to_string()),
            foods: vec![FoodEntry {
                name: "Bread".to_string(),
                confidence: 80.0,
                boxes: vec![],
            }],
        };

        assert!(project(&result, 640.0, 480.0).is_empty());
    }

    #[test]
    fn test_projection_order_follows_foods_then_boxes() {
        let result = DetectionResult {
            best_guess: Some("Egg".to_string()),
            foods: vec![
                FoodEntry {
                    name: "Egg".to_string(),
                    confidence: 90.0,
                    boxes: vec![
                        entry(0.0, 0.1, 0.1, 0.1, Some(90.0)),
                        entry(0.5, 0.1, 0.1, 0.1, Some(80.0)),
                    ],
                },
                FoodEntry {
                    name: "Bacon".to_string(),
                    confidence: 85.0,
                    boxes: vec![entry(0.2, 0.6, 0.2, 0.2, Some(85.0))],
                },
            ],
        };

        let overlay = project(&result, 100.0, 100.0);

        let labels: Vec<&str> = overlay.iter().map(|p| p.label_text.as_str()).collect();
        assert_eq!(labels, vec!["Egg (90.0%)", "Egg (80.0%)", "Bacon (85.0%)"]);
        assert!(overlay[1].rect_pixels.x > overlay[0].rect_pixels.x);
    }

    #[test]
    fn test_projection_does_not_mutate_input() {
        let result = single_box_result("Pizza", entry(0.5, 0.5, 0.1, 0.1, Some(90.9)));
        let before = result.clone();

        let _ = project(&result, 200.0, 100.0);

        assert_eq!(result, before);
    }
}
