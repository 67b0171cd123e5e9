//! Food-oriented view over a generic label-detection response.
//!
//! [`reduce`] turns the raw labels into a [`DetectionResult`] and [`project`]
//! maps that result onto an image's pixel space for drawing. Both are pure.

mod lenient;
pub mod project;
pub mod reduce;
pub mod types;

pub use project::{Anchor, NO_FOOD_MESSAGE, OverlayPrimitive, PixelRect, project};
pub use reduce::{GENERIC_LABELS, LabelReducer, reduce, round_confidence};
pub use types::{
    BoxEntry, DetectionResult, FoodEntry, FractionalBox, RawBoundingBox, RawInstance, RawLabel,
    UNNAMED_LABEL, deserialize_raw_labels,
};
