use crate::types::{BoxEntry, DetectionResult, FoodEntry, RawInstance, RawLabel, UNNAMED_LABEL};
use std::collections::HashSet;

/// Label names too coarse to report as a specific food.
pub const GENERIC_LABELS: &[&str] = &["Food", "Meal", "Dish", "Cuisine", "Food Presentation"];

/// Reduces raw detection labels to a food-only [`DetectionResult`].
///
/// Holds the exclusion set as data so callers can extend it without touching
/// the filtering rules. No confidence threshold is applied here; the
/// detection service has already done that.
#[derive(Debug, Clone)]
pub struct LabelReducer {
    excluded: HashSet<String>,
}

impl Default for LabelReducer {
    fn default() -> Self {
        Self::new(GENERIC_LABELS.iter().copied())
    }
}

impl LabelReducer {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds names on top of the current exclusion set.
    pub fn with_excluded<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    pub fn excluded_len(&self) -> usize {
        self.excluded.len()
    }

    #[tracing::instrument(skip_all, fields(labels = labels.len()))]
    pub fn reduce(&self, labels: &[RawLabel]) -> DetectionResult {
        let foods: Vec<FoodEntry> = labels
            .iter()
            .filter_map(|label| self.reduce_label(label))
            .collect();

        let best_guess = foods.first().map(|food| food.name.clone());

        tracing::debug!(
            foods = foods.len(),
            best_guess = best_guess.as_deref().unwrap_or("none"),
            "Reduced detection labels"
        );

        DetectionResult { best_guess, foods }
    }

    fn reduce_label(&self, label: &RawLabel) -> Option<FoodEntry> {
        // Only a present name can be excluded; unnamed labels are kept.
        let name = match label.name.as_deref() {
            Some(name) if self.is_excluded(name) => {
                tracing::debug!(label = name, "Dropping generic label");
                return None;
            }
            Some(name) => name,
            None => UNNAMED_LABEL,
        };

        let confidence = label.confidence.unwrap_or(0.0);

        let boxes = label
            .instances
            .iter()
            .filter_map(|instance| box_entry(instance, confidence))
            .collect();

        Some(FoodEntry {
            name: name.to_string(),
            confidence: round_confidence(confidence),
            boxes,
        })
    }
}

/// Instances without a usable box yield nothing.
fn box_entry(instance: &RawInstance, label_confidence: f64) -> Option<BoxEntry> {
    let raw = instance.bounding_box.as_ref().filter(|b| !b.is_empty())?;
    let bbox = raw.to_fractional();
    let confidence = instance.confidence.unwrap_or(label_confidence);

    Some(BoxEntry {
        left: bbox.left,
        top: bbox.top,
        width: bbox.width,
        height: bbox.height,
        confidence: Some(round_confidence(confidence)),
    })
}

/// Reduces with the default generic-label exclusion set.
pub fn reduce(labels: &[RawLabel]) -> DetectionResult {
    LabelReducer::default().reduce(labels)
}

/// Rounds to two decimals, ties to even. Non-finite input becomes `0.0`.
#[inline]
pub fn round_confidence(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round_ties_even() / 100.0
}
