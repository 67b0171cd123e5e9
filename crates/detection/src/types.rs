use crate::lenient;
use serde::{Deserialize, Serialize};

/// Name given to a label that arrives without one.
pub const UNNAMED_LABEL: &str = "Unknown";

pub(crate) fn unnamed_label() -> String {
    UNNAMED_LABEL.to_string()
}

/// One label of a detection-service response (`DetectLabels` shape).
///
/// Every field is optional on the wire; malformed values read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLabel {
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    /// Overall label confidence in `[0, 100]`.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient::sequence")]
    pub instances: Vec<RawInstance>,
}

/// Deserializes a response's `Labels` array. `null` or a non-list reads as no
/// labels; entries that are not label objects are skipped one by one.
pub fn deserialize_raw_labels<'de, D>(deserializer: D) -> Result<Vec<RawLabel>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    lenient::sequence(deserializer)
}

/// One located occurrence of a label.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawInstance {
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_box: Option<RawBoundingBox>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<f64>,
}

/// Bounding box as sent by the service, fractions of the image size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBoundingBox {
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub left: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub top: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,
}

impl RawBoundingBox {
    /// An object carrying none of the four coordinates counts as no box at all.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.top.is_none() && self.width.is_none() && self.height.is_none()
    }

    pub fn to_fractional(&self) -> FractionalBox {
        FractionalBox {
            left: self.left.unwrap_or(0.0),
            top: self.top.unwrap_or(0.0),
            width: self.width.unwrap_or(0.0),
            height: self.height.unwrap_or(0.0),
        }
    }
}

impl RawLabel {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: Some(name.into()),
            confidence: Some(confidence),
            instances: Vec::new(),
        }
    }

    pub fn with_instance(mut self, bounding_box: Option<FractionalBox>, confidence: Option<f64>) -> Self {
        self.instances.push(RawInstance {
            bounding_box: bounding_box.map(RawBoundingBox::from),
            confidence,
        });
        self
    }
}

/// Box relative to the image dimensions, each component in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FractionalBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl FractionalBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

impl From<FractionalBox> for RawBoundingBox {
    fn from(b: FractionalBox) -> Self {
        Self {
            left: Some(b.left),
            top: Some(b.top),
            width: Some(b.width),
            height: Some(b.height),
        }
    }
}

/// Food-only detection result, the JSON body returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DetectionResult {
    /// Name of the first entry of `foods`, `None` when `foods` is empty.
    #[serde(default, deserialize_with = "lenient::string")]
    pub best_guess: Option<String>,
    #[serde(default, deserialize_with = "lenient::sequence")]
    pub foods: Vec<FoodEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FoodEntry {
    #[serde(default = "unnamed_label", deserialize_with = "lenient::label_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "lenient::sequence")]
    pub boxes: Vec<BoxEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BoxEntry {
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub left: f64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub top: f64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub width: f64,
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub height: f64,
    /// Always present in results produced here; may be missing from
    /// results received over the wire.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub confidence: Option<f64>,
}

impl BoxEntry {
    pub fn fractional(&self) -> FractionalBox {
        FractionalBox::new(self.left, self.top, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_label_parses_service_shape() {
        let json = r#"{
            "Name": "Pizza",
            "Confidence": 91.2,
            "Instances": [
                {"BoundingBox": {"Width": 0.1, "Height": 0.2, "Left": 0.3, "Top": 0.4}, "Confidence": 90.9}
            ],
            "Parents": [{"Name": "Food"}],
            "Categories": [{"Name": "Food and Beverage"}]
        }"#;

        let label: RawLabel = serde_json::from_str(json).unwrap();

        assert_eq!(label.name.as_deref(), Some("Pizza"));
        assert_eq!(label.confidence, Some(91.2));
        assert_eq!(label.instances.len(), 1);
        let bbox = label.instances[0].bounding_box.unwrap();
        assert_eq!(
            bbox.to_fractional(),
            FractionalBox::new(0.3, 0.4, 0.1, 0.2),
            "Box fields should map by name, not position"
        );
        assert_eq!(label.instances[0].confidence, Some(90.9));
    }

    #[test]
    fn test_raw_label_tolerates_malformed_fields() {
        let json = r#"{
            "Name": 42,
            "Confidence": "not a number",
            "Instances": [
                {"BoundingBox": null, "Confidence": true},
                {"BoundingBox": {"Left": "0.25", "Top": null}},
                "garbage"
            ]
        }"#;

        let label: Result<RawLabel, _> = serde_json::from_str(json);

        let label = label.expect("Malformed fields should never fail the label");
        assert_eq!(label.name, None, "Non-string name reads as absent");
        assert_eq!(label.confidence, None, "Non-numeric confidence reads as absent");
        assert_eq!(
            label.instances.len(),
            2,
            "Only the non-object instance should be skipped"
        );
        assert_eq!(label.instances[1].bounding_box.unwrap().left, Some(0.25));
    }

    #[test]
    fn test_malformed_instance_keeps_valid_siblings() {
        let json = r#"{
            "Name": "Pizza",
            "Confidence": 91.2,
            "Instances": [
                {"BoundingBox": {"Left": 0.1, "Top": 0.2, "Width": 0.3, "Height": 0.4}, "Confidence": 90.0},
                "garbage",
                null,
                42
            ]
        }"#;

        let label: RawLabel = serde_json::from_str(json).unwrap();

        assert_eq!(label.instances.len(), 1, "Valid instance should survive bad siblings");
        assert_eq!(label.instances[0].confidence, Some(90.0));

        let result = crate::reduce(&[label]);
        assert_eq!(result.foods[0].boxes.len(), 1);
        assert_eq!(result.foods[0].boxes[0].confidence, Some(90.0));
    }

    #[test]
    fn test_malformed_foods_and_boxes_skipped_individually() {
        let json = r#"{
            "best_guess": "Pizza",
            "foods": [
                {"name": "Pizza", "confidence": 91.2, "boxes": [
                    {"left": 0.5, "top": 0.5, "width": 0.1, "height": 0.1},
                    "not a box"
                ]},
                "not a food"
            ]
        }"#;

        let result: DetectionResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.foods.len(), 1);
        assert_eq!(result.foods[0].boxes.len(), 1);
        assert_eq!(result.foods[0].boxes[0].left, 0.5);
    }

    #[test]
    fn test_raw_instance_field_level_leniency() {
        let json = r#"[
            {"BoundingBox": null, "Confidence": true},
            {"BoundingBox": {"Left": "0.25", "Top": null}}
        ]"#;

        let instances: Vec<RawInstance> = serde_json::from_str(json).unwrap();

        assert_eq!(instances.len(), 2);
        assert!(instances[0].bounding_box.is_none());
        assert_eq!(instances[0].confidence, None);
        let bbox = instances[1].bounding_box.unwrap();
        assert_eq!(bbox.left, Some(0.25), "Numeric strings should be parsed");
        assert_eq!(bbox.top, None);
        assert!(!bbox.is_empty());
    }

    #[test]
    fn test_null_instances_read_as_empty() {
        let label: RawLabel =
            serde_json::from_str(r#"{"Name": "Salad", "Confidence": 70, "Instances": null}"#)
                .unwrap();

        assert!(label.instances.is_empty());
        assert_eq!(label.confidence, Some(70.0), "Integers should read as floats");
    }

    #[test]
    fn test_empty_bounding_box_object_is_empty() {
        let instance: RawInstance =
            serde_json::from_str(r#"{"BoundingBox": {}, "Confidence": 80.0}"#).unwrap();

        assert!(instance.bounding_box.unwrap().is_empty());
    }

    #[test]
    fn test_detection_result_wire_field_names() {
        let result = DetectionResult {
            best_guess: Some("Pizza".to_string()),
            foods: vec![FoodEntry {
                name: "Pizza".to_string(),
                confidence: 91.2,
                boxes: vec![BoxEntry {
                    left: 0.5,
                    top: 0.25,
                    width: 0.125,
                    height: 0.0625,
                    confidence: Some(90.9),
                }],
            }],
        };

        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "best_guess": "Pizza",
                "foods": [{
                    "name": "Pizza",
                    "confidence": 91.2,
                    "boxes": [{
                        "left": 0.5,
                        "top": 0.25,
                        "width": 0.125,
                        "height": 0.0625,
                        "confidence": 90.9
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_empty_result_serializes_null_best_guess() {
        let value = serde_json::to_value(DetectionResult::default()).unwrap();

        assert_eq!(value, serde_json::json!({"best_guess": null, "foods": []}));
    }

    #[test]
    fn test_non_string_best_guess_reads_as_absent() {
        let json = r#"{"best_guess": 17, "foods": [{"name": "Rice", "confidence": 80.0, "boxes": []}]}"#;

        let result: DetectionResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.best_guess, None, "Non-string best_guess should not fail decoding");
        assert_eq!(result.foods[0].name, "Rice");
    }

    #[test]
    fn test_detection_result_lenient_client_side_parse() {
        let json = r#"{"foods": [{"boxes": [{"left": 0.1, "top": 0.2}]}]}"#;

        let result: DetectionResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.best_guess, None);
        let food = &result.foods[0];
        assert_eq!(food.name, UNNAMED_LABEL);
        assert_eq!(food.confidence, 0.0);
        assert_eq!(food.boxes[0].width, 0.0, "Missing coordinates default to zero");
        assert_eq!(food.boxes[0].confidence, None);
    }
}
