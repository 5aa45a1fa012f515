//! # Annotation Bounds
//!
//! Checks that every annotation's geometry lies inside the image it
//! refers to, using the `width`/`height` declared on the image record.
//!
//! - `bbox` is `[x, y, w, h]`: both edges along each axis (`x` and
//!   `x + w`, `y` and `y + h`) must lie in `[0, width]` / `[0, height]`,
//!   so a negative `w` or `h` cannot carry the box outside the image.
//! - Polygon `segmentation` is a list of flat `x0, y0, x1, y1, ...` lists;
//!   every x must lie in `[0, width]` and every y in `[0, height]`. A
//!   trailing unpaired value is an x.
//! - Run-length encoded `segmentation` (an object) carries no coordinates
//!   and is not checked.

use std::collections::HashMap;

use serde_json::Value;
use weedcoco_core::{RecordId, ValidationError};

use crate::references::ID_FIELD;

/// Extent of an image as declared in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Extent {
    width: f64,
    height: f64,
}

impl Extent {
    fn along(self, axis: char) -> f64 {
        if axis == 'x' {
            self.width
        } else {
            self.height
        }
    }
}

/// Validate annotation coordinates against their images.
///
/// Returns the number of annotations whose geometry was checked.
///
/// # Errors
///
/// Returns `ValidationError::GeometryOutOfBounds` for the first coordinate
/// outside its image.
pub fn validate_coordinates(document: &Value) -> Result<usize, ValidationError> {
    let extents: HashMap<RecordId, Extent> = records(document, "images")
        .filter_map(|image| {
            let id = RecordId::from_value(image.get(ID_FIELD)?);
            let width = image.get("width")?.as_f64()?;
            let height = image.get("height")?.as_f64()?;
            Some((id, Extent { width, height }))
        })
        .collect();

    let mut checked = 0usize;
    for annotation in records(document, "annotations") {
        let Some(image_id) = annotation.get("image_id").map(RecordId::from_value) else {
            continue;
        };
        let annotation_id = annotation
            .get(ID_FIELD)
            .map(RecordId::from_value)
            .unwrap_or_else(|| RecordId::Other("null".to_string()));
        let Some(extent) = extents.get(&image_id).copied() else {
            tracing::warn!(
                annotation = %annotation_id,
                image = %image_id,
                "image unknown or without declared width/height; skipping bounds check"
            );
            continue;
        };

        let out_of_bounds = |field: &str, axis: char, value: f64| {
            ValidationError::GeometryOutOfBounds {
                annotation_id: annotation_id.clone(),
                image_id: image_id.clone(),
                field: field.to_string(),
                axis,
                value,
                bound: extent.along(axis),
            }
        };

        if let Some(bbox) = annotation.get("bbox").and_then(numbers) {
            if let [x, y, w, h] = bbox[..] {
                for (axis, start, far_edge) in [('x', x, x + w), ('y', y, y + h)] {
                    let bound = extent.along(axis);
                    if let Some(edge) = [start, far_edge]
                        .into_iter()
                        .find(|edge| *edge < 0.0 || *edge > bound)
                    {
                        return Err(out_of_bounds("bbox", axis, edge));
                    }
                }
            }
        }

        if let Some(polygons) = annotation.get("segmentation").and_then(Value::as_array) {
            for polygon in polygons {
                let Some(coords) = numbers(polygon) else {
                    continue;
                };
                for (i, value) in coords.into_iter().enumerate() {
                    let axis = if i % 2 == 0 { 'x' } else { 'y' };
                    if value < 0.0 || value > extent.along(axis) {
                        return Err(out_of_bounds("segmentation", axis, value));
                    }
                }
            }
        }

        checked += 1;
    }

    tracing::debug!(annotations = checked, "annotation bounds checked");
    Ok(checked)
}

/// Object records of a list-valued section.
fn records<'a>(
    document: &'a Value,
    section: &str,
) -> impl Iterator<Item = &'a serde_json::Map<String, Value>> {
    document
        .get(section)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// All elements of a numeric array, or `None` if any element is not a number.
fn numbers(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(Value::as_f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(annotation: Value) -> Value {
        json!({
            "images": [
                {"id": 46, "width": 1296, "height": 966},
                {"id": 7}
            ],
            "annotations": [annotation]
        })
    }

    fn expect_out_of_bounds(d: &Value) -> (String, char, f64, f64) {
        match validate_coordinates(d).unwrap_err() {
            ValidationError::GeometryOutOfBounds {
                field,
                axis,
                value,
                bound,
                ..
            } => (field, axis, value, bound),
            other => panic!("expected GeometryOutOfBounds, got {other}"),
        }
    }

    #[test]
    fn polygons_inside_image_pass() {
        let d = doc(json!({
            "id": 0, "image_id": 46,
            "segmentation": [[596, 207, 521], [0, 0, 1296, 966]]
        }));
        assert_eq!(validate_coordinates(&d).unwrap(), 1);
    }

    #[test]
    fn polygon_y_beyond_height() {
        let d = doc(json!({"id": 0, "image_id": 46, "segmentation": [[10, 10, 20, 967.5]]}));
        assert_eq!(
            expect_out_of_bounds(&d),
            ("segmentation".to_string(), 'y', 967.5, 966.0)
        );
    }

    #[test]
    fn trailing_unpaired_value_is_an_x() {
        let d = doc(json!({"id": 0, "image_id": 46, "segmentation": [[10, 10, 1300]]}));
        let (_, axis, value, bound) = expect_out_of_bounds(&d);
        assert_eq!((axis, value, bound), ('x', 1300.0, 1296.0));
    }

    #[test]
    fn negative_coordinate() {
        let d = doc(json!({"id": 0, "image_id": 46, "segmentation": [[-1, 10]]}));
        assert_eq!(expect_out_of_bounds(&d).1, 'x');
    }

    #[test]
    fn bbox_far_edge() {
        let ok = doc(json!({"id": 0, "image_id": 46, "bbox": [1000, 900, 296, 66]}));
        validate_coordinates(&ok).unwrap();

        let bad = doc(json!({"id": 3, "image_id": 46, "bbox": [1000, 900, 297, 10]}));
        let err = validate_coordinates(&bad).unwrap_err();
        assert!(err.to_string().starts_with("annotation 3 bbox x=1297"), "{err}");
    }

    #[test]
    fn bbox_negative_origin() {
        let d = doc(json!({"id": 0, "image_id": 46, "bbox": [5, -2, 10, 10]}));
        assert_eq!(
            expect_out_of_bounds(&d),
            ("bbox".to_string(), 'y', -2.0, 966.0)
        );
    }

    #[test]
    fn bbox_negative_extent_from_outside_image() {
        let d = doc(json!({"id": 0, "image_id": 46, "bbox": [1300, 0, -10, 5]}));
        assert_eq!(
            expect_out_of_bounds(&d),
            ("bbox".to_string(), 'x', 1300.0, 1296.0)
        );

        let d = doc(json!({"id": 0, "image_id": 46, "bbox": [5, 3, 10, -4]}));
        assert_eq!(
            expect_out_of_bounds(&d),
            ("bbox".to_string(), 'y', -1.0, 966.0)
        );
    }

    #[test]
    fn annotation_of_unknown_image_is_skipped() {
        let d = doc(json!({"id": 0, "image_id": 999, "bbox": [5000, 5000, 10, 10]}));
        assert_eq!(validate_coordinates(&d).unwrap(), 0);

        let no_image_id = doc(json!({"id": 1, "bbox": [5000, 5000, 10, 10]}));
        assert_eq!(validate_coordinates(&no_image_id).unwrap(), 0);
    }

    #[test]
    fn rle_and_unsized_images_are_skipped() {
        let rle = doc(json!({
            "id": 0, "image_id": 46,
            "segmentation": {"counts": [1, 2], "size": [966, 1296]}
        }));
        assert_eq!(validate_coordinates(&rle).unwrap(), 1);

        let unsized_image = doc(json!({"id": 0, "image_id": 7, "segmentation": [[99999, 0]]}));
        assert_eq!(validate_coordinates(&unsized_image).unwrap(), 0);
    }

    #[test]
    fn documents_without_sections_pass() {
        assert_eq!(validate_coordinates(&json!({})).unwrap(), 0);
        assert_eq!(
            validate_coordinates(&json!({"images": [], "annotations": []})).unwrap(),
            0
        );
    }
}
