//! # Image Size Matching
//!
//! Compares every image record's declared `width`/`height` with the pixel
//! size of the file it names, resolved under an images root.
//!
//! Missing or unreadable files are skipped with a warning and listed in
//! the returned [`ImageSizeReport`]: schema and reference validation must
//! be usable without the image files at hand.

use std::path::{Path, PathBuf};

use serde_json::Value;
use weedcoco_core::{RecordId, ValidationError};

use crate::provider::ImageMetadataProvider;
use crate::references::ID_FIELD;

/// An image whose size could not be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    /// Image record id.
    pub image_id: RecordId,
    /// Resolved file path, when the record names one.
    pub path: Option<PathBuf>,
    /// Why the check was skipped.
    pub reason: String,
}

/// Outcome of a successful image size check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSizeReport {
    /// Images whose file size matched the declaration.
    pub checked: usize,
    /// Images that could not be checked.
    pub skipped: Vec<SkippedImage>,
}

impl ImageSizeReport {
    /// True when every image was checked.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Check declared image sizes against the files under `images_root`.
///
/// With no `images_root` the check is skipped entirely.
///
/// # Errors
///
/// Returns `ValidationError::ImageSizeMismatch` for the first image whose
/// file dimensions differ from its declaration.
pub fn validate_image_sizes(
    document: &Value,
    images_root: Option<&Path>,
    provider: &dyn ImageMetadataProvider,
) -> Result<ImageSizeReport, ValidationError> {
    let mut report = ImageSizeReport::default();
    let Some(root) = images_root else {
        tracing::debug!("no images root; image size check disabled");
        return Ok(report);
    };

    let images = document
        .get("images")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object);

    for image in images {
        let image_id = image
            .get(ID_FIELD)
            .map(RecordId::from_value)
            .unwrap_or_else(|| RecordId::Other("null".to_string()));
        let mut skip = |path: Option<PathBuf>, reason: String| {
            tracing::warn!(image = %image_id, %reason, "image size not checked");
            report.skipped.push(SkippedImage {
                image_id: image_id.clone(),
                path,
                reason,
            });
        };

        let Some(file_name) = image.get("file_name").and_then(Value::as_str) else {
            skip(None, "no file_name".to_string());
            continue;
        };
        let path = root.join(file_name);
        let declared = (
            image.get("width").and_then(Value::as_u64),
            image.get("height").and_then(Value::as_u64),
        );
        let (Some(declared_width), Some(declared_height)) = declared else {
            skip(Some(path), "no declared width/height".to_string());
            continue;
        };

        let actual = match provider.dimensions(&path) {
            Ok(Some(actual)) => actual,
            Ok(None) => {
                skip(Some(path), "file not found".to_string());
                continue;
            }
            Err(e) => {
                skip(Some(path), e.to_string());
                continue;
            }
        };

        if actual.width != declared_width || actual.height != declared_height {
            return Err(ValidationError::ImageSizeMismatch {
                image_id,
                file_name: file_name.to_string(),
                declared_width,
                declared_height,
                actual_width: actual.width,
                actual_height: actual.height,
            });
        }
        report.checked += 1;
    }

    if !report.is_complete() {
        tracing::warn!(
            checked = report.checked,
            skipped = report.skipped.len(),
            "image size coverage degraded"
        );
    }
    Ok(report)
}
