//! # Image Metadata Provider
//!
//! The seam between validation and image files. Validation only ever asks
//! for pixel dimensions; how they are obtained is the provider's business.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u64,
    /// Height in pixels.
    pub height: u64,
}

impl Dimensions {
    /// Create dimensions from width and height.
    pub fn new(width: u64, height: u64) -> Self {
        Self { width, height }
    }
}

/// Failure to read an existing image.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The file exists but its header could not be decoded.
    #[error("cannot read image header of '{path}': {reason}")]
    Unreadable {
        /// Image path.
        path: String,
        /// Decoder message.
        reason: String,
    },
}

/// Source of image dimensions.
///
/// Calls are blocking. `Ok(None)` means the file does not exist.
pub trait ImageMetadataProvider: Send + Sync {
    /// Dimensions of the image at `path`.
    fn dimensions(&self, path: &Path) -> Result<Option<Dimensions>, ProviderError>;
}

/// Reads dimensions from image file headers (PNG, JPEG, TIFF, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageMetadataProvider;

impl ImageMetadataProvider for FsImageMetadataProvider {
    fn dimensions(&self, path: &Path) -> Result<Option<Dimensions>, ProviderError> {
        if !path.is_file() {
            return Ok(None);
        }
        let size = imagesize::size(path).map_err(|e| ProviderError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(Dimensions::new(size.width as u64, size.height as u64)))
    }
}

/// Fixed path → dimensions table.
#[derive(Debug, Clone, Default)]
pub struct StaticImageMetadataProvider {
    images: HashMap<PathBuf, Dimensions>,
}

impl StaticImageMetadataProvider {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image.
    pub fn with_image(mut self, path: impl Into<PathBuf>, dimensions: Dimensions) -> Self {
        self.images.insert(path.into(), dimensions);
        self
    }
}

impl ImageMetadataProvider for StaticImageMetadataProvider {
    fn dimensions(&self, path: &Path) -> Result<Option<Dimensions>, ProviderError> {
        Ok(self.images.get(path).copied())
    }
}
