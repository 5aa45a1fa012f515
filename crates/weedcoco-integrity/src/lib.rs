//! # weedcoco-integrity — Cross-Section Checks
//!
//! Checks that schema validation cannot express: the id graph between
//! sections, and agreement between annotations, image records and image
//! files.
//!
//! - [`validate_references`]: per-namespace id uniqueness, `*_id`
//!   resolution and mandatory referencing. Fail-fast.
//! - [`validate_coordinates`]: annotation geometry inside its image.
//! - [`validate_image_sizes`]: declared image sizes against the files,
//!   via an [`ImageMetadataProvider`].
//!
//! Every check borrows the document immutably and keeps no state between
//! calls.

pub mod geometry;
pub mod image_size;
pub mod provider;
pub mod references;

pub use geometry::validate_coordinates;
pub use image_size::{validate_image_sizes, ImageSizeReport, SkippedImage};
pub use provider::{
    Dimensions, FsImageMetadataProvider, ImageMetadataProvider, ProviderError,
    StaticImageMetadataProvider,
};
pub use references::{validate_references, ReferenceIndex, ReferencePolicy, DEFAULT_REQUIRE_REFERENCED};
