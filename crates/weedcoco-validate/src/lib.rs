//! # weedcoco-validate — Validation Pipeline
//!
//! Runs every WeedCOCO check on one document in a fixed order and stops at
//! the first failing stage:
//!
//! 1. JSON Schema conformance against the chosen [`SchemaName`].
//! 2. Referential integrity ([`validate_references`]).
//! 3. Annotation bounds ([`validate_coordinates`]).
//! 4. Image sizes ([`validate_image_sizes`]), only when an images root is
//!    given.
//!
//! A [`Validator`] compiles its schemas once and is then read-only: it can
//! be shared across threads and validates any number of documents.
//!
//! ```ignore
//! let config = ValidationConfig::default().apply_env()?;
//! let validator = Validator::from_config(&config)?;
//! let summary = validator.validate(&document, None, SchemaName::WeedCoco)?;
//! ```

pub mod config;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use weedcoco_core::{ConfigError, ValidationError};
use weedcoco_integrity::{
    validate_coordinates, validate_image_sizes, validate_references, FsImageMetadataProvider,
    ImageMetadataProvider, ImageSizeReport, ReferencePolicy,
};
use weedcoco_schema::{SchemaRegistry, SchemaValidator};

pub use config::ValidationConfig;
pub use weedcoco_schema::SchemaName;

/// What a successful validation saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Schema the document was checked against.
    pub schema: SchemaName,
    /// Distinct ids across all sections.
    pub known_ids: usize,
    /// Distinct ids referenced by some `*_id` field.
    pub referenced_ids: usize,
    /// Annotations whose geometry was checked.
    pub annotations_checked: usize,
    /// Image size coverage. Empty when no images root was given.
    pub image_sizes: ImageSizeReport,
}

/// The validation pipeline.
pub struct Validator {
    schemas: SchemaValidator,
    policy: ReferencePolicy,
    default_schema: SchemaName,
    provider: Arc<dyn ImageMetadataProvider>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("schemas", &self.schemas)
            .field("policy", &self.policy)
            .field("default_schema", &self.default_schema)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Build a validator over an already-loaded registry.
    ///
    /// Image files are read from the filesystem unless replaced with
    /// [`with_provider`](Self::with_provider).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SchemaLoad` if a named schema does not
    /// compile, or `ValidationError::Configuration` if the configured
    /// default schema is unknown.
    pub fn new(
        registry: Arc<SchemaRegistry>,
        config: &ValidationConfig,
    ) -> Result<Self, ValidationError> {
        let default_schema = config.schema_name()?;
        let schemas = SchemaValidator::new(registry)?;
        tracing::debug!(
            schemas = schemas.registry().len(),
            %default_schema,
            "validator ready"
        );
        Ok(Self {
            schemas,
            policy: config.reference_policy(),
            default_schema,
            provider: Arc::new(FsImageMetadataProvider),
        })
    }

    /// Load the registry from `config.schema_dir` and build a validator.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingSchemaDir` (wrapped) if no directory is
    /// configured, plus anything [`SchemaRegistry::load`] and
    /// [`new`](Self::new) return.
    pub fn from_config(config: &ValidationConfig) -> Result<Self, ValidationError> {
        let dir = config
            .schema_dir
            .as_deref()
            .ok_or(ConfigError::MissingSchemaDir)?;
        let registry = SchemaRegistry::load(dir)?;
        Self::new(Arc::new(registry), config)
    }

    /// Replace the source of image dimensions.
    pub fn with_provider(mut self, provider: Arc<dyn ImageMetadataProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// The compiled schemas.
    pub fn schemas(&self) -> &SchemaValidator {
        &self.schemas
    }

    /// Schema used by [`validate_default`](Self::validate_default).
    pub fn default_schema(&self) -> SchemaName {
        self.default_schema
    }

    /// Validate one document.
    ///
    /// `images_root` enables the image size check; image `file_name`s are
    /// resolved against it.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage's error. Schema failures carry every
    /// violation; later stages report the first fault found.
    pub fn validate(
        &self,
        document: &Value,
        images_root: Option<&Path>,
        schema: SchemaName,
    ) -> Result<ValidationSummary, ValidationError> {
        self.schemas.check(document, schema)?;

        let index = validate_references(document, &self.policy)?;
        tracing::debug!(
            known = index.known_count(),
            referenced = index.referenced_count(),
            "references consistent"
        );

        let annotations_checked = validate_coordinates(document)?;
        tracing::debug!(annotations = annotations_checked, "annotation bounds ok");

        let image_sizes = validate_image_sizes(document, images_root, self.provider.as_ref())?;

        tracing::info!(%schema, "document valid");
        Ok(ValidationSummary {
            schema,
            known_ids: index.known_count(),
            referenced_ids: index.referenced_count(),
            annotations_checked,
            image_sizes,
        })
    }

    /// Validate against the configured default schema.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_default(
        &self,
        document: &Value,
        images_root: Option<&Path>,
    ) -> Result<ValidationSummary, ValidationError> {
        self.validate(document, images_root, self.default_schema)
    }

    /// Validate against a schema given by name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Configuration` for an unknown name before
    /// looking at the document, otherwise see [`validate`](Self::validate).
    pub fn validate_named(
        &self,
        document: &Value,
        images_root: Option<&Path>,
        schema: &str,
    ) -> Result<ValidationSummary, ValidationError> {
        let schema = SchemaName::from_str(schema)?;
        self.validate(document, images_root, schema)
    }
}
