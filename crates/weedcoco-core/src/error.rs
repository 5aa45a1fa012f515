//! # Error Types
//!
//! Defines the error types used throughout WeedCOCO validation. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Schema violations are aggregated: one [`ValidationError::JsonSchema`]
//!   carries every structural problem found in a document.
//! - Referential and semantic failures are single faults carrying the
//!   namespace, id and location needed to find them without re-running.
//! - A missing image file is never an error; it is reported as skipped
//!   coverage by the image size check.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::identity::{IdKey, RecordId};

/// Top-level error type for WeedCOCO validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The schema registry could not be built. No validation is possible.
    #[error("schema load error for '{source_name}': {reason}")]
    SchemaLoad {
        /// Schema file, directory, or URI that failed.
        source_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// Caller-side misconfiguration, such as an unknown schema name.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The document did not conform to the selected schema.
    #[error("{} violations found: {}", .violations.len(), join_messages(.violations))]
    JsonSchema {
        /// Name of the schema validated against.
        schema: String,
        /// Every violation found.
        violations: Vec<SchemaViolation>,
    },

    /// Two records in the same namespace share an id.
    #[error("Duplicate ID: {key}")]
    DuplicateId {
        /// The repeated key.
        key: IdKey,
    },

    /// A `*_id` field names an id that no record in its namespace has.
    #[error("Reference to unknown ID: {key}. Found in {section} id {}", display_origin(.record_id))]
    UnknownReference {
        /// The unresolved key.
        key: IdKey,
        /// Section of the referring record.
        section: String,
        /// Id of the referring record, when it has one.
        record_id: Option<RecordId>,
    },

    /// A `*_id` field appears on a section whose allowed references exclude it.
    #[error("Unexpected reference field '{field}' in {section} id {}", display_origin(.record_id))]
    UnexpectedReference {
        /// The reference field name.
        field: String,
        /// Section of the referring record.
        section: String,
        /// Id of the referring record, when it has one.
        record_id: Option<RecordId>,
    },

    /// An id in a must-be-referenced namespace is never referenced.
    #[error("{}", unreferenced_message(.key))]
    UnreferencedId {
        /// The unreferenced key.
        key: IdKey,
    },

    /// An annotation coordinate lies outside its image.
    #[error(
        "annotation {annotation_id} {field} {axis}={value} is outside image {image_id} bounds [0, {bound}]"
    )]
    GeometryOutOfBounds {
        /// Offending annotation.
        annotation_id: RecordId,
        /// Image the annotation refers to.
        image_id: RecordId,
        /// Geometry field (`bbox` or `segmentation`).
        field: String,
        /// `x` or `y`.
        axis: char,
        /// The offending coordinate (for `bbox`, the far edge).
        value: f64,
        /// Image extent along `axis`.
        bound: f64,
    },

    /// An image file's pixel size disagrees with the declared width/height.
    #[error(
        "image {image_id} ({file_name}) declares {declared_width}x{declared_height} but file is {actual_width}x{actual_height}"
    )]
    ImageSizeMismatch {
        /// Image record id.
        image_id: RecordId,
        /// `file_name` of the image record.
        file_name: String,
        /// Declared width.
        declared_width: u64,
        /// Declared height.
        declared_height: u64,
        /// Width read from the file.
        actual_width: u64,
        /// Height read from the file.
        actual_height: u64,
    },

    /// The document itself could not be loaded.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ValidationError {
    /// Short machine-readable kind, used as `error_type` in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::SchemaLoad { .. } => "schema_load",
            ValidationError::Configuration(_) => "configuration",
            ValidationError::JsonSchema { .. } => "jsonschema",
            ValidationError::DuplicateId { .. } => "duplicate_id",
            ValidationError::UnknownReference { .. } => "unknown_reference",
            ValidationError::UnexpectedReference { .. } => "unexpected_reference",
            ValidationError::UnreferencedId { .. } => "unreferenced_id",
            ValidationError::GeometryOutOfBounds { .. } => "geometry_out_of_bounds",
            ValidationError::ImageSizeMismatch { .. } => "image_size_mismatch",
            ValidationError::Document(_) => "document",
        }
    }

    /// Schema violations carried by this error; empty for other kinds.
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            ValidationError::JsonSchema { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Machine-readable report of this failure.
    ///
    /// Schema failures list one entry per violation with its path segments,
    /// offending value, message and failing schema location. Other kinds
    /// produce a single entry with the rendered message.
    pub fn error_details(&self) -> Value {
        let details: Vec<Value> = match self {
            ValidationError::JsonSchema { violations, .. } => violations
                .iter()
                .map(|v| {
                    json!({
                        "path": v.path_segments(),
                        "value": v.value,
                        "message": v.message,
                        "schema": v.schema_path,
                    })
                })
                .collect(),
            other => vec![json!({ "message": other.to_string() })],
        };
        json!({
            "error_type": self.kind(),
            "n_errors_found": details.len().to_string(),
            "error_details": details,
        })
    }
}

fn join_messages(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unreferenced_message(key: &IdKey) -> String {
    format!("{} ID {} is unreferenced", key.namespace, key.id)
}

fn display_origin(record_id: &Option<RecordId>) -> String {
    match record_id {
        Some(id) => id.to_string(),
        None => "None".to_string(),
    }
}

/// A single structural violation with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaViolation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// The violating value.
    pub value: Value,
    /// Human-readable description.
    pub message: String,
    /// Keyword that failed (`required`, `pattern`, `enum`, ...).
    pub rule: String,
    /// JSON Pointer within the schema that triggered the violation.
    pub schema_path: String,
}

impl SchemaViolation {
    /// Decoded segments of [`instance_path`](Self::instance_path).
    pub fn path_segments(&self) -> Vec<String> {
        self.instance_path
            .split('/')
            .skip(1)
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect()
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {} [{}]", self.message, self.rule)
        } else {
            write!(f, "{}: {} [{}]", self.instance_path, self.message, self.rule)
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Schema name outside the named schema set.
    #[error("schema should be one of {valid:?}, got '{name}'")]
    UnknownSchema {
        /// The name that was asked for.
        name: String,
        /// Recognised names, sorted.
        valid: Vec<&'static str>,
    },

    /// No schema directory was configured or discovered.
    #[error("no schema directory configured")]
    MissingSchemaDir,

    /// A configuration file could not be read or parsed.
    #[error("invalid configuration file '{path}': {reason}")]
    InvalidFile {
        /// Path of the configuration file.
        path: String,
        /// Parse or IO failure.
        reason: String,
    },

    /// An environment variable held an unusable value.
    #[error("invalid value for {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Error loading a document from disk.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path to the document.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file contents are not valid JSON/YAML, or not JSON-compatible.
    #[error("cannot parse '{path}': {reason}")]
    Parse {
        /// Path to the document.
        path: String,
        /// Parser message.
        reason: String,
    },
}
