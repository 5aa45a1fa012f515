//! # Schema Validation
//!
//! Runs a WeedCOCO document against one of the named top-level schemas
//! (draft-07 semantics) and collects every violation.
//!
//! Validation is exhaustive: it never stops at the first problem. Each
//! [`SchemaViolation`] carries the JSON Pointer into the document, the
//! offending value, a message and the failing keyword, so a large dataset
//! can be fixed in one pass.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::Value;
use weedcoco_core::{ConfigError, SchemaViolation, ValidationError};

use crate::registry::{LocalSchemaRetriever, SchemaRegistry};

/// The named top-level schemas a document can be validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaName {
    /// Full WeedCOCO dataset.
    #[default]
    WeedCoco,
    /// Plain COCO dataset with WeedCOCO-compatible categories.
    CompatibleCoco,
}

impl SchemaName {
    /// Every named schema.
    pub const ALL: [SchemaName; 2] = [SchemaName::WeedCoco, SchemaName::CompatibleCoco];

    /// Name used on the command line and in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaName::WeedCoco => "weedcoco",
            SchemaName::CompatibleCoco => "compatible-coco",
        }
    }

    /// Identifying URI of the root schema.
    pub fn uri(self) -> &'static str {
        match self {
            SchemaName::WeedCoco => "https://weedid.sydney.edu.au/schema/main.json",
            SchemaName::CompatibleCoco => "https://weedid.sydney.edu.au/schema/compatible-coco.json",
        }
    }

    /// All recognised names, sorted.
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Self::ALL.iter().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownSchema {
                name: s.to_string(),
                valid: Self::names(),
            })
    }
}

/// Validator for the named schema set, compiled once from a shared registry.
///
/// ## Thread Safety
///
/// `SchemaValidator` is `Send + Sync`. Compiled validators and the registry
/// are read-only after construction, so one instance can serve concurrent
/// validation calls.
pub struct SchemaValidator {
    registry: Arc<SchemaRegistry>,
    validators: HashMap<SchemaName, Validator>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema_count", &self.registry.len())
            .field("compiled", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaValidator {
    /// Compile every named schema against `registry`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SchemaLoad` if a named schema is missing
    /// from the registry, or if it (or anything it references) fails to
    /// compile.
    pub fn new(registry: Arc<SchemaRegistry>) -> Result<Self, ValidationError> {
        let mut validators = HashMap::new();
        for name in SchemaName::ALL {
            validators.insert(name, build_validator(&registry, name)?);
        }
        Ok(Self {
            registry,
            validators,
        })
    }

    /// The registry the validators were compiled from.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Every violation of `schema` found in `document`, in evaluation order.
    pub fn violations(&self, document: &Value, schema: SchemaName) -> Vec<SchemaViolation> {
        let Some(validator) = self.validators.get(&schema) else {
            return Vec::new();
        };
        validator
            .iter_errors(document)
            .map(|e| {
                let schema_path = e.schema_path.to_string();
                let rule = schema_path
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                SchemaViolation {
                    instance_path: e.instance_path.to_string(),
                    value: e.instance.clone().into_owned(),
                    message: e.to_string(),
                    rule,
                    schema_path,
                }
            })
            .collect()
    }

    /// Validate against a schema given by name.
    ///
    /// Returns the (possibly empty) violation list; a non-empty list means
    /// the document is invalid.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Configuration` if `schema_name` is not one
    /// of [`SchemaName::names`].
    pub fn validate_schema(
        &self,
        document: &Value,
        schema_name: &str,
    ) -> Result<Vec<SchemaViolation>, ValidationError> {
        let schema = SchemaName::from_str(schema_name)?;
        Ok(self.violations(document, schema))
    }

    /// Validate and fold any violations into one aggregate error.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::JsonSchema` carrying every violation if the
    /// document does not conform.
    pub fn check(&self, document: &Value, schema: SchemaName) -> Result<(), ValidationError> {
        let violations = self.violations(document, schema);
        if violations.is_empty() {
            tracing::debug!(%schema, "document conforms to schema");
            return Ok(());
        }
        tracing::warn!(%schema, count = violations.len(), "schema violations found");
        Err(ValidationError::JsonSchema {
            schema: schema.to_string(),
            violations,
        })
    }
}

fn build_validator(
    registry: &Arc<SchemaRegistry>,
    name: SchemaName,
) -> Result<Validator, ValidationError> {
    let schema = registry
        .get(name.uri())
        .ok_or_else(|| ValidationError::SchemaLoad {
            source_name: name.uri().to_string(),
            reason: format!("schema '{name}' is not in the registry"),
        })?;

    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.with_retriever(LocalSchemaRetriever::new(Arc::clone(registry)));

    opts.build(schema).map_err(|e| ValidationError::SchemaLoad {
        source_name: name.uri().to_string(),
        reason: format!("cannot compile schema '{name}': {e}"),
    })
}
