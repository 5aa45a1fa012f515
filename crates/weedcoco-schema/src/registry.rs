//! # Schema Registry
//!
//! Loads every schema document in a directory and indexes it by its
//! self-declared `$id` URI.
//!
//! The registry is built once and never mutated afterwards. Share it
//! behind an `Arc` between validators and threads; all access is
//! read-only.
//!
//! ## Schema Resolution
//!
//! Cross-schema `$ref`s such as `image.json` inside
//! `https://weedid.sydney.edu.au/schema/main.json` resolve against the
//! referring schema's `$id` and are served from the registry by
//! [`LocalSchemaRetriever`]. A URI that is not registered is an error;
//! nothing is ever fetched over the network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jsonschema::{Retrieve, Uri};
use serde_json::Value;
use weedcoco_core::document::{is_yaml_path, parse_document};
use weedcoco_core::ValidationError;

/// Key holding a schema's identifying URI.
pub const ID_KEY: &str = "$id";

/// Immutable index of schema documents keyed by `$id`.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Map from `$id` URI to schema document.
    schemas: HashMap<String, Value>,
    /// Map from `$id` URI to the file it was loaded from, when loaded from disk.
    origins: HashMap<String, PathBuf>,
}

impl SchemaRegistry {
    /// Load all `*.yaml`, `*.yml` and `*.json` schema files in `schema_dir`.
    ///
    /// Files are read in name order. Subdirectories are not scanned.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::SchemaLoad` if the directory cannot be
    /// read, a file cannot be parsed, a schema lacks a string `$id`, or two
    /// files declare the same `$id`.
    pub fn load(schema_dir: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let schema_dir = schema_dir.as_ref();
        let load_error = |source_name: String, reason: String| ValidationError::SchemaLoad {
            source_name,
            reason,
        };

        let entries = std::fs::read_dir(schema_dir).map_err(|e| {
            load_error(
                schema_dir.display().to_string(),
                format!("cannot read schema directory: {e}"),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| load_error(schema_dir.display().to_string(), e.to_string()))?
                .path();
            let is_schema_file = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml" | "json")
            );
            if path.is_file() && is_schema_file {
                paths.push(path);
            }
        }
        paths.sort();

        let mut registry = Self::default();
        for path in paths {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| load_error(path.display().to_string(), e.to_string()))?;
            let schema = parse_document(&content, is_yaml_path(&path))
                .map_err(|reason| load_error(path.display().to_string(), reason))?;
            registry.insert(schema, Some(path))?;
        }

        tracing::info!(
            schema_dir = %schema_dir.display(),
            schema_count = registry.len(),
            "loaded schema registry"
        );
        Ok(registry)
    }

    /// Build a registry from in-memory schema documents.
    ///
    /// # Errors
    ///
    /// Same `$id` rules as [`load`](Self::load).
    pub fn from_schemas(schemas: impl IntoIterator<Item = Value>) -> Result<Self, ValidationError> {
        let mut registry = Self::default();
        for schema in schemas {
            registry.insert(schema, None)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, schema: Value, origin: Option<PathBuf>) -> Result<(), ValidationError> {
        let source_name = origin
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());

        let uri = match schema.get(ID_KEY).and_then(Value::as_str) {
            Some(uri) => normalize_uri(uri).to_string(),
            None => {
                return Err(ValidationError::SchemaLoad {
                    source_name,
                    reason: format!("schema has no string \"{ID_KEY}\""),
                })
            }
        };

        if self.schemas.contains_key(&uri) {
            let first = self
                .origins
                .get(&uri)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string());
            return Err(ValidationError::SchemaLoad {
                source_name,
                reason: format!("duplicate {ID_KEY} '{uri}' (also declared by {first})"),
            });
        }

        tracing::debug!(%uri, source = %source_name, "registered schema");
        if let Some(path) = origin {
            self.origins.insert(uri.clone(), path);
        }
        self.schemas.insert(uri, schema);
        Ok(())
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// All registered URIs, sorted.
    pub fn uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        uris.sort_unstable();
        uris
    }

    /// Look up a schema by its identifying URI. A trailing empty fragment
    /// (`...json#`) is ignored.
    pub fn get(&self, uri: &str) -> Option<&Value> {
        self.schemas.get(normalize_uri(uri))
    }

    /// File a schema was loaded from, if it came from disk.
    pub fn origin(&self, uri: &str) -> Option<&Path> {
        self.origins.get(normalize_uri(uri)).map(PathBuf::as_path)
    }

    /// Resolve a `$ref` found in the schema identified by `base_uri` to the
    /// full document of another registered schema.
    ///
    /// Absolute references are looked up directly. Relative references are
    /// joined to the directory part of `base_uri`. Any JSON-pointer fragment
    /// is dropped: the whole target document is returned.
    pub fn resolve_ref(&self, base_uri: &str, reference: &str) -> Option<&Value> {
        let target = reference.split('#').next().unwrap_or(reference);
        if target.is_empty() {
            return self.get(base_uri);
        }
        if target.contains("://") {
            return self.get(target);
        }
        let base = base_uri.split('#').next().unwrap_or(base_uri);
        let dir = match base.rfind('/') {
            Some(idx) => &base[..=idx],
            None => "",
        };
        self.get(&format!("{dir}{target}"))
    }
}

fn normalize_uri(uri: &str) -> &str {
    uri.strip_suffix('#').unwrap_or(uri)
}

/// Retriever serving `$ref` targets from a shared [`SchemaRegistry`].
///
/// Prevents the jsonschema crate from making network requests: every
/// external reference must be satisfied locally or the validator fails
/// to build.
pub struct LocalSchemaRetriever {
    registry: Arc<SchemaRegistry>,
}

impl LocalSchemaRetriever {
    /// Create a retriever over `registry`.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        match self.registry.get(uri_str) {
            Some(value) => Ok(value.clone()),
            None => Err(format!("no schema registered for '{uri_str}'").into()),
        }
    }
}
