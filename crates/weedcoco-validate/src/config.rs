//! # Validation Configuration
//!
//! Settings for a validation run, layered from defaults, an optional
//! YAML/JSON file, and the environment.
//!
//! Variables:
//! - `WEEDCOCO_SCHEMA_DIR`: schema registry directory.
//! - `WEEDCOCO_SCHEMA`: default named schema (`weedcoco` or `compatible-coco`).
//! - `WEEDCOCO_REQUIRE_REFERENCED`: comma-separated namespaces whose ids
//!   must be referenced. An empty value disables the check.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use weedcoco_core::{load_document, ConfigError};
use weedcoco_integrity::{ReferencePolicy, DEFAULT_REQUIRE_REFERENCED};
use weedcoco_schema::SchemaName;

/// Environment variable naming the schema directory.
pub const ENV_SCHEMA_DIR: &str = "WEEDCOCO_SCHEMA_DIR";
/// Environment variable naming the default schema.
pub const ENV_SCHEMA: &str = "WEEDCOCO_SCHEMA";
/// Environment variable listing must-be-referenced namespaces.
pub const ENV_REQUIRE_REFERENCED: &str = "WEEDCOCO_REQUIRE_REFERENCED";

/// Configuration for a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Directory holding the schema files.
    pub schema_dir: Option<PathBuf>,
    /// Named schema used when the caller does not choose one.
    pub schema: String,
    /// Namespaces whose ids must each be referenced at least once.
    pub require_referenced: BTreeSet<String>,
    /// Per-section allowed reference fields. Absent means any section may
    /// carry any `*_id` field.
    pub allowed_references: Option<BTreeMap<String, BTreeSet<String>>>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            schema: SchemaName::default().to_string(),
            require_referenced: DEFAULT_REQUIRE_REFERENCED
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_references: None,
        }
    }
}

impl ValidationConfig {
    /// Load a configuration file (YAML for `.yaml`/`.yml`, JSON otherwise).
    /// Keys not present keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFile` if the file cannot be read, parsed,
    /// or contains unknown keys.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidFile {
            path: path.display().to_string(),
            reason,
        };
        let value = load_document(path).map_err(|e| invalid(e.to_string()))?;
        let config: Self = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        config.schema_name()?;
        Ok(config)
    }

    /// Overlay settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` for an unusable value.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Overlay settings from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` for an unusable value.
    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup(ENV_SCHEMA_DIR) {
            if dir.trim().is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var: ENV_SCHEMA_DIR.to_string(),
                    reason: "empty path".to_string(),
                });
            }
            self.schema_dir = Some(PathBuf::from(dir));
        }
        if let Some(schema) = lookup(ENV_SCHEMA) {
            SchemaName::from_str(&schema).map_err(|e| ConfigError::InvalidEnv {
                var: ENV_SCHEMA.to_string(),
                reason: e.to_string(),
            })?;
            self.schema = schema;
        }
        if let Some(list) = lookup(ENV_REQUIRE_REFERENCED) {
            self.require_referenced = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(self)
    }

    /// The configured default schema.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownSchema` if `schema` is not a named schema.
    pub fn schema_name(&self) -> Result<SchemaName, ConfigError> {
        SchemaName::from_str(&self.schema)
    }

    /// Reference rules derived from this configuration.
    pub fn reference_policy(&self) -> ReferencePolicy {
        let policy = ReferencePolicy::new(self.require_referenced.iter().cloned());
        match &self.allowed_references {
            Some(table) => policy.with_allowed_references(table.clone()),
            None => policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = ValidationConfig::default();
        assert_eq!(config.schema_name().unwrap(), SchemaName::WeedCoco);
        assert!(config.require_referenced.contains("image"));
        assert!(config.require_referenced.contains("agcontext"));
        assert_eq!(config.reference_policy(), ReferencePolicy::default());
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weedcoco.yaml");
        std::fs::write(
            &path,
            "schema: compatible-coco\nrequire_referenced: [image]\nallowed_references:\n  annotations: [image_id, category_id]\n",
        )
        .unwrap();
        let config = ValidationConfig::from_file(&path).unwrap();
        assert_eq!(config.schema_name().unwrap(), SchemaName::CompatibleCoco);
        assert_eq!(config.require_referenced, BTreeSet::from(["image".to_string()]));
        assert_eq!(config.schema_dir, None);
        let table = config.allowed_references.unwrap();
        assert!(table["annotations"].contains("category_id"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weedcoco.json");
        std::fs::write(&path, r#"{"schema_directory": "x"}"#).unwrap();
        let err = ValidationConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile { .. }));
    }

    #[test]
    fn unknown_schema_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weedcoco.json");
        std::fs::write(&path, r#"{"schema": "coco"}"#).unwrap();
        let err = ValidationConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSchema { .. }));
    }

    #[test]
    fn environment_overlay() {
        let config = ValidationConfig::default()
            .apply_env_from(env(&[
                (ENV_SCHEMA_DIR, "/opt/weedcoco/schemas"),
                (ENV_SCHEMA, "compatible-coco"),
                (ENV_REQUIRE_REFERENCED, " image , category ,"),
            ]))
            .unwrap();
        assert_eq!(config.schema_dir, Some(PathBuf::from("/opt/weedcoco/schemas")));
        assert_eq!(config.schema, "compatible-coco");
        assert_eq!(
            config.require_referenced,
            BTreeSet::from(["image".to_string(), "category".to_string()])
        );
    }

    #[test]
    fn empty_requirement_list_disables_check() {
        let config = ValidationConfig::default()
            .apply_env_from(env(&[(ENV_REQUIRE_REFERENCED, "")]))
            .unwrap();
        assert!(config.require_referenced.is_empty());
    }

    #[test]
    fn bad_environment_values() {
        let err = ValidationConfig::default()
            .apply_env_from(env(&[(ENV_SCHEMA, "coco")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));

        let err = ValidationConfig::default()
            .apply_env_from(env(&[(ENV_SCHEMA_DIR, "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_SCHEMA_DIR));
    }
}
