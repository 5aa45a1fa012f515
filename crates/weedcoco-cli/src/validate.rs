//! # Validate Command
//!
//! Loads configuration, builds one [`Validator`], and validates each path
//! given on the command line with it.
//!
//! Configuration layers, later overriding earlier: defaults, `--config`
//! file, `WEEDCOCO_*` environment, command-line flags.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use weedcoco_core::{load_document, ConfigError, ValidationError};
use weedcoco_validate::{SchemaName, ValidationConfig, Validator};

use crate::discover_schema_dir;

/// Arguments for `weedcoco-validate`.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Configuration file (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the schema files. Defaults to the nearest
    /// `schemas/` above the current directory.
    #[arg(long, value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Schema to validate against: `weedcoco` or `compatible-coco`.
    #[arg(long)]
    pub schema: Option<String>,

    /// Directory image `file_name`s are relative to.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub images_root: PathBuf,

    /// Skip comparing declared image sizes with the image files.
    #[arg(long, conflicts_with = "images_root")]
    pub disable_size_check: bool,

    /// Print a JSON failure report to stdout for each failing path.
    #[arg(long)]
    pub json: bool,

    /// WeedCOCO documents to validate (`.json`, `.yaml`, `.yml`).
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

impl ValidateArgs {
    fn images_root(&self) -> Option<&Path> {
        (!self.disable_size_check).then_some(self.images_root.as_path())
    }
}

/// Execute validation over every path.
///
/// Returns exit code: 0 when every path is valid, 1 when any failed.
///
/// # Errors
///
/// Returns an error when configuration or the schema registry cannot be
/// loaded. No document is validated in that case.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = resolve_config(args)?;
    let schema = config.schema_name()?;
    let validator = Validator::from_config(&config).context("failed to build validator")?;

    tracing::info!(
        schema_count = validator.schemas().registry().len(),
        %schema,
        "loaded schema registry"
    );

    let mut had_failures = false;
    for path in &args.paths {
        match validate_path(&validator, path, args.images_root(), schema) {
            Ok(()) => tracing::info!(path = %path.display(), "valid"),
            Err(e) => {
                had_failures = true;
                eprintln!("While validating {}: {e}", path.display());
                if args.json {
                    let mut report = e.error_details();
                    report["path"] = json!(path.display().to_string());
                    println!("{report}");
                }
            }
        }
    }

    Ok(u8::from(had_failures))
}

fn validate_path(
    validator: &Validator,
    path: &Path,
    images_root: Option<&Path>,
    schema: SchemaName,
) -> Result<(), ValidationError> {
    let document = load_document(path)?;
    let summary = validator.validate(&document, images_root, schema)?;
    tracing::debug!(
        path = %path.display(),
        known_ids = summary.known_ids,
        annotations = summary.annotations_checked,
        images_checked = summary.image_sizes.checked,
        images_skipped = summary.image_sizes.skipped.len(),
        "validation summary"
    );
    Ok(())
}

/// Layer defaults, config file, environment and flags.
fn resolve_config(args: &ValidateArgs) -> Result<ValidationConfig> {
    let mut config = match &args.config {
        Some(path) => ValidationConfig::from_file(path)?,
        None => ValidationConfig::default(),
    }
    .apply_env()?;

    if let Some(dir) = &args.schema_dir {
        config.schema_dir = Some(dir.clone());
    }
    if let Some(schema) = &args.schema {
        SchemaName::from_str(schema)?;
        config.schema = schema.clone();
    }
    if config.schema_dir.is_none() {
        let cwd = std::env::current_dir().context("cannot read current directory")?;
        let found = discover_schema_dir(&cwd).ok_or(ConfigError::MissingSchemaDir)?;
        tracing::debug!(schema_dir = %found.display(), "discovered schema directory");
        config.schema_dir = Some(found);
    }
    Ok(config)
}
