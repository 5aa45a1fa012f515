//! # weedcoco-cli — WeedCOCO Command-Line Validator
//!
//! Provides the `weedcoco-validate` binary:
//!
//! ```bash
//! weedcoco-validate dataset/weedcoco.json
//! weedcoco-validate --schema compatible-coco --disable-size-check coco.json
//! weedcoco-validate -vv --images-root dataset/ dataset/weedcoco.yaml
//! ```

pub mod validate;

use std::path::{Path, PathBuf};

/// Name of the schema directory searched for by [`discover_schema_dir`].
pub const SCHEMA_DIR_NAME: &str = "schemas";

/// Schema file that marks a directory as a schema registry.
pub const MAIN_SCHEMA_FILE: &str = "main.yaml";

/// Walk up from `start` to the first `schemas/` directory holding
/// `main.yaml`.
pub fn discover_schema_dir(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        let candidate = dir.join(SCHEMA_DIR_NAME);
        candidate
            .join(MAIN_SCHEMA_FILE)
            .is_file()
            .then_some(candidate)
    })
}
