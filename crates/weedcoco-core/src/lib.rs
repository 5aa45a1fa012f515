//! # weedcoco-core — Foundational Types for WeedCOCO Validation
//!
//! This crate is the leaf of the validation workspace. It defines the
//! types every other crate agrees on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One error taxonomy.** [`ValidationError`] enumerates every way a
//!    dataset can be rejected, from registry construction through image
//!    size checks. Schema violations are aggregated; everything else is
//!    a single, fully located fault.
//!
//! 2. **Typed identifiers.** Record ids are scalars of mixed type in the
//!    wild. [`RecordId`] gives them structural equality so that `1` and
//!    `"1"` never collide, and [`IdKey`] scopes them to a namespace.
//!
//! 3. **Namespace derivation is a pure function.** [`namespace::derive`]
//!    maps a section name to its entity-type key using an explicit table
//!    plus a documented fallback rule. It never looks at content.
//!
//! 4. **Documents are plain `serde_json::Value` trees.** Parsing from disk
//!    (JSON or YAML) is provided by [`document`] for callers that need it;
//!    the validators themselves only ever borrow an in-memory tree.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `weedcoco-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod identity;
pub mod namespace;

pub use document::{load_document, yaml_to_json_value};
pub use error::{ConfigError, DocumentError, SchemaViolation, ValidationError};
pub use identity::{IdKey, RecordId};
