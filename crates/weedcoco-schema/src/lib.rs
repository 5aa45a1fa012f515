//! # weedcoco-schema — Schema Registry & Validation
//!
//! Structural validation of WeedCOCO documents against JSON Schema.
//!
//! ## Registry (`registry`)
//!
//! [`SchemaRegistry::load`] scans the `schemas/` directory, parses each
//! YAML/JSON schema, and indexes it by `$id`. It is built once per
//! process and shared read-only behind an `Arc`.
//!
//! ## Validation (`validate`)
//!
//! [`SchemaValidator`] compiles the named schema set ([`SchemaName`]) with
//! all cross-schema `$ref`s served from the registry, then reports every
//! violation found in a document.
//!
//! ## Crate Policy
//!
//! - Depends only on `weedcoco-core` internally.
//! - Schema `$id` URIs are stable identifiers; renaming a schema file does
//!   not change how it is referenced.

pub mod registry;
pub mod validate;

pub use registry::{LocalSchemaRetriever, SchemaRegistry};
pub use validate::{SchemaName, SchemaValidator};
