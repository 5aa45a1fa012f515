//! # Referential Integrity
//!
//! Checks the id graph of a WeedCOCO document in three passes:
//!
//! 1. Collect every `(namespace, id)` pair from the records of every
//!    list-valued section, failing on the first duplicate.
//! 2. Resolve every `*_id` field against the collected pairs, failing on
//!    the first unknown target.
//! 3. Fail on the first id of a must-be-referenced namespace that no
//!    `*_id` field points at.
//!
//! Pass 1 completes before pass 2 starts, so forward references (to
//! records later in the document) are legal.
//!
//! Reference resolution is loose by default: any section may carry any
//! `*_id` field naming any namespace. [`ReferencePolicy`] can restrict
//! which reference fields a section may carry.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::{Map, Value};
use weedcoco_core::namespace::{self, reference_namespace};
use weedcoco_core::{IdKey, RecordId, ValidationError};

/// Namespaces whose ids must be referenced unless configured otherwise.
pub const DEFAULT_REQUIRE_REFERENCED: [&str; 2] = ["image", "agcontext"];

/// Field holding a record's own id.
pub const ID_FIELD: &str = "id";

/// Rules for the reference passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePolicy {
    require_referenced: BTreeSet<String>,
    allowed_references: Option<BTreeMap<String, BTreeSet<String>>>,
}

impl Default for ReferencePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRE_REFERENCED)
    }
}

impl ReferencePolicy {
    /// Policy requiring every id in `require_referenced` namespaces to be
    /// referenced, with loose reference fields.
    pub fn new<I, S>(require_referenced: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            require_referenced: require_referenced.into_iter().map(Into::into).collect(),
            allowed_references: None,
        }
    }

    /// Restrict reference fields per section. Sections missing from the
    /// table stay unrestricted.
    pub fn with_allowed_references(
        mut self,
        allowed: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        self.allowed_references = Some(allowed);
        self
    }

    /// Namespaces whose ids must be referenced.
    pub fn require_referenced(&self) -> &BTreeSet<String> {
        &self.require_referenced
    }

    fn allows(&self, section: &str, field: &str) -> bool {
        match &self.allowed_references {
            Some(table) => table
                .get(section)
                .map_or(true, |fields| fields.contains(field)),
            None => true,
        }
    }
}

/// Id sets built by a successful reference check.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    /// Known keys in document order.
    known: Vec<IdKey>,
    known_set: HashSet<IdKey>,
    referenced: HashSet<IdKey>,
}

impl ReferenceIndex {
    /// Number of `(namespace, id)` pairs declared by records.
    pub fn known_count(&self) -> usize {
        self.known.len()
    }

    /// Number of known pairs targeted by at least one reference.
    pub fn referenced_count(&self) -> usize {
        self.referenced.len()
    }

    /// Whether a record declares `key`.
    pub fn is_known(&self, key: &IdKey) -> bool {
        self.known_set.contains(key)
    }

    /// Whether some `*_id` field targets `key`.
    pub fn is_referenced(&self, key: &IdKey) -> bool {
        self.referenced.contains(key)
    }

    /// Known keys in document order.
    pub fn known(&self) -> &[IdKey] {
        &self.known
    }
}

/// List-valued top-level entries with their object records.
fn sections(document: &Value) -> impl Iterator<Item = (&str, Vec<&Map<String, Value>>)> {
    document
        .as_object()
        .into_iter()
        .flat_map(|root| root.iter())
        .filter_map(|(name, value)| {
            value.as_array().map(|records| {
                let records = records.iter().filter_map(Value::as_object).collect();
                (name.as_str(), records)
            })
        })
}

/// Check id uniqueness, reference resolution and mandatory referencing.
///
/// # Errors
///
/// Fails fast with the first `ValidationError::DuplicateId`,
/// `ValidationError::UnexpectedReference`, `ValidationError::UnknownReference`
/// or `ValidationError::UnreferencedId` found, in that pass order.
pub fn validate_references(
    document: &Value,
    policy: &ReferencePolicy,
) -> Result<ReferenceIndex, ValidationError> {
    let mut index = ReferenceIndex::default();

    for (section, records) in sections(document) {
        let namespace = namespace::derive(section);
        for record in records {
            let Some(id) = record.get(ID_FIELD) else {
                continue;
            };
            let key = IdKey {
                namespace: namespace.clone(),
                id: RecordId::from_value(id),
            };
            if !index.known_set.insert(key.clone()) {
                return Err(ValidationError::DuplicateId { key });
            }
            index.known.push(key);
        }
    }

    for (section, records) in sections(document) {
        for record in records {
            for (field, value) in record {
                let Some(target) = reference_namespace(field) else {
                    continue;
                };
                let origin = || record.get(ID_FIELD).map(RecordId::from_value);
                if !policy.allows(section, field) {
                    return Err(ValidationError::UnexpectedReference {
                        field: field.clone(),
                        section: section.to_string(),
                        record_id: origin(),
                    });
                }
                let key = IdKey {
                    namespace: target.to_string(),
                    id: RecordId::from_value(value),
                };
                if !index.known_set.contains(&key) {
                    return Err(ValidationError::UnknownReference {
                        key,
                        section: section.to_string(),
                        record_id: origin(),
                    });
                }
                index.referenced.insert(key);
            }
        }
    }

    if let Some(key) = index.known.iter().find(|key| {
        policy.require_referenced.contains(&key.namespace) && !index.referenced.contains(*key)
    }) {
        return Err(ValidationError::UnreferencedId { key: key.clone() });
    }

    tracing::debug!(
        known = index.known_count(),
        referenced = index.referenced_count(),
        "references resolved"
    );
    Ok(index)
}
