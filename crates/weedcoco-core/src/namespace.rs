//! # ID Namespace Derivation
//!
//! Maps a top-level section name to the entity-type key that scopes the
//! ids of its records, and maps a `*_id` reference field to the namespace
//! it points into.
//!
//! Derivation looks only at the name string. Known WeedCOCO sections go
//! through [`KNOWN_SECTIONS`]; anything else falls back to a plural rule:
//!
//! | Section name ends with | Namespace |
//! |------------------------|-----------|
//! | `ies`                  | stem + `y` (`categories` → `category`) |
//! | `ss`                   | unchanged (`class` → `class`) |
//! | `s`                    | stem (`images` → `image`) |
//! | anything else          | unchanged (`license` → `license`) |

/// Suffix marking a field as a reference into another namespace.
pub const REFERENCE_SUFFIX: &str = "_id";

/// Explicit section → namespace table for every section WeedCOCO defines.
pub const KNOWN_SECTIONS: &[(&str, &str)] = &[
    ("images", "image"),
    ("annotations", "annotation"),
    ("categories", "category"),
    ("agcontexts", "agcontext"),
    ("collections", "collection"),
    ("collection_memberships", "collection_membership"),
    ("license", "license"),
    ("licenses", "license"),
    ("info", "info"),
];

/// Derive the namespace for a section name.
pub fn derive(section: &str) -> String {
    if let Some((_, namespace)) = KNOWN_SECTIONS.iter().find(|(name, _)| *name == section) {
        return (*namespace).to_string();
    }
    if let Some(stem) = section.strip_suffix("ies") {
        format!("{stem}y")
    } else if section.ends_with("ss") {
        section.to_string()
    } else if let Some(stem) = section.strip_suffix('s') {
        stem.to_string()
    } else {
        section.to_string()
    }
}

/// Namespace targeted by a reference field, or `None` if `field` is not
/// a reference. A bare `_id` is not a reference.
pub fn reference_namespace(field: &str) -> Option<&str> {
    field
        .strip_suffix(REFERENCE_SUFFIX)
        .filter(|namespace| !namespace.is_empty())
}
