//! # Document Loading
//!
//! Reads WeedCOCO documents and schema files from disk into
//! `serde_json::Value` trees. YAML is accepted for `.yaml`/`.yml` files
//! and converted to the JSON data model; everything else is parsed as JSON.

use std::path::Path;

use serde_json::Value;

use crate::error::DocumentError;

/// Whether `path` should be parsed as YAML, judged by its extension.
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Load a JSON or YAML file into a JSON value tree.
///
/// # Errors
///
/// Returns [`DocumentError::Io`] if the file cannot be read and
/// [`DocumentError::Parse`] if it is not valid JSON/YAML or uses YAML
/// features with no JSON equivalent.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_document(&content, is_yaml_path(path)).map_err(|reason| DocumentError::Parse {
        path: path.display().to_string(),
        reason,
    })
}

/// Parse document text as YAML or JSON.
pub fn parse_document(content: &str, yaml: bool) -> Result<Value, String> {
    if yaml {
        let yaml_value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
        yaml_to_json_value(&yaml_value)
    } else {
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Map keys that are numbers or booleans become strings. Tags are dropped
/// and their inner value kept. Non-finite floats and compound map keys
/// have no JSON form and are rejected; the error names the JSON Pointer of
/// the offending node.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    convert(yaml, &mut String::new())
}

fn convert(yaml: &serde_yaml::Value, pointer: &mut String) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i.into());
            }
            if let Some(u) = n.as_u64() {
                return Ok(u.into());
            }
            n.as_f64()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("cannot represent number {n} in JSON at {}", at(pointer)))
        }
        Yaml::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push_str(&format!("/{i}"));
                out.push(convert(item, pointer)?);
                pointer.truncate(len);
            }
            Ok(Value::Array(out))
        }
        Yaml::Mapping(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => return Err(format!("non-scalar map key at {}", at(pointer))),
                };
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&key.replace('~', "~0").replace('/', "~1"));
                out.insert(key, convert(v, pointer)?);
                pointer.truncate(len);
            }
            Ok(Value::Object(out))
        }
        Yaml::Tagged(tagged) => convert(&tagged.value, pointer),
    }
}

fn at(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn yaml_converts_to_json_model() {
        let yaml = r#"
images: []
info:
  description: Something
  metadata:
    creator:
      - name: Someone
agcontexts:
  - id: 0
    camera_fov: 22.6
    cropped_to_plant: false
    bbch_growth_range: [10, 20]
"#;
        let value = parse_document(yaml, true).unwrap();
        assert_eq!(value["images"], serde_json::json!([]));
        assert_eq!(value["info"]["metadata"]["creator"][0]["name"], "Someone");
        assert_eq!(value["agcontexts"][0]["id"], 0);
        assert_eq!(value["agcontexts"][0]["camera_fov"], 22.6);
        assert_eq!(value["agcontexts"][0]["cropped_to_plant"], false);
        assert_eq!(value["agcontexts"][0]["bbch_growth_range"][1], 20);
    }

    #[test]
    fn numeric_yaml_keys_become_strings() {
        let value = parse_document("1: one\ntrue: yes\n", true).unwrap();
        assert_eq!(value["1"], "one");
        assert_eq!(value["true"], "yes");
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let err = parse_document("agcontexts:\n  - camera_fov: .nan\n", true).unwrap_err();
        assert!(err.contains("cannot represent number"), "{err}");
        assert!(err.ends_with("at /agcontexts/0/camera_fov"), "{err}");
    }

    #[test]
    fn compound_keys_name_their_location() {
        let mut info = serde_yaml::Mapping::new();
        info.insert(serde_yaml::Value::Sequence(Vec::new()), "x".into());
        let mut root = serde_yaml::Mapping::new();
        root.insert("info".into(), serde_yaml::Value::Mapping(info));
        let err = yaml_to_json_value(&serde_yaml::Value::Mapping(root)).unwrap_err();
        assert_eq!(err, "non-scalar map key at /info");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_document("{", false).unwrap_err();
        assert!(err.starts_with("invalid JSON"));
    }

    #[test]
    fn load_document_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("dataset.yml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(f, "images: []").unwrap();
        assert_eq!(load_document(&yaml_path).unwrap()["images"], serde_json::json!([]));

        let json_path = dir.path().join("dataset.json");
        std::fs::write(&json_path, r#"{"images": [{"id": 1}]}"#).unwrap();
        assert_eq!(load_document(&json_path).unwrap()["images"][0]["id"], 1);
    }

    #[test]
    fn missing_document_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
