//! JSON sidecar reader
//!
//! Loads scanner acquisition parameters from the `.json` document that sits
//! next to each image. Scalars and numeric arrays are kept; anything else
//! is not needed downstream and is dropped.

use crate::models::{MetadataRecord, MetadataValue, ParsedFilename};
use qmri_common::{Error, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Read and convert one sidecar
pub fn read_sidecar(path: &Path, parsed: &ParsedFilename) -> Result<MetadataRecord> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::FileAccess(path.to_path_buf(), e.to_string()))?;

    let document: Value = serde_json::from_str(&content)
        .map_err(|e| Error::malformed_metadata(path, format!("invalid JSON: {}", e)))?;

    let object = match document {
        Value::Object(object) => object,
        _ => return Err(Error::malformed_metadata(path, "top level is not an object")),
    };

    Ok(MetadataRecord {
        key: parsed.sidecar_key(),
        path: path.to_path_buf(),
        fields: convert_fields(object, path),
    })
}

fn convert_fields(object: Map<String, Value>, path: &Path) -> BTreeMap<String, MetadataValue> {
    let mut fields = BTreeMap::new();
    for (name, value) in object {
        match convert_value(value) {
            Some(value) => {
                fields.insert(name, value);
            }
            None => {
                tracing::trace!(path = %path.display(), field = %name, "Dropping non-scalar field");
            }
        }
    }
    fields
}

fn convert_value(value: Value) -> Option<MetadataValue> {
    match value {
        Value::Number(n) => n.as_f64().map(MetadataValue::Number),
        Value::String(s) => Some(MetadataValue::Text(s)),
        Value::Bool(b) => Some(MetadataValue::Bool(b)),
        Value::Array(items) => items
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .map(MetadataValue::NumberList),
        Value::Null | Value::Object(_) => None,
    }
}
