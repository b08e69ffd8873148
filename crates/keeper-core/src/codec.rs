//! YAML codec for resource bodies
//!
//! Files hold the body only, with keys sorted and server-managed fields
//! removed, so `decode(encode(body)) == body` for any body without those
//! fields.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::resource::{ResourceBody, ResourceKind};

/// Remove fields the cluster injects and manages for `kind`.
pub fn strip_server_fields(kind: ResourceKind, body: &mut ResourceBody) {
    let info = kind.info();
    for field in info.server_fields {
        body.remove(*field);
    }
    for (parent, field) in info.nested_server_fields {
        match body.get_mut(*parent) {
            Some(Value::Array(items)) => {
                for item in items.iter_mut() {
                    if let Value::Object(entry) = item {
                        entry.remove(*field);
                    }
                }
            }
            Some(Value::Object(entry)) => {
                entry.remove(*field);
            }
            _ => {}
        }
    }
}

/// Serialize a body to its file representation.
pub fn encode(kind: ResourceKind, body: &ResourceBody) -> Result<String> {
    let mut body = body.clone();
    strip_server_fields(kind, &mut body);
    serde_yaml::to_string(&body).map_err(|e| Error::codec(format!("cannot serialize: {}", e)))
}

/// Parse a file representation back into a body.
///
/// Fails on YAML syntax errors and on documents that are not a mapping.
pub fn decode(kind: ResourceKind, content: &[u8]) -> Result<ResourceBody> {
    let value: Value = serde_yaml::from_slice(content)
        .map_err(|e| Error::codec(format!("malformed YAML: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::codec(format!(
            "{} file must contain a mapping, found {}",
            kind,
            describe(&other)
        ))),
    }
}

/// Check that a body has the keys required to publish it.
pub fn validate(kind: ResourceKind, body: &ResourceBody) -> Result<()> {
    let missing: Vec<&str> = kind
        .info()
        .required_fields
        .iter()
        .copied()
        .filter(|field| !body.contains_key(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::codec(format!(
            "{} is missing required field(s): {}",
            kind,
            missing.join(", ")
        )))
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
