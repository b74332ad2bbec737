//! Validated application of a partial profile override onto full defaults
//!
//! The default profile, serialized to JSON, doubles as the schema:
//! - objects are merged key by key, recursively
//! - arrays are replaced wholesale
//! - `null` in the override keeps the default
//! - keys absent from the default are rejected unless the path is an open map
//! - scalars are coerced where unambiguous (`"0.87"` -> `0.87`, `"true"` -> `true`)
//!
//! The merged value is then deserialized into the typed profile, which
//! rejects anything the shape check let through.

use crate::profile::BalanceProfile;
use crate::ConfigError;
use serde_json::{Number, Value};

/// Apply `partial` onto `T::default()` and return the typed result
pub fn apply_override<T: BalanceProfile>(partial: &Value) -> Result<T, ConfigError> {
    let mut merged = serde_json::to_value(T::default()).map_err(|e| ConfigError::Validation {
        domain: T::DOMAIN,
        message: e.to_string(),
    })?;

    overlay_value(&mut merged, partial, "", T::OPEN_MAPS)?;

    serde_json::from_value(merged).map_err(|e| ConfigError::Validation {
        domain: T::DOMAIN,
        message: e.to_string(),
    })
}

fn overlay_value(
    base: &mut Value,
    patch: &Value,
    path: &str,
    open_maps: &[&str],
) -> Result<(), ConfigError> {
    match patch {
        Value::Null => Ok(()),
        Value::Object(patch_map) => {
            let base_map = match base {
                Value::Object(map) => map,
                // Optional section that defaults to null takes the patch as-is
                Value::Null => {
                    *base = patch.clone();
                    return Ok(());
                }
                other => {
                    return Err(ConfigError::TypeMismatch {
                        path: display_path(path),
                        expected: kind_name(other),
                        found: "object",
                    })
                }
            };

            let open = open_maps.contains(&path);
            for (key, patch_value) in patch_map {
                let child_path = join_path(path, key);
                match base_map.get_mut(key) {
                    Some(base_value) => {
                        overlay_value(base_value, patch_value, &child_path, open_maps)?
                    }
                    None if open => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                    None => return Err(ConfigError::UnknownField { path: child_path }),
                }
            }
            Ok(())
        }
        _ => {
            *base = coerce_scalar(base, patch, path)?;
            Ok(())
        }
    }
}

/// Coerce a non-object override value to the shape of its default
fn coerce_scalar(default: &Value, patch: &Value, path: &str) -> Result<Value, ConfigError> {
    let mismatch = || ConfigError::TypeMismatch {
        path: display_path(path),
        expected: kind_name(default),
        found: kind_name(patch),
    };

    match (default, patch) {
        (Value::Null, _) => Ok(patch.clone()),
        (Value::Number(_), Value::Number(_))
        | (Value::Bool(_), Value::Bool(_))
        | (Value::String(_), Value::String(_))
        | (Value::Array(_), Value::Array(_)) => Ok(patch.clone()),
        (Value::Number(n), Value::String(s)) => parse_number(s.trim(), n.is_f64())
            .map(Value::Number)
            .ok_or_else(mismatch),
        (Value::Bool(_), Value::String(s)) => match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch()),
        },
        (Value::String(_), Value::Number(n)) => Ok(Value::String(n.to_string())),
        _ => Err(mismatch()),
    }
}

/// Parse a numeric string, keeping integers integral when the default is
fn parse_number(s: &str, float_default: bool) -> Option<Number> {
    if !float_default {
        if let Ok(v) = s.parse::<u64>() {
            return Some(Number::from(v));
        }
        if let Ok(v) = s.parse::<i64>() {
            return Some(Number::from(v));
        }
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}
