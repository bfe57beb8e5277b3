//! Argument validation against a tool's declared parameter schema.
//!
//! Arguments arrive from clients as loosely typed JSON. Before a tool runs,
//! each argument is checked against the JSON schema in its descriptor and
//! lightly coerced (`"4"` for a number, `"true"` for a boolean, `3.0` for an
//! integer). Every rejection names the offending parameter.

use rmcp::model::JsonObject;
use serde_json::{Number, Value};
use tracing::debug;

use super::error::ToolError;

/// Validate and coerce `arguments` against `schema`.
///
/// Unknown arguments are dropped. `null` for an optional, non-nullable
/// parameter is treated as absent.
pub fn validate_arguments(schema: &JsonObject, arguments: JsonObject) -> Result<JsonObject, ToolError> {
    let properties = schema.get("properties").and_then(Value::as_object);
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut validated = JsonObject::new();

    for (name, value) in arguments {
        let Some(property) = properties
            .and_then(|p| p.get(&name))
            .and_then(Value::as_object)
        else {
            debug!(parameter = %name, "Ignoring undeclared argument");
            continue;
        };

        if value.is_null() && !accepts_null(property) {
            if required.contains(&name.as_str()) {
                return Err(ToolError::invalid_parameter(name, "must not be null"));
            }
            continue;
        }

        let value = check_value(&name, property, value)?;
        validated.insert(name, value);
    }

    for name in required {
        if !validated.contains_key(name) {
            return Err(ToolError::invalid_parameter(name, "is required"));
        }
    }

    Ok(validated)
}

fn check_value(name: &str, property: &JsonObject, value: Value) -> Result<Value, ToolError> {
    let types = declared_types(property);
    let value = if types.is_empty() {
        value
    } else {
        coerce(name, &types, value)?
    };

    check_enum(name, property, &value)?;
    check_range(name, property, &value)?;
    Ok(value)
}

fn declared_types(property: &JsonObject) -> Vec<&str> {
    match property.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn accepts_null(property: &JsonObject) -> bool {
    let types = declared_types(property);
    types.is_empty()
        || types.contains(&"null")
        || property.get("nullable").and_then(Value::as_bool) == Some(true)
}

fn coerce(name: &str, types: &[&str], value: Value) -> Result<Value, ToolError> {
    if value.is_null() || types.iter().any(|t| matches_type(t, &value)) {
        return Ok(value);
    }

    types
        .iter()
        .find_map(|t| coerce_to(t, &value))
        .ok_or_else(|| {
            ToolError::invalid_parameter(
                name,
                format!("expected {}, got {}", types.join(" or "), type_name(&value)),
            )
        })
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn coerce_to(expected: &str, value: &Value) -> Option<Value> {
    match (expected, value) {
        ("number", Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ("integer", Value::Number(n)) => n
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| Value::from(f as i64)),
        ("integer", Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        ("boolean", Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn check_enum(name: &str, property: &JsonObject, value: &Value) -> Result<(), ToolError> {
    let Some(allowed) = property.get("enum").and_then(Value::as_array) else {
        return Ok(());
    };
    if value.is_null() || allowed.contains(value) {
        return Ok(());
    }

    let choices: Vec<String> = allowed
        .iter()
        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
        .collect();
    Err(ToolError::invalid_parameter(
        name,
        format!("must be one of: {}", choices.join(", ")),
    ))
}

fn check_range(name: &str, property: &JsonObject, value: &Value) -> Result<(), ToolError> {
    let Some(n) = value.as_f64() else {
        return Ok(());
    };

    if let Some(min) = property.get("minimum").and_then(Value::as_f64) {
        if n < min {
            return Err(ToolError::invalid_parameter(name, format!("must be >= {}", min)));
        }
    }
    if let Some(max) = property.get("maximum").and_then(Value::as_f64) {
        if n > max {
            return Err(ToolError::invalid_parameter(name, format!("must be <= {}", max)));
        }
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> JsonObject {
        json!({
            "type": "object",
            "properties": {
                "a": { "type": "number" },
                "count": { "type": "integer", "minimum": -12, "maximum": 14 },
                "flag": { "type": "boolean", "default": false },
                "label": { "type": ["string", "null"] },
                "mode": { "type": "string", "enum": ["fast", "slow"] },
                "note": { "type": "string", "nullable": true }
            },
            "required": ["a"]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn args(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_accepts_well_typed_arguments() {
        let out = validate_arguments(&schema(), args(json!({ "a": 1.5, "count": 3, "flag": true })))
            .unwrap();
        assert_eq!(out["a"], 1.5);
        assert_eq!(out["count"], 3);
        assert_eq!(out["flag"], true);
    }

    #[test]
    fn test_coerces_numeric_and_boolean_strings() {
        let out = validate_arguments(
            &schema(),
            args(json!({ "a": "4", "count": "-2", "flag": "TRUE" })),
        )
        .unwrap();
        assert_eq!(out["a"], 4.0);
        assert_eq!(out["count"], -2);
        assert_eq!(out["flag"], true);
    }

    #[test]
    fn test_integral_float_accepted_for_integer() {
        let out = validate_arguments(&schema(), args(json!({ "a": 1, "count": 5.0 }))).unwrap();
        assert_eq!(out["count"], json!(5));

        let err = validate_arguments(&schema(), args(json!({ "a": 1, "count": 5.5 }))).unwrap_err();
        assert_eq!(err.parameter(), Some("count"));
    }

    #[test]
    fn test_type_mismatch_names_parameter() {
        let err = validate_arguments(&schema(), args(json!({ "a": "abc" }))).unwrap_err();
        assert_eq!(err.parameter(), Some("a"));
        assert!(err.to_string().contains("expected number, got string"));
    }

    #[test]
    fn test_missing_required_parameter() {
        let err = validate_arguments(&schema(), args(json!({ "count": 1 }))).unwrap_err();
        assert_eq!(err.parameter(), Some("a"));
        assert!(err.to_string().contains("is required"));
    }

    #[test]
    fn test_null_required_parameter_rejected() {
        let err = validate_arguments(&schema(), args(json!({ "a": null }))).unwrap_err();
        assert_eq!(err.parameter(), Some("a"));
    }

    #[test]
    fn test_null_handling_for_optional_parameters() {
        let out = validate_arguments(
            &schema(),
            args(json!({ "a": 1, "label": null, "note": null, "flag": null })),
        )
        .unwrap();
        assert_eq!(out["label"], Value::Null);
        assert_eq!(out["note"], Value::Null);
        assert!(!out.contains_key("flag"));
    }

    #[test]
    fn test_range_constraints() {
        let err = validate_arguments(&schema(), args(json!({ "a": 1, "count": 20 }))).unwrap_err();
        assert_eq!(err.parameter(), Some("count"));
        assert!(err.to_string().contains("<= 14"));

        let err = validate_arguments(&schema(), args(json!({ "a": 1, "count": -13 }))).unwrap_err();
        assert!(err.to_string().contains(">= -12"));
    }

    #[test]
    fn test_enum_constraint() {
        assert!(validate_arguments(&schema(), args(json!({ "a": 1, "mode": "fast" }))).is_ok());
        let err = validate_arguments(&schema(), args(json!({ "a": 1, "mode": "warp" }))).unwrap_err();
        assert_eq!(err.parameter(), Some("mode"));
        assert!(err.to_string().contains("fast, slow"));
    }

    #[test]
    fn test_undeclared_arguments_are_dropped() {
        let out = validate_arguments(&schema(), args(json!({ "a": 1, "extra": "x" }))).unwrap();
        assert!(!out.contains_key("extra"));
    }

    #[test]
    fn test_string_is_not_coerced_from_number() {
        let err = validate_arguments(&schema(), args(json!({ "a": 1, "mode": 3 }))).unwrap_err();
        assert_eq!(err.parameter(), Some("mode"));
    }
}
