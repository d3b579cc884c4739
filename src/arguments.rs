//! Tool-call arguments.
//!
//! Calls carry a flat object of scalars. Nested arrays and objects are
//! rejected up front so every downstream consumer (query strings, JSON
//! bodies, validation) deals with one small value type.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::InvokeError;
use crate::projection::{ParamKind, ParameterSchema};

/// A single scalar argument value. Serializes untagged, so an argument
/// map renders as the flat JSON object a request body needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl ArgumentValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgumentValue::Null => "null",
            ArgumentValue::Bool(_) => "boolean",
            ArgumentValue::Number(_) => "number",
            ArgumentValue::String(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Query-string rendering. `Null` yields `None` and is dropped from
    /// the pair list; strings are passed through unquoted.
    pub fn query_value(&self) -> Option<String> {
        match self {
            ArgumentValue::Null => None,
            ArgumentValue::Bool(b) => Some(b.to_string()),
            ArgumentValue::Number(n) => Some(n.to_string()),
            ArgumentValue::String(s) => Some(s.clone()),
        }
    }

    fn matches(&self, kind: ParamKind) -> bool {
        matches!(
            (self, kind),
            (ArgumentValue::Bool(_), ParamKind::Boolean)
                | (ArgumentValue::Number(_), ParamKind::Number)
                | (ArgumentValue::String(_), ParamKind::String)
        )
    }
}

/// Arguments of one tool call, keyed by parameter name.
pub type ArgumentMap = BTreeMap<String, ArgumentValue>;

/// Convert the raw arguments object of an incoming call. A missing object
/// is treated as empty; any nested array or object is an argument error.
pub fn from_request_object(raw: Option<Map<String, Value>>) -> Result<ArgumentMap, InvokeError> {
    let mut args = ArgumentMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let scalar = match value {
            Value::Null => ArgumentValue::Null,
            Value::Bool(b) => ArgumentValue::Bool(b),
            Value::Number(n) => ArgumentValue::Number(n),
            Value::String(s) => ArgumentValue::String(s),
            Value::Array(_) | Value::Object(_) => {
                return Err(InvokeError::Arguments(format!(
                    "argument \"{key}\" must be a string, number, boolean or null"
                )));
            }
        };
        args.insert(key, scalar);
    }
    Ok(args)
}

/// Check arguments against a tool's declared schema. Open schemas accept
/// anything; declared schemas require every mandatory parameter and match
/// kinds for the ones present. Arguments the schema does not mention are
/// ignored rather than rejected.
pub fn validate(args: &ArgumentMap, schema: &ParameterSchema) -> Result<(), InvokeError> {
    let ParameterSchema::Declared(specs) = schema else {
        return Ok(());
    };

    for spec in specs {
        match args.get(&spec.name) {
            None | Some(ArgumentValue::Null) => {
                if spec.required {
                    return Err(InvokeError::Arguments(format!(
                        "missing required argument \"{}\"",
                        spec.name
                    )));
                }
            }
            Some(value) => {
                if !value.matches(spec.kind) {
                    return Err(InvokeError::Arguments(format!(
                        "argument \"{}\" must be a {}, got {}",
                        spec.name,
                        spec.kind.as_str(),
                        value.kind_name()
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Render arguments as query pairs. Null-valued entries are omitted.
pub fn query_pairs(args: &ArgumentMap) -> Vec<(String, String)> {
    args.iter()
        .filter_map(|(name, value)| value.query_value().map(|v| (name.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ParamSpec;
    use serde_json::json;

    fn raw(value: Value) -> Option<Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_missing_arguments_object_is_empty() {
        let args = from_request_object(None).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_scalars_convert() {
        let args = from_request_object(raw(json!({
            "name": "Maria",
            "limit": 25,
            "active": true,
            "note": null,
        })))
        .unwrap();

        assert_eq!(args["name"], ArgumentValue::String("Maria".to_string()));
        assert_eq!(args["limit"], ArgumentValue::Number(25.into()));
        assert_eq!(args["active"], ArgumentValue::Bool(true));
        assert_eq!(args["note"], ArgumentValue::Null);
    }

    #[test]
    fn test_nested_values_rejected() {
        let err = from_request_object(raw(json!({"filters": {"city": "SP"}}))).unwrap_err();
        assert!(err.to_string().contains("\"filters\""));

        let err = from_request_object(raw(json!({"ids": [1, 2]}))).unwrap_err();
        assert!(err.to_string().contains("\"ids\""));
    }

    #[test]
    fn test_validate_open_schema_accepts_anything() {
        let args = from_request_object(raw(json!({"whatever": 1}))).unwrap();
        assert!(validate(&args, &ParameterSchema::Open).is_ok());
    }

    #[test]
    fn test_validate_missing_required() {
        let schema = ParameterSchema::Declared(vec![ParamSpec::required(
            "date",
            ParamKind::String,
            "Day to query",
        )]);

        let err = validate(&ArgumentMap::new(), &schema).unwrap_err();
        assert!(err.to_string().contains("missing required argument \"date\""));

        // An explicit null does not satisfy a required parameter.
        let args = from_request_object(raw(json!({"date": null}))).unwrap();
        assert!(validate(&args, &schema).is_err());
    }

    #[test]
    fn test_validate_kind_mismatch() {
        let schema = ParameterSchema::Declared(vec![ParamSpec::required(
            "date",
            ParamKind::String,
            "Day to query",
        )]);
        let args = from_request_object(raw(json!({"date": 20260825}))).unwrap();

        let err = validate(&args, &schema).unwrap_err();
        assert!(err.to_string().contains("must be a string, got number"));
    }

    #[test]
    fn test_validate_ignores_undeclared_arguments() {
        let schema = ParameterSchema::Declared(vec![ParamSpec::required(
            "date",
            ParamKind::String,
            "Day to query",
        )]);
        let args = from_request_object(raw(json!({"date": "2026-08-25", "extra": 7}))).unwrap();

        assert!(validate(&args, &schema).is_ok());
    }

    #[test]
    fn test_query_pairs_drop_null_and_keep_strings_unquoted() {
        let args = from_request_object(raw(json!({
            "cpf": null,
            "name": "Maria Silva",
            "page": 2,
        })))
        .unwrap();

        let pairs = query_pairs(&args);
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "Maria Silva".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_argument_map_serializes_as_bare_scalars() {
        let args = from_request_object(raw(json!({
            "active": false,
            "limit": 3,
            "note": null,
        })))
        .unwrap();

        let body = serde_json::to_value(&args).unwrap();
        assert_eq!(body, json!({"active": false, "limit": 3, "note": null}));
    }
}
