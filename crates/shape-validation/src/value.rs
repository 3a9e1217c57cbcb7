//! Untyped values checked by the validator.
//!
//! `Value` is deliberately richer than `serde_json::Value`: it distinguishes the
//! absence of a value (`Absent`) from an explicit `Null`, and stores numbers as
//! `f64` so that non-finite inputs can reach the validator and be rejected there.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Keyed structure used for objects, choices and dicts.
pub type Map = IndexMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// The absence sentinel: a missing property or an unset value.
    #[default]
    Absent,
    /// The explicit null sentinel.
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Parse a JSON document into a `Value`.
    pub fn from_json_str(input: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(input).map(Value::from)
    }

    /// Diagnostic name of this value's kind, used in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "object",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`.
    ///
    /// `Absent` object members are dropped; any other `Absent` and any
    /// non-finite number become `null`, since JSON cannot represent them.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Absent | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => match as_whole(*n) {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
            },
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_absent())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().collect())
    }
}

/// Integral numbers in the exactly representable range, written without a
/// fractional part
fn as_whole(n: f64) -> Option<i64> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    (n.fract() == 0.0 && n.abs() <= MAX_EXACT).then_some(n as i64)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Absent | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match as_whole(*n) {
                Some(i) => serializer.serialize_i64(i),
                None if n.is_finite() => serializer.serialize_f64(*n),
                None => serializer.serialize_unit(),
            },
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let present = map.values().filter(|v| !v.is_absent()).count();
                let mut out = serializer.serialize_map(Some(present))?;
                for (key, value) in map.iter().filter(|(_, v)| !v.is_absent()) {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "<absent>"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_member_order() {
        let value = Value::from_json_str(r#"{"b": 1, "a": [true, null], "c": "x"}"#).unwrap();
        let map = value.as_map().unwrap();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(map["a"], Value::List(vec![Value::Bool(true), Value::Null]));
    }

    #[test]
    fn test_integers_become_floats() {
        assert_eq!(Value::from(json!(3)), Value::Number(3.0));
        assert_eq!(Value::from(json!(-2.5)), Value::Number(-2.5));
    }

    #[test]
    fn test_absent_members_are_dropped_on_output() {
        let value: Value = [
            ("kept".to_string(), Value::from("yes")),
            ("gone".to_string(), Value::Absent),
        ]
        .into_iter()
        .collect();
        assert_eq!(value.to_json(), json!({"kept": "yes"}));
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"kept": "yes"}));
    }

    #[test]
    fn test_whole_numbers_serialize_as_integers() {
        assert_eq!(Value::Number(3.0).to_json(), json!(3));
        assert_eq!(Value::Number(-0.5).to_json(), json!(-0.5));
        assert_eq!(
            serde_json::to_string(&Value::List(vec![Value::Number(2.0), Value::Number(1.5)]))
                .unwrap(),
            "[2,1.5]"
        );
    }

    #[test]
    fn test_non_finite_serializes_as_null() {
        assert_eq!(Value::Number(f64::NAN).to_json(), json!(null));
        assert_eq!(
            serde_json::to_string(&Value::List(vec![Value::Number(f64::INFINITY), Value::Absent]))
                .unwrap(),
            "[null,null]"
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Absent.type_name(), "absent");
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1.5).type_name(), "number");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Map(Map::new()).type_name(), "object");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Absent.to_string(), "<absent>");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
    }
}
