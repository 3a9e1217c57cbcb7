// Error types for shape validation

use crate::schema::{DanglingReference, SchemaNode};
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while loading an environment
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The environment document is not valid JSON or not a valid schema
    #[error("invalid environment JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Some `ref` nodes name schemas the environment does not define
    #[error("environment has unresolved references: {}", format_dangling(.0))]
    DanglingReferences(Vec<DanglingReference>),
}

fn format_dangling(dangling: &[DanglingReference]) -> String {
    dangling
        .iter()
        .map(|d| format!("{} -> {}", d.owner, d.target))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// Wrong primitive or structural kind
    TypeMismatch { expected: String, got: String },

    /// `null` given to `unit` while `strictUnit` is on
    StrictUnit,

    /// NaN or an infinity given to `number`
    NonFinite,

    /// Fractional value given to an integral `number`
    NotInteger { value: f64 },

    /// Declared property absent while `strictMissing` is on
    MissingProperty { property: String },

    /// Property present in the value but not declared in the schema
    ExtraProperty { property: String },

    /// Choice value is not an object carrying a string discriminant
    MissingDiscriminant { type_key: String },

    /// Choice discriminant names no declared option
    UnknownDiscriminant {
        type_key: String,
        tag: String,
        allowed: Vec<String>,
    },

    /// A reference was revisited without crossing a structural node
    ReferenceCycle { chain: Vec<String> },

    /// A reference names a schema missing from the environment
    UnresolvedReference { name: String },

    /// Neither branch of a union matched; see `sub_errors`
    UnionExhausted,

    /// A string could not be decoded as JSON before validation
    JsonString { message: String },
}

impl ValidationErrorKind {
    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            ValidationErrorKind::TypeMismatch { expected, got } => {
                format!("expected {}, got {}", expected, got)
            }
            ValidationErrorKind::StrictUnit => {
                "under strictUnit validation, null does not match the unit type".to_string()
            }
            ValidationErrorKind::NonFinite => "value is not a finite number".to_string(),
            ValidationErrorKind::NotInteger { value } => {
                format!("value {} is not an integer", value)
            }
            ValidationErrorKind::MissingProperty { property } => format!(
                "property {:?} is not present in the value and strict missing-checks are on",
                property
            ),
            ValidationErrorKind::ExtraProperty { property } => {
                format!("extra key {:?} seen here but not in the schema", property)
            }
            ValidationErrorKind::MissingDiscriminant { type_key } => {
                format!("value is not an object with a string property {:?}", type_key)
            }
            ValidationErrorKind::UnknownDiscriminant {
                type_key,
                tag,
                allowed,
            } => format!(
                "value specifies {} as {:?} but that is not one of the allowed types: {}",
                type_key,
                tag,
                allowed.join(", ")
            ),
            ValidationErrorKind::ReferenceCycle { chain } => format!(
                "value witnesses a reference cycle in the given schema: {}",
                chain.join(" -> ")
            ),
            ValidationErrorKind::UnresolvedReference { name } => {
                format!("no schema named {:?} in the environment", name)
            }
            ValidationErrorKind::UnionExhausted => {
                "could not match this against either the first or second type in the union"
                    .to_string()
            }
            ValidationErrorKind::JsonString { message } => {
                format!("could not JSON parse value: {}", message)
            }
        }
    }
}

/// Errors from each branch of a failed union
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubErrors {
    pub first: Vec<ValidationError>,
    pub second: Vec<ValidationError>,
}

/// A single defect found in the validated value
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Property names and element indices from the root to the defect
    pub path: Path,
    /// Message prefixed by the kind of the node that failed, e.g. `"number: ..."`
    pub message: String,
    /// The offending value
    pub value: Value,
    /// The node the value was checked against
    #[serde(rename = "schemaNode")]
    pub node: SchemaNode,
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Present only on `UnionExhausted`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_errors: Option<SubErrors>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error at {}: {}", self.path, self.message)
    }
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, node: &SchemaNode, path: &Path, value: &Value) -> Self {
        Self {
            message: format!("{}: {}", node.kind(), kind.message()),
            path: path.clone(),
            value: value.clone(),
            node: node.clone(),
            kind,
            sub_errors: None,
        }
    }

    pub fn with_sub_errors(mut self, sub_errors: SubErrors) -> Self {
        self.sub_errors = Some(sub_errors);
        self
    }
}

/// Every error collected by one validation pass. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn from_vec(errors: Vec<ValidationError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self(errors)
    }

    pub fn single(error: ValidationError) -> Self {
        Self(vec![error])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

impl std::ops::Deref for ValidationErrors {
    type Target = [ValidationError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [only] => write!(f, "{}", only),
            errors => {
                write!(f, "{} validation errors", errors.len())?;
                for error in errors {
                    write!(f, "\n  {}", error)?;
                }
                Ok(())
            }
        }
    }
}

/// Location of a value relative to the validation root (e.g., `["cells", 0, "first"]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Create a new empty path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            for (i, segment) in self.segments.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{}", segment)?;
            }
            Ok(())
        }
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A segment in a path; serializes as a bare string or integer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object or dict key
    Key(String),
    /// List index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_display() {
        let mut path = Path::new();
        assert_eq!(path.to_string(), "(root)");

        path.push("cells".into());
        assert_eq!(path.to_string(), "cells");

        path.push(PathSegment::Index(0));
        path.push("first".into());
        assert_eq!(path.to_string(), "cells.[0].first");

        assert_eq!(path.pop(), Some(PathSegment::Key("first".to_string())));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_path_serializes_as_mixed_array() {
        let path: Path = [PathSegment::from("a"), PathSegment::from(2usize), PathSegment::from("b")]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_value(&path).unwrap(), json!(["a", 2, "b"]));
    }

    #[test]
    fn test_message_is_prefixed_with_node_kind() {
        let error = ValidationError::new(
            ValidationErrorKind::TypeMismatch {
                expected: "a string".to_string(),
                got: "number".to_string(),
            },
            &SchemaNode::Text,
            &["name"].into_iter().collect(),
            &Value::Number(4.0),
        );
        assert_eq!(error.message, "text: expected a string, got number");
        assert_eq!(
            error.to_string(),
            "Validation error at name: text: expected a string, got number"
        );
    }

    #[test]
    fn test_kind_serialization_is_tagged() {
        let kind = ValidationErrorKind::ExtraProperty {
            property: "c".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&kind).unwrap(),
            json!({"type": "ExtraProperty", "data": {"property": "c"}})
        );
        assert_eq!(
            serde_json::to_value(ValidationErrorKind::UnionExhausted).unwrap(),
            json!({"type": "UnionExhausted"})
        );
    }

    #[test]
    fn test_error_serialization_omits_absent_sub_errors() {
        let error = ValidationError::new(
            ValidationErrorKind::StrictUnit,
            &SchemaNode::Unit,
            &Path::new(),
            &Value::Null,
        );
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["path"], json!([]));
        assert_eq!(json["schemaNode"], json!({"type": "unit"}));
        assert_eq!(json["value"], json!(null));
        assert!(json.get("subErrors").is_none());
    }

    #[test]
    fn test_errors_display() {
        let one = ValidationError::new(
            ValidationErrorKind::NonFinite,
            &SchemaNode::number(),
            &Path::new(),
            &Value::Number(f64::NAN),
        );
        let two = ValidationError::new(
            ValidationErrorKind::ExtraProperty {
                property: "c".to_string(),
            },
            &SchemaNode::object([("a", SchemaNode::Text)]),
            &Path::new(),
            &Value::Absent,
        );
        assert_eq!(
            ValidationErrors::single(one.clone()).to_string(),
            "Validation error at (root): number: value is not a finite number"
        );
        assert_eq!(
            ValidationErrors::from_vec(vec![one, two]).to_string(),
            "2 validation errors\n  Validation error at (root): number: value is not a finite number\n  Validation error at (root): object: extra key \"c\" seen here but not in the schema"
        );
    }
}
