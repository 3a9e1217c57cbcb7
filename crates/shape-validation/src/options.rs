//! Validation strictness options.

use crate::schema::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Options consumed by [`crate::validate`].
///
/// All options default to off. The struct deserializes from the camelCase
/// option names, so it can be loaded from a TOML or JSON file:
///
/// ```toml
/// strictMissing = true
/// jsonStrings = ["number", "bool"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidationOptions {
    /// A declared property missing from the value is an error, instead of
    /// being validated as the absence sentinel.
    pub strict_missing: bool,

    /// Do not report keys present in the value but absent from the schema.
    /// They are still dropped from the sanitized output.
    pub skip_prop_check: bool,

    /// `null` no longer satisfies `unit`; only the absence sentinel does.
    pub strict_unit: bool,

    /// Node kinds that JSON-decode a string input before checking it.
    ///
    /// Mostly useful for query-string style inputs, where numbers and
    /// booleans can only arrive as text.
    pub json_strings: BTreeSet<NodeKind>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_missing(mut self, on: bool) -> Self {
        self.strict_missing = on;
        self
    }

    pub fn skip_prop_check(mut self, on: bool) -> Self {
        self.skip_prop_check = on;
        self
    }

    pub fn strict_unit(mut self, on: bool) -> Self {
        self.strict_unit = on;
        self
    }

    pub fn json_string(mut self, kind: NodeKind) -> Self {
        self.json_strings.insert(kind);
        self
    }

    pub(crate) fn decodes_strings_for(&self, kind: NodeKind) -> bool {
        self.json_strings.contains(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_lenient() {
        let options = ValidationOptions::default();
        assert!(!options.strict_missing);
        assert!(!options.skip_prop_check);
        assert!(!options.strict_unit);
        assert!(options.json_strings.is_empty());
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let options: ValidationOptions =
            serde_json::from_str(r#"{"strictUnit": true, "jsonStrings": ["num", "bool"]}"#)
                .unwrap();
        assert_eq!(
            options,
            ValidationOptions::new()
                .strict_unit(true)
                .json_string(NodeKind::Number)
                .json_string(NodeKind::Bool)
        );
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let result = serde_json::from_str::<ValidationOptions>(r#"{"strictMising": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decodes_strings_for() {
        let options = ValidationOptions::new().json_string(NodeKind::List);
        assert!(options.decodes_strings_for(NodeKind::List));
        assert!(!options.decodes_strings_for(NodeKind::Dict));
    }
}
