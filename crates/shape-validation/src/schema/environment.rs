use crate::error::EnvironmentError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::SchemaNode;

/// Named library of schema nodes that `Reference` nodes resolve against.
///
/// An environment is read-only while a validation runs, so a single instance
/// can be shared between threads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    schemas: IndexMap<String, SchemaNode>,
}

/// A `Reference` whose target is not defined in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Environment entry containing the reference
    pub owner: String,
    /// Missing target name
    pub target: String,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            schemas: IndexMap::new(),
        }
    }

    /// Parse an environment from a JSON object mapping names to nodes and
    /// check that every reference inside it resolves.
    pub fn from_json_str(input: &str) -> Result<Self, EnvironmentError> {
        let env: Environment = serde_json::from_str(input)?;
        env.check()?;
        Ok(env)
    }

    /// Register a schema under `name`, replacing any previous definition.
    pub fn register(&mut self, name: impl Into<String>, node: SchemaNode) {
        self.schemas.insert(name.into(), node);
    }

    pub fn resolve(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Every reference, in definition order, whose target is not registered.
    pub fn unresolved_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for (owner, node) in self.iter() {
            node.visit_references(&mut |target| {
                if !self.contains(target) {
                    dangling.push(DanglingReference {
                        owner: owner.to_string(),
                        target: target.to_string(),
                    });
                }
            });
        }
        dangling
    }

    pub fn check(&self) -> Result<(), EnvironmentError> {
        let dangling = self.unresolved_references();
        if dangling.is_empty() {
            Ok(())
        } else {
            Err(EnvironmentError::DanglingReferences(dangling))
        }
    }
}

impl<K: Into<String>> FromIterator<(K, SchemaNode)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, SchemaNode)>>(iter: I) -> Self {
        Self {
            schemas: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
