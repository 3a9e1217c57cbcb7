//! Schema model
//!
//! A schema is a tree of [`SchemaNode`]s. Recursive shapes are not expressed as
//! pointer cycles; instead a [`SchemaNode::Reference`] names an entry in an
//! [`Environment`], which is looked up when validation reaches it.
//!
//! The serialized form is an object tagged on `"type"`:
//!
//! ```json
//! {
//!   "type": "union",
//!   "first": {"type": "unit"},
//!   "second": {
//!     "type": "object",
//!     "properties": {"first": {"type": "ref", "to": "item"}, "rest": {"type": "ref", "to": "cell"}}
//!   }
//! }
//! ```

mod environment;
mod kind;

pub use environment::{DanglingReference, Environment};
pub use kind::{NodeKind, UnknownNodeKind};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named sub-schemas of an object or of one choice option.
pub type Props = IndexMap<String, SchemaNode>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNode {
    /// Matches the absence sentinel (and `null`, unless `strictUnit` is set)
    Unit,
    Bool,
    /// Matches a finite number, optionally restricted to integral values
    #[serde(alias = "num")]
    Number {
        #[serde(default)]
        integer: bool,
    },
    Text,
    /// Fixed-shape record
    Object { properties: Props },
    /// Record discriminated by the string field `type_key`
    Choice {
        #[serde(rename = "typeKey")]
        type_key: String,
        options: IndexMap<String, Props>,
    },
    /// Named pointer into the environment, resolved lazily
    #[serde(rename = "ref")]
    Reference { to: String },
    List { elements: Box<SchemaNode> },
    Dict { elements: Box<SchemaNode> },
    /// Untagged alternative; `first` is always tried before `second`
    Union {
        first: Box<SchemaNode>,
        second: Box<SchemaNode>,
    },
}

impl SchemaNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            SchemaNode::Unit => NodeKind::Unit,
            SchemaNode::Bool => NodeKind::Bool,
            SchemaNode::Number { .. } => NodeKind::Number,
            SchemaNode::Text => NodeKind::Text,
            SchemaNode::Object { .. } => NodeKind::Object,
            SchemaNode::Choice { .. } => NodeKind::Choice,
            SchemaNode::Reference { .. } => NodeKind::Reference,
            SchemaNode::List { .. } => NodeKind::List,
            SchemaNode::Dict { .. } => NodeKind::Dict,
            SchemaNode::Union { .. } => NodeKind::Union,
        }
    }

    pub fn number() -> Self {
        SchemaNode::Number { integer: false }
    }

    pub fn integer() -> Self {
        SchemaNode::Number { integer: true }
    }

    pub fn reference(to: impl Into<String>) -> Self {
        SchemaNode::Reference { to: to.into() }
    }

    pub fn list(elements: SchemaNode) -> Self {
        SchemaNode::List {
            elements: Box::new(elements),
        }
    }

    pub fn dict(elements: SchemaNode) -> Self {
        SchemaNode::Dict {
            elements: Box::new(elements),
        }
    }

    pub fn union(first: SchemaNode, second: SchemaNode) -> Self {
        SchemaNode::Union {
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// `Unit | wraps`
    pub fn maybe(wraps: SchemaNode) -> Self {
        SchemaNode::union(SchemaNode::Unit, wraps)
    }

    pub fn object<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaNode)>,
    {
        SchemaNode::Object {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn choice<K, I>(type_key: impl Into<String>, options: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Props)>,
    {
        SchemaNode::Choice {
            type_key: type_key.into(),
            options: options.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Call `f` with the target of every `Reference` reachable inside this node
    /// without going through the environment.
    pub fn visit_references<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            SchemaNode::Unit | SchemaNode::Bool | SchemaNode::Number { .. } | SchemaNode::Text => {}
            SchemaNode::Object { properties } => {
                properties.values().for_each(|p| p.visit_references(f))
            }
            SchemaNode::Choice { options, .. } => options
                .values()
                .flat_map(|props| props.values())
                .for_each(|p| p.visit_references(f)),
            SchemaNode::Reference { to } => f(to),
            SchemaNode::List { elements } | SchemaNode::Dict { elements } => {
                elements.visit_references(f)
            }
            SchemaNode::Union { first, second } => {
                first.visit_references(f);
                second.visit_references(f);
            }
        }
    }
}
