use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Field-less discriminant of [`super::SchemaNode`].
///
/// Used to select which kinds accept JSON-encoded strings and to prefix
/// error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Unit,
    Bool,
    #[serde(alias = "num")]
    Number,
    Text,
    Object,
    Choice,
    #[serde(rename = "ref")]
    Reference,
    List,
    Dict,
    Union,
}

impl NodeKind {
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Unit,
        NodeKind::Bool,
        NodeKind::Number,
        NodeKind::Text,
        NodeKind::Object,
        NodeKind::Choice,
        NodeKind::Reference,
        NodeKind::List,
        NodeKind::Dict,
        NodeKind::Union,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Unit => "unit",
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::Text => "text",
            NodeKind::Object => "object",
            NodeKind::Choice => "choice",
            NodeKind::Reference => "ref",
            NodeKind::List => "list",
            NodeKind::Dict => "dict",
            NodeKind::Union => "union",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown schema node kind '{0}'")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "num" {
            return Ok(NodeKind::Number);
        }
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}
