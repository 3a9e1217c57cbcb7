// Schema-driven validation of untyped values
//
// A schema is a tree of `SchemaNode`s; named fragments live in an
// `Environment` and are reached through `Reference` nodes, which makes
// recursive shapes possible. `validate` checks a `Value` against a node and
// returns either a sanitized copy holding only schema-declared data or every
// defect it found, each annotated with its path.
//
// Validation is synchronous and allocates its own output and error lists, so
// one environment can serve many threads at once. Value nesting depth is not
// bounded; see the notes in `validator`.

pub mod collector;
pub mod error;
pub mod options;
pub mod schema;
pub mod validator;
pub mod value;

pub use collector::{ErrorCollector, ValidationOutput};
pub use error::{
    EnvironmentError, Path, PathSegment, SubErrors, ValidationError, ValidationErrorKind,
    ValidationErrors,
};
pub use options::ValidationOptions;
pub use schema::{DanglingReference, Environment, NodeKind, Props, SchemaNode};
pub use validator::{ValidationContext, validate, validate_named};
pub use value::{Map, Value};
