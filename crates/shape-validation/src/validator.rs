// Recursive-descent validation engine
//
// Recursion depth follows the nesting depth of the *value*: every nested
// object, list or dict costs a few stack frames, and no cap is imposed. A
// sufficiently deep input exhausts the stack and aborts the process; callers
// that accept untrusted input should bound its depth before validating.
// As a rough figure, an unoptimized build spends about 1 KiB of stack per
// nesting level through a `maybe(list(ref t))` schema, so around 2000 levels
// overflow a default 2 MiB thread. Budgeting a few hundred levels per MiB
// leaves headroom for wider node chains.
// Schema self-reference, on the other hand, is bounded by the reference-cycle
// guard described on `ValidationContext::validate_one`.

use crate::collector::{ErrorCollector, ValidationOutput};
use crate::error::{Path, PathSegment, SubErrors, ValidationError, ValidationErrorKind, ValidationErrors};
use crate::options::ValidationOptions;
use crate::schema::{Environment, Props, SchemaNode};
use crate::value::{Map, Value};
use tracing::{debug, trace};

static ABSENT: Value = Value::Absent;

/// Validates `root` against `spec`, returning a sanitized copy of the value or
/// every defect found.
pub fn validate(
    root: &Value,
    spec: &SchemaNode,
    env: &Environment,
    options: &ValidationOptions,
) -> ValidationOutput<Value> {
    debug!(kind = %spec.kind(), "validating value");
    let mut context = ValidationContext::new(env, options);
    let result = context.validate_one(root, spec, &[]);
    match &result {
        Ok(_) => debug!("validation succeeded"),
        Err(errors) => debug!(errors = errors.len(), "validation failed"),
    }
    result
}

/// Validates `root` against the environment entry called `name`.
///
/// The name is entered through a reference, so it takes part in cycle
/// detection and an unknown name is reported as an unresolved reference.
pub fn validate_named(
    root: &Value,
    name: &str,
    env: &Environment,
    options: &ValidationOptions,
) -> ValidationOutput<Value> {
    validate(root, &SchemaNode::reference(name), env, options)
}

/// Validation context tracks state during validation
pub struct ValidationContext<'a> {
    /// Environment used to resolve references
    env: &'a Environment,
    options: &'a ValidationOptions,
    /// Current path (e.g., ["rest", "rest", "first"])
    path: Path,
}

impl<'a> ValidationContext<'a> {
    /// Create a new validation context
    pub fn new(env: &'a Environment, options: &'a ValidationOptions) -> Self {
        Self {
            env,
            options,
            path: Path::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute a function with a new path segment
    fn with_path<F, R>(&mut self, segment: PathSegment, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    fn error(&self, kind: ValidationErrorKind, node: &SchemaNode, value: &Value) -> ValidationError {
        ValidationError::new(kind, node, &self.path, value)
    }

    fn fail(&self, kind: ValidationErrorKind, node: &SchemaNode, value: &Value) -> ValidationErrors {
        ValidationErrors::single(self.error(kind, node, value))
    }

    fn mismatch(&self, expected: &str, node: &SchemaNode, value: &Value) -> ValidationErrors {
        self.fail(
            ValidationErrorKind::TypeMismatch {
                expected: expected.to_string(),
                got: value.type_name().to_string(),
            },
            node,
            value,
        )
    }

    /// Validate one value against one node.
    ///
    /// `ref_cycle` holds the reference names entered since the last
    /// structural node (object, choice, list or dict). Entering a name that
    /// is already on it means the schema can recurse without consuming any
    /// input, which is reported as a cycle instead of looping.
    pub fn validate_one(
        &mut self,
        value: &Value,
        node: &'a SchemaNode,
        ref_cycle: &[&'a str],
    ) -> ValidationOutput<Value> {
        if self.options.decodes_strings_for(node.kind())
            && let Value::Text(text) = value
        {
            let decoded = match Value::from_json_str(text) {
                Ok(decoded) => decoded,
                Err(e) => {
                    return Err(self.fail(
                        ValidationErrorKind::JsonString {
                            message: e.to_string(),
                        },
                        node,
                        value,
                    ));
                }
            };
            return self.dispatch(&decoded, node, ref_cycle);
        }
        self.dispatch(value, node, ref_cycle)
    }

    /// Main validation dispatcher
    fn dispatch(
        &mut self,
        value: &Value,
        node: &'a SchemaNode,
        ref_cycle: &[&'a str],
    ) -> ValidationOutput<Value> {
        match node {
            SchemaNode::Unit => self.validate_unit(value, node),
            SchemaNode::Bool => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                _ => Err(self.mismatch("a boolean", node, value)),
            },
            SchemaNode::Text => match value {
                Value::Text(s) => Ok(Value::Text(s.clone())),
                _ => Err(self.mismatch("a string", node, value)),
            },
            SchemaNode::Number { integer } => self.validate_number(value, *integer, node),
            SchemaNode::Object { properties } => self
                .validate_props(value, properties, node, None)
                .map(Value::Map),
            SchemaNode::Choice { type_key, options } => {
                let Some(tag) = value
                    .as_map()
                    .and_then(|map| map.get(type_key))
                    .and_then(Value::as_str)
                else {
                    return Err(self.fail(
                        ValidationErrorKind::MissingDiscriminant {
                            type_key: type_key.clone(),
                        },
                        node,
                        value,
                    ));
                };
                let Some(props) = options.get(tag) else {
                    return Err(self.fail(
                        ValidationErrorKind::UnknownDiscriminant {
                            type_key: type_key.clone(),
                            tag: tag.to_string(),
                            allowed: options.keys().cloned().collect(),
                        },
                        node,
                        value,
                    ));
                };
                let mut out = self.validate_props(value, props, node, Some(type_key.as_str()))?;
                // validate_props drops the discriminant; put it back
                out.insert(type_key.clone(), Value::Text(tag.to_string()));
                Ok(Value::Map(out))
            }
            SchemaNode::Reference { to } => {
                if ref_cycle.contains(&to.as_str()) {
                    let mut chain: Vec<String> = ref_cycle.iter().map(|s| s.to_string()).collect();
                    chain.push(to.clone());
                    return Err(self.fail(ValidationErrorKind::ReferenceCycle { chain }, node, value));
                }
                let Some(target) = self.env.resolve(to) else {
                    return Err(self.fail(
                        ValidationErrorKind::UnresolvedReference { name: to.clone() },
                        node,
                        value,
                    ));
                };
                trace!(reference = %to, depth = ref_cycle.len(), "resolving reference");
                let mut cycle = ref_cycle.to_vec();
                cycle.push(to.as_str());
                self.validate_one(value, target, &cycle)
            }
            SchemaNode::List { elements } => {
                let Some(items) = value.as_list() else {
                    return Err(self.mismatch("a list", node, value));
                };
                self.validate_many(items.iter().enumerate(), elements, Vec::with_capacity(items.len()))
                    .map(Value::List)
            }
            SchemaNode::Dict { elements } => {
                let Some(map) = value.as_map() else {
                    return Err(self.mismatch("an object", node, value));
                };
                self.validate_many(
                    map.iter().map(|(k, v)| (k.clone(), v)),
                    elements,
                    Map::with_capacity(map.len()),
                )
                .map(Value::Map)
            }
            SchemaNode::Union { first, second } => {
                let first_errors = match self.validate_one(value, first, ref_cycle) {
                    Ok(sanitized) => return Ok(sanitized),
                    Err(errors) => errors,
                };
                trace!(path = %self.path, "first union branch failed, trying second");
                let second_errors = match self.validate_one(value, second, ref_cycle) {
                    Ok(sanitized) => return Ok(sanitized),
                    Err(errors) => errors,
                };
                let error = self
                    .error(ValidationErrorKind::UnionExhausted, node, value)
                    .with_sub_errors(SubErrors {
                        first: first_errors.into_vec(),
                        second: second_errors.into_vec(),
                    });
                Err(ValidationErrors::single(error))
            }
        }
    }

    fn validate_unit(&self, value: &Value, node: &SchemaNode) -> ValidationOutput<Value> {
        match value {
            Value::Absent => Ok(Value::Absent),
            Value::Null if self.options.strict_unit => {
                Err(self.fail(ValidationErrorKind::StrictUnit, node, value))
            }
            Value::Null => Ok(Value::Absent),
            _ => {
                let expected = if self.options.strict_unit {
                    "no value"
                } else {
                    "no value or null"
                };
                Err(self.mismatch(expected, node, value))
            }
        }
    }

    fn validate_number(&self, value: &Value, integer: bool, node: &SchemaNode) -> ValidationOutput<Value> {
        let Value::Number(n) = value else {
            return Err(self.mismatch("a number", node, value));
        };
        if !n.is_finite() {
            return Err(self.fail(ValidationErrorKind::NonFinite, node, value));
        }
        if integer && n.fract() != 0.0 {
            return Err(self.fail(ValidationErrorKind::NotInteger { value: *n }, node, value));
        }
        Ok(Value::Number(*n))
    }

    /// Validate the declared properties of an object or of one choice option.
    ///
    /// Every property is checked even after a failure. The output holds only
    /// declared keys; `discriminant` is exempt from the extra-key check.
    fn validate_props(
        &mut self,
        value: &Value,
        props: &'a Props,
        owner: &'a SchemaNode,
        discriminant: Option<&str>,
    ) -> ValidationOutput<Map> {
        let Some(map) = value.as_map() else {
            return Err(self.mismatch("an object", owner, value));
        };

        let mut collector = ErrorCollector::new();
        let mut out = Map::with_capacity(props.len());
        for (name, prop) in props {
            let present = map.get(name);
            if present.is_none() && self.options.strict_missing {
                collector.push(self.error(
                    ValidationErrorKind::MissingProperty {
                        property: name.clone(),
                    },
                    owner,
                    value,
                ));
                continue;
            }
            let item = present.unwrap_or(&ABSENT);
            let result = self.with_path(PathSegment::Key(name.clone()), |ctx| {
                ctx.validate_one(item, prop, &[])
            });
            if let Some(sanitized) = collector.absorb(result) {
                out.insert(name.clone(), sanitized);
            }
        }

        if !self.options.skip_prop_check {
            for key in map.keys() {
                if Some(key.as_str()) != discriminant && !props.contains_key(key) {
                    collector.push(self.error(
                        ValidationErrorKind::ExtraProperty {
                            property: key.clone(),
                        },
                        owner,
                        value,
                    ));
                }
            }
        }

        collector.finish(out)
    }

    /// Validate every element of a list or dict against `elements`,
    /// collecting all failures.
    fn validate_many<'v, A: Accumulator>(
        &mut self,
        entries: impl IntoIterator<Item = (A::Key, &'v Value)>,
        elements: &'a SchemaNode,
        mut acc: A,
    ) -> ValidationOutput<A> {
        let mut collector = ErrorCollector::new();
        for (key, item) in entries {
            let result = self.with_path(A::segment(&key), |ctx| {
                ctx.validate_one(item, elements, &[])
            });
            if let Some(sanitized) = collector.absorb(result) {
                acc.accept(key, sanitized);
            }
        }
        collector.finish(acc)
    }
}

/// Output collection built by `validate_many`.
trait Accumulator {
    type Key;

    fn segment(key: &Self::Key) -> PathSegment;

    fn accept(&mut self, key: Self::Key, value: Value);
}

impl Accumulator for Vec<Value> {
    type Key = usize;

    fn segment(key: &usize) -> PathSegment {
        PathSegment::Index(*key)
    }

    fn accept(&mut self, _key: usize, value: Value) {
        self.push(value);
    }
}

impl Accumulator for Map {
    type Key = String;

    fn segment(key: &String) -> PathSegment {
        PathSegment::Key(key.clone())
    }

    fn accept(&mut self, key: String, value: Value) {
        self.insert(key, value);
    }
}
