//! Structural validation of decoded upstream JSON
//!
//! Every response body is checked against a [`Shape`] before it is turned
//! into a typed DTO. The walker does not stop at the first problem: it
//! collects every `(path, expected)` pair so a schema drift can be diagnosed
//! from a single log line.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

const ROOT: &str = "$input";

/// Expected structure of a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Accepts anything, including null
    Any,
    Null,
    Bool,
    Number,
    /// A number without a fractional part
    Integer,
    String,
    /// One of a fixed set of strings
    OneOf(Vec<&'static str>),
    Array(Box<Shape>),
    Object {
        name: &'static str,
        fields: Vec<Field>,
    },
    /// Object with arbitrary keys and uniform values
    Map(Box<Shape>),
    /// The inner shape or null
    Nullable(Box<Shape>),
}

/// A named member of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    /// Optional fields may be missing, but not null unless nullable
    pub required: bool,
}

impl Field {
    pub fn req(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: true,
        }
    }

    pub fn opt(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
        }
    }
}

impl Shape {
    pub fn object(name: &'static str, fields: Vec<Field>) -> Self {
        Self::Object { name, fields }
    }

    pub fn array(item: Self) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn one_of(values: &[&'static str]) -> Self {
        Self::OneOf(values.to_vec())
    }

    /// Human-readable type description used in mismatch reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Any => "any".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool => "boolean".to_string(),
            Self::Number => "number".to_string(),
            Self::Integer => "integer".to_string(),
            Self::String => "string".to_string(),
            Self::OneOf(values) => {
                let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
                format!("({})", quoted.join(" | "))
            }
            Self::Array(item) => format!("Array<{}>", item.describe()),
            Self::Object { name, .. } => (*name).to_string(),
            Self::Map(value) => format!("Record<string, {}>", value.describe()),
            Self::Nullable(inner) => format!("({} | null)", inner.describe()),
        }
    }

    /// Collect every mismatch between `value` and this shape.
    pub fn check(&self, value: &Value) -> Vec<Mismatch> {
        let mut mismatches = Vec::new();
        self.walk(value, ROOT, &mut mismatches);
        mismatches
    }

    fn walk(&self, value: &Value, path: &str, out: &mut Vec<Mismatch>) {
        let matches = match (self, value) {
            (Self::Any, _)
            | (Self::Null, Value::Null)
            | (Self::Bool, Value::Bool(_))
            | (Self::Number, Value::Number(_))
            | (Self::String, Value::String(_)) => true,
            (Self::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            (Self::OneOf(values), Value::String(s)) => values.contains(&s.as_str()),
            (Self::Nullable(_), Value::Null) => true,
            (Self::Nullable(inner), _) => {
                if inner.accepts_kind(value) {
                    inner.walk(value, path, out);
                    return;
                }
                false
            }
            (Self::Array(item), Value::Array(items)) => {
                for (i, element) in items.iter().enumerate() {
                    item.walk(element, &format!("{path}[{i}]"), out);
                }
                return;
            }
            (Self::Object { fields, .. }, Value::Object(map)) => {
                for field in fields {
                    let field_path = join_path(path, field.name);
                    match map.get(field.name) {
                        Some(member) => field.shape.walk(member, &field_path, out),
                        None if field.required => {
                            out.push(Mismatch::new(field_path, field.shape.describe()));
                        }
                        None => {}
                    }
                }
                return;
            }
            (Self::Map(inner), Value::Object(map)) => {
                for (key, member) in map {
                    inner.walk(member, &join_path(path, key), out);
                }
                return;
            }
            _ => false,
        };

        if !matches {
            out.push(Mismatch::new(path, self.describe()));
        }
    }

    /// Whether the top-level JSON kind fits, ignoring nested content.
    fn accepts_kind(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Array(_), Value::Array(_))
            | (Self::Object { .. } | Self::Map(_), Value::Object(_)) => true,
            (Self::Array(_) | Self::Object { .. } | Self::Map(_), _) => false,
            _ => {
                let mut scratch = Vec::new();
                self.walk(value, ROOT, &mut scratch);
                scratch.is_empty()
            }
        }
    }
}

fn join_path(parent: &str, key: &str) -> String {
    let is_identifier = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        format!("{parent}.{key}")
    } else {
        format!("{parent}[{}]", Value::String(key.to_string()))
    }
}

/// One point of disagreement between a payload and its expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub path: String,
    pub expected: String,
}

impl Mismatch {
    pub fn new(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expected: {} on {}", self.expected, self.path)
    }
}

/// A 2xx body that does not match the endpoint's DTO.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.mismatches))]
pub struct ValidationError {
    /// Route the payload came from
    pub endpoint: String,
    pub mismatches: Vec<Mismatch>,
}

fn render(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl ValidationError {
    pub fn new(endpoint: impl Into<String>, mismatches: Vec<Mismatch>) -> Self {
        Self {
            endpoint: endpoint.into(),
            mismatches,
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.mismatches.iter().map(|m| m.path.as_str())
    }
}

/// Outcome of validating a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation<T> {
    Valid(T),
    Invalid(Vec<Mismatch>),
}

impl<T> Validation<T> {
    /// Attach the route so a rejection can be reported on its own.
    pub fn into_result(self, endpoint: &str) -> Result<T, ValidationError> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(mismatches) => Err(ValidationError::new(endpoint, mismatches)),
        }
    }
}

/// A typed upstream payload with a known JSON shape.
pub trait Dto: DeserializeOwned + Serialize + Send + Sync + 'static {
    fn shape() -> Shape;
}

impl<T: Dto> Dto for Vec<T> {
    fn shape() -> Shape {
        Shape::array(T::shape())
    }
}

/// Check `value` against `T`'s shape and convert it.
pub fn validate<T: Dto>(value: Value) -> Validation<T> {
    let shape = T::shape();
    let mismatches = shape.check(&value);
    if !mismatches.is_empty() {
        return Validation::Invalid(mismatches);
    }

    match serde_json::from_value(value) {
        Ok(typed) => Validation::Valid(typed),
        Err(e) => Validation::Invalid(vec![Mismatch::new(
            ROOT,
            format!("{} ({e})", shape.describe()),
        )]),
    }
}
