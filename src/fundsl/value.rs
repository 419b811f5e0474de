//! Runtime values, the evaluation context and keyword arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::CallError;

/// Attribute and field access on a value.
///
/// `get_attr` backs `a.b` chains, where a missing attribute is an error at
/// the evaluator. `get_field` backs `a["b"]` chains, where a missing key
/// evaluates to [`Value::Null`].
pub trait Accessible: fmt::Debug {
    fn get_attr(&self, name: &str) -> Option<Value>;
    fn get_field(&self, key: &Value) -> Option<Value>;
}

/// A fun-dsl value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value: lenient lookups that miss, JSON `null`.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Map),
    /// Opaque host value.
    Object(Rc<dyn Accessible>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "dict",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of ints and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Items of a list or a tuple.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// JSON form for embedding in scripts. Tuples become arrays, map keys
    /// are stringified and host objects become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null | Value::Object(_) => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(x) => serde_json::Number::from_f64(*x).map_or(Json::Null, Json::Number),
            Value::Str(s) => Json::String(s.clone()),
            Value::List(items) | Value::Tuple(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Accessible for Value {
    fn get_attr(&self, name: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get_str(name).cloned(),
            Value::Object(host) => host.get_attr(name),
            _ => None,
        }
    }

    fn get_field(&self, key: &Value) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(key).cloned(),
            Value::List(items) | Value::Tuple(items) => {
                let index = key.as_i64()?;
                let index = if index < 0 {
                    items.len().checked_sub(index.unsigned_abs() as usize)?
                } else {
                    index as usize
                };
                items.get(index).cloned()
            }
            Value::Object(host) => host.get_field(key),
            _ => None,
        }
    }
}

/// Python-like rendering; strings inside containers are quoted.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => write_items(f, "[", items, "]"),
            Value::Tuple(items) => write_items(f, "(", items, ")"),
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", Repr(k), Repr(v))?;
                }
                f.write_str("}")
            }
            Value::Object(host) => write!(f, "{host:?}"),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", Repr(item))?;
    }
    f.write_str(close)
}

struct Repr<'a>(&'a Value);

impl fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Null => f.write_str("None"),
            other => write!(f, "{other}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// Map
// ============================================================================

/// Insertion-ordered mapping with last-write-wins keys.
///
/// Keys may be floats or tuples, so lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map(Vec<(Value, Value)>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing the value of an equal key in place.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ============================================================================
// Context
// ============================================================================

/// Variables visible to identifiers during one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Context {
    vars: BTreeMap<String, Value>,
}

/// A JSON context document that is not an object.
#[derive(Debug, thiserror::Error)]
#[error("context must be a JSON object, found {0}")]
pub struct ContextShapeError(&'static str);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from the top-level object of a JSON document.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ContextShapeError> {
        use serde_json::Value as Json;
        let shape = match &json {
            Json::Object(_) => "object",
            Json::Null => "null",
            Json::Bool(_) => "bool",
            Json::Number(_) => "number",
            Json::String(_) => "string",
            Json::Array(_) => "array",
        };
        let Json::Object(fields) = json else {
            return Err(ContextShapeError(shape));
        };
        Ok(fields
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    /// String form of every scalar variable, for `{{name}}` substitution.
    pub fn scalar_vars(&self) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .filter(|(_, v)| matches!(v, Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)))
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Keyword arguments
// ============================================================================

/// Evaluated keyword parameters of a call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KwArgs(BTreeMap<String, Value>);

impl KwArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter; a repeated name replaces the earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn require(&self, name: &str) -> Result<&Value, CallError> {
        self.get(name)
            .ok_or_else(|| CallError::MissingArgument(name.to_owned()))
    }

    pub fn str(&self, name: &str) -> Result<&str, CallError> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| CallError::mismatch(name, "string", value))
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, CallError> {
        self.get(name)
            .map(|value| {
                value
                    .as_str()
                    .ok_or_else(|| CallError::mismatch(name, "string", value))
            })
            .transpose()
    }

    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, CallError> {
        self.get(name)
            .map(|value| {
                value
                    .as_f64()
                    .ok_or_else(|| CallError::mismatch(name, "number", value))
            })
            .transpose()
    }

    /// Booleans come from JSON contexts; integers are accepted as flags.
    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>, CallError> {
        self.get(name)
            .map(|value| match value {
                Value::Bool(b) => Ok(*b),
                Value::Int(n) => Ok(*n != 0),
                other => Err(CallError::mismatch(name, "bool", other)),
            })
            .transpose()
    }

    pub fn seq(&self, name: &str) -> Result<&[Value], CallError> {
        let value = self.require(name)?;
        value
            .as_seq()
            .ok_or_else(|| CallError::mismatch(name, "list", value))
    }

    pub fn numbers(&self, name: &str) -> Result<Vec<f64>, CallError> {
        self.seq(name)?
            .iter()
            .map(|item| {
                item.as_f64()
                    .ok_or_else(|| CallError::mismatch(name, "list of numbers", item))
            })
            .collect()
    }

    /// Any list, rendered item by item.
    pub fn labels(&self, name: &str) -> Result<Vec<String>, CallError> {
        Ok(self.seq(name)?.iter().map(ToString::to_string).collect())
    }
}

impl FromIterator<(String, Value)> for KwArgs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut args = KwArgs::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}
