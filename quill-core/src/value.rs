//! Parsed annotation values.
//!
//! Values mirror the shape of the annotation grammar: scalars, ordered keyed
//! collections and nested annotation objects. They stay untyped until a
//! schema validates them.

use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// VALUE
// ============================================================================

/// A single parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(ArrayValue),
    Annotation(Box<AnnotationInstance>),
}

impl Value {
    /// Runtime type name, as reported in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Annotation(_) => "object",
        }
    }

    /// Describe the runtime type for error messages: objects are named by class.
    pub fn describe_type(&self) -> String {
        match self {
            Value::Annotation(instance) => format!("an instance of {}", instance.class()),
            other => other.type_name().to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Scalars are everything except collections and annotation objects.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&AnnotationInstance> {
        match self {
            Value::Annotation(a) => Some(a),
            _ => None,
        }
    }

    /// Truthiness used by loose comparison.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !(s.is_empty() || s == "0"),
            Value::Array(a) => !a.is_empty(),
            Value::Annotation(_) => true,
        }
    }

    /// Loose equality, as used when checking a value against an enumeration.
    ///
    /// Numbers compare numerically with each other and with numeric strings,
    /// booleans compare by truthiness, and null equals every "empty" value.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), b) | (b, Bool(a)) => *a == b.is_truthy(),
            (Null, String(s)) | (String(s), Null) => s.is_empty(),
            (Null, v) | (v, Null) => !v.is_truthy() && !matches!(v, Annotation(_)),
            (Int(a), Int(b)) => a == b,
            (Int(a), Float(b)) | (Float(b), Int(a)) => (*a as f64) == *b,
            (Float(a), Float(b)) => a == b,
            (Int(n), String(s)) | (String(s), Int(n)) => match numeric_value(s) {
                Some(parsed) => parsed == *n as f64,
                None => n.to_string() == *s,
            },
            (Float(n), String(s)) | (String(s), Float(n)) => match numeric_value(s) {
                Some(parsed) => parsed == *n,
                None => n.to_string() == *s,
            },
            (String(a), String(b)) => match (numeric_value(a), numeric_value(b)) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            (Array(a), Array(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        b.get(key).is_some_and(|other| value.loosely_equals(other))
                    })
            }
            (Annotation(a), Annotation(b)) => a == b,
            _ => false,
        }
    }
}

/// Parse a numeric string (leading/trailing whitespace allowed).
fn numeric_value(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(_) => write!(f, "Array"),
            Value::Annotation(instance) => write!(f, "{}", instance.class()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ArrayValue> for Value {
    fn from(a: ArrayValue) -> Self {
        Value::Array(a)
    }
}

impl From<AnnotationInstance> for Value {
    fn from(a: AnnotationInstance) -> Self {
        Value::Annotation(Box::new(a))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(a) => a.serialize(serializer),
            Value::Annotation(instance) => instance.serialize(serializer),
        }
    }
}

// ============================================================================
// COLLECTIONS
// ============================================================================

/// Key of an [`ArrayValue`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl ArrayKey {
    /// Build a string key, normalising canonical decimal integers to integer keys.
    pub fn string(s: impl Into<String>) -> Self {
        let s = s.into();
        match canonical_int(&s) {
            Some(i) => ArrayKey::Int(i),
            None => ArrayKey::Str(s),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArrayKey::Str(s) => Some(s),
            ArrayKey::Int(_) => None,
        }
    }
}

/// `"12"` and `"-3"` are integer keys; `"012"`, `"+1"` and `"-0"` are not.
fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if s.starts_with('-') && digits == "0" {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{}", i),
            ArrayKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ArrayKey {
    fn from(i: i64) -> Self {
        ArrayKey::Int(i)
    }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self {
        ArrayKey::string(s)
    }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self {
        ArrayKey::string(s)
    }
}

/// Insertion-ordered keyed collection.
///
/// Appending uses the next implicit integer index: one past the largest
/// integer key seen so far, never below zero.
#[derive(Debug, Clone, Default)]
pub struct ArrayValue {
    entries: Vec<(ArrayKey, Value)>,
    next_index: i64,
}

impl ArrayValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append under the next implicit integer index.
    pub fn push(&mut self, value: impl Into<Value>) {
        let key = ArrayKey::Int(self.next_index);
        self.insert(key, value);
    }

    /// Assign `key`, overwriting an existing entry in place.
    pub fn insert(&mut self, key: impl Into<ArrayKey>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let ArrayKey::Int(i) = key {
            if i >= self.next_index {
                self.next_index = i.saturating_add(1);
            }
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &ArrayKey) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up by property name.
    pub fn get_str(&self, name: &str) -> Option<&Value> {
        self.get(&ArrayKey::string(name))
    }

    /// Look up by property name, treating a null entry as absent.
    pub fn get_set(&self, name: &str) -> Option<&Value> {
        self.get_str(name).filter(|v| !v.is_null())
    }

    pub fn contains_key(&self, key: &ArrayKey) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &ArrayKey) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// True when the keys are exactly `0..len` in order.
    pub fn is_list(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == ArrayKey::Int(i as i64))
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl IntoIterator for ArrayValue {
    type Item = (ArrayKey, Value);
    type IntoIter = std::vec::IntoIter<(ArrayKey, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Into<Value>> FromIterator<V> for ArrayValue {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut array = ArrayValue::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl Serialize for ArrayValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_list() {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for value in self.values() {
                seq.serialize_element(value)?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self.iter() {
                map.serialize_entry(&key.to_string(), value)?;
            }
            map.end()
        }
    }
}

// ============================================================================
// ANNOTATION INSTANCES
// ============================================================================

/// A constructed annotation object.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInstance {
    class: String,
    properties: ArrayValue,
}

impl AnnotationInstance {
    pub fn new(class: impl Into<String>, properties: ArrayValue) -> Self {
        Self {
            class: class.into(),
            properties,
        }
    }

    /// Fully-qualified class name.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get_str(property)
    }

    pub fn set(&mut self, property: &str, value: impl Into<Value>) {
        self.properties.insert(property, value);
    }

    pub fn properties(&self) -> &ArrayValue {
        &self.properties
    }

    pub fn into_properties(self) -> ArrayValue {
        self.properties
    }
}

impl Serialize for AnnotationInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AnnotationInstance", 2)?;
        state.serialize_field("class", &self.class)?;
        state.serialize_field("properties", &self.properties)?;
        state.end()
    }
}
