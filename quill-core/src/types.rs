//! Structural and constant types for describing and validating values.

use crate::value::{ArrayKey, ArrayValue, Value};

/// Class/interface membership, answered by whoever knows the class graph.
pub trait ClassHierarchy {
    /// True if `class` is `ancestor` or extends/implements it.
    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool;
}

/// Hierarchy that only knows exact class names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactHierarchy;

impl ClassHierarchy for ExactHierarchy {
    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        class == ancestor
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// A value type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Mixed,
    Null,
    Boolean,
    Integer,
    Float,
    String,
    /// Any annotation object, or one of the given class.
    Object(Option<String>),
    List(Box<Type>),
    Map {
        key: Box<Type>,
        value: Box<Type>,
    },
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Constant(ConstantType),
}

/// A type inhabited by exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantType {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List { element: Box<Type>, value: ArrayValue },
    Map {
        key: Box<Type>,
        element: Box<Type>,
        value: ArrayValue,
    },
}

impl Type {
    pub fn object(class: impl Into<String>) -> Self {
        Type::Object(Some(class.into()))
    }

    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Union of two or more types.
    pub fn union(types: impl IntoIterator<Item = Type>) -> Self {
        let types: Vec<Type> = types.into_iter().collect();
        debug_assert!(types.len() >= 2, "a union needs at least two members");
        Type::Union(types)
    }

    /// Intersection of two or more types.
    pub fn intersection(types: impl IntoIterator<Item = Type>) -> Self {
        let types: Vec<Type> = types.into_iter().collect();
        debug_assert!(types.len() >= 2, "an intersection needs at least two members");
        Type::Intersection(types)
    }

    /// Textual form, e.g. `array<string>` or `Countable&(Iterator|IteratorAggregate)`.
    pub fn describe(&self) -> String {
        match self {
            Type::Mixed => "mixed".to_string(),
            Type::Null => "null".to_string(),
            Type::Boolean => "boolean".to_string(),
            Type::Integer => "integer".to_string(),
            Type::Float => "float".to_string(),
            Type::String => "string".to_string(),
            Type::Object(None) => "object".to_string(),
            Type::Object(Some(class)) => class.clone(),
            Type::List(element) => format!("array<{}>", element.describe()),
            Type::Map { key, value } => format!("array<{}, {}>", key.describe(), value.describe()),
            Type::Union(members) => join_members(members, "|"),
            Type::Intersection(members) => join_members(members, "&"),
            Type::Constant(constant) => constant.describe(),
        }
    }

    pub fn accepts_null(&self) -> bool {
        match self {
            Type::Mixed | Type::Null => true,
            Type::Union(members) => members.iter().any(Type::accepts_null),
            Type::Intersection(members) => members.iter().all(Type::accepts_null),
            _ => false,
        }
    }

    pub fn validate(&self, value: &Value, classes: &dyn ClassHierarchy) -> bool {
        match self {
            Type::Mixed => true,
            Type::Null => value.is_null(),
            Type::Boolean => matches!(value, Value::Bool(_)),
            Type::Integer => matches!(value, Value::Int(_)),
            Type::Float => matches!(value, Value::Float(_)),
            Type::String => matches!(value, Value::String(_)),
            Type::Object(class) => match (value, class) {
                (Value::Annotation(_), None) => true,
                (Value::Annotation(instance), Some(class)) => {
                    classes.is_subclass_of(instance.class(), class)
                }
                _ => false,
            },
            Type::List(element) => match value {
                Value::Array(array) => array.values().all(|v| element.validate(v, classes)),
                _ => false,
            },
            Type::Map { key, value: element } => match value {
                Value::Array(array) => array.iter().all(|(k, v)| {
                    key.validate(&key_value(k), classes) && element.validate(v, classes)
                }),
                _ => false,
            },
            Type::Union(members) => members.iter().any(|t| t.validate(value, classes)),
            Type::Intersection(members) => members.iter().all(|t| t.validate(value, classes)),
            Type::Constant(constant) => constant.validate(value),
        }
    }

    fn is_composite(&self) -> bool {
        matches!(self, Type::Union(_) | Type::Intersection(_))
    }
}

fn join_members(members: &[Type], separator: &str) -> String {
    members
        .iter()
        .map(|member| {
            if member.is_composite() {
                format!("({})", member.describe())
            } else {
                member.describe()
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn key_value(key: &ArrayKey) -> Value {
    match key {
        ArrayKey::Int(i) => Value::Int(*i),
        ArrayKey::Str(s) => Value::String(s.clone()),
    }
}

impl ConstantType {
    pub fn describe(&self) -> String {
        match self {
            ConstantType::Boolean(true) => "true".to_string(),
            ConstantType::Boolean(false) => "false".to_string(),
            ConstantType::Float(x) => format!("{:.6}", x),
            ConstantType::Integer(_) => Type::Integer.describe(),
            ConstantType::String(_) => Type::String.describe(),
            ConstantType::List { element, .. } => Type::List(element.clone()).describe(),
            ConstantType::Map { key, element, .. } => Type::Map {
                key: key.clone(),
                value: element.clone(),
            }
            .describe(),
        }
    }

    /// Strict identity with the constant.
    pub fn validate(&self, value: &Value) -> bool {
        match (self, value) {
            (ConstantType::Boolean(a), Value::Bool(b)) => a == b,
            (ConstantType::Integer(a), Value::Int(b)) => a == b,
            (ConstantType::Float(a), Value::Float(b)) => a == b,
            (ConstantType::String(a), Value::String(b)) => a == b,
            (ConstantType::List { value: a, .. }, Value::Array(b))
            | (ConstantType::Map { value: a, .. }, Value::Array(b)) => a == b,
            _ => false,
        }
    }
}
