//! Typed records for annotation instances.
//!
//! Parsed values stay untyped until they cross this boundary; a record is
//! either fully read or the binding fails.

use crate::schema::builtin;
use quill_core::{AnnotationInstance, ArrayValue, BindError, EnumConstraint, Target, Value};

/// Reads an annotation instance of class `CLASS` into `Self`.
pub trait FromAnnotation: Sized {
    const CLASS: &'static str;

    fn from_properties(annotation: &AnnotationInstance) -> Result<Self, BindError>;

    fn from_annotation(annotation: &AnnotationInstance) -> Result<Self, BindError> {
        if annotation.class() != Self::CLASS {
            return Err(BindError::WrongClass {
                expected: Self::CLASS.to_string(),
                found: annotation.class().to_string(),
            });
        }
        Self::from_properties(annotation)
    }
}

/// Bind the first annotation of class `T::CLASS`, if any.
pub fn bind_first<T: FromAnnotation>(
    annotations: &[AnnotationInstance],
) -> Result<Option<T>, BindError> {
    annotations
        .iter()
        .find(|a| a.class() == T::CLASS)
        .map(T::from_annotation)
        .transpose()
}

/// Bind every annotation of class `T::CLASS`, skipping the rest.
pub fn bind_all<T: FromAnnotation>(annotations: &[AnnotationInstance]) -> Result<Vec<T>, BindError> {
    annotations
        .iter()
        .filter(|a| a.class() == T::CLASS)
        .map(T::from_annotation)
        .collect()
}

// ============================================================================
// PROPERTY READERS
// ============================================================================

fn invalid(annotation: &AnnotationInstance, property: &str, expected: &str, actual: &Value) -> BindError {
    BindError::InvalidProperty {
        class: annotation.class().to_string(),
        property: property.to_string(),
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

fn required<'a>(annotation: &'a AnnotationInstance, property: &str) -> Result<&'a Value, BindError> {
    annotation
        .get(property)
        .filter(|v| !v.is_null())
        .ok_or_else(|| BindError::MissingProperty {
            class: annotation.class().to_string(),
            property: property.to_string(),
        })
}

fn string(annotation: &AnnotationInstance, property: &str) -> Result<String, BindError> {
    let value = required(annotation, property)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(annotation, property, "string", value))
}

/// Missing or null reads as an empty collection.
fn array(annotation: &AnnotationInstance, property: &str) -> Result<ArrayValue, BindError> {
    match annotation.get(property) {
        None | Some(Value::Null) => Ok(ArrayValue::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(invalid(annotation, property, "array", other)),
    }
}

// ============================================================================
// BUILT-IN RECORDS
// ============================================================================

/// `@Target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDecl {
    pub targets: Target,
    pub literal: String,
}

impl FromAnnotation for TargetDecl {
    const CLASS: &'static str = builtin::TARGET;

    fn from_properties(annotation: &AnnotationInstance) -> Result<Self, BindError> {
        let bits = required(annotation, "targets")?;
        let targets = bits
            .as_int()
            .and_then(|b| u32::try_from(b).ok())
            .and_then(Target::from_bits)
            .ok_or_else(|| invalid(annotation, "targets", "target bitmask", bits))?;
        Ok(Self {
            targets,
            literal: string(annotation, "literal")?,
        })
    }
}

/// `@Enum`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub values: Vec<Value>,
    /// Enumerator value → label.
    pub literal: ArrayValue,
}

impl EnumDecl {
    pub fn into_constraint(self) -> EnumConstraint {
        let source: Vec<&Value> = if self.literal.is_empty() {
            self.values.iter().collect()
        } else {
            self.literal.values().collect()
        };
        let literals = source.iter().map(|v| v.to_string()).collect();
        EnumConstraint::new(self.values, literals)
    }
}

impl FromAnnotation for EnumDecl {
    const CLASS: &'static str = builtin::ENUM;

    fn from_properties(annotation: &AnnotationInstance) -> Result<Self, BindError> {
        Ok(Self {
            values: array(annotation, "value")?.values().cloned().collect(),
            literal: array(annotation, "literal")?,
        })
    }
}

/// `@Attribute`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    pub name: String,
    pub type_name: String,
    pub required: bool,
}

impl FromAnnotation for AttributeDecl {
    const CLASS: &'static str = builtin::ATTRIBUTE;

    fn from_properties(annotation: &AnnotationInstance) -> Result<Self, BindError> {
        let required = match annotation.get("required") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => return Err(invalid(annotation, "required", "boolean", other)),
        };
        Ok(Self {
            name: string(annotation, "name")?,
            type_name: string(annotation, "type")?,
            required,
        })
    }
}

/// `@Attributes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributesDecl {
    pub attributes: Vec<AttributeDecl>,
}

impl FromAnnotation for AttributesDecl {
    const CLASS: &'static str = builtin::ATTRIBUTES;

    fn from_properties(annotation: &AnnotationInstance) -> Result<Self, BindError> {
        let attributes = array(annotation, "value")?
            .values()
            .map(|item| match item {
                Value::Annotation(inner) => AttributeDecl::from_annotation(inner),
                other => Err(invalid(annotation, "value", builtin::ATTRIBUTE, other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { attributes })
    }
}

/// `@IgnoreAnnotation`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreAnnotationDecl {
    pub names: Vec<String>,
}

impl FromAnnotation for IgnoreAnnotationDecl {
    const CLASS: &'static str = builtin::IGNORE_ANNOTATION;

    fn from_properties(annotation: &AnnotationInstance) -> Result<Self, BindError> {
        let names = array(annotation, "names")?
            .values()
            .map(|name| {
                name.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(annotation, "names", "string", name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { names })
    }
}
