//! Built-in annotation classes.
//!
//! These declare the shape of other annotations (`@Target`, `@Enum`,
//! `@Attributes`, ...). Their metadata is preloaded, never reflected.

use crate::registry::{ClassDescriptor, PropertyDescriptor};
use quill_core::{
    AnnotationInstance, AnnotationMetadataBuilder, ArrayValue, MetadataCollection, MetadataError,
    PropertyMetadataBuilder, PropertyType, Target, Value,
};
use std::collections::BTreeMap;

pub const NAMESPACE: &str = "Quill\\Annotation";
pub const ANNOTATION: &str = "Quill\\Annotation\\Annotation";
pub const TARGET: &str = "Quill\\Annotation\\Target";
pub const ENUM: &str = "Quill\\Annotation\\Enum";
pub const ATTRIBUTE: &str = "Quill\\Annotation\\Attribute";
pub const ATTRIBUTES: &str = "Quill\\Annotation\\Attributes";
pub const REQUIRED: &str = "Quill\\Annotation\\Required";
pub const IGNORE_ANNOTATION: &str = "Quill\\Annotation\\IgnoreAnnotation";

/// Imports used when parsing the doc comments of annotation classes.
pub fn imports() -> BTreeMap<String, String> {
    [
        ("enum", ENUM),
        ("target", TARGET),
        ("attribute", ATTRIBUTE),
        ("attributes", ATTRIBUTES),
        ("ignoreannotation", IGNORE_ANNOTATION),
    ]
    .into_iter()
    .map(|(alias, class)| (alias.to_string(), class.to_string()))
    .collect()
}

// ============================================================================
// CLASS DECLARATIONS
// ============================================================================

pub fn classes() -> Vec<ClassDescriptor> {
    vec![
        ClassDescriptor::new(ANNOTATION).with_doc("/** Marker for annotation classes. */"),
        ClassDescriptor::new(TARGET)
            .with_doc("/**\n * @Annotation\n * @Target(\"CLASS\")\n */")
            .with_property(PropertyDescriptor::new("value"))
            .with_property(PropertyDescriptor::new("targets"))
            .with_property(PropertyDescriptor::new("literal"))
            .with_constructor(construct_target),
        ClassDescriptor::new(ENUM)
            .with_doc("/**\n * @Annotation\n * @Target(\"PROPERTY\")\n */")
            .with_property(PropertyDescriptor::new("value"))
            .with_property(PropertyDescriptor::new("literal"))
            .with_constructor(construct_enum),
        ClassDescriptor::new(ATTRIBUTE)
            .with_doc("/**\n * @Annotation\n * @Target(\"ANNOTATION\")\n */")
            .with_property(PropertyDescriptor::new("name").with_doc("/** @var string */"))
            .with_property(PropertyDescriptor::new("type").with_doc("/** @var string */"))
            .with_property(
                PropertyDescriptor::new("required")
                    .with_doc("/** @var bool */")
                    .with_default(false),
            ),
        ClassDescriptor::new(ATTRIBUTES)
            .with_doc("/**\n * @Annotation\n * @Target(\"CLASS\")\n */")
            .with_property(
                PropertyDescriptor::new("value").with_doc("/** @var array<Attribute> */"),
            ),
        ClassDescriptor::new(REQUIRED).with_doc("/**\n * @Annotation\n * @Target(\"PROPERTY\")\n */"),
        ClassDescriptor::new(IGNORE_ANNOTATION)
            .with_doc("/**\n * @Annotation\n * @Target(\"CLASS\")\n */")
            .with_property(PropertyDescriptor::new("names"))
            .with_constructor(construct_ignore_annotation),
    ]
}

// ============================================================================
// PRELOADED METADATA
// ============================================================================

pub fn metadata() -> Result<MetadataCollection, MetadataError> {
    let mut collection = MetadataCollection::new();

    collection.add(
        AnnotationMetadataBuilder::new(ATTRIBUTE)
            .with_target(Target::ANNOTATION)
            .with_property(
                PropertyMetadataBuilder::new("name")
                    .with_type(PropertyType::named("string"))
                    .with_being_required()
                    .with_being_default()
                    .build(),
            )
            .with_property(
                PropertyMetadataBuilder::new("type")
                    .with_type(PropertyType::named("string"))
                    .with_being_required()
                    .build(),
            )
            .with_property(
                PropertyMetadataBuilder::new("required")
                    .with_type(PropertyType::named("boolean"))
                    .build(),
            )
            .build()?,
    )?;

    collection.add(
        AnnotationMetadataBuilder::new(ATTRIBUTES)
            .with_target(Target::CLASS)
            .with_property(
                PropertyMetadataBuilder::new("value")
                    .with_type(PropertyType::array(
                        Some(ATTRIBUTE),
                        format!("array<{}>", ATTRIBUTE),
                    ))
                    .with_being_required()
                    .with_being_default()
                    .build(),
            )
            .build()?,
    )?;

    collection.add(
        AnnotationMetadataBuilder::new(ENUM)
            .with_target(Target::PROPERTY)
            .with_constructor()
            .with_property(
                PropertyMetadataBuilder::new("value")
                    .with_type(PropertyType::array(None, "array"))
                    .with_being_required()
                    .with_being_default()
                    .build(),
            )
            .with_property(
                PropertyMetadataBuilder::new("literal")
                    .with_type(PropertyType::array(None, "array"))
                    .build(),
            )
            .build()?,
    )?;

    collection.add(
        AnnotationMetadataBuilder::new(TARGET)
            .with_target(Target::CLASS)
            .with_constructor()
            .with_property(
                PropertyMetadataBuilder::new("value")
                    .with_type(PropertyType::array(Some("string"), "array<string>"))
                    .with_being_default()
                    .build(),
            )
            .build()?,
    )?;

    collection.add(
        AnnotationMetadataBuilder::new(REQUIRED)
            .with_target(Target::PROPERTY)
            .build()?,
    )?;

    collection.add(
        AnnotationMetadataBuilder::new(IGNORE_ANNOTATION)
            .with_target(Target::CLASS)
            .with_constructor()
            .with_property(
                PropertyMetadataBuilder::new("value")
                    .with_being_default()
                    .build(),
            )
            .build()?,
    )?;

    Ok(collection)
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

fn json(value: Option<&Value>) -> String {
    serde_json::to_string(value.unwrap_or(&Value::Null)).unwrap_or_else(|_| "null".to_string())
}

fn construct_target(class: &str, values: ArrayValue) -> Result<AnnotationInstance, String> {
    let value = values.get_set("value");
    let literals: Vec<Value> = match value {
        Some(Value::String(s)) => vec![Value::from(s.as_str())],
        Some(Value::Array(items)) => items.values().cloned().collect(),
        other => {
            return Err(format!(
                "@Target expects either a string value, or an array of strings, but got {}.",
                other.map(Value::type_name).unwrap_or("NULL")
            ))
        }
    };

    let mut targets = Target::empty();
    let mut names = Vec::with_capacity(literals.len());
    for literal in &literals {
        let target = literal.as_str().and_then(Target::from_name).ok_or_else(|| {
            format!(
                "Invalid Target \"{}\". Available targets: [{}]",
                literal,
                Target::available_names()
            )
        })?;
        targets |= target;
        names.push(literal.to_string());
    }

    let mut properties = ArrayValue::new();
    properties.insert("value", literals.into_iter().collect::<ArrayValue>());
    properties.insert("targets", i64::from(targets.bits()));
    properties.insert("literal", names.join(", "));
    Ok(AnnotationInstance::new(class, properties))
}

fn construct_enum(class: &str, values: ArrayValue) -> Result<AnnotationInstance, String> {
    let enumerators = match values.get_set("value") {
        Some(Value::Array(items)) => items.clone(),
        Some(single) => std::iter::once(single.clone()).collect(),
        None => ArrayValue::new(),
    };
    for enumerator in enumerators.values() {
        if !enumerator.is_scalar() {
            return Err(format!(
                "@Enum supports only scalar values \"{}\" given.",
                enumerator.type_name()
            ));
        }
    }

    let literal = match values.get_set("literal") {
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(format!(
                "@Enum literal expects an array, but got {}.",
                other.type_name()
            ))
        }
        None => ArrayValue::new(),
    };
    for (key, label) in literal.iter() {
        let key_value = match key {
            quill_core::ArrayKey::Int(i) => Value::Int(*i),
            quill_core::ArrayKey::Str(s) => Value::from(s.as_str()),
        };
        if !enumerators.values().any(|e| e.loosely_equals(&key_value)) {
            return Err(format!(
                "Undefined enumerator value \"{}\" for literal \"{}\".",
                key, label
            ));
        }
    }

    let mut properties = ArrayValue::new();
    properties.insert("value", enumerators);
    properties.insert("literal", literal);
    Ok(AnnotationInstance::new(class, properties))
}

fn construct_ignore_annotation(class: &str, values: ArrayValue) -> Result<AnnotationInstance, String> {
    let names = match values.get_str("value") {
        Some(Value::String(s)) => std::iter::once(Value::from(s.as_str())).collect(),
        Some(Value::Array(items)) => items.clone(),
        other => {
            return Err(format!(
                "@IgnoreAnnotation expects either a string name, or an array of strings, but got {}.",
                json(other)
            ))
        }
    };
    let mut properties = ArrayValue::new();
    properties.insert("names", names);
    Ok(AnnotationInstance::new(class, properties))
}
