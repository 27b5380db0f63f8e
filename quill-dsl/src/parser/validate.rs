//! Semantic checks and instantiation of a parsed annotation.

use crate::schema::SchemaResolver;
use quill_core::{
    type_for_name, AnnotationError, AnnotationInstance, AnnotationMetadata, AnnotationResult,
    ArrayKey, ArrayValue, PropertyMetadata, PropertyType, Value,
};

/// Reject values outside a property's enumeration. Unset properties pass.
pub(super) fn check_enums(
    metadata: &AnnotationMetadata,
    values: &ArrayValue,
    annotation: &str,
    context: &str,
) -> AnnotationResult<()> {
    for property in metadata.properties() {
        let Some(enumeration) = property.enumeration() else {
            continue;
        };
        let Some(value) = values.get_set(property.name()) else {
            continue;
        };
        if !enumeration.allows(value) {
            return Err(AnnotationError::Enumerator {
                property: property.name().to_string(),
                annotation: annotation.to_string(),
                context: context.to_string(),
                allowed: enumeration.describe(),
                given: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Enforce required properties and declared types.
///
/// Array-typed properties given a single value are wrapped in place.
pub(super) fn check_properties(
    metadata: &AnnotationMetadata,
    values: &mut ArrayValue,
    annotation: &str,
    context: &str,
    resolver: &SchemaResolver,
) -> AnnotationResult<()> {
    for property in metadata.properties() {
        let key = value_key(property, values);
        let Some(value) = values.get_set(key) else {
            if property.is_required() {
                return Err(AnnotationError::RequiredMissing {
                    property: property.name().to_string(),
                    annotation: annotation.to_string(),
                    context: context.to_string(),
                    expected: property.expected_description(),
                });
            }
            continue;
        };

        let Some(ty) = property.property_type() else {
            continue;
        };
        let mismatch = |expected: String, actual: &Value| AnnotationError::TypeMismatch {
            property: property.name().to_string(),
            annotation: annotation.to_string(),
            context: context.to_string(),
            expected,
            actual: actual.describe_type(),
        };

        match ty {
            PropertyType::Array { element, .. } => {
                if !value.is_array() {
                    let single = value.clone();
                    values.insert(key, ArrayValue::from_iter([single]));
                }
                let Some(element) = element else {
                    continue;
                };
                let element_type = type_for_name(element);
                if let Some(Value::Array(items)) = values.get_set(key) {
                    if let Some(item) = items.values().find(|item| !element_type.validate(item, resolver)) {
                        let expected = format!("either a(n) {element}, or an array of {element}s");
                        return Err(mismatch(expected, item));
                    }
                }
            }
            PropertyType::Named { declared, .. } => {
                if !ty.to_type().validate(value, resolver) {
                    return Err(mismatch(format!("a(n) {declared}"), value));
                }
            }
        }
    }
    Ok(())
}

/// Positional `value` stands in for the default property when that one is unset.
fn value_key<'a>(property: &'a PropertyMetadata, values: &ArrayValue) -> &'a str {
    if property.is_default()
        && values.get_set(property.name()).is_none()
        && values.get_set("value").is_some()
    {
        "value"
    } else {
        property.name()
    }
}

/// Build the instance: constructor-style classes get the whole value map,
/// others get their properties assigned one by one.
pub(super) fn instantiate(
    metadata: &AnnotationMetadata,
    values: ArrayValue,
    annotation: &str,
    context: &str,
    resolver: &SchemaResolver,
) -> AnnotationResult<AnnotationInstance> {
    let descriptor = resolver.describe(metadata.name());

    if metadata.uses_constructor() {
        return match descriptor.and_then(|d| d.constructor()) {
            Some(factory) => {
                factory(metadata.name(), values).map_err(|reason| AnnotationError::Construction {
                    annotation: annotation.to_string(),
                    context: context.to_string(),
                    reason,
                })
            }
            None => Ok(AnnotationInstance::new(metadata.name(), values)),
        };
    }

    let mut instance = descriptor
        .map(|d| d.default_instance())
        .unwrap_or_else(|| AnnotationInstance::new(metadata.name(), ArrayValue::new()));

    for (key, value) in values.iter() {
        let name = key.to_string();
        if metadata.property(&name).is_some() {
            instance.set(&name, value.clone());
            continue;
        }
        if *key != ArrayKey::string("value") {
            return Err(AnnotationError::UnknownProperty {
                annotation: annotation.to_string(),
                context: context.to_string(),
                property: name,
                available: metadata.property_names().join(", "),
            });
        }
        let Some(default) = metadata.default_property() else {
            return Err(AnnotationError::NoValuesAccepted {
                annotation: annotation.to_string(),
                context: context.to_string(),
                values: serde_json::to_string(&values).unwrap_or_default(),
            });
        };
        instance.set(default.name(), value.clone());
    }

    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClassDescriptor, ClassRegistry, PropertyDescriptor};
    use quill_core::{AnnotationMetadataBuilder, EnumConstraint, PropertyMetadataBuilder};

    fn resolver() -> SchemaResolver {
        let mut registry = ClassRegistry::new();
        registry.register(
            ClassDescriptor::new("App\\Route")
                .with_doc("/** @Annotation */")
                .with_property(PropertyDescriptor::new("path"))
                .with_property(PropertyDescriptor::new("methods").with_default(ArrayValue::new())),
        );
        SchemaResolver::new(registry.into_source()).unwrap()
    }

    fn route() -> AnnotationMetadata {
        AnnotationMetadataBuilder::new("App\\Route")
            .with_property(
                PropertyMetadataBuilder::new("path")
                    .with_being_default()
                    .with_being_required()
                    .with_type(PropertyType::named("string"))
                    .build(),
            )
            .with_property(
                PropertyMetadataBuilder::new("methods")
                    .with_type(PropertyType::array(Some("string"), "array<string>"))
                    .with_enum(EnumConstraint::new(
                        vec![Value::from("GET"), Value::from("POST")],
                        Vec::new(),
                    ))
                    .build(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_positional_value_fills_default_property() {
        let mut values = ArrayValue::new();
        values.insert("value", "/home");
        check_properties(&route(), &mut values, "Route", "", &resolver()).unwrap();
        let instance = instantiate(&route(), values, "Route", "", &resolver()).unwrap();
        assert_eq!(instance.get("path"), Some(&Value::from("/home")));
        assert_eq!(instance.get("methods"), Some(&Value::Array(ArrayValue::new())));
    }

    #[test]
    fn test_required_property_missing() {
        let mut values = ArrayValue::new();
        values.insert("methods", "GET");
        let err = check_properties(&route(), &mut values, "Route", "", &resolver()).unwrap_err();
        assert!(matches!(err, AnnotationError::RequiredMissing { ref property, .. } if property == "path"));
    }

    #[test]
    fn test_single_value_wrapped_for_array_property() {
        let mut values = ArrayValue::new();
        values.insert("path", "/");
        values.insert("methods", "GET");
        check_properties(&route(), &mut values, "Route", "", &resolver()).unwrap();
        let methods = values.get_str("methods").and_then(Value::as_array).unwrap();
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn test_positional_mismatch_names_the_default_property() {
        let mut values = ArrayValue::new();
        values.insert("value", 123i64);
        let err = check_properties(&route(), &mut values, "Route", "method A::b()", &resolver())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Type Error] Attribute \"path\" of @Route declared on method A::b() expects a(n) string, but got integer."
        );
    }

    #[test]
    fn test_array_element_mismatch() {
        let mut values = ArrayValue::new();
        values.insert("path", "/");
        values.insert("methods", ArrayValue::from_iter([Value::Int(1)]));
        let err = check_properties(&route(), &mut values, "Route", "", &resolver()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Type Error] Attribute \"methods\" of @Route declared expects either a(n) string, or an array of strings, but got integer."
        );
    }

    #[test]
    fn test_enum_rejects_unknown_value() {
        let mut values = ArrayValue::new();
        values.insert("methods", "PATCH");
        let err = check_enums(&route(), &values, "Route", "method App::run()").unwrap_err();
        assert_eq!(
            err.to_string(),
            "[Enum Error] Attribute \"methods\" of @Route declared on method App::run() accepts only [GET, POST], but got PATCH."
        );
    }

    #[test]
    fn test_unknown_property_lists_available() {
        let mut values = ArrayValue::new();
        values.insert("verb", "GET");
        let err = instantiate(&route(), values, "Route", "", &resolver()).unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::UnknownProperty { ref property, ref available, .. }
                if property == "verb" && available == "path, methods"
        ));
    }

    #[test]
    fn test_no_default_property_rejects_value() {
        let metadata = AnnotationMetadataBuilder::new("App\\Marker").build().unwrap();
        let mut values = ArrayValue::new();
        values.insert("value", 5i64);
        let err = instantiate(&metadata, values, "Marker", "", &resolver()).unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::NoValuesAccepted { ref values, .. } if values == "{\"value\":5}"
        ));
    }
}
