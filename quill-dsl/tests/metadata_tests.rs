//! Metadata collected from annotation class declarations.

use quill_core::{PropertyType, Target, Value};
use quill_dsl::schema::builtin;
use quill_dsl::{ClassDescriptor, ClassRegistry, Parser, PropertyDescriptor};
use quill_test_utils::fixtures::{self, imports_parser, parser};

#[test]
fn test_builtins_are_preloaded() {
    let p = parser();
    let metadata = p.resolver().metadata();
    for name in [
        builtin::TARGET,
        builtin::ENUM,
        builtin::ATTRIBUTE,
        builtin::ATTRIBUTES,
        builtin::REQUIRED,
        builtin::IGNORE_ANNOTATION,
    ] {
        assert!(metadata.contains(name), "{} should be preloaded", name);
    }
    assert!(!metadata.contains(fixtures::ROUTE));
}

#[test]
fn test_metadata_is_collected_on_first_use_and_cached() {
    let mut p = imports_parser();
    p.parse("@Route(\"/a\")", "").unwrap();
    let before = p.resolver().metadata().len();
    p.parse("@Route(\"/b\") @Route(\"/c\")", "").unwrap();
    assert_eq!(p.resolver().metadata().len(), before);

    let route = p.resolver().metadata().get(fixtures::ROUTE).unwrap();
    assert_eq!(route.target(), Target::CLASS | Target::METHOD);
    assert!(!route.uses_constructor());
    assert_eq!(route.property_names(), vec!["path", "name", "methods", "defaults"]);
    assert_eq!(route.default_property().map(|p| p.name()), Some("path"));

    let path = route.property("path").unwrap();
    assert!(path.is_required());
    assert_eq!(path.property_type(), Some(&PropertyType::named("string")));
    let methods = route.property("methods").unwrap();
    assert_eq!(methods.property_type().and_then(PropertyType::element), Some("string"));
}

#[test]
fn test_enum_metadata() {
    let mut p = imports_parser();
    p.parse("@ORM\\Column", "").unwrap();
    let column = p.resolver().metadata().get(fixtures::COLUMN).unwrap();
    let enumeration = column.property("type").and_then(|p| p.enumeration()).unwrap();
    assert_eq!(enumeration.describe(), "string, integer, boolean, datetime");
    assert!(enumeration.allows(&Value::from("datetime")));
    assert!(!enumeration.allows(&Value::from("float")));
}

#[test]
fn test_constructor_classes_skip_property_reflection() {
    let mut p = imports_parser();
    p.parse("@WithConstructor", "").unwrap();
    let metadata = p.resolver().metadata().get(fixtures::WITH_CONSTRUCTOR).unwrap();
    assert!(metadata.uses_constructor());
    assert!(metadata.properties().is_empty());
    assert_eq!(metadata.target(), Target::ALL);
}

#[test]
fn test_attribute_types_merge_with_properties() {
    let mut p = imports_parser();
    p.parse("@WithAttributes(\"x\")", "").unwrap();
    let metadata = p.resolver().metadata().get(fixtures::WITH_ATTRIBUTES).unwrap();
    let label = metadata.property("label").unwrap();
    assert!(label.is_default());
    assert!(label.is_required());
    assert_eq!(label.property_type().map(PropertyType::declared), Some("string"));
    let labels = metadata.property("labels").unwrap();
    assert!(labels.property_type().is_some_and(PropertyType::is_array));
}

#[test]
fn test_enum_literal_labels() {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassDescriptor::new("App\\Level")
            .with_doc("/** @Annotation */")
            .with_property(PropertyDescriptor::new("value").with_doc(
                "/**\n * @var int\n * @Enum({1, 2}, literal = {1 = \"LOW\", 2 = \"HIGH\"})\n */",
            )),
    );
    let mut p = Parser::new(registry.into_source()).unwrap();
    let err = p.parse("@\\App\\Level(3)", "").unwrap_err();
    assert_eq!(
        err.to_string(),
        "[Enum Error] Attribute \"value\" of @\\App\\Level declared accepts only [LOW, HIGH], but got 3."
    );
    assert_eq!(p.parse("@\\App\\Level(2)", "").unwrap().len(), 1);
}

#[test]
fn test_invalid_enum_declaration_fails_metadata() {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassDescriptor::new("App\\Broken")
            .with_doc("/** @Annotation */")
            .with_property(
                PropertyDescriptor::new("value")
                    .with_doc("/** @Enum({\"A\"}, literal = {\"B\" = \"Bee\"}) */"),
            ),
    );
    let mut p = Parser::new(registry.into_source()).unwrap();
    let err = p.parse("@\\App\\Broken(\"A\")", "").unwrap_err();
    assert!(err.to_string().contains("Undefined enumerator value \"B\""), "{}", err);
}

#[test]
fn test_collect_ignored_annotation_names() {
    let mut p = parser();
    let doc = "/**\n * @IgnoreAnnotation(\"fixme\")\n * @IgnoreAnnotation({\"todo\", \"review\"})\n */";
    let names = p
        .collect_ignored_annotation_names(doc, "class App\\Service")
        .unwrap();
    assert_eq!(names, vec!["fixme", "todo", "review"]);
}

#[test]
fn test_qualified_target_in_class_doc_is_honoured() {
    let mut registry = ClassRegistry::new();
    registry.register(
        ClassDescriptor::new("App\\Scoped")
            .with_doc("/**\n * @Annotation\n * @Quill\\Annotation\\Target(\"CLASS\")\n */"),
    );
    let mut p = Parser::new(registry.into_source()).unwrap();
    p.set_target(Target::PROPERTY);
    let err = p.parse("@\\App\\Scoped", "property App\\User::$id").unwrap_err();
    assert!(matches!(err, quill_core::AnnotationError::TargetNotAllowed { .. }), "{}", err);

    let metadata = p.resolver().metadata().get("App\\Scoped").unwrap();
    assert_eq!(metadata.target(), Target::CLASS);
}
