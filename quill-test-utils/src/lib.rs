//! QUILL Test Utilities
//!
//! Shared test infrastructure for the QUILL workspace:
//! - Fixture annotation classes and pre-configured parsers
//! - Proptest generators for annotation source text
//! - Assertions over parse results

pub use quill_core::{
    AnnotationError, AnnotationInstance, AnnotationResult, ArrayKey, ArrayValue, ParserConfig,
    Target, Value,
};
pub use quill_dsl::{ClassDescriptor, ClassRegistry, ClassSource, Parser, PropertyDescriptor};

use std::sync::Arc;

/// Install a test-writer tracing subscriber once; later calls are no-ops.
///
/// Filtering follows `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

// ============================================================================
// FIXTURE SCHEMA
// ============================================================================

pub mod fixtures {
    //! Annotation classes under `App\Annotation` and `App\Mapping`.

    use super::*;

    pub const ANNOTATION_NS: &str = "App\\Annotation";
    pub const MAPPING_NS: &str = "App\\Mapping";

    pub const NAME: &str = "App\\Annotation\\Name";
    pub const MARKER: &str = "App\\Annotation\\Marker";
    pub const ROUTE: &str = "App\\Annotation\\Route";
    pub const TYPED: &str = "App\\Annotation\\Typed";
    pub const REQUIRED_VALUE: &str = "App\\Annotation\\RequiredValue";
    pub const CLASS_ONLY: &str = "App\\Annotation\\ClassOnly";
    pub const PROPERTY_ONLY: &str = "App\\Annotation\\PropertyOnly";
    pub const NESTED_ONLY: &str = "App\\Annotation\\NestedOnly";
    pub const WITH_CONSTRUCTOR: &str = "App\\Annotation\\WithConstructor";
    pub const STRICT_CONSTRUCTOR: &str = "App\\Annotation\\StrictConstructor";
    pub const WITH_ATTRIBUTES: &str = "App\\Annotation\\WithAttributes";
    pub const NODE: &str = "App\\Annotation\\Node";
    pub const LEAF: &str = "App\\Annotation\\Leaf";
    pub const LOOP: &str = "App\\Annotation\\Loop";
    pub const NOT_ANNOTATION: &str = "App\\Annotation\\NotAnnotation";

    pub const COLUMN: &str = "App\\Mapping\\Column";
    pub const ENTITY: &str = "App\\Mapping\\Entity";
    pub const JOIN_TABLE: &str = "App\\Mapping\\JoinTable";
    pub const JOIN_COLUMN: &str = "App\\Mapping\\JoinColumn";

    pub const USER: &str = "App\\Entity\\User";

    fn doc(lines: &[&str]) -> String {
        let mut doc = String::from("/**\n");
        for line in lines {
            doc.push_str(" * ");
            doc.push_str(line);
            doc.push('\n');
        }
        doc.push_str(" */");
        doc
    }

    fn property(name: &str, lines: &[&str]) -> PropertyDescriptor {
        PropertyDescriptor::new(name).with_doc(doc(lines))
    }

    fn annotation_classes() -> Vec<ClassDescriptor> {
        vec![
            ClassDescriptor::new(NAME)
                .with_doc(doc(&["@Annotation"]))
                .with_property(PropertyDescriptor::new("foo")),
            ClassDescriptor::new(MARKER).with_doc(doc(&["A flag without values.", "", "@Annotation"])),
            ClassDescriptor::new(ROUTE)
                .with_doc(doc(&["@Annotation", "@Target({\"METHOD\", \"CLASS\"})"]))
                .with_property(property("path", &["@var string", "@Required"]))
                .with_property(property("name", &["@var string"]))
                .with_property(property("methods", &["@var array<string>"]).with_default(ArrayValue::new()))
                .with_property(property("defaults", &["@var array"]).with_default(ArrayValue::new()))
                .with_constant("GET", "GET"),
            ClassDescriptor::new(TYPED)
                .with_doc(doc(&["@Annotation"]))
                .with_property(property("mixed", &["@var mixed"]))
                .with_property(property("flag", &["@var bool"]))
                .with_property(property("count", &["@var int"]))
                .with_property(property("ratio", &["@var float"]))
                .with_property(property("label", &["@var string"]))
                .with_property(property("numbers", &["@var array<integer>"]))
                .with_property(property("tags", &["@var string[]"]))
                .with_property(property("node", &["@var App\\Annotation\\Node"]))
                .with_property(property("nodes", &["@var array<App\\Annotation\\Node>"])),
            ClassDescriptor::new(REQUIRED_VALUE)
                .with_doc(doc(&["@Annotation"]))
                .with_property(property("value", &["@Required"])),
            ClassDescriptor::new(CLASS_ONLY)
                .with_doc(doc(&["@Annotation", "@Target(\"CLASS\")"]))
                .with_property(PropertyDescriptor::new("value")),
            ClassDescriptor::new(PROPERTY_ONLY)
                .with_doc(doc(&["@Annotation", "@Target(\"PROPERTY\")"]))
                .with_property(PropertyDescriptor::new("value")),
            ClassDescriptor::new(NESTED_ONLY)
                .with_doc(doc(&["@Annotation", "@Target(\"ANNOTATION\")"]))
                .with_property(PropertyDescriptor::new("value")),
            ClassDescriptor::new(WITH_CONSTRUCTOR)
                .with_doc(doc(&["@Annotation"]))
                .with_value_constructor(),
            ClassDescriptor::new(STRICT_CONSTRUCTOR)
                .with_doc(doc(&["@Annotation"]))
                .with_constructor(|class, values| {
                    if values.get_set("value").is_none() {
                        return Err("value is mandatory".to_string());
                    }
                    Ok(AnnotationInstance::new(class, values))
                }),
            ClassDescriptor::new(WITH_ATTRIBUTES)
                .with_doc(doc(&[
                    "@Annotation",
                    "@Attributes({",
                    "  @Attribute(\"label\", type = \"string\", required = true),",
                    "  @Attribute(\"weight\", type = \"int\"),",
                    "  @Attribute(\"labels\", type = \"array<string>\"),",
                    "})",
                ]))
                .with_property(PropertyDescriptor::new("label"))
                .with_property(PropertyDescriptor::new("weight"))
                .with_property(PropertyDescriptor::new("labels")),
            ClassDescriptor::new(NODE)
                .with_doc(doc(&["@Annotation"]))
                .with_property(PropertyDescriptor::new("value")),
            ClassDescriptor::new(LEAF)
                .with_doc(doc(&["@Annotation"]))
                .with_ancestor(NODE)
                .with_property(PropertyDescriptor::new("value")),
            ClassDescriptor::new(LOOP).with_doc(doc(&["@Annotation", "@\\App\\Annotation\\Loop"])),
            ClassDescriptor::new(NOT_ANNOTATION)
                .with_doc(doc(&["Plain class."]))
                .with_property(PropertyDescriptor::new("value")),
        ]
    }

    fn mapping_classes() -> Vec<ClassDescriptor> {
        vec![
            ClassDescriptor::new(ENTITY)
                .with_doc(doc(&["@Annotation", "@Target(\"CLASS\")"]))
                .with_property(property("repositoryClass", &["@var string"]))
                .with_property(property("readOnly", &["@var bool"]).with_default(false)),
            ClassDescriptor::new(COLUMN)
                .with_doc(doc(&["@Annotation", "@Target({\"PROPERTY\", \"ANNOTATION\"})"]))
                .with_property(property("name", &["@var string"]))
                .with_property(property(
                    "type",
                    &["@var string", "@Enum({\"string\", \"integer\", \"boolean\", \"datetime\"})"],
                ).with_default("string"))
                .with_property(property("length", &["@var integer"]))
                .with_property(property("nullable", &["@var bool"]).with_default(false))
                .with_property(property("options", &["@var array"]).with_default(ArrayValue::new())),
            ClassDescriptor::new(JOIN_TABLE)
                .with_doc(doc(&["@Annotation", "@Target({\"PROPERTY\", \"ANNOTATION\"})"]))
                .with_property(property("name", &["@var string"]))
                .with_property(
                    property("joinColumns", &["@var array<App\\Mapping\\JoinColumn>"])
                        .with_default(ArrayValue::new()),
                )
                .with_property(
                    property("inverseJoinColumns", &["@var array<App\\Mapping\\JoinColumn>"])
                        .with_default(ArrayValue::new()),
                ),
            ClassDescriptor::new(JOIN_COLUMN)
                .with_doc(doc(&["@Annotation", "@Target({\"PROPERTY\", \"ANNOTATION\"})"]))
                .with_property(property("name", &["@var string"]))
                .with_property(property("referencedColumnName", &["@var string"]).with_default("id")),
        ]
    }

    /// Every fixture class plus a handful of constants.
    pub fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        for class in annotation_classes().into_iter().chain(mapping_classes()) {
            registry.register(class);
        }
        registry
            .register(
                ClassDescriptor::new(USER)
                    .with_doc(doc(&["@Entity"]))
                    .with_constant("ROLE_ADMIN", "admin")
                    .with_constant("MAX_LOGINS", 3i64),
            )
            .define_constant("APP_VERSION", "1.2.0")
            .define_constant("APP_LIMIT", 42i64)
            .define_constant("APP_CHANNELS", ArrayValue::from_iter(["web", "cli"]))
            .define_constant("App\\Annotation\\FLAG", true);
        registry
    }

    pub fn source() -> Arc<dyn ClassSource> {
        registry().into_source()
    }

    /// Parser with default settings: full names or bare names only.
    pub fn parser() -> Parser {
        Parser::new(source()).expect("fixture schema is valid")
    }

    /// Parser resolving through `App\Annotation`.
    pub fn namespaced_parser() -> Parser {
        let mut parser = parser();
        parser
            .add_namespace(ANNOTATION_NS)
            .expect("fresh parser has no imports");
        parser
    }

    /// Parser with the usual imports: `Route`, `Name`, `ORM` and the current namespace.
    pub fn imports_parser() -> Parser {
        let mut parser = parser();
        parser
            .set_imports([
                ("Route", ROUTE),
                ("Name", NAME),
                ("ORM", MAPPING_NS),
                ("User", USER),
                ("__NAMESPACE__", ANNOTATION_NS),
            ])
            .expect("fresh parser has no namespaces");
        parser
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for annotation source text.

    use proptest::prelude::*;

    /// A name that lexes as a plain identifier.
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[A-Za-z_][A-Za-z0-9_]{0,12}".prop_filter("keywords lex as literals", |name| {
            !matches!(name.to_lowercase().as_str(), "true" | "false" | "null")
        })
    }

    /// Free text for a string literal, paired with its quoted source form.
    pub fn arb_string_literal() -> impl Strategy<Value = (String, String)> {
        "[ -~]{0,24}".prop_map(|text| {
            let quoted = format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""));
            (text, quoted)
        })
    }

    pub fn arb_integer() -> impl Strategy<Value = i64> {
        -1_000_000i64..1_000_000
    }

    /// Scalar literal source text.
    pub fn arb_scalar_source() -> impl Strategy<Value = String> {
        prop_oneof![
            arb_integer().prop_map(|i| i.to_string()),
            arb_string_literal().prop_map(|(_, quoted)| quoted),
            Just("true".to_string()),
            Just("FALSE".to_string()),
            Just("null".to_string()),
            (0u32..1000, 0u32..1000).prop_map(|(a, b)| format!("{a}.{b}")),
        ]
    }

    /// A `{...}` collection of scalars, nested up to three levels.
    pub fn arb_collection_source() -> impl Strategy<Value = String> {
        let leaf = arb_scalar_source();
        leaf.prop_recursive(3, 24, 6, |inner| {
            prop::collection::vec(inner, 0..6).prop_map(|items| format!("{{{}}}", items.join(", ")))
        })
    }

    /// Arbitrary text mixing annotation punctuation and prose.
    pub fn arb_docblock_noise() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("@".to_string()),
                Just("(".to_string()),
                Just(")".to_string()),
                Just("{".to_string()),
                Just("}".to_string()),
                Just("=".to_string()),
                Just(",".to_string()),
                Just("\"".to_string()),
                Just("\\".to_string()),
                Just(" * ".to_string()),
                Just("\n".to_string()),
                arb_identifier(),
                "[ -~]{0,6}",
            ],
            0..32,
        )
        .prop_map(|parts| parts.concat())
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over parse results.

    use super::*;

    /// Assert that parsing failed with exactly `expected` as the message.
    pub fn assert_error_message<T: std::fmt::Debug>(result: &AnnotationResult<T>, expected: &str) {
        match result {
            Err(err) => assert_eq!(err.to_string(), expected),
            Ok(value) => panic!("Expected error \"{}\", got Ok({:?})", expected, value),
        }
    }

    /// Assert a grammar-level failure.
    pub fn assert_syntax_error<T: std::fmt::Debug>(result: &AnnotationResult<T>) {
        match result {
            Err(err) => assert!(err.is_syntax(), "Expected syntax error, got {}", err),
            Ok(value) => panic!("Expected syntax error, got Ok({:?})", value),
        }
    }

    /// The only annotation in `annotations`, checked against `class`.
    pub fn single<'a>(annotations: &'a [AnnotationInstance], class: &str) -> &'a AnnotationInstance {
        assert_eq!(annotations.len(), 1, "Expected one annotation, got {:?}", annotations);
        assert_eq!(annotations[0].class(), class);
        &annotations[0]
    }

    /// A property value that must be present.
    pub fn property<'a>(annotation: &'a AnnotationInstance, name: &str) -> &'a Value {
        annotation
            .get(name)
            .unwrap_or_else(|| panic!("@{} has no property \"{}\"", annotation.class(), name))
    }
}
