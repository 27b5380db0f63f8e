//! Parsers configured from TOML settings.

use quill_core::{ConfigError, Target, Value};
use quill_dsl::{Parser, ParserInitError};
use quill_test_utils::fixtures;

#[test]
fn test_parser_from_toml_imports() {
    let text = r#"
        ignored_annotation_names = ["author"]
        target = 2

        [imports]
        Route = "App\\Annotation\\Route"
        ORM = "App\\Mapping"
        __NAMESPACE__ = "App\\Annotation"
    "#;
    let mut p = Parser::from_config(text, fixtures::source()).unwrap();
    assert_eq!(p.config().target, Target::METHOD);

    let annotations = p
        .parse("/** @author Jane @Route(\"/\") @Name(7) */", "method A::b()")
        .unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[1].get("foo"), Some(&Value::Int(7)));
}

#[test]
fn test_parser_from_toml_namespaces() {
    let text = r#"namespaces = ["App\\Annotation", "App\\Mapping"]"#;
    let mut p = Parser::from_config(text, fixtures::source()).unwrap();
    let annotations = p.parse("@Marker @JoinColumn", "").unwrap();
    assert_eq!(annotations[1].class(), fixtures::JOIN_COLUMN);
}

#[test]
fn test_invalid_settings() {
    let err = Parser::from_config("target = 64", fixtures::source()).unwrap_err();
    assert!(matches!(err, ParserInitError::Config(ConfigError::Parse { .. })));

    let err = Parser::from_config(
        "namespaces = [\"App\"]\nimports = { a = \"B\" }",
        fixtures::source(),
    )
    .unwrap_err();
    assert_eq!(err, ParserInitError::Config(ConfigError::ImportsAndNamespacesMixed));

    let err = Parser::from_config("namespaces = [\"\\\\\"]", fixtures::source()).unwrap_err();
    assert!(matches!(
        err,
        ParserInitError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "namespaces"
    ));
}
