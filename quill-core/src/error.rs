//! Error types for QUILL operations

use thiserror::Error;

/// Render `context` behind `prefix`, or nothing when the context is empty.
fn with_context(prefix: &str, context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!("{}{}", prefix, context)
    }
}

/// Every failure a `parse` call can produce.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnnotationError {
    #[error("[Syntax Error] Expected {expected}, got {found}{}.", with_context(" in ", .context))]
    Syntax {
        expected: String,
        found: String,
        context: String,
    },

    #[error("[Syntax Error] Illegal collection key of type {key_type}{}.", with_context(" in ", .context))]
    IllegalKey { key_type: String, context: String },

    #[error(
        "[Semantical Error] The annotation \"@{name}\"{} was never imported. Did you maybe forget to add a \"use\" statement for this annotation?",
        with_context(" in ", .context)
    )]
    NotImported { name: String, context: String },

    #[error(
        "[Semantical Error] The annotation \"@{name}\"{} does not exist, or could not be auto-loaded.",
        with_context(" in ", .context)
    )]
    ClassNotFound { name: String, context: String },

    #[error(
        "[Semantical Error] The class \"{class}\" is not annotated with @Annotation. Are you sure this class can be used as annotation? If so, then you need to add @Annotation to the _class_ doc comment of \"{class}\". If it is indeed no annotation, then you need to add @IgnoreAnnotation(\"{name}\") to the _class_ doc comment{}.",
        with_context(" in ", .context)
    )]
    NotAnAnnotation {
        class: String,
        name: String,
        context: String,
    },

    #[error(
        "[Semantical Error] Annotation @{name} is not allowed to be declared{}. You may only use this annotation on these code elements: {allowed}.",
        with_context(" on ", .context)
    )]
    TargetNotAllowed {
        name: String,
        context: String,
        allowed: String,
    },

    #[error(
        "[Enum Error] Attribute \"{property}\" of @{annotation} declared{} accepts only [{allowed}], but got {given}.",
        with_context(" on ", .context)
    )]
    Enumerator {
        property: String,
        annotation: String,
        context: String,
        allowed: String,
        given: String,
    },

    #[error(
        "[Type Error] Attribute \"{property}\" of @{annotation} declared{} expects {expected}. This value should not be null.",
        with_context(" on ", .context)
    )]
    RequiredMissing {
        property: String,
        annotation: String,
        context: String,
        expected: String,
    },

    #[error(
        "[Type Error] Attribute \"{property}\" of @{annotation} declared{} expects {expected}, but got {actual}.",
        with_context(" on ", .context)
    )]
    TypeMismatch {
        property: String,
        annotation: String,
        context: String,
        expected: String,
        actual: String,
    },

    #[error(
        "[Creation Error] The annotation @{annotation} declared{} does not have a property named \"{property}\". Available properties: {available}",
        with_context(" on ", .context)
    )]
    UnknownProperty {
        annotation: String,
        context: String,
        property: String,
        available: String,
    },

    #[error(
        "[Creation Error] The annotation @{annotation} declared{} does not accept any values, but got {values}.",
        with_context(" on ", .context)
    )]
    NoValuesAccepted {
        annotation: String,
        context: String,
        values: String,
    },

    #[error(
        "[Creation Error] An error occurred while instantiating the annotation @{annotation} declared{}: \"{reason}\".",
        with_context(" on ", .context)
    )]
    Construction {
        annotation: String,
        context: String,
        reason: String,
    },

    #[error("[Semantical Error] Couldn't find constant {identifier}{}.", with_context(", ", .context))]
    UndefinedConstant { identifier: String, context: String },

    #[error("[Semantical Error] Annotation metadata for \"{class}\" depends on itself.")]
    CircularMetadata { class: String },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Binding(#[from] BindError),
}

impl AnnotationError {
    /// Syntax errors come from the grammar; everything else is semantic.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            AnnotationError::Syntax { .. } | AnnotationError::IllegalKey { .. }
        )
    }
}

/// Result type for annotation parsing.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Metadata model invariant violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Metadata for annotation \"{name}\" is already registered")]
    Duplicate { name: String },

    #[error("Annotation \"{annotation}\" declares more than one default property: {properties}")]
    MultipleDefaults {
        annotation: String,
        properties: String,
    },
}

/// Failure to read an annotation instance into a typed record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("Expected an instance of {expected}, got {found}")]
    WrongClass { expected: String, found: String },

    #[error("@{class} is missing property \"{property}\"")]
    MissingProperty { class: String, property: String },

    #[error("Property \"{property}\" of @{class} expects {expected}, got {actual}")]
    InvalidProperty {
        class: String,
        property: String,
        expected: String,
        actual: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("You have to either use addNamespace(), or setImports(), but not both.")]
    ImportsAndNamespacesMixed,

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_is_appended_when_present() {
        let err = AnnotationError::Syntax {
            expected: "')'".into(),
            found: "end of string".into(),
            context: "class Foo".into(),
        };
        assert_eq!(
            err.to_string(),
            "[Syntax Error] Expected ')', got end of string in class Foo."
        );
    }

    #[test]
    fn test_context_is_omitted_when_empty() {
        let err = AnnotationError::UndefinedConstant {
            identifier: "FOO".into(),
            context: String::new(),
        };
        assert_eq!(err.to_string(), "[Semantical Error] Couldn't find constant FOO.");

        let err = AnnotationError::UndefinedConstant {
            identifier: "FOO".into(),
            context: "method Foo::bar()".into(),
        };
        assert_eq!(
            err.to_string(),
            "[Semantical Error] Couldn't find constant FOO, method Foo::bar()."
        );
    }

    #[test]
    fn test_target_message_uses_on() {
        let err = AnnotationError::TargetNotAllowed {
            name: "App\\ClassOnly".into(),
            context: "property Foo::$bar".into(),
            allowed: "CLASS".into(),
        };
        assert_eq!(
            err.to_string(),
            "[Semantical Error] Annotation @App\\ClassOnly is not allowed to be declared on property Foo::$bar. You may only use this annotation on these code elements: CLASS."
        );
    }

    #[test]
    fn test_is_syntax() {
        let err = AnnotationError::ClassNotFound {
            name: "Foo".into(),
            context: String::new(),
        };
        assert!(!err.is_syntax());
    }
}
