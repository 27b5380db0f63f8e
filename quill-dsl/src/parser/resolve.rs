//! Class-name and constant resolution for a parse session.

use super::grammar::DocParser;
use quill_core::{AnnotationError, AnnotationResult, Value};
use tracing::trace;

const CLASS_SUFFIX: &str = "::class";

impl DocParser<'_> {
    /// Fully-qualified class for an annotation name written without a leading `\`.
    ///
    /// Configured namespaces take precedence and are exclusive. Otherwise the
    /// import map, the current namespace and the bare name are tried in turn.
    pub(super) fn resolve_annotation_name(&mut self, name: &str) -> Option<String> {
        let config = self.config;
        if !config.namespaces.is_empty() {
            return self.resolve_in_namespaces(name);
        }
        if let Some(imported) = resolve_import(config.import(alias_of(name)), name) {
            return Some(imported);
        }
        if !config.ignored_annotation_names.contains(name) {
            if let Some(namespace) = config.current_namespace() {
                let candidate = format!("{namespace}\\{name}");
                if self.resolver.class_exists(candidate.trim_start_matches('\\')) {
                    return Some(candidate);
                }
            }
        }
        if !config.ignored_annotation_names.contains(name) && self.resolver.class_exists(name) {
            return Some(name.to_string());
        }
        None
    }

    fn resolve_in_namespaces(&mut self, name: &str) -> Option<String> {
        let config = self.config;
        config.namespaces.iter().find_map(|namespace| {
            let candidate = format!("{}\\{}", namespace.trim_end_matches('\\'), name);
            self.resolver
                .class_exists(candidate.trim_start_matches('\\'))
                .then_some(candidate)
        })
    }

    /// Class part of a `Class::CONSTANT` reference; a miss leaves it untouched.
    fn resolve_constant_class(&mut self, class: &str) -> Option<String> {
        let config = self.config;
        if !config.namespaces.is_empty() {
            if let Some(found) = self.resolve_in_namespaces(class) {
                return Some(found);
            }
        }
        if let Some(imported) = resolve_import(config.import(alias_of(class)), class) {
            return Some(imported);
        }
        let namespace = config.current_namespace()?;
        let candidate = format!("{namespace}\\{class}");
        self.resolver
            .class_exists(candidate.trim_start_matches('\\'))
            .then_some(candidate)
    }

    /// A constant reference: `NAME`, `Class::NAME` or `Class::class`.
    ///
    /// `Class::class` yields the class name as written after resolution,
    /// leading separator included.
    pub(super) fn constant(&mut self) -> AnnotationResult<Value> {
        let mut identifier = self.identifier()?;

        if self.resolver.constant(&identifier).is_none() && !identifier.starts_with('\\') {
            if let Some((class, constant)) = split_class_constant(&identifier) {
                if let Some(resolved) = self.resolve_constant_class(class) {
                    trace!(constant = %identifier, class = %resolved, "resolved constant class");
                    identifier = format!("{resolved}::{constant}");
                }
            }
        }

        if let Some(class) = class_name_literal(&identifier) {
            return Ok(Value::String(class.to_string()));
        }

        self.resolver
            .constant(identifier.trim_start_matches('\\'))
            .ok_or_else(|| AnnotationError::UndefinedConstant {
                identifier,
                context: self.context.to_string(),
            })
    }
}

/// Leading segment of a possibly qualified name.
fn alias_of(name: &str) -> &str {
    name.split('\\').next().unwrap_or(name)
}

/// Replace the alias segment of `name` with its import, keeping the sub-path.
fn resolve_import(import: Option<&str>, name: &str) -> Option<String> {
    let import = import?;
    Some(match name.find('\\') {
        Some(position) => format!("{import}{}", &name[position..]),
        None => import.to_string(),
    })
}

/// First two `::` parts of an identifier.
fn split_class_constant(identifier: &str) -> Option<(&str, &str)> {
    let mut parts = identifier.split("::");
    let class = parts.next()?;
    let constant = parts.next()?;
    Some((class, constant))
}

/// The class named by a `Foo::class` literal, matched case-insensitively.
fn class_name_literal(identifier: &str) -> Option<&str> {
    let split = identifier.len().checked_sub(CLASS_SUFFIX.len())?;
    if !identifier.is_char_boundary(split) {
        return None;
    }
    let (class, suffix) = identifier.split_at(split);
    suffix.eq_ignore_ascii_case(CLASS_SUFFIX).then_some(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_keeps_sub_path() {
        assert_eq!(
            resolve_import(Some("Acme\\ORM\\Mapping"), "ORM\\Column"),
            Some("Acme\\ORM\\Mapping\\Column".to_string())
        );
        assert_eq!(
            resolve_import(Some("App\\Route"), "Route"),
            Some("App\\Route".to_string())
        );
        assert_eq!(resolve_import(None, "Route"), None);
    }

    #[test]
    fn test_alias_is_leading_segment() {
        assert_eq!(alias_of("ORM\\Column"), "ORM");
        assert_eq!(alias_of("Route"), "Route");
    }

    #[test]
    fn test_class_constant_split() {
        assert_eq!(split_class_constant("Foo::BAR"), Some(("Foo", "BAR")));
        assert_eq!(split_class_constant("Foo::BAR::BAZ"), Some(("Foo", "BAR")));
        assert_eq!(split_class_constant("FOO"), None);
    }

    #[test]
    fn test_class_literal_is_case_insensitive() {
        assert_eq!(class_name_literal("App\\Foo::class"), Some("App\\Foo"));
        assert_eq!(class_name_literal("App\\Foo::CLASS"), Some("App\\Foo"));
        assert_eq!(class_name_literal("App\\Foo::NAME"), None);
        assert_eq!(class_name_literal("ü::clas"), None);
        assert_eq!(class_name_literal("class"), None);
    }
}
