//! Docblock parser.
//!
//! A [`Parser`] owns its configuration and its [`SchemaResolver`]; each call
//! to [`Parser::parse`] runs one grammar session over a single docblock.

mod grammar;
mod resolve;
mod validate;

pub use grammar::{Outcome, MAX_NESTING_DEPTH};
pub(crate) use grammar::DocParser;

use crate::registry::ClassSource;
use crate::schema::SchemaResolver;
use quill_core::{AnnotationInstance, AnnotationResult, ConfigError, ParserConfig, Target};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Parser {
    config: ParserConfig,
    resolver: SchemaResolver,
}

impl Parser {
    pub fn new(classes: Arc<dyn ClassSource>) -> AnnotationResult<Self> {
        Ok(Self {
            config: ParserConfig::default(),
            resolver: SchemaResolver::new(classes)?,
        })
    }

    /// Parser with pre-built settings; the settings must be valid.
    pub fn with_config(
        config: ParserConfig,
        classes: Arc<dyn ClassSource>,
    ) -> Result<Self, ParserInitError> {
        config.validate()?;
        Ok(Self {
            config,
            resolver: SchemaResolver::new(classes)?,
        })
    }

    /// Parser configured from a TOML document.
    pub fn from_config(text: &str, classes: Arc<dyn ClassSource>) -> Result<Self, ParserInitError> {
        Self::with_config(crate::config::load_config(text)?, classes)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    /// Add a namespace prefix for name resolution. Exclusive with imports.
    pub fn add_namespace(&mut self, namespace: impl Into<String>) -> Result<(), ConfigError> {
        if !self.config.imports.is_empty() {
            return Err(ConfigError::ImportsAndNamespacesMixed);
        }
        self.config.namespaces.push(namespace.into());
        Ok(())
    }

    /// Replace the import map. Aliases are stored lower-cased.
    pub fn set_imports<I, K, V>(&mut self, imports: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        if !self.config.namespaces.is_empty() {
            return Err(ConfigError::ImportsAndNamespacesMixed);
        }
        self.config.imports = imports
            .into_iter()
            .map(|(alias, fqn)| (alias.as_ref().to_lowercase(), fqn.into()))
            .collect::<BTreeMap<_, _>>();
        Ok(())
    }

    pub fn set_ignored_annotation_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ignored_annotation_names = names.into_iter().map(Into::into).collect::<BTreeSet<_>>();
    }

    pub fn set_ignored_annotation_namespaces<I, S>(&mut self, namespaces: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ignored_annotation_namespaces =
            namespaces.into_iter().map(Into::into).collect::<BTreeSet<_>>();
    }

    pub fn set_ignore_not_imported_annotations(&mut self, ignore: bool) {
        self.config.ignore_not_imported_annotations = ignore;
    }

    /// Target of top-level annotations; `Target::empty()` disables the check.
    pub fn set_target(&mut self, target: Target) {
        self.config.target = target;
    }

    // ========================================================================
    // PARSING
    // ========================================================================

    /// Parse every annotation in `input`.
    ///
    /// `context` describes where the docblock came from and appears in error
    /// messages; it may be empty.
    pub fn parse(&mut self, input: &str, context: &str) -> AnnotationResult<Vec<AnnotationInstance>> {
        let target = self.config.target;
        let annotations =
            DocParser::new(&self.config, &mut self.resolver, context, target).parse(input)?;
        debug!(count = annotations.len(), context = %context, "parsed docblock");
        Ok(annotations)
    }

    /// Names listed by `@IgnoreAnnotation` in a class doc comment.
    pub fn collect_ignored_annotation_names(
        &mut self,
        doc_comment: &str,
        context: &str,
    ) -> AnnotationResult<Vec<String>> {
        self.resolver
            .collect_ignored_annotation_names(doc_comment, context, &self.config)
    }
}

/// Failure to build a [`Parser`] from settings.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ParserInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Annotation(#[from] quill_core::AnnotationError),
}
