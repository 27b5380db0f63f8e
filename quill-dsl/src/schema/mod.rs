//! Schema resolution: class lookups, metadata collection and their caches.
//!
//! A [`SchemaResolver`] is owned by one [`Parser`](crate::Parser). Its caches
//! live exactly as long as that parser and accumulate across `parse` calls.

pub mod builtin;
mod reflect;

pub use reflect::property_type;

use crate::binding::{bind_all, IgnoreAnnotationDecl};
use crate::parser::DocParser;
use crate::registry::{ClassDescriptor, ClassSource};
use quill_core::{
    AnnotationMetadata, AnnotationResult, ClassHierarchy, MetadataCollection, ParserConfig, Target,
    Value,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub struct SchemaResolver {
    classes: Arc<dyn ClassSource>,
    metadata: MetadataCollection,
    non_annotations: HashSet<String>,
    class_exists: HashMap<String, bool>,
    in_progress: HashSet<String>,
    /// Settings for parsing annotation classes' own doc comments; fixed on first use.
    metadata_config: Option<Arc<ParserConfig>>,
}

impl SchemaResolver {
    pub fn new(classes: Arc<dyn ClassSource>) -> AnnotationResult<Self> {
        Ok(Self {
            classes,
            metadata: builtin::metadata()?,
            non_annotations: HashSet::new(),
            class_exists: HashMap::new(),
            in_progress: HashSet::new(),
            metadata_config: None,
        })
    }

    pub fn classes(&self) -> &dyn ClassSource {
        self.classes.as_ref()
    }

    /// Metadata collected so far, including the built-in annotations.
    pub fn metadata(&self) -> &MetadataCollection {
        &self.metadata
    }

    /// True once `name` has been found to lack the annotation marker.
    pub fn is_non_annotation(&self, name: &str) -> bool {
        self.non_annotations.contains(name)
    }

    /// Names listed by `@IgnoreAnnotation` in a class doc comment.
    pub fn collect_ignored_annotation_names(
        &mut self,
        doc_comment: &str,
        context: &str,
        owner: &ParserConfig,
    ) -> AnnotationResult<Vec<String>> {
        let settings = self.metadata_config(owner);
        let annotations =
            DocParser::new(&settings, self, context, Target::CLASS).parse(doc_comment)?;
        let names = bind_all::<IgnoreAnnotationDecl>(&annotations)?
            .into_iter()
            .flat_map(|decl| decl.names)
            .collect();
        Ok(names)
    }

    pub(crate) fn class_exists(&mut self, name: &str) -> bool {
        if let Some(&exists) = self.class_exists.get(name) {
            return exists;
        }
        let exists = self.classes.class_exists(name);
        self.class_exists.insert(name.to_string(), exists);
        exists
    }

    pub(crate) fn describe(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.describe(name)
    }

    pub(crate) fn constant(&self, identifier: &str) -> Option<Value> {
        self.classes.constant(identifier)
    }

    /// Metadata for a resolved class, collected on first use.
    ///
    /// `None` means the class exists but is not an annotation.
    pub(crate) fn metadata_for(
        &mut self,
        name: &str,
        owner: &ParserConfig,
    ) -> AnnotationResult<Option<Arc<AnnotationMetadata>>> {
        if let Some(metadata) = self.metadata.get(name) {
            return Ok(Some(metadata));
        }
        if self.non_annotations.contains(name) {
            return Ok(None);
        }
        self.collect(name, owner)?;
        Ok(self.metadata.get(name))
    }

    fn metadata_config(&mut self, owner: &ParserConfig) -> Arc<ParserConfig> {
        let config = self.metadata_config.get_or_insert_with(|| {
            Arc::new(ParserConfig {
                imports: builtin::imports(),
                ignored_annotation_names: owner.ignored_annotation_names.clone(),
                ignore_not_imported_annotations: true,
                ..ParserConfig::default()
            })
        });
        Arc::clone(config)
    }
}

impl ClassHierarchy for SchemaResolver {
    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.classes.is_subclass_of(class, ancestor)
    }
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("metadata", &self.metadata.len())
            .field("non_annotations", &self.non_annotations)
            .field("class_exists", &self.class_exists.len())
            .finish()
    }
}
