//! Metadata collection from class declarations.

use super::{builtin, SchemaResolver};
use crate::binding::{bind_first, AttributeDecl, AttributesDecl, EnumDecl, FromAnnotation, TargetDecl};
use crate::parser::DocParser;
use crate::registry::{ClassDescriptor, PropertyDescriptor};
use once_cell::sync::Lazy;
use quill_core::{
    AnnotationError, AnnotationMetadata, AnnotationMetadataBuilder, AnnotationResult, ParserConfig,
    PropertyMetadata, PropertyMetadataBuilder, PropertyType, Target,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Marker an annotation class must carry in its own doc comment.
const ANNOTATION_MARKER: &str = "@Annotation";

static VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@var\s+(\S+)").expect("Invalid @var regex"));

impl SchemaResolver {
    /// Reflect on `name` once, caching either its metadata or its non-annotation status.
    pub(crate) fn collect(&mut self, name: &str, owner: &ParserConfig) -> AnnotationResult<()> {
        let classes = Arc::clone(&self.classes);
        let Some(class) = classes.describe(name) else {
            self.non_annotations.insert(name.to_string());
            return Ok(());
        };

        if !class.doc_comment().contains(ANNOTATION_MARKER) {
            debug!(class = %name, "class is not an annotation");
            self.non_annotations.insert(name.to_string());
            return Ok(());
        }

        if !self.in_progress.insert(name.to_string()) {
            return Err(AnnotationError::CircularMetadata {
                class: name.to_string(),
            });
        }
        let built = self.build_metadata(class, owner);
        self.in_progress.remove(name);
        let metadata = built?;

        debug!(
            annotation = %name,
            target = %metadata.target(),
            constructor = metadata.uses_constructor(),
            properties = metadata.properties().len(),
            "collected annotation metadata"
        );
        self.metadata.add(metadata)?;
        Ok(())
    }

    fn build_metadata(
        &mut self,
        class: &ClassDescriptor,
        owner: &ParserConfig,
    ) -> AnnotationResult<AnnotationMetadata> {
        let settings = self.metadata_config(owner);
        let context = format!("class @{}", class.name());
        let annotations =
            DocParser::new(&settings, self, &context, Target::CLASS).parse(class.doc_comment())?;

        let mut builder = AnnotationMetadataBuilder::new(class.name());
        if class.has_constructor() {
            builder = builder.with_constructor();
        }

        let mut declared = HashMap::new();
        for annotation in &annotations {
            match annotation.class() {
                builtin::TARGET => {
                    builder = builder.with_target(TargetDecl::from_annotation(annotation)?.targets);
                }
                builtin::ATTRIBUTES => {
                    for attribute in AttributesDecl::from_annotation(annotation)?.attributes {
                        let property = attribute_property(&attribute);
                        declared.insert(attribute.name, property.clone());
                        builder = builder.with_property(property);
                    }
                }
                _ => {}
            }
        }

        if !class.has_constructor() {
            for (index, property) in class.properties().iter().enumerate() {
                let attribute = declared.get(property.name());
                let metadata = self.reflect_property(class, property, index == 0, attribute, owner)?;
                builder = builder.with_property(metadata);
            }
        }

        Ok(builder.build()?)
    }

    fn reflect_property(
        &mut self,
        class: &ClassDescriptor,
        property: &PropertyDescriptor,
        is_default: bool,
        attribute: Option<&PropertyMetadata>,
        owner: &ParserConfig,
    ) -> AnnotationResult<PropertyMetadata> {
        let doc = property.doc_comment();
        let mut builder = PropertyMetadataBuilder::new(property.name());
        if is_default {
            builder = builder.with_being_default();
        }

        // `@var` and `@Required` on the property win over `@Attributes`.
        let ty = match VAR_PATTERN.captures(doc).and_then(|captures| captures.get(1)) {
            Some(declared) => property_type(declared.as_str()),
            None => attribute.and_then(|a| a.property_type().cloned()),
        };
        if let Some(ty) = ty {
            builder = builder.with_type(ty);
        }
        if doc.contains("@Required") || attribute.is_some_and(PropertyMetadata::is_required) {
            builder = builder.with_being_required();
        }

        if doc.contains("@Enum") {
            let settings = self.metadata_config(owner);
            let context = format!("property {}::${}", class.name(), property.name());
            let annotations = DocParser::new(&settings, self, &context, Target::PROPERTY).parse(doc)?;
            if let Some(decl) = bind_first::<EnumDecl>(&annotations)? {
                builder = builder.with_enum(decl.into_constraint());
            }
        }

        Ok(builder.build())
    }
}

fn attribute_property(attribute: &AttributeDecl) -> PropertyMetadata {
    let mut builder = PropertyMetadataBuilder::new(attribute.name.as_str());
    if attribute.required {
        builder = builder.with_being_required();
    }
    if let Some(ty) = property_type(&attribute.type_name) {
        builder = builder.with_type(ty);
    }
    builder.build()
}

fn normalize_type_name(name: &str) -> &str {
    match name {
        "float" => "double",
        "bool" | "Boolean" => "boolean",
        "int" => "integer",
        other => other,
    }
}

fn element_type(name: &str) -> Option<&str> {
    match normalize_type_name(name.trim()) {
        "mixed" | "" => None,
        other => Some(other),
    }
}

/// Structural type for a declared type string; `None` for `mixed`.
///
/// `TYPE<ELEM>`, `TYPE<KEY, ELEM>` and `ELEM[]` become arrays of `ELEM`.
pub fn property_type(declared: &str) -> Option<PropertyType> {
    let name = normalize_type_name(declared);
    if name == "mixed" {
        return None;
    }
    if let Some(open) = name.find('<') {
        let inner = name[open + 1..].trim_end_matches('>');
        let element = inner.rsplit(',').next().and_then(element_type);
        return Some(PropertyType::array(element, declared));
    }
    if let Some(stripped) = name.strip_suffix("[]") {
        return Some(PropertyType::array(element_type(stripped), declared));
    }
    if name == "array" {
        return Some(PropertyType::array(None, declared));
    }
    Some(PropertyType::Named {
        name: name.to_string(),
        declared: declared.to_string(),
    })
}
