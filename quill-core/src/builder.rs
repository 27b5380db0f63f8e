//! Staged construction of annotation metadata.
//!
//! Builders are consumed by each `with_*` step and produce immutable
//! metadata on `build`.

use crate::error::MetadataError;
use crate::metadata::{AnnotationMetadata, EnumConstraint, PropertyMetadata, PropertyType};
use crate::target::Target;

#[derive(Debug, Clone)]
pub struct AnnotationMetadataBuilder {
    name: String,
    target: Target,
    uses_constructor: bool,
    properties: Vec<PropertyMetadata>,
}

impl AnnotationMetadataBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: Target::ALL,
            uses_constructor: false,
            properties: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_constructor(mut self) -> Self {
        self.uses_constructor = true;
        self
    }

    /// Adds a property; a property with the same name is replaced in place.
    pub fn with_property(mut self, property: PropertyMetadata) -> Self {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    pub fn build(self) -> Result<AnnotationMetadata, MetadataError> {
        AnnotationMetadata::new(self.name, self.target, self.uses_constructor, self.properties)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyMetadataBuilder {
    property: PropertyMetadata,
}

impl PropertyMetadataBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            property: PropertyMetadata {
                name: name.into(),
                ty: None,
                required: false,
                is_default: false,
                enumeration: None,
            },
        }
    }

    pub fn with_type(mut self, ty: PropertyType) -> Self {
        self.property.ty = Some(ty);
        self
    }

    pub fn with_being_required(mut self) -> Self {
        self.property.required = true;
        self
    }

    pub fn with_being_default(mut self) -> Self {
        self.property.is_default = true;
        self
    }

    pub fn with_enum(mut self, constraint: EnumConstraint) -> Self {
        self.property.enumeration = Some(constraint);
        self
    }

    pub fn build(self) -> PropertyMetadata {
        self.property
    }
}
