//! Annotation schema metadata.
//!
//! Metadata is built once per annotation class and never mutated afterwards;
//! the [`MetadataCollection`] caches it by fully-qualified name.

use crate::error::MetadataError;
use crate::target::Target;
use crate::types::Type;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// PROPERTY TYPES
// ============================================================================

/// Declared type of an annotation property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    /// A collection, optionally constrained per element.
    Array {
        element: Option<String>,
        declared: String,
    },
    /// A runtime type name (`string`, `integer`, ...) or a class name.
    Named { name: String, declared: String },
}

impl PropertyType {
    pub fn array(element: Option<&str>, declared: impl Into<String>) -> Self {
        PropertyType::Array {
            element: element.map(str::to_string),
            declared: declared.into(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        PropertyType::Named {
            declared: name.clone(),
            name,
        }
    }

    /// The type exactly as written in the schema.
    pub fn declared(&self) -> &str {
        match self {
            PropertyType::Array { declared, .. } | PropertyType::Named { declared, .. } => declared,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, PropertyType::Array { .. })
    }

    pub fn element(&self) -> Option<&str> {
        match self {
            PropertyType::Array { element, .. } => element.as_deref(),
            PropertyType::Named { .. } => None,
        }
    }

    /// Structural type used to validate values.
    pub fn to_type(&self) -> Type {
        match self {
            PropertyType::Array { element, .. } => {
                Type::list(element.as_deref().map(type_for_name).unwrap_or(Type::Mixed))
            }
            PropertyType::Named { name, .. } => type_for_name(name),
        }
    }
}

/// Map a runtime type name to a structural type; anything else is a class name.
pub fn type_for_name(name: &str) -> Type {
    match name {
        "mixed" => Type::Mixed,
        "boolean" => Type::Boolean,
        "integer" => Type::Integer,
        "double" => Type::Float,
        "string" => Type::String,
        "array" => Type::list(Type::Mixed),
        "object" => Type::Object(None),
        "NULL" | "null" => Type::Null,
        class => Type::object(class.trim_start_matches('\\')),
    }
}

/// Allowed values of an enumerated property.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstraint {
    pub values: Vec<Value>,
    /// Labels listed in error messages; same length as `values` or empty.
    pub literals: Vec<String>,
}

impl EnumConstraint {
    pub fn new(values: Vec<Value>, literals: Vec<String>) -> Self {
        Self { values, literals }
    }

    pub fn allows(&self, value: &Value) -> bool {
        self.values.iter().any(|allowed| allowed.loosely_equals(value))
    }

    /// Labels joined for error messages, falling back to the values themselves.
    pub fn describe(&self) -> String {
        if self.literals.is_empty() {
            self.values
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            self.literals.join(", ")
        }
    }
}

// ============================================================================
// PROPERTY & ANNOTATION METADATA
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMetadata {
    pub(crate) name: String,
    pub(crate) ty: Option<PropertyType>,
    pub(crate) required: bool,
    pub(crate) is_default: bool,
    pub(crate) enumeration: Option<EnumConstraint>,
}

impl PropertyMetadata {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` means untyped; validation is skipped.
    pub fn property_type(&self) -> Option<&PropertyType> {
        self.ty.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn enumeration(&self) -> Option<&EnumConstraint> {
        self.enumeration.as_ref()
    }

    /// Expected type text used by required-property errors.
    pub fn expected_description(&self) -> String {
        format!(
            "a(n) {}",
            self.ty.as_ref().map(PropertyType::declared).unwrap_or("mixed")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationMetadata {
    name: String,
    target: Target,
    uses_constructor: bool,
    properties: Vec<PropertyMetadata>,
}

impl AnnotationMetadata {
    /// Fails when more than one property is marked default.
    pub fn new(
        name: impl Into<String>,
        target: Target,
        uses_constructor: bool,
        properties: Vec<PropertyMetadata>,
    ) -> Result<Self, MetadataError> {
        let name = name.into();
        let defaults: Vec<&str> = properties
            .iter()
            .filter(|p| p.is_default)
            .map(|p| p.name.as_str())
            .collect();
        if defaults.len() > 1 {
            return Err(MetadataError::MultipleDefaults {
                annotation: name,
                properties: defaults.join(", "),
            });
        }
        Ok(Self {
            name,
            target,
            uses_constructor,
            properties,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn uses_constructor(&self) -> bool {
        self.uses_constructor
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertyMetadata] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn default_property(&self) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.is_default)
    }

    pub fn property_names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }
}

// ============================================================================
// COLLECTION
// ============================================================================

/// Metadata cache keyed by fully-qualified annotation class name.
#[derive(Debug, Clone, Default)]
pub struct MetadataCollection {
    entries: HashMap<String, Arc<AnnotationMetadata>>,
    order: Vec<String>,
}

impl MetadataCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, metadata: AnnotationMetadata) -> Result<(), MetadataError> {
        if self.entries.contains_key(metadata.name()) {
            return Err(MetadataError::Duplicate {
                name: metadata.name().to_string(),
            });
        }
        self.order.push(metadata.name().to_string());
        self.entries
            .insert(metadata.name().to_string(), Arc::new(metadata));
        Ok(())
    }

    /// Add every entry of `other`.
    pub fn include(&mut self, other: &MetadataCollection) -> Result<(), MetadataError> {
        for metadata in other.iter() {
            self.add(metadata.as_ref().clone())?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<AnnotationMetadata>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<AnnotationMetadata>> {
        let removed = self.entries.remove(name)?;
        self.order.retain(|n| n != name);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AnnotationMetadata>> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }
}
