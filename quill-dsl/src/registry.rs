//! Registered annotation classes.
//!
//! Annotation classes are declared ahead of time rather than discovered by
//! reflection. A [`ClassSource`] answers the questions the parser would
//! otherwise ask a runtime: does a class exist, what does it look like, what
//! value does a constant hold.

use crate::schema::builtin;
use quill_core::{AnnotationInstance, ArrayValue, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Builds an instance from the full parsed value map of a constructor-style class.
pub type Factory =
    Arc<dyn Fn(&str, ArrayValue) -> Result<AnnotationInstance, String> + Send + Sync>;

// ============================================================================
// CLASS SOURCE
// ============================================================================

/// Lookup of class declarations and constants.
pub trait ClassSource: Send + Sync {
    fn class_exists(&self, name: &str) -> bool {
        self.describe(name).is_some()
    }

    fn describe(&self, name: &str) -> Option<&ClassDescriptor>;

    /// Value of a global constant (`NAME`) or class constant (`Class::NAME`).
    fn constant(&self, identifier: &str) -> Option<Value>;

    /// True if `class` is `ancestor` or extends/implements it.
    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool;
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// A public property of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    name: String,
    doc_comment: String,
    default: Value,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc_comment: String::new(),
            default: Value::Null,
        }
    }

    pub fn with_doc(mut self, doc_comment: impl Into<String>) -> Self {
        self.doc_comment = doc_comment.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc_comment(&self) -> &str {
        &self.doc_comment
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

/// Declaration of a class: doc comment, public properties, ancestry, constants.
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    doc_comment: String,
    properties: Vec<PropertyDescriptor>,
    ancestors: Vec<String>,
    constants: Vec<(String, Value)>,
    constructor: Option<Factory>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: normalize(&name.into()).to_string(),
            doc_comment: String::new(),
            properties: Vec::new(),
            ancestors: Vec::new(),
            constants: Vec::new(),
            constructor: None,
        }
    }

    pub fn with_doc(mut self, doc_comment: impl Into<String>) -> Self {
        self.doc_comment = doc_comment.into();
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// A parent class or implemented interface.
    pub fn with_ancestor(mut self, ancestor: impl Into<String>) -> Self {
        self.ancestors.push(normalize(&ancestor.into()).to_string());
        self
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.push((name.into(), value.into()));
        self
    }

    /// Construct instances through `factory`, passing the whole value map.
    pub fn with_constructor<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str, ArrayValue) -> Result<AnnotationInstance, String> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(factory));
        self
    }

    /// Constructor that keeps the value map as the instance's properties.
    pub fn with_value_constructor(self) -> Self {
        self.with_constructor(|class, values| Ok(AnnotationInstance::new(class, values)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc_comment(&self) -> &str {
        &self.doc_comment
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants
            .iter()
            .find(|(constant, _)| constant == name)
            .map(|(_, value)| value)
    }

    pub fn constructor(&self) -> Option<&Factory> {
        self.constructor.as_ref()
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// A fresh instance holding every property's declared default.
    pub fn default_instance(&self) -> AnnotationInstance {
        let mut properties = ArrayValue::new();
        for property in &self.properties {
            properties.insert(property.name(), property.default_value().clone());
        }
        AnnotationInstance::new(self.name.clone(), properties)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("doc_comment", &self.doc_comment)
            .field("properties", &self.properties)
            .field("ancestors", &self.ancestors)
            .field("constants", &self.constants)
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}

fn normalize(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}

// ============================================================================
// REGISTRY
// ============================================================================

/// In-memory [`ClassSource`]. Always contains the built-in annotation classes.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
    constants: HashMap<String, Value>,
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            classes: HashMap::new(),
            constants: HashMap::new(),
        };
        for class in builtin::classes() {
            registry.register(class);
        }
        registry
    }

    /// Register a class, replacing any previous declaration of the same name.
    pub fn register(&mut self, class: ClassDescriptor) -> &mut Self {
        self.classes.insert(class.name().to_string(), class);
        self
    }

    pub fn define_constant(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        self.constants
            .insert(normalize(&name).to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn into_source(self) -> Arc<dyn ClassSource> {
        Arc::new(self)
    }
}

impl ClassSource for ClassRegistry {
    fn describe(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(normalize(name))
    }

    fn constant(&self, identifier: &str) -> Option<Value> {
        match identifier.split_once("::") {
            Some((class, constant)) => self.describe(class)?.constant(constant).cloned(),
            None => self.constants.get(normalize(identifier)).cloned(),
        }
    }

    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        let ancestor = normalize(ancestor);
        let mut pending = vec![normalize(class).to_string()];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(descriptor) = self.classes.get(&current) {
                pending.extend(descriptor.ancestors().iter().cloned());
            }
        }
        false
    }
}
