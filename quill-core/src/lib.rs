//! QUILL Core - Annotation Data Model
//!
//! Values produced by the parser, the schema metadata they are validated
//! against, the structural type layer, and the error family shared by every
//! other crate. This crate does no parsing.

pub mod builder;
pub mod config;
pub mod error;
pub mod metadata;
pub mod target;
pub mod types;
pub mod value;

pub use builder::{AnnotationMetadataBuilder, PropertyMetadataBuilder};
pub use config::{ParserConfig, NAMESPACE_IMPORT};
pub use error::{AnnotationError, AnnotationResult, BindError, ConfigError, MetadataError};
pub use metadata::{
    type_for_name, AnnotationMetadata, EnumConstraint, MetadataCollection, PropertyMetadata,
    PropertyType,
};
pub use target::{Target, TARGET_NAMES};
pub use types::{ClassHierarchy, ConstantType, ExactHierarchy, Type};
pub use value::{AnnotationInstance, ArrayKey, ArrayValue, Value};
