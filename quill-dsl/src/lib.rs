//! QUILL DSL - Docblock Annotation Parser
//!
//! Turns documentation comments such as
//!
//! ```text
//! /**
//!  * @Route("/users/{id}", methods={"GET"})
//!  * @ORM\Column(type="string", length=32)
//!  */
//! ```
//!
//! into validated [`AnnotationInstance`](quill_core::AnnotationInstance)s.
//! Class names are resolved against a [`ClassSource`], and each annotation
//! class's own doc comment describes its schema.

pub mod binding;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod schema;

pub use binding::{
    bind_all, bind_first, AttributeDecl, AttributesDecl, EnumDecl, FromAnnotation,
    IgnoreAnnotationDecl, TargetDecl,
};
pub use config::load_config;
pub use lexer::{Lexer, Span, Token, TokenCursor, TokenKind};
pub use parser::{Outcome, Parser, ParserInitError, MAX_NESTING_DEPTH};
pub use registry::{ClassDescriptor, ClassRegistry, ClassSource, Factory, PropertyDescriptor};
pub use schema::{property_type, SchemaResolver};

pub use quill_core;
