//! Lexer module for QUILL docblock annotations

pub mod cursor;
pub mod scanner;
pub mod token;

pub use cursor::*;
pub use scanner::*;
pub use token::*;
