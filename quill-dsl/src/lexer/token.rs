//! Lexer token types

use std::fmt;

// ============================================================================
// LEXER TYPES
// ============================================================================

/// Token kinds of the annotation micro-language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    At,
    /// A plain name, possibly containing `::`.
    Identifier,
    /// A name containing at least one `\` separator.
    QualifiedName,
    /// A lone `\` not followed by a name character.
    NamespaceSeparator,
    String,
    Integer,
    Float,
    True,
    False,
    Null,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
    Equals,
    /// Any other single character.
    Other,
}

impl TokenKind {
    /// Tokens that may start a class name.
    pub fn is_identifier_class(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::QualifiedName
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Names that resolve through constants rather than keywords.
    pub fn is_name(&self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::QualifiedName)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenKind::At => "'@'",
            TokenKind::Identifier => "identifier",
            TokenKind::QualifiedName => "qualified name",
            TokenKind::NamespaceSeparator => "namespace separator",
            TokenKind::String => "string",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenBrace => "'{'",
            TokenKind::CloseBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Equals => "'='",
            TokenKind::Other => "character",
        };
        f.write_str(label)
    }
}

/// Source location of a token. `start`/`end` are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind, decoded text and source location.
///
/// For strings `value` is the unquoted, unescaped content.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn position(&self) -> usize {
        self.span.start
    }

    /// True when `other` starts exactly where this token ends.
    pub fn is_adjacent_to(&self, other: &Token) -> bool {
        self.span.end == other.span.start
    }
}
