//! Lookahead cursor over a token stream.

use super::scanner::Lexer;
use super::token::{Token, TokenKind};

/// Holds the just-consumed token, the lookahead, and one token of glimpse.
#[derive(Debug, Clone, Default)]
pub struct TokenCursor {
    tokens: Vec<Token>,
    /// Index of the lookahead token.
    next: usize,
    started: bool,
}

impl TokenCursor {
    pub fn new(input: &str) -> Self {
        let mut cursor = Self::default();
        cursor.set_input(input);
        cursor
    }

    /// Reset to the start of `input`; nothing is consumed or looked ahead yet.
    pub fn set_input(&mut self, input: &str) {
        self.tokens = Lexer::new(input).tokenize();
        self.next = 0;
        self.started = false;
    }

    /// Advance by one token; returns whether a lookahead token is available.
    pub fn move_next(&mut self) -> bool {
        if self.started {
            if self.next < self.tokens.len() {
                self.next += 1;
            }
        } else {
            self.started = true;
        }
        self.next < self.tokens.len()
    }

    /// The token not yet consumed.
    pub fn lookahead(&self) -> Option<&Token> {
        if self.started {
            self.tokens.get(self.next)
        } else {
            None
        }
    }

    /// The token consumed by the last `move_next`.
    pub fn token(&self) -> Option<&Token> {
        if self.started && self.next > 0 {
            self.tokens.get(self.next - 1)
        } else {
            None
        }
    }

    /// The token after the lookahead, without consuming anything.
    pub fn glimpse(&self) -> Option<&Token> {
        if self.started {
            self.tokens.get(self.next + 1)
        } else {
            self.tokens.first()
        }
    }

    pub fn is_next(&self, kind: TokenKind) -> bool {
        self.lookahead().is_some_and(|t| t.kind == kind)
    }

    pub fn is_next_any(&self, kinds: &[TokenKind]) -> bool {
        self.lookahead().is_some_and(|t| kinds.contains(&t.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_walks_tokens() {
        let mut cursor = TokenCursor::new("@Foo(1)");
        assert!(cursor.lookahead().is_none());
        assert!(cursor.move_next());
        assert!(cursor.is_next(TokenKind::At));
        assert!(cursor.token().is_none());
        assert_eq!(cursor.glimpse().map(|t| t.value.as_str()), Some("Foo"));

        assert!(cursor.move_next());
        assert_eq!(cursor.token().map(|t| t.kind), Some(TokenKind::At));
        assert!(cursor.is_next_any(&[TokenKind::Identifier, TokenKind::QualifiedName]));

        assert!(cursor.move_next());
        assert!(cursor.move_next());
        assert!(cursor.move_next());
        assert!(cursor.is_next(TokenKind::CloseParen));
        assert!(cursor.glimpse().is_none());
        assert!(!cursor.move_next());
        assert!(cursor.lookahead().is_none());
        assert_eq!(cursor.token().map(|t| t.kind), Some(TokenKind::CloseParen));
        assert!(!cursor.move_next());
    }

    #[test]
    fn test_set_input_resets() {
        let mut cursor = TokenCursor::new("@A");
        cursor.move_next();
        cursor.move_next();
        cursor.set_input("@B");
        assert!(cursor.token().is_none());
        assert!(cursor.move_next());
        assert_eq!(cursor.glimpse().map(|t| t.value.as_str()), Some("B"));
    }
}
