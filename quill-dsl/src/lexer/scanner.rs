//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Single forward pass over a docblock body.
///
/// Whitespace and runs of `*` separate tokens and are never emitted.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Tokenize the entire source.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_padding();

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let c = self.peek_char()?;
        let (kind, value) = match c {
            '@' => self.single(TokenKind::At),
            '(' => self.single(TokenKind::OpenParen),
            ')' => self.single(TokenKind::CloseParen),
            '{' => self.single(TokenKind::OpenBrace),
            '}' => self.single(TokenKind::CloseBrace),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '=' => self.single(TokenKind::Equals),
            '"' => self.scan_string(),
            '\\' if self.peek_nth(1).is_some_and(is_name_start) => self.scan_name(),
            '\\' => self.single(TokenKind::NamespaceSeparator),
            '+' | '-' if self.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.scan_number()
            }
            d if d.is_ascii_digit() => self.scan_number(),
            n if is_name_start(n) => self.scan_name(),
            _ => self.single(TokenKind::Other),
        };

        Some(Token {
            kind,
            value,
            span: Span {
                start: start_pos,
                end: self.pos,
                line: start_line,
                column: start_col,
            },
        })
    }

    fn skip_padding(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == '*' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> (TokenKind, String) {
        let value = self.advance().map(String::from).unwrap_or_default();
        (kind, value)
    }

    /// `"..."` with `\"` and `\\` collapsed; other escapes are kept verbatim.
    ///
    /// An unterminated string yields the quote alone as an `Other` token.
    fn scan_string(&mut self) -> (TokenKind, String) {
        let checkpoint = (self.chars.clone(), self.pos, self.line, self.column);
        self.advance();

        let mut value = String::new();
        loop {
            match self.peek_char() {
                None => {
                    let (chars, pos, line, column) = checkpoint;
                    self.chars = chars;
                    self.pos = pos;
                    self.line = line;
                    self.column = column;
                    return self.single(TokenKind::Other);
                }
                Some('"') => {
                    self.advance();
                    return (TokenKind::String, value);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some(escaped @ ('"' | '\\')) => {
                            self.advance();
                            value.push(escaped);
                        }
                        _ => value.push('\\'),
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
    }

    /// Optional sign, digits, optional fraction, optional exponent.
    fn scan_number(&mut self) -> (TokenKind, String) {
        let start = self.pos;
        let mut is_float = false;

        if matches!(self.peek_char(), Some('+' | '-')) {
            self.advance();
        }
        self.eat_digits();

        if self.peek_char() == Some('.') && self.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.eat_digits();
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            let digit_at = match self.peek_nth(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if self.peek_nth(digit_at).is_some_and(|d| d.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        (kind, self.source[start..self.pos].to_string())
    }

    fn eat_digits(&mut self) {
        while self.peek_char().is_some_and(|d| d.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Names may embed `\` separators and `::` as long as a name character follows.
    fn scan_name(&mut self) -> (TokenKind, String) {
        let start = self.pos;
        let mut qualified = false;

        if self.peek_char() == Some('\\') {
            qualified = true;
            self.advance();
        }

        loop {
            match self.peek_char() {
                Some(c) if is_name_char(c) => {
                    self.advance();
                }
                Some('\\') if self.peek_nth(1).is_some_and(is_name_start) => {
                    qualified = true;
                    self.advance();
                }
                Some(':')
                    if self.peek_nth(1) == Some(':')
                        && self.peek_nth(2).is_some_and(is_name_start) =>
                {
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }

        let text = &self.source[start..self.pos];
        let kind = if qualified {
            TokenKind::QualifiedName
        } else {
            match text.to_lowercase().as_str() {
                "true" => TokenKind::True,
                "false" => TokenKind::False,
                "null" => TokenKind::Null,
                _ => TokenKind::Identifier,
            }
        };
        (kind, text.to_string())
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let (idx, c) = self.chars.next()?;
        self.pos = idx + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lexer_punctuation() {
        assert_eq!(
            kinds("@ ( ) { } , : ="),
            vec![
                TokenKind::At,
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Equals,
            ]
        );
    }

    #[test]
    fn test_lexer_skips_stars_and_whitespace() {
        let tokens = Lexer::new("*\n * @Foo\t**").tokenize();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::At);
        assert_eq!(tokens[0].span.line, 2);
        assert_eq!(tokens[1].value, "Foo");
    }

    #[test]
    fn test_lexer_keywords_ignore_case() {
        assert_eq!(
            kinds("true FALSE Null nullable"),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn test_lexer_numbers() {
        let tokens = Lexer::new("1 -123 +5 1.2 -123.456 1e2 1.2e-3 7E+1").tokenize();
        let pairs: Vec<_> = tokens.iter().map(|t| (t.kind, t.value.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                (TokenKind::Integer, "1"),
                (TokenKind::Integer, "-123"),
                (TokenKind::Integer, "+5"),
                (TokenKind::Float, "1.2"),
                (TokenKind::Float, "-123.456"),
                (TokenKind::Float, "1e2"),
                (TokenKind::Float, "1.2e-3"),
                (TokenKind::Float, "7E+1"),
            ]
        );
    }

    #[test]
    fn test_lexer_minus_without_digit_is_other() {
        assert_eq!(kinds("- a"), vec![TokenKind::Other, TokenKind::Identifier]);
    }

    #[test]
    fn test_lexer_string_escapes() {
        let tokens = Lexer::new(r#""b\"a\"r" "ba\\z" "bla\h""#).tokenize();
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec![r#"b"a"r"#, r"ba\z", r"bla\h"]);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::String));
        assert_eq!(tokens[0].span.end - tokens[0].span.start, 9);
    }

    #[test]
    fn test_lexer_unterminated_string() {
        let tokens = Lexer::new(r#""abc"#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Other);
        assert_eq!(tokens[0].value, "\"");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value, "abc");
    }

    #[test]
    fn test_lexer_single_quotes_are_other() {
        assert_eq!(
            kinds("'bar'"),
            vec![TokenKind::Other, TokenKind::Identifier, TokenKind::Other]
        );
    }

    #[test]
    fn test_lexer_qualified_names() {
        let tokens = Lexer::new(r"\Foo\Bar Baz::QUX Foo\ Bar").tokenize();
        let pairs: Vec<_> = tokens.iter().map(|t| (t.kind, t.value.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                (TokenKind::QualifiedName, r"\Foo\Bar"),
                (TokenKind::Identifier, "Baz::QUX"),
                (TokenKind::Identifier, "Foo"),
                (TokenKind::NamespaceSeparator, r"\"),
                (TokenKind::Identifier, "Bar"),
            ]
        );
    }

    #[test]
    fn test_lexer_colon_after_name() {
        assert_eq!(
            kinds("{foo: 1}"),
            vec![
                TokenKind::OpenBrace,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Integer,
                TokenKind::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_lexer_non_ascii_identifiers() {
        let tokens = Lexer::new("@Fähre(größe=1)").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value, "Fähre");
        assert_eq!(tokens[3].value, "größe");
        assert!(tokens[0].is_adjacent_to(&tokens[1]));
    }
}
