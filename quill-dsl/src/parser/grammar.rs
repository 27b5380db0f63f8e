//! Recursive-descent grammar for docblock annotations.

use super::validate;
use crate::lexer::{Token, TokenCursor, TokenKind};
use crate::schema::SchemaResolver;
use quill_core::{
    AnnotationError, AnnotationInstance, AnnotationResult, ArrayKey, ArrayValue, ParserConfig,
    Target, Value,
};
use tracing::trace;

/// Tokens that may start a class name.
const CLASS_IDENTIFIERS: [TokenKind; 5] = [
    TokenKind::Identifier,
    TokenKind::QualifiedName,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Null,
];

/// Deepest nesting of collections and annotations inside a value.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Result of the Annotation production.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Produced(AnnotationInstance),
    /// The name matched an ignore rule; nothing is produced.
    Skipped,
}

/// An entry of a parenthesized value list.
enum Entry {
    Named(String, Value),
    Positional(Value),
}

/// One `parse` session over a single input.
pub(crate) struct DocParser<'p> {
    pub(super) config: &'p ParserConfig,
    pub(super) resolver: &'p mut SchemaResolver,
    pub(super) context: &'p str,
    cursor: TokenCursor,
    target: Target,
    nested: bool,
    depth: usize,
}

impl<'p> DocParser<'p> {
    pub(crate) fn new(
        config: &'p ParserConfig,
        resolver: &'p mut SchemaResolver,
        context: &'p str,
        target: Target,
    ) -> Self {
        Self {
            config,
            resolver,
            context,
            cursor: TokenCursor::default(),
            target,
            nested: false,
            depth: 0,
        }
    }

    /// Parse every annotation in `input`, in order of appearance.
    pub(crate) fn parse(mut self, input: &str) -> AnnotationResult<Vec<AnnotationInstance>> {
        let Some(position) = find_initial_token_position(input) else {
            return Ok(Vec::new());
        };
        let body = input[position..].trim_matches(|c| matches!(c, '*' | ' ' | '/'));
        self.cursor.set_input(body);
        self.cursor.move_next();
        self.annotations()
    }

    // ========================================================================
    // ENTRY SCAN
    // ========================================================================

    fn annotations(&mut self) -> AnnotationResult<Vec<AnnotationInstance>> {
        let mut annotations = Vec::new();

        while self.cursor.lookahead().is_some() {
            if !self.starts_annotation() {
                self.cursor.move_next();
                continue;
            }

            self.nested = false;
            if let Outcome::Produced(annotation) = self.annotation()? {
                annotations.push(annotation);
            }
        }

        Ok(annotations)
    }

    /// `@` not glued to the previous token, directly followed by a name.
    fn starts_annotation(&self) -> bool {
        let Some(at) = self.cursor.lookahead() else {
            return false;
        };
        if at.kind != TokenKind::At {
            return false;
        }
        if self.cursor.token().is_some_and(|previous| previous.is_adjacent_to(at)) {
            return false;
        }
        self.cursor.glimpse().is_some_and(|name| {
            at.is_adjacent_to(name)
                && (name.kind == TokenKind::NamespaceSeparator || name.kind.is_identifier_class())
        })
    }

    // ========================================================================
    // ANNOTATION
    // ========================================================================

    pub(super) fn annotation(&mut self) -> AnnotationResult<Outcome> {
        self.expect(TokenKind::At)?;
        let original = self.identifier()?;

        let mut name = original.clone();
        if !name.starts_with('\\') {
            match self.resolve_annotation_name(&name) {
                Some(resolved) => name = resolved,
                None => {
                    if self.config.is_ignored(&original) {
                        trace!(annotation = %original, "skipping ignored annotation");
                        return Ok(Outcome::Skipped);
                    }
                    return Err(AnnotationError::NotImported {
                        name: original,
                        context: self.context.to_string(),
                    });
                }
            }
        }

        let name = name.trim_start_matches('\\').to_string();
        if !self.resolver.class_exists(&name) {
            return Err(AnnotationError::ClassNotFound {
                name,
                context: self.context.to_string(),
            });
        }

        let Some(metadata) = self.resolver.metadata_for(&name, self.config)? else {
            if self.config.ignore_not_imported_annotations
                || self.config.ignored_annotation_names.contains(&original)
            {
                trace!(annotation = %original, class = %name, "skipping non-annotation class");
                return Ok(Outcome::Skipped);
            }
            return Err(AnnotationError::NotAnAnnotation {
                class: name,
                name: original,
                context: self.context.to_string(),
            });
        };

        let target = if self.nested {
            Target::ANNOTATION
        } else {
            self.target
        };
        self.nested = true;

        if !target.is_empty() && !metadata.target().intersects(target) {
            return Err(AnnotationError::TargetNotAllowed {
                name: original,
                context: self.context.to_string(),
                allowed: metadata.target().describe(),
            });
        }

        let mut values = self.method_call()?;
        validate::check_enums(&metadata, &values, &original, self.context)?;
        validate::check_properties(&metadata, &mut values, &original, self.context, &*self.resolver)?;
        let instance = validate::instantiate(&metadata, values, &original, self.context, &*self.resolver)?;
        Ok(Outcome::Produced(instance))
    }

    fn method_call(&mut self) -> AnnotationResult<ArrayValue> {
        if !self.cursor.is_next(TokenKind::OpenParen) {
            return Ok(ArrayValue::new());
        }
        self.expect(TokenKind::OpenParen)?;
        let values = if self.cursor.is_next(TokenKind::CloseParen) {
            ArrayValue::new()
        } else {
            self.values()?
        };
        self.expect(TokenKind::CloseParen)?;
        Ok(values)
    }

    /// Comma-separated entries folded into a value map.
    ///
    /// Named entries set their key; the first positional entry becomes
    /// `value` and later ones turn `value` into a list.
    fn values(&mut self) -> AnnotationResult<ArrayValue> {
        let mut entries = Vec::new();
        entries.extend(self.value()?);

        while self.cursor.is_next(TokenKind::Comma) {
            self.expect(TokenKind::Comma)?;
            if self.cursor.is_next(TokenKind::CloseParen) {
                break;
            }
            entries.extend(self.value()?);
        }

        let mut values = ArrayValue::new();
        for entry in entries {
            match entry {
                Entry::Named(name, value) => values.insert(name, value),
                Entry::Positional(value) => {
                    if values.get_set("value").is_none() {
                        values.insert("value", value);
                        continue;
                    }
                    let key = ArrayKey::string("value");
                    if let Some(existing) = values.get_mut(&key) {
                        if !existing.is_array() {
                            let first = std::mem::replace(existing, Value::Null);
                            *existing = Value::Array(std::iter::once(first).collect());
                        }
                        if let Value::Array(list) = existing {
                            list.push(value);
                        }
                    }
                }
            }
        }
        Ok(values)
    }

    fn value(&mut self) -> AnnotationResult<Option<Entry>> {
        if self.cursor.glimpse().is_some_and(|t| t.kind == TokenKind::Equals) {
            return self.field_assignment();
        }
        Ok(self.plain_value()?.map(Entry::Positional))
    }

    fn field_assignment(&mut self) -> AnnotationResult<Option<Entry>> {
        let name = self.expect(TokenKind::Identifier)?.value;
        self.expect(TokenKind::Equals)?;
        Ok(self.plain_value()?.map(|value| Entry::Named(name, value)))
    }

    // ========================================================================
    // VALUES
    // ========================================================================

    /// `None` when the value was a nested annotation that got skipped.
    fn plain_value(&mut self) -> AnnotationResult<Option<Value>> {
        let Some(lookahead) = self.cursor.lookahead() else {
            return Err(self.syntax_error("PlainValue"));
        };

        match lookahead.kind {
            TokenKind::OpenBrace => Ok(Some(Value::Array(self.descend(Self::collection)?))),
            TokenKind::At => match self.descend(Self::annotation)? {
                Outcome::Produced(annotation) => Ok(Some(Value::from(annotation))),
                Outcome::Skipped => Ok(None),
            },
            TokenKind::Identifier | TokenKind::QualifiedName => Ok(Some(self.constant()?)),
            TokenKind::String => {
                let token = self.advance();
                Ok(Some(Value::String(token.value)))
            }
            TokenKind::Integer => {
                let token = self.advance();
                Ok(Some(Value::Int(parse_integer(&token.value))))
            }
            TokenKind::Float => {
                let text = lookahead.value.clone();
                let parsed = text
                    .parse::<f64>()
                    .map_err(|_| self.syntax_error("PlainValue"))?;
                self.advance();
                Ok(Some(Value::Float(parsed)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Some(Value::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Some(Value::Bool(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Some(Value::Null))
            }
            _ => Err(self.syntax_error("PlainValue")),
        }
    }

    fn descend<T>(&mut self, parse: fn(&mut Self) -> AnnotationResult<T>) -> AnnotationResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.syntax_error(&format!("at most {MAX_NESTING_DEPTH} levels of nesting")));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// `{...}`: keyed entries assign, unkeyed entries append.
    fn collection(&mut self) -> AnnotationResult<ArrayValue> {
        let mut array = ArrayValue::new();
        self.expect(TokenKind::OpenBrace)?;

        if self.cursor.is_next(TokenKind::CloseBrace) {
            self.expect(TokenKind::CloseBrace)?;
            return Ok(array);
        }

        let mut entries = vec![self.array_entry()?];
        while self.cursor.is_next(TokenKind::Comma) {
            self.expect(TokenKind::Comma)?;
            if self.cursor.is_next(TokenKind::CloseBrace) {
                break;
            }
            entries.push(self.array_entry()?);
        }
        self.expect(TokenKind::CloseBrace)?;

        for (key, value) in entries {
            let Some(value) = value else { continue };
            match key {
                Some(key) => array.insert(key, value),
                None => array.push(value),
            }
        }
        Ok(array)
    }

    fn array_entry(&mut self) -> AnnotationResult<(Option<ArrayKey>, Option<Value>)> {
        let keyed = self
            .cursor
            .glimpse()
            .is_some_and(|t| matches!(t.kind, TokenKind::Equals | TokenKind::Colon));
        if !keyed {
            return Ok((None, self.plain_value()?));
        }

        let key = if self.cursor.lookahead().is_some_and(|t| t.kind.is_name()) {
            let constant = self.constant()?;
            self.array_key(constant)?
        } else {
            let token = self.expect_any(&[TokenKind::Integer, TokenKind::String])?;
            ArrayKey::string(token.value)
        };
        self.expect_any(&[TokenKind::Equals, TokenKind::Colon])?;
        Ok((Some(key), self.plain_value()?))
    }

    fn array_key(&self, value: Value) -> AnnotationResult<ArrayKey> {
        match value {
            Value::Int(i) => Ok(ArrayKey::Int(i)),
            Value::String(s) => Ok(ArrayKey::string(s)),
            Value::Bool(b) => Ok(ArrayKey::Int(i64::from(b))),
            Value::Float(x) => Ok(ArrayKey::Int(x.trunc() as i64)),
            Value::Null => Ok(ArrayKey::Str(String::new())),
            other => Err(AnnotationError::IllegalKey {
                key_type: other.type_name().to_string(),
                context: self.context.to_string(),
            }),
        }
    }

    // ========================================================================
    // NAMES
    // ========================================================================

    /// Name tokens joined by separators glued to the previous token.
    pub(super) fn identifier(&mut self) -> AnnotationResult<String> {
        if !self.cursor.is_next_any(&CLASS_IDENTIFIERS) {
            return Err(self.syntax_error("namespace separator or identifier"));
        }
        let mut name = self.advance().value;

        while self.separator_follows() {
            self.expect(TokenKind::NamespaceSeparator)?;
            let part = self.expect_any(&CLASS_IDENTIFIERS)?;
            name.push('\\');
            name.push_str(&part.value);
        }
        Ok(name)
    }

    fn separator_follows(&self) -> bool {
        match (self.cursor.token(), self.cursor.lookahead()) {
            (Some(previous), Some(next)) => {
                next.kind == TokenKind::NamespaceSeparator && previous.is_adjacent_to(next)
            }
            _ => false,
        }
    }

    // ========================================================================
    // TOKEN HELPERS
    // ========================================================================

    /// Consume the lookahead; callers have already checked it exists.
    fn advance(&mut self) -> Token {
        let token = self.cursor.lookahead().cloned();
        self.cursor.move_next();
        token.unwrap_or_else(|| Token {
            kind: TokenKind::Other,
            value: String::new(),
            span: Default::default(),
        })
    }

    fn expect(&mut self, kind: TokenKind) -> AnnotationResult<Token> {
        if !self.cursor.is_next(kind) {
            return Err(self.syntax_error(&kind.to_string()));
        }
        Ok(self.advance())
    }

    fn expect_any(&mut self, kinds: &[TokenKind]) -> AnnotationResult<Token> {
        if !self.cursor.is_next_any(kinds) {
            let expected = kinds
                .iter()
                .map(TokenKind::to_string)
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(self.syntax_error(&expected));
        }
        Ok(self.advance())
    }

    fn syntax_error(&self, expected: &str) -> AnnotationError {
        let found = match self.cursor.lookahead() {
            Some(token) => format!("'{}' at position {}", token.value, token.position()),
            None => "end of string".to_string(),
        };
        AnnotationError::Syntax {
            expected: expected.to_string(),
            found,
            context: self.context.to_string(),
        }
    }
}

/// First `@` at the start of input or after a space, `*` or tab.
fn find_initial_token_position(input: &str) -> Option<usize> {
    input.char_indices().find_map(|(index, c)| {
        if c != '@' {
            return None;
        }
        let preceded_ok = input[..index]
            .chars()
            .next_back()
            .map_or(true, |previous| matches!(previous, ' ' | '*' | '\t'));
        preceded_ok.then_some(index)
    })
}

/// Out-of-range literals saturate.
fn parse_integer(text: &str) -> i64 {
    text.parse().unwrap_or(if text.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}
