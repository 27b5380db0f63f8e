//! Fuzz test for the QUILL annotation lexer
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use quill_dsl::{Lexer, TokenKind};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens = Lexer::new(input).tokenize();

        let mut previous_end = 0;
        for token in &tokens {
            // Spans are ordered, non-overlapping and on char boundaries.
            assert!(token.span.start >= previous_end, "Spans must not overlap");
            assert!(token.span.start < token.span.end, "Tokens are never empty");
            assert!(input.is_char_boundary(token.span.start));
            assert!(input.is_char_boundary(token.span.end));
            assert!(token.span.line >= 1 && token.span.column >= 1);
            if token.kind != TokenKind::String {
                assert_eq!(&input[token.span.start..token.span.end], token.value);
            }
            previous_end = token.span.end;
        }
    }
});
