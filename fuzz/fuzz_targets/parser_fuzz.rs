//! Fuzz test for the QUILL docblock parser
//!
//! Parses arbitrary text against the fixture schema under two settings:
//! strict (every unresolved name is an error) and lenient.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use quill_test_utils::fixtures::imports_parser;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut strict = imports_parser();
        if let Err(err) = strict.parse(input, "fuzz") {
            let message = err.to_string();
            assert!(message.starts_with('['), "Unprefixed error: {}", message);
        }

        let mut lenient = imports_parser();
        lenient.set_ignore_not_imported_annotations(true);
        if let Ok(annotations) = lenient.parse(input, "fuzz") {
            // Lenient parsing never yields more annotations than `@` signs.
            assert!(annotations.len() <= input.matches('@').count());
        }
    }
});
