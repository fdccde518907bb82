#![no_main]

use leveldeck_core::{RawDocument, UnknownFieldPolicy, ValidationOptions, Validator};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let strict = Validator::new(ValidationOptions {
        unknown_fields: UnknownFieldPolicy::Deny,
    });

    // Any outcome is fine as long as neither parser nor walker panics
    for document in [RawDocument::json(data), RawDocument::yaml(data)] {
        let _ = Validator::default().validate_document(&document);
        let _ = strict.validate_document(&document);
    }
});
