#![no_main]

use leveldeck_core::Validator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Well-formed JSON exercises the structural walker rather than the parser
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(level) = Validator::default().validate(&value) {
            // A valid level must survive its own serialization
            let again = serde_json::to_value(&level).expect("level serializes");
            assert!(Validator::default().validate(&again).is_ok());
        }
    }
});
