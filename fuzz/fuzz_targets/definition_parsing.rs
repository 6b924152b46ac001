#![no_main]

use ferrous_wire::{Definition, Identifier};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(id) = Identifier::parse(raw) {
        // Printing must reproduce the input exactly
        assert_eq!(id.to_string(), raw);
        if let Some(variant) = id.variant() {
            assert!(!variant.is_empty());
        }
    }

    let _ = Definition::parse(raw);
});
