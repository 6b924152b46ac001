#![no_main]

use ferrous_wire::{ContainerBuilder, DiError};
use libfuzzer_sys::fuzz_target;

// Each byte wires Node{i} to another node or to Leaf. Every chain either
// reaches Leaf or runs into a cycle.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() || data.len() > 64 {
        return;
    }
    let n = data.len();

    let mut builder = ContainerBuilder::new().instance("Leaf", 7u32);
    for (i, byte) in data.iter().enumerate() {
        let target = *byte as usize % (n + 1);
        let raw = if target == n {
            "@Leaf".to_string()
        } else {
            format!("@Node{}", target)
        };
        builder = builder.define_str(format!("Node{}", i), &raw);
    }
    let container = builder.build();

    for i in 0..n {
        match container.get_as::<u32>(&format!("Node{}", i)) {
            Ok(value) => assert_eq!(*value, 7),
            Err(DiError::Circular(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
});
