/// Property-based tests for service resolution
///
/// These tests verify that resolution behavior follows expected patterns
/// regardless of the specific identifiers or chain shapes used.

use ferrous_wire::{Callable, ContainerBuilder, DiError, Param, Params};
use proptest::prelude::*;
use std::sync::Arc;

// Property: every link of an alias chain resolves to the terminal instance
proptest! {
    #[test]
    fn alias_chains_are_transparent(length in 1usize..12, value in any::<u64>()) {
        let mut builder = ContainerBuilder::new().instance("Link0", value);
        for i in 1..=length {
            builder = builder.define_str(format!("Link{}", i), &format!("@Link{}", i - 1));
        }
        let container = builder.build();

        let terminal = container.get("Link0").unwrap();
        for i in (0..=length).rev() {
            let id = format!("Link{}", i);
            let first = container.get(&id).unwrap();
            let second = container.get(&id).unwrap();
            prop_assert!(Arc::ptr_eq(&first, &second));
            prop_assert!(Arc::ptr_eq(&first, &terminal));
        }
        prop_assert_eq!(*container.get_as::<u64>(&format!("Link{}", length)).unwrap(), value);
    }
}

// Property: named variants of one base never alias each other
proptest! {
    #[test]
    fn named_variants_are_independent(
        names in proptest::collection::btree_set("[a-z]{1,6}", 2..6)
    ) {
        let mut builder = ContainerBuilder::new();
        for name in &names {
            builder = builder.instance(format!("Pool#{}", name), name.clone());
        }
        let container = builder.build();

        let resolved: Vec<_> = names
            .iter()
            .map(|name| container.get(&format!("Pool#{}", name)).unwrap())
            .collect();
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                prop_assert!(!Arc::ptr_eq(a, b));
            }
        }
    }
}

// Property: one error names every unresolvable parameter, in order
proptest! {
    #[test]
    fn missing_parameters_are_reported_together(
        flags in proptest::collection::vec(any::<bool>(), 1..8)
    ) {
        let params: Vec<Param> = flags
            .iter()
            .enumerate()
            .map(|(i, has_default)| {
                let param = Param::new(format!("p{}", i));
                if *has_default { param.with_default(i) } else { param }
            })
            .collect();
        let callable = Callable::new("target", params, |_, _| Ok(()));
        let container = ContainerBuilder::new().build();

        let expected: Vec<String> = flags
            .iter()
            .enumerate()
            .filter(|(_, has_default)| !**has_default)
            .map(|(i, _)| format!("p{}", i))
            .collect();

        match container.call(&callable, &Params::new()) {
            Ok(_) => prop_assert!(expected.is_empty()),
            Err(DiError::MissingParameters { callable, missing }) => {
                prop_assert_eq!(callable, "target");
                prop_assert_eq!(missing, expected);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}

// Property: has() agrees with get() for definitions and cached instances
proptest! {
    #[test]
    fn has_agrees_with_get(
        defined in proptest::collection::btree_set("[A-Z][a-z]{1,5}", 0..6),
        candidate in "[A-Z][a-z]{1,5}",
    ) {
        let mut builder = ContainerBuilder::new();
        for id in &defined {
            builder = builder.instance(id.clone(), id.len());
        }
        let container = builder.build();

        prop_assert_eq!(container.has(&candidate), defined.contains(&candidate));
        prop_assert_eq!(container.get(&candidate).is_ok(), defined.contains(&candidate));
    }
}
