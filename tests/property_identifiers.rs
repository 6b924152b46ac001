/// Property-based tests for identifier and definition parsing
///
/// Parsing must be total (never panic) and the parsed form must print back
/// to the string it came from.

use ferrous_wire::{Definition, Identifier};
use proptest::prelude::*;

fn type_name() -> impl Strategy<Value = String> {
    proptest::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,8}", 1..4)
        .prop_map(|segments| segments.join("."))
}

fn variant_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,8}"
}

proptest! {
    #[test]
    fn parsing_never_panics(raw in "\\PC{0,40}") {
        let _ = Identifier::parse(&raw);
        let _ = Definition::parse(&raw);
    }

    #[test]
    fn plain_identifiers_round_trip(name in type_name()) {
        let parsed = Identifier::parse(&name).unwrap();
        prop_assert!(parsed.is_plain());
        prop_assert_eq!(parsed.base(), name.as_str());
        prop_assert_eq!(parsed.to_string(), name);
    }

    #[test]
    fn named_identifiers_split_on_sigil(base in type_name(), variant in variant_name()) {
        let raw = format!("{}#{}", base, variant);
        let parsed = Identifier::parse(&raw).unwrap();
        prop_assert_eq!(parsed.base(), base.as_str());
        prop_assert_eq!(parsed.variant(), Some(variant.as_str()));
        prop_assert_eq!(parsed.to_string(), raw.clone());

        let alias = Identifier::parse(&format!("@{}", raw)).unwrap();
        prop_assert_eq!(alias, Identifier::Alias(raw));
    }

    #[test]
    fn alias_of_alias_is_rejected(name in type_name()) {
        let raw = format!("@@{}", name);
        prop_assert!(Identifier::parse(&raw).is_err());
    }

    #[test]
    fn variant_definitions_keep_their_name(variant in variant_name()) {
        let parsed = Definition::parse(&format!("#{}", variant)).unwrap();
        prop_assert!(matches!(parsed, Definition::Variant(ref v) if *v == variant));
    }
}
