//! Property-based tests for the engine
//!
//! These tests use proptest to verify invariants across many randomly generated namespaces and outputs.

use proptest::prelude::*;
use scriptbox::{Namespace, NamespaceBuilder, Value, execute};

// =============================================================================
// Generators
// =============================================================================

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        // Finite floats only: NaN never equals itself.
        (-1e12f64..1e12).prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(Value::from),
        ]
    })
}

fn name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}".prop_filter("reserved word", |n| {
        !scriptbox_core::lang::keywords::is_reserved(n) && n != "untouched"
    })
}

// =============================================================================
// Engine Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: bindings the code does not touch come back deep-equal.
    #[test]
    fn injected_values_round_trip(bindings in prop::collection::btree_map(name(), value(), 0..5)) {
        let ns = Namespace::build(bindings.clone()).unwrap();
        let result = execute("untouched = 1", &ns);
        prop_assert!(result.is_success());
        for (name, value) in &bindings {
            prop_assert_eq!(result.namespace.get(name), Some(value));
        }
        prop_assert_eq!(result.namespace.len(), bindings.len() + 1);
    }

    /// Property: printing a bound string reproduces it exactly.
    #[test]
    fn printed_text_is_captured_verbatim(text in "[ -~\n\t]{0,40}") {
        let ns = NamespaceBuilder::new().bind("text", text.as_str()).build().unwrap();
        let result = execute("print(text, end='')", &ns);
        prop_assert_eq!(result.stdout, text);
    }

    /// Property: any bound value compares equal to itself in executed code.
    #[test]
    fn bound_values_equal_themselves(v in value()) {
        let ns = NamespaceBuilder::new().bind("v", v).build().unwrap();
        let result = execute("same = v == v", &ns);
        prop_assert_eq!(result.namespace.get("same"), Some(&Value::from(true)));
    }

    /// Property: two builds from the same input are deep-equal and independent.
    #[test]
    fn builder_is_idempotent(bindings in prop::collection::btree_map(name(), value(), 0..5)) {
        let first = Namespace::build(bindings.clone()).unwrap();
        let mut second = Namespace::build(bindings).unwrap();
        prop_assert_eq!(&first, &second);
        second.set("extra_binding", 1).unwrap();
        prop_assert!(!first.contains("extra_binding"));
    }

    /// Property: integer arithmetic matches Rust's checked arithmetic, or fails with OverflowError.
    #[test]
    fn int_addition_is_checked(a in any::<i64>(), b in any::<i64>()) {
        let ns = Namespace::build([("a", a), ("b", b)]).unwrap();
        let result = execute("c = a + b", &ns);
        match a.checked_add(b) {
            Some(c) => prop_assert_eq!(result.namespace.get("c"), Some(&Value::from(c))),
            None => prop_assert_eq!(result.failure.map(|f| f.exception), Some("OverflowError".to_string())),
        }
    }
}
