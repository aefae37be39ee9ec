//! End-to-end tests for executing code against injected globals.
//!
//! `tests/fixtures/test_globals.py` is the script an external runner feeds the engine; these tests drive it the
//! same way.

use scriptbox::{ExecutionState, FailureKind, Namespace, NamespaceBuilder, Value, execute};

const FIXTURE: &str = include_str!("fixtures/test_globals.py");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fixture_bindings(test_number: i64) -> NamespaceBuilder {
    NamespaceBuilder::new()
        .bind("test_boolean", true)
        .bind("test_none", Value::Null)
        .bind("test_number", test_number)
        .bind("test_array", vec![Value::from(1), Value::from(2), Value::from(3)])
        .bind(
            "test_dict",
            Value::mapping([("inner_dict", Value::mapping([("a", Value::from(1)), ("b", Value::from(2))]))]),
        )
}

#[test]
fn matching_globals_pass_every_assertion() {
    init_tracing();
    let ns = fixture_bindings(42).build().unwrap();
    let code = r#"
assert globals().get("test_boolean") == True
assert globals().get("test_none") == None
assert globals().get("test_number") == 42
assert globals().get("test_array") == [1, 2, 3]
assert globals().get("test_dict") == {"inner_dict": {"a": 1, "b": 2}}
"#;
    let result = execute(code, &ns);
    assert_eq!(result.state, ExecutionState::Completed);
    assert!(result.failure.is_none());
    assert_eq!(result.stdout, "");
    assert_eq!(result.namespace, ns);
}

#[test]
fn fixture_script_completes_and_prints_none() {
    init_tracing();
    let ns = fixture_bindings(42).build().unwrap();
    let result = execute(FIXTURE, &ns);
    assert!(result.is_success(), "unexpected failure: {:?}", result.failure);
    assert_eq!(result.stdout, "None\n");
    assert_eq!(result.namespace.get("string"), Some(&Value::Null));
    assert_eq!(
        result.namespace.get("test_global"),
        Some(&Value::Unrepresentable {
            type_name: "function".into()
        })
    );
    for (name, value) in ns.iter() {
        assert_eq!(result.namespace.get(name), Some(value), "{name} changed");
    }
}

#[test]
fn mismatched_global_fails_the_assertion() {
    init_tracing();
    let ns = fixture_bindings(41).build().unwrap();
    let result = execute(FIXTURE, &ns);
    assert_eq!(result.state, ExecutionState::Failed);
    assert_eq!(result.stdout, "");
    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Assertion);
    assert_eq!(failure.exception, "AssertionError");
    assert_eq!(failure.message, "test_number is incorrect, expected 42, got 41");
    assert_eq!(failure.line, Some(7));
    insta::assert_snapshot!(
        failure.to_string(),
        @"AssertionError: test_number is incorrect, expected 42, got 41 (line 7, column 5)"
    );
}

#[test]
fn unbound_global_reads_as_none() {
    let result = execute("print(globals().get(\"test_string\"))", &Namespace::new());
    assert_eq!(result.state, ExecutionState::Completed);
    assert_eq!(result.stdout, "None\n");
}

#[test]
fn syntax_error_leaves_namespace_untouched() {
    let ns = fixture_bindings(42).build().unwrap();
    let result = execute("test_number = 1\nprint((test_number)\n", &ns);
    assert_eq!(result.state, ExecutionState::Failed);
    assert_eq!(result.stdout, "");
    assert_eq!(result.namespace, ns);
    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Syntax);
    assert_eq!(failure.exception, "SyntaxError");
}

#[test]
fn quoted_string_prints_verbatim() {
    let text = "Hello! :') \"";
    let ns = NamespaceBuilder::new().bind("test_string", text).build().unwrap();
    let result = execute(FIXTURE.lines().skip(14).collect::<Vec<_>>().join("\n").as_str(), &ns);
    assert!(result.is_success(), "unexpected failure: {:?}", result.failure);
    assert_eq!(result.stdout, format!("{text}\n"));

    let with_backslash = "back\\slash 'single' \"double\"";
    let ns = NamespaceBuilder::new().bind("test_string", with_backslash).build().unwrap();
    let result = execute("print(test_string)", &ns);
    assert_eq!(result.stdout, format!("{with_backslash}\n"));
}

#[test]
fn fixture_globals_from_json() {
    let json = serde_json::json!({
        "test_number": 42,
        "test_string": "Hello! :') \"",
        "test_array": [1, 2, 3],
        "test_dict": {"a": 1, "b": 2},
    });
    let ns = Namespace::from_json(&json).unwrap();
    let result = execute("print(test_string)\nprint(test_dict['b'] + test_array[-1])", &ns);
    assert_eq!(result.stdout, "Hello! :') \"\n5\n");
    assert_eq!(result.namespace.to_json(), json);
}

#[test]
fn failure_keeps_partial_output_and_state() {
    let result = execute("print('start')\ncount = 3\ncount = count / 0\nprint('never')", &Namespace::new());
    assert_eq!(result.stdout, "start\n");
    assert_eq!(result.namespace.get("count"), Some(&Value::from(3)));
    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Runtime);
    insta::assert_snapshot!(failure.to_string(), @"ZeroDivisionError: division by zero (line 3, column 9)");
}
