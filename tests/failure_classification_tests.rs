//! Uncaught failures are returned, never propagated, and land in the right category.

use std::time::Duration;

use scriptbox::{Engine, ExecConfig, ExecutionState, Failure, FailureKind, Namespace, execute};

fn failure_of(code: &str) -> Failure {
    let result = execute(code, &Namespace::new());
    assert_eq!(result.state, ExecutionState::Failed, "expected a failure from {code:?}");
    result.failure.expect("failed result carries a failure")
}

#[test]
fn syntax_errors() {
    let failure = failure_of("x = (1 +\n");
    assert_eq!(failure.kind, FailureKind::Syntax);
    assert_eq!(failure.exception, "SyntaxError");

    let failure = failure_of("if True:\nprint(1)\n");
    assert_eq!(failure.kind, FailureKind::Syntax);
    assert_eq!(failure.exception, "IndentationError");

    let failure = failure_of("s = 'unterminated\n");
    assert_eq!(failure.kind, FailureKind::Syntax);
}

#[test]
fn assertion_errors() {
    let failure = failure_of("assert 1 == 2");
    assert_eq!(failure.kind, FailureKind::Assertion);
    assert_eq!(failure.message, "");
    insta::assert_snapshot!(failure.to_string(), @"AssertionError (line 1, column 1)");

    let failure = failure_of("x = 3\nassert x < 2, f'x was {x}'");
    assert_eq!(failure.message, "x was 3");

    let failure = failure_of("raise AssertionError('explicit')");
    assert_eq!(failure.kind, FailureKind::Assertion);
}

#[test]
fn runtime_errors() {
    let cases = [
        ("missing + 1", "NameError", "name 'missing' is not defined"),
        ("1 + 'a'", "TypeError", "unsupported operand type(s) for +: 'int' and 'str'"),
        ("{'a': 1}['b']", "KeyError", "'b'"),
        ("[1, 2][5]", "IndexError", "list index out of range"),
        ("int('x')", "ValueError", "invalid literal for int() with base 10: 'x'"),
        ("1 // 0", "ZeroDivisionError", "integer division or modulo by zero"),
        ("1.5 / 0", "ZeroDivisionError", "float division by zero"),
        ("(1).foo", "AttributeError", "'int' object has no attribute 'foo'"),
        ("import os", "ImportError", "No module named 'os'"),
        ("raise ValueError('bad value')", "ValueError", "bad value"),
        ("raise TimeoutError('user raised')", "TimeoutError", "user raised"),
        ("2 ** 64 * 2 ** 64", "OverflowError", "integer result too large to represent"),
    ];
    for (code, exception, message) in cases {
        let failure = failure_of(code);
        assert_eq!(failure.kind, FailureKind::Runtime, "{code}");
        assert_eq!(failure.exception, exception, "{code}");
        assert_eq!(failure.message, message, "{code}");
    }
}

#[test]
fn caught_exceptions_do_not_fail_the_run() {
    let code = r#"
try:
    {}["k"]
except KeyError as e:
    print("caught", repr(e))
try:
    raise ValueError("v")
except (TypeError, ValueError):
    print("tuple match")
finally:
    print("finally")
"#;
    let result = execute(code, &Namespace::new());
    assert!(result.is_success(), "{:?}", result.failure);
    insta::assert_snapshot!(result.stdout, @r"
    caught KeyError('k')
    tuple match
    finally
    ");
    assert!(result.namespace.get("e").is_none());
}

#[test]
fn failure_positions_point_at_the_innermost_expression() {
    let code = "def f(d):\n    return d['missing']\n\nf({})\n";
    let failure = failure_of(code);
    assert_eq!(failure.exception, "KeyError");
    insta::assert_snapshot!(failure.to_string(), @"KeyError: 'missing' (line 2, column 12)");
}

#[test]
fn engine_interrupts() {
    let engine = Engine::new(ExecConfig::default().with_max_steps(100));
    let result = engine.execute("while True:\n    pass", &Namespace::new());
    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Interrupted);
    insta::assert_snapshot!(
        failure.to_string(),
        @"TimeoutError: execution exceeded its budget of 100 steps (line 2, column 5)"
    );

    let engine = Engine::new(ExecConfig::default().with_deadline(Duration::from_millis(10)));
    let result = engine.execute("i = 0\nwhile True:\n    i += 1", &Namespace::new());
    assert_eq!(result.failure.unwrap().kind, FailureKind::Interrupted);
}

#[test]
fn recursion_limit_is_configurable() {
    let code = "def depth(n):\n    if n == 0:\n        return 0\n    return 1 + depth(n - 1)\nd = depth(50)";
    let engine = Engine::new(ExecConfig::default().with_max_call_depth(20));
    let failure = engine.execute(code, &Namespace::new()).failure.unwrap();
    assert_eq!(failure.exception, "RecursionError");
    assert_eq!(failure.message, "maximum recursion depth exceeded");

    let result = execute(code, &Namespace::new());
    assert!(result.is_success());
}

#[test]
fn oversized_format_precision_is_a_value_error() {
    let failure = failure_of("x = 1.0\ns = f'{x:.70000f}'");
    assert_eq!(failure.kind, FailureKind::Runtime);
    assert_eq!(failure.exception, "ValueError");
    assert_eq!(failure.message, "precision too big");

    let failure = failure_of("s = '{:>99999999}'.format(1)");
    assert_eq!(failure.exception, "ValueError");
    assert_eq!(failure.message, "width too big");
}

#[test]
fn comprehensions_over_large_ranges_honor_limits() {
    let code = "xs = [0 for i in range(60000000)]";

    let engine = Engine::new(ExecConfig::default().with_max_steps(1_000));
    let failure = engine.execute(code, &Namespace::new()).failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Interrupted);
    assert_eq!(failure.exception, "TimeoutError");

    let engine = Engine::new(ExecConfig::default().with_deadline(Duration::from_millis(50)));
    let started = std::time::Instant::now();
    let failure = engine.execute(code, &Namespace::new()).failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Interrupted);
    assert!(started.elapsed() < Duration::from_secs(5), "took {:?}", started.elapsed());
}
