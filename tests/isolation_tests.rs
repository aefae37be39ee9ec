//! Executions never observe each other's bindings, sequentially or concurrently.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scriptbox::{CancelToken, Engine, ExecConfig, FailureKind, Namespace, Value};

#[test]
fn sequential_runs_start_from_their_own_namespace() {
    let engine = Engine::default();
    let first = engine.execute("leaked = 1\nshared = 'changed'", &Namespace::build([("shared", "orig")]).unwrap());
    assert_eq!(first.namespace.get("leaked"), Some(&Value::from(1)));

    let second = engine.execute(
        "print(globals().get('leaked'))\nprint(shared)",
        &Namespace::build([("shared", "orig")]).unwrap(),
    );
    assert_eq!(second.stdout, "None\norig\n");
}

#[test]
fn caller_namespace_is_never_mutated() {
    let initial = Namespace::build([("items", Value::from(vec![Value::from(1)]))]).unwrap();
    let snapshot = initial.clone();
    let result = scriptbox::execute("items.append(2)\nglobals()['extra'] = True", &initial);
    assert!(result.is_success());
    assert_eq!(initial, snapshot);
    assert_eq!(
        result.namespace.get("items"),
        Some(&Value::from(vec![Value::from(1), Value::from(2)]))
    );
    assert_eq!(result.namespace.get("extra"), Some(&Value::from(true)));
}

#[test]
fn builtins_are_not_part_of_the_namespace() {
    let result = scriptbox::execute("x = len([1, 2])", &Namespace::new());
    let names: Vec<&str> = result.namespace.names().collect();
    assert_eq!(names, vec!["x"]);
}

#[test]
fn rebinding_a_builtin_stays_local_to_one_run() {
    let engine = Engine::default();
    let shadowed = engine.execute("def len(x):\n    return -1\nn = len([1, 2, 3])", &Namespace::new());
    assert_eq!(shadowed.namespace.get("n"), Some(&Value::from(-1)));

    let fresh = engine.execute("n = len([1, 2, 3])", &Namespace::new());
    assert_eq!(fresh.namespace.get("n"), Some(&Value::from(3)));
}

#[test]
fn concurrent_runs_share_nothing() {
    let engine = Arc::new(Engine::default());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let ns = Namespace::build([("seed", i)]).unwrap();
                let code = "total = 0\nfor k in range(1000):\n    total += seed\nprint(seed)";
                (i, engine.execute(code, &ns))
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.join().unwrap();
        assert!(result.is_success(), "run {i} failed: {:?}", result.failure);
        assert_eq!(result.stdout, format!("{i}\n"));
        assert_eq!(result.namespace.get("total"), Some(&Value::from(i64::from(i) * 1000)));
    }
}

#[test]
fn cancel_from_another_thread() {
    let engine = Engine::default();
    let token = CancelToken::new();
    let canceller = {
        let token = token.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.cancel();
        })
    };
    let result = engine.execute_with_cancel("n = 0\nwhile True:\n    n += 1\n", &Namespace::new(), &token);
    canceller.join().unwrap();

    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Interrupted);
    assert_eq!(failure.exception, "KeyboardInterrupt");
    assert!(matches!(result.namespace.get("n"), Some(Value::Number(_))));
}

#[test]
fn interrupts_cannot_be_caught() {
    let engine = Engine::new(ExecConfig::default().with_max_steps(50));
    let code = "caught = False\ntry:\n    while True:\n        pass\nexcept BaseException:\n    caught = True\nfinally:\n    cleaned = True\n";
    let result = engine.execute(code, &Namespace::new());
    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Interrupted);
    assert_eq!(failure.exception, "TimeoutError");
    assert_eq!(result.namespace.get("caught"), Some(&Value::from(false)));
    assert_eq!(result.namespace.get("cleaned"), None);
}

#[test]
fn deep_recursion_is_a_recursion_error_not_a_crash() {
    let result = scriptbox::execute("def f(n):\n    return f(n + 1)\nf(0)", &Namespace::new());
    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Runtime);
    assert_eq!(failure.exception, "RecursionError");
}

#[test]
fn long_flat_expressions_are_contained_syntax_errors() {
    for code in [
        format!("x = 1{}\n", " + 1".repeat(6000)),
        format!("x = 1{}\n", " ** 1".repeat(10000)),
        format!("x = [1]{}\n", "[0]".repeat(6000)),
    ] {
        let result = scriptbox::execute(&code, &Namespace::new());
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Syntax);
        assert_eq!(failure.exception, "SyntaxError");
        assert_eq!(failure.message, "expression is too deeply nested");
        assert!(result.namespace.is_empty());
    }

    let result = scriptbox::execute(&format!("x = 1{}\n", " + 1".repeat(150)), &Namespace::new());
    assert_eq!(result.namespace.get("x"), Some(&Value::from(151)));
}

#[test]
fn small_worker_stacks_raise_recursion_error_instead_of_overflowing() {
    let engine = Engine::new(
        ExecConfig::default()
            .with_stack_size(2 * 1024 * 1024)
            .with_max_call_depth(1_000_000),
    );
    let result = engine.execute("def f(n):\n    return f(n + 1)\nf(0)", &Namespace::new());
    let failure = result.failure.unwrap();
    assert_eq!(failure.kind, FailureKind::Runtime);
    assert_eq!(failure.exception, "RecursionError");
    assert_eq!(failure.message, "maximum recursion depth exceeded");
}
