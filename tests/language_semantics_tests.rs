//! Behaviour of the executed language, checked through captured output.

use scriptbox::{Namespace, Value, execute};

/// Run `code` and return its output, failing the test on any uncaught exception.
fn output_of(code: &str) -> String {
    let result = execute(code, &Namespace::new());
    if let Some(failure) = &result.failure {
        panic!("unexpected failure: {failure}\n--- code ---\n{code}");
    }
    result.stdout
}

#[test]
fn arithmetic_follows_python() {
    let out = output_of(
        r#"
print(7 / 2, 7 // 2, -7 // 2, 7 % 3, -7 % 3, 7 % -3)
print(2 ** 10, 2 ** -1, 10 / 5)
print(0.1 + 0.2, 1e20, 1.5e-7, 3.0)
print(-7.5 // 2, 7.5 % 2)
print(True + True, 1 == 1.0, True == 1)
print(round(2.5), round(3.5), round(2.675, 2), abs(-3))
print(int("  -12 "), int(3.9), float("1.5"), int("1_000"))
"#,
    );
    insta::assert_snapshot!(out, @r"
    3.5 3 -4 1 2 -2
    1024 0.5 2.0
    0.30000000000000004 1e+20 1.5e-07 3.0
    -4.0 1.5
    2 True True
    2 4 2.67 3
    -12 3 1.5 1000
    ");
}

#[test]
fn strings_and_methods() {
    let out = output_of(
        r#"
s = "  Hello, World  "
print(s.strip(), s.lower().strip(), s.upper().strip())
print("a,b,,c".split(","), "a b  c".split(), "x-y-z".split("-", 1))
print("-".join(["a", "b", "c"]), "abc".startswith("ab"), "abc".endswith(("x", "c")))
print("banana".replace("a", "o"), "banana".replace("a", "o", 1), "banana".find("n"), "banana".count("a"))
print("123".isdigit(), "abc".isalpha(), "a1".isalpha())
print("abc"[1], "abcdef"[1:4], "abcdef"[::-1], "abc" * 2, len("héllo"))
print(repr("it's"), repr('say "hi"'), str(None))
print("{} + {} = {}".format(1, 2, 3), "{name}!".format(name="hey"), "{0:>5}|{0:<5}|".format("ab"))
"#,
    );
    insta::assert_snapshot!(out, @r#"
    Hello, World hello, world HELLO, WORLD
    ['a', 'b', '', 'c'] ['a', 'b', 'c'] ['x', 'y-z']
    a-b-c True True
    bonono bonana 2 3
    True True False
    b bcd fedcba abcabc 5
    "it's" 'say "hi"' None
    1 + 2 = 3 hey!    ab|ab   |
    "#);
}

#[test]
fn f_strings() {
    let out = output_of(
        r#"
name = "x"
value = 3.14159
items = [1, 2]
print(f"{name}={value:.2f} {items} {name!r} {{literal}} {value:>8.3f}")
print(f"{len(items) * 10:04d} {'nested'} {1 + 1}")
"#,
    );
    insta::assert_snapshot!(out, @r"
    x=3.14 [1, 2] 'x' {literal}    3.142
    0020 nested 2
    ");
}

#[test]
fn containers() {
    let out = output_of(
        r#"
xs = [3, 1, 2]
xs.append(4)
xs.extend((5, 6))
xs.insert(0, 0)
print(xs, xs.pop(), xs.pop(0), xs.index(2), xs.count(1))
xs.remove(1)
xs.sort(reverse=True)
print(xs, sorted(["bb", "a", "ccc"], key=len), list(reversed([1, 2, 3])))
d = {"b": 2, "a": 1}
d["c"] = 3
print(d, list(d.keys()), d.get("zz"), d.get("zz", 0), d.pop("b"), d)
d.update({"a": 10}, e=5)
print(d.setdefault("f", []), d, len(d), "a" in d, 10 in d)
del d["a"]
print(d.items(), d.copy() == d, d.copy() is d)
t = (1, 2, 3)
a, b, c = t
print(t, a + b + c, t[-1], t[1:], (1,), ())
print([1, [2, [3]]] == [1, [2, [3]]], {"a": [1]} == {"a": [1]}, [1, 2] < [1, 3])
"#,
    );
    insta::assert_snapshot!(out, @r"
    [3, 1, 2, 4, 5] 6 0 2 1
    [5, 4, 3, 2] ['a', 'bb', 'ccc'] [3, 2, 1]
    {'a': 1, 'c': 3} ['b', 'a', 'c'] None 0 2 {'a': 1, 'c': 3}
    [] {'a': 10, 'c': 3, 'e': 5, 'f': []} 4 True False
    [('c', 3), ('e', 5), ('f', [])] True False
    (1, 2, 3) 6 3 (2, 3) (1,) ()
    True True True
    ");
}

#[test]
fn control_flow() {
    let out = output_of(
        r#"
total = 0
for i in range(10):
    if i % 2 == 0:
        continue
    if i > 7:
        break
    total += i
else:
    print("no break")
print(total)

n = 0
while n < 3:
    n += 1
else:
    print("while done", n)

for k, v in {"x": 1, "y": 2}.items():
    print(k, v)
for i, ch in enumerate("ab", 1):
    print(i, ch)
for pair in zip([1, 2, 3], "ab"):
    print(pair)
print("yes" if total > 10 else "no", 0 or "default", 1 and 2, not [])
print(1 < 2 < 3, 3 > 2 > 2, 1 in [1, 2], "z" not in "abc", None is None)
"#,
    );
    insta::assert_snapshot!(out, @r"
    16
    while done 3
    x 1
    y 2
    1 a
    2 b
    (1, 'a')
    (2, 'b')
    yes default 2 True
    True False True True True
    ");
}

#[test]
fn functions_closures_and_globals() {
    let out = output_of(
        r#"
counter = 0

def bump(step=1):
    global counter
    counter += step
    return counter

def make_adder(n):
    def add(x):
        return x + n
    return add

def describe(a, b=2, c=None):
    return f"{a}-{b}-{c}"

bump()
bump(5)
add3 = make_adder(3)
square = lambda x: x * x
print(counter, add3(4), square(5), describe(1, c=3), describe(1, 5))
print(sorted([(2, "b"), (1, "z"), (2, "a")]), max([3, 9, 2]), min("bca"), sum([1, 2, 3], 10))
print(any(x > 2 for x in [1, 3]), all([]), [x * 2 for x in range(4) if x != 2], {k: len(k) for k in ["ab", "c"]})
"#,
    );
    insta::assert_snapshot!(out, @r"
    6 7 25 1-2-3 1-5-None
    [(1, 'z'), (2, 'a'), (2, 'b')] 9 a 16
    True True [0, 2, 6] {'ab': 2, 'c': 1}
    ");
}

#[test]
fn exceptions_and_cleanup() {
    let out = output_of(
        r#"
def risky(kind):
    try:
        if kind == 1:
            raise ValueError("one")
        if kind == 2:
            return "returned"
        return "fine"
    except ValueError as e:
        return f"handled {e}"
    finally:
        print("cleanup", kind)

print(risky(1))
print(risky(2))
print(risky(0))

try:
    try:
        1 / 0
    except ZeroDivisionError:
        raise
except ArithmeticError as outer:
    print("outer", type(outer).__name__, outer.args)
else:
    print("not reached")

try:
    raise KeyError("k")
except LookupError as e:
    print("lookup", repr(e), isinstance(e, KeyError), isinstance(e, Exception))
"#,
    );
    insta::assert_snapshot!(out, @r"
    cleanup 1
    handled one
    cleanup 2
    returned
    cleanup 0
    fine
    outer ZeroDivisionError ('division by zero',)
    lookup KeyError('k') True True
    ");
}

#[test]
fn printing() {
    let out = output_of(
        r#"
print("a", "b", sep="-", end="!\n")
print(1, 2.0, None, True, [1, "x"], {"k": (1,)}, sep=" | ")
print(str(1.0), repr("a\nb"), type(1), type("s").__name__)
"#,
    );
    insta::assert_snapshot!(out, @r"
    a-b!
    1 | 2.0 | None | True | [1, 'x'] | {'k': (1,)}
    1.0 'a\nb' <class 'int'> str
    ");
}

#[test]
fn bare_print_writes_a_newline() {
    assert_eq!(output_of("print()\nprint('', end='')\nprint('x', end='')"), "\nx");
}

#[test]
fn globals_view_is_live() {
    let result = execute(
        "g = globals()\ng['made'] = 1\nmade += 1\nprint(g['made'], 'seed' in g)",
        &Namespace::build([("seed", 0)]).unwrap(),
    );
    assert_eq!(result.stdout, "2 True\n");
    assert_eq!(result.namespace.get("made"), Some(&Value::from(2)));
    assert_eq!(
        result.namespace.get("g"),
        Some(&Value::Unrepresentable {
            type_name: "dict".into()
        })
    );
}

#[test]
fn unrepresentable_globals_follow_policy() {
    use scriptbox::{Engine, ExecConfig, UnrepresentablePolicy};

    let code = "f = lambda: 1\nnested = [1, f, {'e': ValueError('x')}]\nkeyed = {1: 'int key'}";
    let placeholder = execute(code, &Namespace::new());
    assert_eq!(
        placeholder.namespace.get("nested"),
        Some(&Value::from(vec![
            Value::from(1),
            Value::Unrepresentable {
                type_name: "function".into()
            },
            Value::mapping([(
                "e",
                Value::Unrepresentable {
                    type_name: "ValueError".into()
                }
            )]),
        ]))
    );

    let engine = Engine::new(ExecConfig::default().with_unrepresentable(UnrepresentablePolicy::Omit));
    let omitted = engine.execute(code, &Namespace::new());
    assert_eq!(omitted.namespace.get("f"), None);
    assert_eq!(omitted.namespace.get("keyed"), None);
    assert_eq!(
        omitted.namespace.get("nested"),
        Some(&Value::from(vec![Value::from(1), Value::Mapping(Default::default())]))
    );
}

#[test]
fn round_with_digits() {
    let out = output_of(
        "print(round(2.675, 2), round(1.5, 400), round(1.5, -400), round(-1.5, -400), round(1250, -2), round(1250.5, -2))",
    );
    assert_eq!(out, "2.67 1.5 0.0 -0.0 1200 1300.0\n");
}
