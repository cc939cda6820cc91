//! Function definition, application and closure tests

use pretty_assertions::assert_eq;
use sapling::*;

fn eval(src: &str) -> Value {
    let program = parse(src).expect("parse failed");
    Evaluator::new().evaluate(&program, &Scope::root("test"), &EvalContext::new())
}

// ═══════════════════════════════════════════════════════════════════════
// Arity
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_exact_arity_without_defaults() {
    let result = eval("func f(a) { a }\nf(1, 2)");
    assert_eq!(
        result.as_error().unwrap().to_string(),
        "arity error: function f expected 1 argument (2 given)"
    );
}

#[test]
fn test_extra_arguments_ignored_with_defaults() {
    assert_eq!(eval("func f(a, b = 2) { a + b }\nf(1, 3, 99, \"ignored\")"), Value::Int(4));
}

#[test]
fn test_missing_argument_without_default_stays_unbound() {
    let result = eval("func f(a = 1, b) { b }\nf()");
    assert_eq!(result.as_error().unwrap().kind, ErrorKind::Name);
}

#[test]
fn test_default_expressions_run_per_call() {
    let src = "
        func f(xs = []) { xs.append(1); len(xs) }
        [f(), f()]";
    assert_eq!(eval(src).to_string(), "[1, 1]");
}

#[test]
fn test_builtin_arity_error() {
    let result = eval("len()");
    assert_eq!(
        result.as_error().unwrap().to_string(),
        "arity error: len() takes exactly 1 argument (0 given)"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Closures
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_counter_closures_are_independent() {
    let src = "
        func counter() { n := 0; return func() { n++; return n } }
        a := counter(); b := counter()
        a(); a();
        [a(), b()]";
    assert_eq!(eval(src).to_string(), "[3, 1]");
}

#[test]
fn test_closure_sees_later_updates() {
    let src = "
        x := 1
        get := func() { x }
        x = 5
        get()";
    assert_eq!(eval(src), Value::Int(5));
}

#[test]
fn test_function_values_are_first_class() {
    let src = "
        func apply(f, v) { f(v) }
        apply(func(n) { n + 1 }, 41)";
    assert_eq!(eval(src), Value::Int(42));
}

#[test]
fn test_mutual_recursion() {
    let src = "
        func is_even(n) { if n == 0 { return true }; return is_odd(n - 1) }
        func is_odd(n) { if n == 0 { return false }; return is_even(n - 1) }
        is_even(10)";
    assert_eq!(eval(src), Value::Bool(true));
}

#[test]
fn test_deep_recursion_within_limit() {
    let src = "func down(n) { if n == 0 { return 0 }; return down(n - 1) }\ndown(900)";
    assert_eq!(eval(src), Value::Int(0));
}

#[test]
fn test_recursion_limit() {
    let program = parse("func f() { f() }\nf()").unwrap();
    let ctx = EvalContext::with_max_call_depth(100);
    let result = Evaluator::new().evaluate(&program, &Scope::root("test"), &ctx);
    assert_eq!(
        result.as_error().unwrap().to_string(),
        "recursion error: maximum call depth of 100 exceeded"
    );
}

#[test]
fn test_function_display() {
    assert_eq!(eval("func add(a, b) { a + b }\nadd").to_string(), "func add(a, b) { ... }");
}

#[test]
fn test_redeclaring_function_in_same_scope_fails() {
    let result = eval("func f() { 1 }\nfunc f() { 2 }");
    assert_eq!(result.as_error().unwrap().kind, ErrorKind::Eval);
}

// ═══════════════════════════════════════════════════════════════════════
// Higher-order builtins
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_map_filter_call_builtins() {
    let src = "
        double := func(x) { x * 2 };
        [map([1, 2], double), filter([1, 2, 3], func(x) { x > 1 }), call(double, 5)]";
    assert_eq!(eval(src).to_string(), "[[2, 4], [2, 3], 10]");
}

#[test]
fn test_error_inside_callback_propagates() {
    let result = eval("map([1, 0], func(x) { 10 / x })");
    assert_eq!(result.as_error().unwrap().kind, ErrorKind::ZeroDivision);
}

#[test]
fn test_spawn_and_wait() {
    let src = "
        func work(a, b) { a * b }
        t := spawn(work, 6, 7)
        t.wait()";
    assert_eq!(eval(src), Value::Int(42));
}

#[test]
fn test_spawned_workers_run_independently() {
    let src = "
        func slow(n) { total := 0; for i := 0; i < n; i++ { total += i }; total }
        ts := [spawn(slow, 10), spawn(slow, 100)];
        [ts[0].wait(), ts[1].wait()]";
    assert_eq!(eval(src).to_string(), "[45, 4950]");
}
