//! Loop expression evaluation

use super::control::{bubble, eval_block};
use super::{Evaluate, Evaluator};
use crate::ast::{ForEach, ForLoop};
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// for expression
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for ForLoop {
    /// Run the loop; its value is the last body value produced, or nil.
    ///
    /// The init statement, condition and post statement share one stable
    /// loop scope. The body runs in a fresh child of that scope on every
    /// iteration, so closures created in different iterations never see
    /// each other's bindings. `break` ends the loop keeping the latest
    /// value; `continue` skips to the post statement without changing it.
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
        let loop_scope = scope.new_child("for");
        if let Some(each) = &self.each {
            return eval_each(self, each, ev, &loop_scope, ctx);
        }
        if let Some(init) = &self.init {
            bubble!(init.eval(ev, &loop_scope, ctx));
        }

        let mut latest = Value::Nil;
        loop {
            // An empty body dispatches no nodes, so poll here too.
            if let Some(err) = ctx.check() {
                return Value::from_error(err);
            }

            if let Some(condition) = &self.condition {
                let condition = bubble!(condition.eval(ev, &loop_scope, ctx));
                if !condition.is_truthy() {
                    break;
                }
            }

            let body_scope = loop_scope.new_child("for-body");
            match eval_block(&self.body, ev, &body_scope, ctx) {
                Value::Break => break,
                Value::Continue => {}
                result @ (Value::Error(_) | Value::Return(_)) => return result,
                value => latest = value,
            }

            if let Some(post) = &self.post {
                bubble!(post.eval(ev, &loop_scope, ctx));
            }
        }
        latest
    }
}

/// Iterate a snapshot of `iterable` taken before the first iteration.
///
/// Lists and strings yield `(element, position)`; maps yield `(key, value)`
/// in insertion order.
fn eval_each(
    for_loop: &ForLoop,
    each: &ForEach,
    ev: &Evaluator,
    loop_scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let iterable = bubble!(each.iterable.eval(ev, loop_scope, ctx));
    let pairs: Vec<(Value, Value)> = match &iterable {
        Value::List(items) => items
            .read()
            .iter()
            .enumerate()
            .map(|(i, item)| (item.clone(), Value::Int(i as i64)))
            .collect(),
        Value::Str(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (Value::string(c.to_string()), Value::Int(i as i64)))
            .collect(),
        Value::Map(entries) => entries
            .read()
            .iter()
            .map(|(key, value)| (Value::string(key.as_str()), value.clone()))
            .collect(),
        other => {
            return Value::error(
                ErrorKind::Type,
                format!("{} object is not iterable", other.type_name()),
            )
        }
    };

    let mut latest = Value::Nil;
    for (item, index) in pairs {
        if let Some(err) = ctx.check() {
            return Value::from_error(err);
        }

        let body_scope = loop_scope.new_child("for-body");
        if let Err(err) = bind_each(&body_scope, each, item, index) {
            return err;
        }
        match eval_block(&for_loop.body, ev, &body_scope, ctx) {
            Value::Break => break,
            Value::Continue => {}
            result @ (Value::Error(_) | Value::Return(_)) => return result,
            value => latest = value,
        }
    }
    latest
}

fn bind_each(scope: &Scope, each: &ForEach, item: Value, index: Value) -> Result<(), Value> {
    scope
        .declare(each.name.as_str(), item, false)
        .map_err(|err| Value::from_error(err.into_script_error()))?;
    if let Some(name) = &each.index {
        scope
            .declare(name.as_str(), index, false)
            .map_err(|err| Value::from_error(err.into_script_error()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;

    fn eval(src: &str) -> Value {
        Evaluator::new().evaluate(
            &parse(src).unwrap(),
            &Scope::root("test"),
            &EvalContext::new(),
        )
    }

    #[test]
    fn test_conditional_loop_counts() {
        assert_eq!(eval("n := 0\nfor n < 5 { n++ }\nn"), Value::Int(5));
    }

    #[test]
    fn test_three_part_loop() {
        let src = "total := 0\nfor i := 1; i <= 4; i++ { total += i }\ntotal";
        assert_eq!(eval(src), Value::Int(10));
    }

    #[test]
    fn test_zero_iterations_is_nil() {
        assert_eq!(eval("for false { 1 }"), Value::Nil);
    }

    #[test]
    fn test_loop_value_is_latest_body_value() {
        assert_eq!(eval("for i := 0; i < 3; i++ { i * 10 }"), Value::Int(20));
    }

    #[test]
    fn test_init_variable_is_loop_local() {
        let result = eval("for i := 0; i < 1; i++ { }\ni");
        assert!(result.is_error());
    }

    #[test]
    fn test_body_declarations_are_fresh_each_iteration() {
        // Re-declaring in the body would fail if the scope were reused.
        let src = "for i := 0; i < 3; i++ { x := i }";
        assert_eq!(eval(src), Value::Int(2));
    }

    #[test]
    fn test_continue_runs_post_and_keeps_latest() {
        let src = "
            sum := 0
            for i := 0; i < 5; i++ {
                if i % 2 == 1 { continue }
                sum += i
            }
            sum";
        assert_eq!(eval(src), Value::Int(6));
    }

    #[test]
    fn test_each_over_list_with_index() {
        let src = "out := []\nfor x, i in [\"a\", \"b\"] { out.append(x + string(i)) }\nout";
        assert_eq!(eval(src).to_string(), "[\"a0\", \"b1\"]");
    }

    #[test]
    fn test_each_over_empty_list_is_nil() {
        assert_eq!(eval("for x in [] { 1 }"), Value::Nil);
    }

    #[test]
    fn test_each_over_int_is_type_error() {
        let err = eval("for x in 5 { }");
        let err = err.as_error().unwrap();
        assert_eq!(err.kind, ErrorKind::Type);
        assert_eq!(err.message, "int object is not iterable");
    }

    #[test]
    fn test_each_iterates_snapshot() {
        let src = "xs := [1, 2]\nfor x in xs { xs.append(x) }\nlen(xs)";
        assert_eq!(eval(src), Value::Int(4));
    }

    #[test]
    fn test_return_inside_loop_leaves_function() {
        let src = "
            func first_big(xs) {
                for i := 0; i < len(xs); i++ {
                    if xs[i] > 10 { return xs[i] }
                }
                return -1
            }
            first_big([3, 12, 40])";
        assert_eq!(eval(src), Value::Int(12));
    }
}
