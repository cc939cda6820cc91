//! Pipe expression evaluation
//!
//! `a | f(x) | g` evaluates `a`, then feeds the running value into each
//! later stage as its first argument: `g(f(a, x))`.

use tracing::trace;

use super::control::bubble;
use super::{Evaluate, Evaluator};
use crate::ast::{ExprKind, Expression};
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

pub fn eval_pipe(
    ev: &Evaluator,
    stages: &[Expression],
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let Some((first, rest)) = stages.split_first() else {
        return too_short();
    };
    if rest.is_empty() {
        return too_short();
    }

    let mut current = bubble!(first.eval(ev, scope, ctx));
    for (i, stage) in rest.iter().enumerate() {
        trace!(stage = i + 1, input = %current, "pipe stage");
        current = bubble!(eval_stage(ev, stage, current, scope, ctx));
    }
    current
}

fn too_short() -> Value {
    Value::error(
        ErrorKind::Eval,
        "pipe expression requires at least two stages",
    )
}

fn with_input(input: Value, args: Vec<Value>) -> Vec<Value> {
    let mut all = Vec::with_capacity(args.len() + 1);
    all.push(input);
    all.extend(args);
    all
}

fn eval_args(
    ev: &Evaluator,
    args: &[Expression],
    scope: &Scope,
    ctx: &EvalContext,
) -> Result<Vec<Value>, Value> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        let value = arg.eval(ev, scope, ctx);
        if value.is_sentinel() {
            return Err(value);
        }
        values.push(value);
    }
    Ok(values)
}

fn eval_stage(
    ev: &Evaluator,
    stage: &Expression,
    input: Value,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    match &stage.kind {
        ExprKind::Call { function, args } => {
            let callee = bubble!(function.eval(ev, scope, ctx));
            match eval_args(ev, args, scope, ctx) {
                Ok(args) => ev.apply(&callee, with_input(input, args), ctx),
                Err(sentinel) => sentinel,
            }
        }
        ExprKind::MethodCall {
            object,
            method,
            args,
        } => {
            let object = bubble!(object.eval(ev, scope, ctx));
            let Some(callee) = object.get_attr(method) else {
                return Value::error(
                    ErrorKind::Attribute,
                    format!("{} object has no attribute {:?}", object.type_name(), method),
                );
            };
            match eval_args(ev, args, scope, ctx) {
                Ok(args) => ev.apply(&callee, with_input(input, args), ctx),
                Err(sentinel) => sentinel,
            }
        }
        _ => {
            let value = bubble!(stage.eval(ev, scope, ctx));
            if value.is_callable() {
                ev.apply(&value, vec![input], ctx)
            } else {
                Value::error(
                    ErrorKind::Type,
                    format!("unexpected {} object in pipe expression", value.type_name()),
                )
            }
        }
    }
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

    const FNS: &str = "func add(a, b) { a + b }\nfunc mul(a, b) { a * b }\n";

    #[test]
    fn test_pipe_order() {
        assert_eq!(eval(&format!("{FNS}5 | add(1) | mul(2)")), Value::Int(12));
        assert_eq!(eval(&format!("{FNS}5 | mul(2) | add(1)")), Value::Int(11));
    }

    #[test]
    fn test_bare_callable_stage() {
        assert_eq!(eval("\"hi\" | len"), Value::Int(2));
    }

    #[test]
    fn test_method_stage_prepends_input() {
        assert_eq!(eval("xs := [1]\n2 | xs.append\nlen(xs)"), Value::Int(2));
    }

    #[test]
    fn test_non_callable_stage() {
        let result = eval("1 | 2");
        assert_eq!(
            result.as_error().unwrap().to_string(),
            "type error: unexpected int object in pipe expression"
        );
    }

    #[test]
    fn test_error_stops_pipeline() {
        let result = eval(&format!("{FNS}1 / 0 | add(1)"));
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::ZeroDivision);
    }
}
