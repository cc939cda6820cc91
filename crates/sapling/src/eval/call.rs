//! Call, method call and attribute access

use tracing::trace;

use super::control::bubble;
use super::{Evaluate, Evaluator};
use crate::ast::Expression;
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

/// Evaluate call arguments left to right.
///
/// An error handler receives error arguments as ordinary values; every
/// other callee stops at the first failing argument.
fn eval_args(
    ev: &Evaluator,
    args: &[Expression],
    error_handler: bool,
    scope: &Scope,
    ctx: &EvalContext,
) -> Result<Vec<Value>, Value> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        let value = arg.eval(ev, scope, ctx);
        match value {
            Value::Error(_) if error_handler => values.push(value),
            value if value.is_sentinel() => return Err(value),
            value => values.push(value),
        }
    }
    Ok(values)
}

fn handles_errors(callee: &Value) -> bool {
    matches!(callee, Value::Builtin(builtin) if builtin.error_handler)
}

/// `f(a, b)`: callee first, then arguments, then the call.
pub fn eval_call(
    ev: &Evaluator,
    function: &Expression,
    args: &[Expression],
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let callee = bubble!(function.eval(ev, scope, ctx));
    let args = match eval_args(ev, args, handles_errors(&callee), scope, ctx) {
        Ok(args) => args,
        Err(sentinel) => return sentinel,
    };
    trace!(callee = %callee, args = args.len(), "call");
    ev.apply(&callee, args, ctx)
}

fn no_attribute(object: &Value, name: &str) -> Value {
    Value::error(
        ErrorKind::Attribute,
        format!("{} object has no attribute {:?}", object.type_name(), name),
    )
}

/// `obj.method(a, b)`: receiver, then the attribute, then arguments.
pub fn eval_method_call(
    ev: &Evaluator,
    object: &Expression,
    method: &str,
    args: &[Expression],
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let object = bubble!(object.eval(ev, scope, ctx));
    let Some(callee) = object.get_attr(method) else {
        return no_attribute(&object, method);
    };
    let args = match eval_args(ev, args, handles_errors(&callee), scope, ctx) {
        Ok(args) => args,
        Err(sentinel) => return sentinel,
    };
    ev.apply(&callee, args, ctx)
}

/// `obj.name`
pub fn eval_get_attr(
    ev: &Evaluator,
    object: &Expression,
    name: &str,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let object = bubble!(object.eval(ev, scope, ctx));
    match object.get_attr(name) {
        Some(value) => value,
        None => no_attribute(&object, name),
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

    #[test]
    fn test_call_builtin() {
        assert_eq!(eval("len([1, 2, 3])"), Value::Int(3));
    }

    #[test]
    fn test_method_call() {
        assert_eq!(eval("\"abc\".upper()"), Value::string("ABC"));
        assert_eq!(eval("xs := [1]\nxs.append(2)\nlen(xs)"), Value::Int(2));
    }

    #[test]
    fn test_bound_method_is_a_value() {
        assert_eq!(eval("f := \"a-b\".split\nf(\"-\")").to_string(), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_missing_attribute() {
        let result = eval("[1].nope()");
        assert_eq!(
            result.as_error().unwrap().to_string(),
            "attribute error: list object has no attribute \"nope\""
        );
    }

    #[test]
    fn test_failing_argument_stops_call() {
        assert_eq!(eval("len(missing)").as_error().unwrap().kind, ErrorKind::Name);
    }

    #[test]
    fn test_error_handler_receives_error_argument() {
        assert_eq!(eval("try(1 / 0, 5)"), Value::Int(5));
    }

    #[test]
    fn test_calling_non_callable() {
        assert_eq!(eval("x := 3\nx()").as_error().unwrap().kind, ErrorKind::Type);
    }
}
