//! Error handling and the result protocol
//!
//! `try` is the one error-handler builtin: the evaluator passes it error
//! arguments as values instead of stopping at the first one.

use std::sync::Arc;

use crate::context::EvalContext;
use crate::value::{unwrap_result, unwrap_result_or, BuiltinFn, ScriptResult, Value};

use super::arg_type_error;

pub(crate) fn builtins() -> Vec<BuiltinFn> {
    vec![
        BuiltinFn::new("ok", 1, |_, args| Value::ok(args[0].clone())),
        BuiltinFn::new("err", 1, |_, args| Value::err(args[0].clone())),
        BuiltinFn::new("try", -1, builtin_try).handling_errors(),
        BuiltinFn::new("unwrap", 1, builtin_unwrap),
        BuiltinFn::new("unwrap_or", 2, builtin_unwrap_or),
    ]
}

/// The first argument that is not an error.
///
/// Callable arguments are called with no arguments and their result is
/// considered instead. A fatal error is returned as soon as it is seen.
/// When every candidate fails the result is nil.
fn builtin_try(ctx: &EvalContext, args: &[Value]) -> Value {
    for arg in args {
        let candidate = if arg.is_callable() {
            ctx.invoke(arg, Vec::new())
        } else {
            arg.clone()
        };
        match candidate.as_error() {
            Some(err) if err.is_fatal() => return candidate,
            Some(_) => continue,
            None => return candidate,
        }
    }
    Value::Nil
}

fn as_result<'a>(fname: &str, value: &'a Value) -> Result<&'a Arc<ScriptResult>, Value> {
    match value {
        Value::Result(result) => Ok(result),
        other => Err(arg_type_error(fname, "a result", other)),
    }
}

fn builtin_unwrap(_ctx: &EvalContext, args: &[Value]) -> Value {
    match as_result("unwrap", &args[0]) {
        Ok(result) => unwrap_result(result),
        Err(err) => err,
    }
}

fn builtin_unwrap_or(_ctx: &EvalContext, args: &[Value]) -> Value {
    match as_result("unwrap_or", &args[0]) {
        Ok(result) => unwrap_result_or(result, &args[1]),
        Err(err) => err,
    }
}
