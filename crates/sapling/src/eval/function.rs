//! Function creation and application
//!
//! Functions capture the scope active when their literal is evaluated.
//! Each call opens a child of that captured scope, so a function sees its
//! own parameters first, then whatever its defining scope could see.

use std::sync::Arc;

use tracing::trace;

use super::control::{eval_block, outside_loop};
use super::{Evaluate, Evaluator};
use crate::ast::FunctionLiteral;
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::{Function, Value};

/// Minimum stack headroom before a call grows the stack.
pub(crate) const STACK_RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
pub(crate) const STACK_GROW_SIZE: usize = 1024 * 1024;

/// A function literal used as an expression: a closure over `scope`.
pub fn eval_literal(literal: &Arc<FunctionLiteral>, scope: &Scope) -> Value {
    Value::Function(Arc::new(Function::new(Arc::clone(literal), scope.clone())))
}

/// `func name(...) { ... }`: create the function and bind it in `scope`.
///
/// The binding lives in the same scope the function captures, so the body
/// can call itself by name.
pub fn eval_declaration(literal: &Arc<FunctionLiteral>, scope: &Scope) -> Value {
    let function = eval_literal(literal, scope);
    let Some(name) = &literal.name else {
        return function;
    };
    match scope.declare(name.clone(), function.clone(), false) {
        Ok(()) => function,
        Err(err) => Value::from_error(err.into_script_error()),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Call a script function with evaluated arguments.
///
/// Without defaults the argument count must match the parameter count
/// exactly. With defaults, every default is evaluated in declaration order
/// inside the call scope, then arguments are bound by position over them;
/// surplus arguments are ignored.
pub fn apply_function(
    ev: &Evaluator,
    function: &Function,
    args: Vec<Value>,
    ctx: &EvalContext,
) -> Value {
    let _guard = match ctx.enter_call() {
        Ok(guard) => guard,
        Err(err) => return Value::from_error(err),
    };
    trace!(
        function = function.name(),
        args = args.len(),
        depth = ctx.call_depth(),
        "apply function"
    );

    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
        call_body(ev, function, args, ctx)
    })
}

fn call_body(ev: &Evaluator, function: &Function, args: Vec<Value>, ctx: &EvalContext) -> Value {
    let params = function.parameters();
    if function.defaults().is_empty() && args.len() != params.len() {
        return Value::error(
            ErrorKind::Arity,
            format!(
                "function {} expected {} argument{} ({} given)",
                function.name(),
                params.len(),
                plural(params.len()),
                args.len()
            ),
        );
    }

    let call_scope = function.scope.new_child(function.name());

    for (name, default) in function.defaults() {
        let value = default.eval(ev, &call_scope, ctx);
        if value.is_sentinel() {
            return value;
        }
        if let Err(err) = call_scope.declare(name.clone(), value, false) {
            return Value::from_error(err.into_script_error());
        }
    }

    for (name, value) in params.iter().zip(args) {
        let bound = if call_scope.contains_local(name) {
            call_scope.update(name, value)
        } else {
            call_scope.declare(name.clone(), value, false)
        };
        if let Err(err) = bound {
            return Value::from_error(err.into_script_error());
        }
    }

    match eval_block(function.body(), ev, &call_scope, ctx) {
        Value::Return(value) => *value,
        sentinel @ (Value::Break | Value::Continue) => {
            outside_loop(&sentinel).unwrap_or(sentinel)
        }
        value => value,
    }
}
