//! Higher-order builtins
//!
//! These call script functions back through the context's call hook.

use crate::context::EvalContext;
use crate::value::{BuiltinFn, ThreadHandle, Value};

use super::{arg_count_error, arg_type_error};

pub(crate) fn builtins() -> Vec<BuiltinFn> {
    vec![
        BuiltinFn::new("call", -1, builtin_call),
        BuiltinFn::new("map", 2, builtin_map),
        BuiltinFn::new("filter", 2, builtin_filter),
        BuiltinFn::new("spawn", -1, builtin_spawn),
    ]
}

fn split_callable<'a>(fname: &str, args: &'a [Value]) -> Result<(&'a Value, &'a [Value]), Value> {
    let Some((function, rest)) = args.split_first() else {
        return Err(arg_count_error(fname, "at least 1 argument", 0));
    };
    if !function.is_callable() {
        return Err(arg_type_error(fname, "a function", function));
    }
    Ok((function, rest))
}

/// `call(fn, args...)`
fn builtin_call(ctx: &EvalContext, args: &[Value]) -> Value {
    match split_callable("call", args) {
        Ok((function, rest)) => ctx.invoke(function, rest.to_vec()),
        Err(err) => err,
    }
}

fn list_and_function<'a>(
    fname: &str,
    args: &'a [Value],
) -> Result<(Vec<Value>, &'a Value), Value> {
    let Value::List(items) = &args[0] else {
        return Err(arg_type_error(fname, "a list", &args[0]));
    };
    if !args[1].is_callable() {
        return Err(arg_type_error(fname, "a function", &args[1]));
    }
    // Snapshot so the callback may mutate the list.
    Ok((items.read().clone(), &args[1]))
}

/// `map(list, fn)`
fn builtin_map(ctx: &EvalContext, args: &[Value]) -> Value {
    let (items, function) = match list_and_function("map", args) {
        Ok(parts) => parts,
        Err(err) => return err,
    };
    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        let value = ctx.invoke(function, vec![item]);
        if value.is_error() {
            return value;
        }
        mapped.push(value);
    }
    Value::list(mapped)
}

/// `filter(list, fn)`
fn builtin_filter(ctx: &EvalContext, args: &[Value]) -> Value {
    let (items, function) = match list_and_function("filter", args) {
        Ok(parts) => parts,
        Err(err) => return err,
    };
    let mut kept = Vec::new();
    for item in items {
        let keep = ctx.invoke(function, vec![item.clone()]);
        if keep.is_error() {
            return keep;
        }
        if keep.is_truthy() {
            kept.push(item);
        }
    }
    Value::list(kept)
}

/// `spawn(fn, args...)`
fn builtin_spawn(ctx: &EvalContext, args: &[Value]) -> Value {
    match split_callable("spawn", args) {
        Ok((function, rest)) => ThreadHandle::spawn(ctx, function, rest),
        Err(err) => err,
    }
}
