//! Core builtins: conversions, collections, output and assertions

use std::cmp::Ordering;
use std::sync::Arc;

use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::value::{BuiltinFn, Value};

use super::{arg_count_error, arg_type_error};

pub(crate) fn builtins() -> Vec<BuiltinFn> {
    vec![
        BuiltinFn::new("len", 1, builtin_len),
        BuiltinFn::new("type", 1, builtin_type),
        BuiltinFn::new("string", 1, builtin_string),
        BuiltinFn::new("int", 1, builtin_int),
        BuiltinFn::new("float", 1, builtin_float),
        BuiltinFn::new("bool", 1, builtin_bool),
        BuiltinFn::new("keys", 1, builtin_keys),
        BuiltinFn::new("delete", 2, builtin_delete),
        BuiltinFn::new("sorted", 1, builtin_sorted),
        BuiltinFn::new("reversed", 1, builtin_reversed),
        BuiltinFn::new("any", 1, builtin_any),
        BuiltinFn::new("all", 1, builtin_all),
        BuiltinFn::new("print", -1, builtin_print),
        BuiltinFn::new("sprintf", -1, builtin_sprintf),
        BuiltinFn::new("regex", 1, builtin_regex),
        BuiltinFn::new("assert", -1, builtin_assert),
        BuiltinFn::new("error", -1, builtin_error),
    ]
}

// ═══════════════════════════════════════════════════════════════════════
// Inspection and conversion
// ═══════════════════════════════════════════════════════════════════════

fn builtin_len(_ctx: &EvalContext, args: &[Value]) -> Value {
    let len = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.read().len(),
        Value::Map(entries) => entries.read().len(),
        other => return arg_type_error("len", "a string, list or map", other),
    };
    Value::Int(len as i64)
}

fn builtin_type(_ctx: &EvalContext, args: &[Value]) -> Value {
    Value::string(args[0].type_name())
}

fn builtin_string(_ctx: &EvalContext, args: &[Value]) -> Value {
    match &args[0] {
        Value::Str(_) => args[0].clone(),
        other => Value::string(other.to_string()),
    }
}

fn builtin_int(_ctx: &EvalContext, args: &[Value]) -> Value {
    match &args[0] {
        Value::Int(_) => args[0].clone(),
        Value::Float(n) => Value::Int(n.trunc() as i64),
        Value::Bool(b) => Value::Int(i64::from(*b)),
        Value::Str(s) => match s.trim().parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::error(
                ErrorKind::Type,
                format!("int() invalid literal: {:?}", s.as_str()),
            ),
        },
        other => arg_type_error("int", "a number, bool or string", other),
    }
}

fn builtin_float(_ctx: &EvalContext, args: &[Value]) -> Value {
    match &args[0] {
        Value::Float(_) => args[0].clone(),
        Value::Int(n) => Value::Float(*n as f64),
        Value::Str(s) => match s.trim().parse::<f64>() {
            Ok(n) => Value::Float(n),
            Err(_) => Value::error(
                ErrorKind::Type,
                format!("float() invalid literal: {:?}", s.as_str()),
            ),
        },
        other => arg_type_error("float", "a number or string", other),
    }
}

fn builtin_bool(_ctx: &EvalContext, args: &[Value]) -> Value {
    Value::Bool(args[0].is_truthy())
}

// ═══════════════════════════════════════════════════════════════════════
// Collections
// ═══════════════════════════════════════════════════════════════════════

fn builtin_keys(_ctx: &EvalContext, args: &[Value]) -> Value {
    match &args[0] {
        Value::Map(entries) => Value::list(
            entries
                .read()
                .keys()
                .map(|key| Value::string(key.as_str()))
                .collect(),
        ),
        other => arg_type_error("keys", "a map", other),
    }
}

fn builtin_delete(_ctx: &EvalContext, args: &[Value]) -> Value {
    match (&args[0], &args[1]) {
        (Value::Map(entries), Value::Str(key)) => {
            entries.write().shift_remove(key.as_str());
            Value::Nil
        }
        (Value::Map(_), other) => arg_type_error("delete", "a string key", other),
        (other, _) => arg_type_error("delete", "a map", other),
    }
}

fn compare_sortable(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn builtin_sorted(_ctx: &EvalContext, args: &[Value]) -> Value {
    let Value::List(items) = &args[0] else {
        return arg_type_error("sorted", "a list", &args[0]);
    };
    let mut items = items.read().clone();

    // Reject mixed or unordered element types before sorting.
    for pair in items.windows(2) {
        if compare_sortable(&pair[0], &pair[1]).is_none() {
            return Value::error(
                ErrorKind::Type,
                format!(
                    "sorted() cannot compare {} and {}",
                    pair[0].type_name(),
                    pair[1].type_name()
                ),
            );
        }
    }
    if let [only] = items.as_slice() {
        if compare_sortable(only, only).is_none() {
            return arg_type_error("sorted", "a list of numbers or strings", only);
        }
    }

    items.sort_by(|a, b| compare_sortable(a, b).unwrap_or(Ordering::Equal));
    Value::list(items)
}

fn builtin_reversed(_ctx: &EvalContext, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => Value::list(items.read().iter().rev().cloned().collect()),
        Value::Str(s) => Value::string(s.chars().rev().collect::<String>()),
        other => arg_type_error("reversed", "a list or string", other),
    }
}

fn builtin_any(_ctx: &EvalContext, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => Value::Bool(items.read().iter().any(Value::is_truthy)),
        other => arg_type_error("any", "a list", other),
    }
}

fn builtin_all(_ctx: &EvalContext, args: &[Value]) -> Value {
    match &args[0] {
        Value::List(items) => Value::Bool(items.read().iter().all(Value::is_truthy)),
        other => arg_type_error("all", "a list", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Output and formatting
// ═══════════════════════════════════════════════════════════════════════

fn builtin_print(_ctx: &EvalContext, args: &[Value]) -> Value {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    Value::Nil
}

fn builtin_sprintf(_ctx: &EvalContext, args: &[Value]) -> Value {
    let Some((format, rest)) = args.split_first() else {
        return arg_count_error("sprintf", "at least 1 argument", 0);
    };
    let Value::Str(format) = format else {
        return arg_type_error("sprintf", "a format string", format);
    };
    match sprintf(format, rest) {
        Ok(s) => Value::string(s),
        Err(err) => err,
    }
}

/// Expand `%v %s %d %f %q %%` verbs; `%f` takes an optional `.N` precision.
fn sprintf(format: &str, args: &[Value]) -> Result<String, Value> {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            precision = digits.parse::<usize>().ok();
        }

        let Some(verb) = chars.next() else {
            return Err(Value::error(ErrorKind::Eval, "sprintf() format ends with '%'"));
        };
        if verb == '%' {
            out.push('%');
            continue;
        }

        let arg = args.next().ok_or_else(|| {
            Value::error(ErrorKind::Eval, format!("sprintf() missing argument for %{verb}"))
        })?;
        match (verb, arg) {
            ('v' | 's', value) => out.push_str(&value.to_string()),
            ('q', value) => out.push_str(&value.inspect()),
            ('d', Value::Int(n)) => out.push_str(&n.to_string()),
            ('f', Value::Float(n)) => out.push_str(&format!("{:.*}", precision.unwrap_or(6), n)),
            ('f', Value::Int(n)) => {
                out.push_str(&format!("{:.*}", precision.unwrap_or(6), *n as f64))
            }
            ('d' | 'f', other) => {
                return Err(Value::error(
                    ErrorKind::Type,
                    format!("sprintf() %{verb} expects a number (got {})", other.type_name()),
                ))
            }
            _ => {
                return Err(Value::error(
                    ErrorKind::Eval,
                    format!("sprintf() unknown verb %{verb}"),
                ))
            }
        }
    }
    Ok(out)
}

fn builtin_regex(_ctx: &EvalContext, args: &[Value]) -> Value {
    let Value::Str(pattern) = &args[0] else {
        return arg_type_error("regex", "a pattern string", &args[0]);
    };
    match regex::Regex::new(pattern) {
        Ok(re) => Value::Regex(Arc::new(re)),
        Err(e) => Value::error(
            ErrorKind::Syntax,
            format!("invalid regex {:?}: {e}", pattern.as_str()),
        ),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Assertions and errors
// ═══════════════════════════════════════════════════════════════════════

fn builtin_assert(_ctx: &EvalContext, args: &[Value]) -> Value {
    match args {
        [condition] | [condition, _] if condition.is_truthy() => Value::Nil,
        [_] => Value::error(ErrorKind::Assertion, "assertion failed"),
        [_, message] => Value::error(ErrorKind::Assertion, message.to_string()),
        _ => arg_count_error("assert", "1 or 2 arguments", args.len()),
    }
}

fn builtin_error(_ctx: &EvalContext, args: &[Value]) -> Value {
    if args.is_empty() {
        return arg_count_error("error", "at least 1 argument", 0);
    }
    let message = match &args[0] {
        Value::Str(format) if args.len() > 1 => match sprintf(format, &args[1..]) {
            Ok(s) => s,
            Err(err) => return err,
        },
        other => other.to_string(),
    };
    Value::error(ErrorKind::Eval, message)
}
