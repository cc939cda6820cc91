//! Indexing and item assignment

use super::control::bubble;
use super::{Evaluate, Evaluator};
use crate::ast::Expression;
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

/// Resolve a possibly negative index against `len`.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

fn out_of_range(index: i64) -> Value {
    Value::error(ErrorKind::Index, format!("index out of range: {index}"))
}

fn bad_index(container: &Value, index: &Value) -> Value {
    Value::error(
        ErrorKind::Type,
        format!(
            "{} indices must be {} (got {})",
            container.type_name(),
            if matches!(container, Value::Map(_)) { "strings" } else { "integers" },
            index.type_name()
        ),
    )
}

/// `left[index]`
pub fn eval_index(
    ev: &Evaluator,
    left: &Expression,
    index: &Expression,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let container = bubble!(left.eval(ev, scope, ctx));
    let index = bubble!(index.eval(ev, scope, ctx));
    get_item(&container, &index)
}

/// Look up `container[index]` on evaluated values.
pub fn get_item(container: &Value, index: &Value) -> Value {
    match (container, index) {
        (Value::List(items), Value::Int(i)) => {
            let items = items.read();
            match resolve_index(*i, items.len()) {
                Some(at) => items[at].clone(),
                None => out_of_range(*i),
            }
        }
        (Value::Str(s), Value::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            match resolve_index(*i, chars.len()) {
                Some(at) => Value::string(chars[at].to_string()),
                None => out_of_range(*i),
            }
        }
        (Value::Map(entries), Value::Str(key)) => match entries.read().get(key.as_str()) {
            Some(value) => value.clone(),
            None => Value::error(ErrorKind::Key, format!("key not found: {key:?}")),
        },
        (Value::List(_) | Value::Str(_) | Value::Map(_), _) => bad_index(container, index),
        _ => Value::error(
            ErrorKind::Type,
            format!("{} object is not subscriptable", container.type_name()),
        ),
    }
}

/// `target[index] = value`. Evaluates to the stored value.
pub fn set_item(target: &Value, index: &Value, value: Value) -> Value {
    match (target, index) {
        (Value::List(items), Value::Int(i)) => {
            let mut items = items.write();
            match resolve_index(*i, items.len()) {
                Some(at) => {
                    items[at] = value.clone();
                    value
                }
                None => out_of_range(*i),
            }
        }
        (Value::Map(entries), Value::Str(key)) => {
            entries.write().insert(key.to_string(), value.clone());
            value
        }
        (Value::List(_) | Value::Map(_), _) => bad_index(target, index),
        _ => Value::error(
            ErrorKind::Type,
            format!("{} object does not support item assignment", target.type_name()),
        ),
    }
}
