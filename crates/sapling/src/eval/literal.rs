//! Collection literal evaluation

use indexmap::IndexMap;

use super::control::bubble;
use super::{Evaluate, Evaluator};
use crate::ast::Expression;
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

/// `[a, b, ...]`, elements left to right.
pub fn eval_list(ev: &Evaluator, items: &[Expression], scope: &Scope, ctx: &EvalContext) -> Value {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(bubble!(item.eval(ev, scope, ctx)));
    }
    Value::list(values)
}

/// `{k: v, ...}`, each key before its value. Keys must be strings; a
/// repeated key keeps its first position and its last value.
pub fn eval_map(
    ev: &Evaluator,
    entries: &[(Expression, Expression)],
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let mut map = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        let key = match bubble!(key.eval(ev, scope, ctx)) {
            Value::Str(s) => s.to_string(),
            other => {
                return Value::error(
                    ErrorKind::Type,
                    format!("map keys must be strings (got {})", other.type_name()),
                )
            }
        };
        let value = bubble!(value.eval(ev, scope, ctx));
        map.insert(key, value);
    }
    Value::map(map)
}
