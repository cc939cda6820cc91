//! Identifier resolution

use super::Evaluator;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

/// Resolve a name: the scope chain first, then the builtin registry.
pub fn eval_ident(ev: &Evaluator, name: &str, scope: &Scope) -> Value {
    if let Some(value) = scope.get(name) {
        return value;
    }
    match ev.builtins().get(name) {
        Some(builtin) => Value::Builtin(builtin),
        None => Value::error(ErrorKind::Name, format!("{name:?} is not defined")),
    }
}
