//! Declarations and assignments

use super::binary::apply_binary;
use super::control::bubble;
use super::{Evaluate, Evaluator};
use crate::ast::{AssignOp, Expression, PostfixOp};
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// var / const
// ═══════════════════════════════════════════════════════════════════════

/// `var name = value` / `const name = value`: declare in the current scope.
pub fn eval_declaration(
    ev: &Evaluator,
    name: &str,
    value: &Expression,
    readonly: bool,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let value = bubble!(value.eval(ev, scope, ctx));
    match scope.declare(name, value.clone(), readonly) {
        Ok(()) => value,
        Err(err) => Value::from_error(err.into_script_error()),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// :=, =, +=, -=, *=, /=
// ═══════════════════════════════════════════════════════════════════════

/// Evaluate an assignment; the statement's value is the value stored.
///
/// `:=` always declares in the current scope and `=` always updates an
/// existing binding. Compound forms read the current value, apply the
/// operator, then update.
pub fn eval_assign(
    ev: &Evaluator,
    name: &str,
    op: AssignOp,
    value: &Expression,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let Some(binary) = op.binary_op() else {
        let value = bubble!(value.eval(ev, scope, ctx));
        let stored = match op {
            AssignOp::Declare => scope.declare(name, value.clone(), false),
            _ => scope.update(name, value.clone()),
        };
        return match stored {
            Ok(()) => value,
            Err(err) => Value::from_error(err.into_script_error()),
        };
    };

    let Some(current) = scope.get(name) else {
        return Value::error(
            ErrorKind::Name,
            format!("unknown variable: {name}"),
        );
    };
    let operand = bubble!(value.eval(ev, scope, ctx));
    let result = bubble!(apply_binary(binary, &current, &operand));
    match scope.update(name, result.clone()) {
        Ok(()) => result,
        Err(err) => Value::from_error(err.into_script_error()),
    }
}

/// `name++` / `name--` on an int or float binding.
pub fn eval_postfix(name: &str, op: PostfixOp, scope: &Scope) -> Value {
    let Some(current) = scope.get(name) else {
        return Value::error(
            ErrorKind::Name,
            format!("unknown variable: {name}"),
        );
    };
    let delta: i64 = match op {
        PostfixOp::Increment => 1,
        PostfixOp::Decrement => -1,
    };
    let updated = match current {
        Value::Int(n) => Value::Int(n.wrapping_add(delta)),
        Value::Float(n) => Value::Float(n + delta as f64),
        other => {
            let symbol = if delta > 0 { "++" } else { "--" };
            return Value::error(
                ErrorKind::Type,
                format!("unsupported operand type for {symbol}: {}", other.type_name()),
            );
        }
    };
    match scope.update(name, updated.clone()) {
        Ok(()) => updated,
        Err(err) => Value::from_error(err.into_script_error()),
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

    fn eval_err(src: &str) -> String {
        match eval(src) {
            Value::Error(err) => err.to_string(),
            other => panic!("expected error, got {}", other),
        }
    }

    #[test]
    fn test_declare_and_update() {
        assert_eq!(eval("x := 1\nx = x + 1\nx"), Value::Int(2));
    }

    #[test]
    fn test_assignment_evaluates_to_value() {
        assert_eq!(eval("x := 1\nx = 5"), Value::Int(5));
    }

    #[test]
    fn test_redeclare_same_scope_fails() {
        assert_eq!(eval_err("x := 1\nx := 2"), "eval error: variable already exists: x");
    }

    #[test]
    fn test_update_unknown_fails() {
        assert_eq!(eval_err("y = 1"), "name error: unknown variable: y");
    }

    #[test]
    fn test_const_is_readonly() {
        assert_eq!(
            eval_err("const k = 1\nk = 2"),
            "type error: cannot update k since it is read-only"
        );
    }

    #[test]
    fn test_compound_assignment() {
        assert_eq!(eval("x := 10\nx += 5\nx -= 3\nx *= 2\nx /= 4\nx"), Value::Int(6));
        assert_eq!(eval("s := \"a\"\ns += \"b\"\ns"), Value::string("ab"));
    }

    #[test]
    fn test_compound_on_unknown_fails() {
        assert_eq!(eval_err("z += 1"), "name error: unknown variable: z");
    }

    #[test]
    fn test_postfix() {
        assert_eq!(eval("i := 0\ni++\ni++\ni--\ni"), Value::Int(1));
        assert_eq!(eval("f := 1.5\nf++\nf"), Value::Float(2.5));
        assert!(eval("s := \"a\"\ns++").is_error());
    }
}
