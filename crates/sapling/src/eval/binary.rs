//! Binary expression evaluation

use std::cmp::Ordering;
use std::sync::Arc;

use super::control::bubble;
use super::{Evaluate, Evaluator};
use crate::ast::{BinaryOp, Expression};
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

/// Evaluate `left op right`.
///
/// The left operand is evaluated first; an error there means the right
/// operand is never evaluated. `&&` and `||` short-circuit on the left
/// operand's truthiness and always produce a bool.
pub fn eval_infix(
    ev: &Evaluator,
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let left = bubble!(left.eval(ev, scope, ctx));

    match op {
        BinaryOp::And if !left.is_truthy() => return Value::Bool(false),
        BinaryOp::Or if left.is_truthy() => return Value::Bool(true),
        BinaryOp::And | BinaryOp::Or => {
            let right = bubble!(right.eval(ev, scope, ctx));
            return Value::Bool(right.is_truthy());
        }
        _ => {}
    }

    let right = bubble!(right.eval(ev, scope, ctx));
    apply_binary(op, &left, &right)
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> Value {
    Value::error(
        ErrorKind::Type,
        format!(
            "unsupported operand types for {}: {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ),
    )
}

/// Apply a non-short-circuiting binary operator to evaluated operands.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Eq => return Value::Bool(left.equals(right)),
        BinaryOp::NotEq => return Value::Bool(!left.equals(right)),
        BinaryOp::Match | BinaryOp::NotMatch => return eval_match(op, left, right),
        BinaryOp::And => return Value::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOp::Or => return Value::Bool(left.is_truthy() || right.is_truthy()),
        _ => {}
    }

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b),
        (Value::Int(a), Value::Float(b)) => float_op(op, *a as f64, *b),
        (Value::Float(a), Value::Int(b)) => float_op(op, *a, *b as f64),
        (Value::Float(a), Value::Float(b)) => float_op(op, *a, *b),
        (Value::Str(a), Value::Str(b)) => match op {
            BinaryOp::Add => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a);
                joined.push_str(b);
                Value::string(joined)
            }
            _ => match compare(op, a.as_str().cmp(b.as_str())) {
                Some(result) => result,
                None => unsupported(op, left, right),
            },
        },
        (Value::List(a), Value::List(b)) if op == BinaryOp::Add => {
            let mut items = a.read().clone();
            // Reading `b` separately keeps `xs + xs` from locking twice.
            let tail = b.read().clone();
            items.extend(tail);
            Value::list(items)
        }
        _ => unsupported(op, left, right),
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> Option<Value> {
    let result = match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::GtEq => ordering != Ordering::Less,
        _ => return None,
    };
    Some(Value::Bool(result))
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> Value {
    match op {
        BinaryOp::Add => Value::Int(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinaryOp::Div | BinaryOp::Mod if b == 0 => {
            Value::error(ErrorKind::ZeroDivision, "division by zero")
        }
        BinaryOp::Div => Value::Int(a.wrapping_div(b)),
        BinaryOp::Mod => Value::Int(a.wrapping_rem(b)),
        BinaryOp::Pow => match u32::try_from(b) {
            Ok(exp) => Value::Int(a.wrapping_pow(exp)),
            Err(_) => Value::Float((a as f64).powf(b as f64)),
        },
        _ => compare(op, a.cmp(&b))
            .unwrap_or_else(|| unsupported(op, &Value::Int(a), &Value::Int(b))),
    }
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> Value {
    match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Mod => Value::Float(a % b),
        BinaryOp::Pow => Value::Float(a.powf(b)),
        _ => match a.partial_cmp(&b) {
            Some(ordering) => compare(op, ordering)
                .unwrap_or_else(|| unsupported(op, &Value::Float(a), &Value::Float(b))),
            // NaN compares false with everything.
            None => Value::Bool(false),
        },
    }
}

/// `=~` / `!~`: the left side must be a string; the right side a regex or
/// a pattern string compiled on the spot.
fn eval_match(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let Value::Str(subject) = left else {
        return unsupported(op, left, right);
    };
    let re = match right {
        Value::Regex(re) => Arc::clone(re),
        Value::Str(pattern) => match regex::Regex::new(pattern) {
            Ok(re) => Arc::new(re),
            Err(e) => {
                return Value::error(ErrorKind::Syntax, format!("invalid regex {pattern:?}: {e}"))
            }
        },
        _ => return unsupported(op, left, right),
    };
    let matched = re.is_match(subject);
    Value::Bool(if op == BinaryOp::Match { matched } else { !matched })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(apply_binary(BinaryOp::Add, &Value::Int(2), &Value::Int(3)), Value::Int(5));
        assert_eq!(apply_binary(BinaryOp::Div, &Value::Int(7), &Value::Int(2)), Value::Int(3));
        assert_eq!(apply_binary(BinaryOp::Mod, &Value::Int(7), &Value::Int(2)), Value::Int(1));
        assert_eq!(apply_binary(BinaryOp::Pow, &Value::Int(2), &Value::Int(10)), Value::Int(1024));
    }

    #[test]
    fn test_int_overflow_wraps() {
        assert_eq!(
            apply_binary(BinaryOp::Add, &Value::Int(i64::MAX), &Value::Int(1)),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn test_int_division_by_zero() {
        let result = apply_binary(BinaryOp::Div, &Value::Int(1), &Value::Int(0));
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::ZeroDivision);
        let result = apply_binary(BinaryOp::Mod, &Value::Int(1), &Value::Int(0));
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::ZeroDivision);
    }

    #[test]
    fn test_float_division_by_zero_is_infinite() {
        let result = apply_binary(BinaryOp::Div, &Value::Float(1.0), &Value::Int(0));
        assert_eq!(result, Value::Float(f64::INFINITY));
    }

    #[test]
    fn test_mixed_promotes_to_float() {
        assert_eq!(
            apply_binary(BinaryOp::Mul, &Value::Int(2), &Value::Float(1.5)),
            Value::Float(3.0)
        );
        assert_eq!(
            apply_binary(BinaryOp::Lt, &Value::Int(1), &Value::Float(1.5)),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_string_ops() {
        assert_eq!(
            apply_binary(BinaryOp::Add, &Value::string("ab"), &Value::string("cd")),
            Value::string("abcd")
        );
        assert_eq!(
            apply_binary(BinaryOp::Lt, &Value::string("a"), &Value::string("b")),
            Value::Bool(true)
        );
        let err = apply_binary(BinaryOp::Sub, &Value::string("a"), &Value::Int(1));
        assert_eq!(
            err.as_error().unwrap().to_string(),
            "type error: unsupported operand types for -: string and int"
        );
    }

    #[test]
    fn test_list_concat() {
        let a = Value::list(vec![Value::Int(1)]);
        assert_eq!(
            apply_binary(BinaryOp::Add, &a, &a).to_string(),
            "[1, 1]"
        );
    }

    #[test]
    fn test_regex_match() {
        assert_eq!(
            apply_binary(BinaryOp::Match, &Value::string("abc123"), &Value::string("[0-9]+")),
            Value::Bool(true)
        );
        assert_eq!(
            apply_binary(BinaryOp::NotMatch, &Value::string("abc"), &Value::string("[0-9]")),
            Value::Bool(true)
        );
        let err = apply_binary(BinaryOp::Match, &Value::string("a"), &Value::string("("));
        assert_eq!(err.as_error().unwrap().kind, ErrorKind::Syntax);
    }
}
