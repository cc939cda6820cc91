//! Prefix expression evaluation

use super::control::bubble;
use super::{Evaluate, Evaluator};
use crate::ast::{Expression, PrefixOp};
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

pub fn eval_prefix(
    ev: &Evaluator,
    op: PrefixOp,
    right: &Expression,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let operand = bubble!(right.eval(ev, scope, ctx));
    match (op, operand) {
        (PrefixOp::Not, value) => Value::Bool(!value.is_truthy()),
        (PrefixOp::Neg, Value::Int(n)) => Value::Int(n.wrapping_neg()),
        (PrefixOp::Neg, Value::Float(n)) => Value::Float(-n),
        (PrefixOp::Neg, other) => Value::error(
            ErrorKind::Type,
            format!("unsupported operand type for -: {}", other.type_name()),
        ),
    }
}
