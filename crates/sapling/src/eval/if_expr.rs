//! If expression evaluation

use super::control::{bubble, eval_block};
use super::{Evaluate, Evaluator};
use crate::ast::{Expression, IfExpr};
use crate::context::EvalContext;
use crate::scope::Scope;
use crate::value::Value;

impl Evaluate for IfExpr {
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
        let condition = bubble!(self.condition.eval(ev, scope, ctx));
        if condition.is_truthy() {
            eval_block(&self.consequence, ev, scope, ctx)
        } else if let Some(alternative) = &self.alternative {
            eval_block(alternative, ev, scope, ctx)
        } else {
            Value::Nil
        }
    }
}

/// `condition ? consequence : alternative`; only the chosen branch runs.
pub(crate) fn eval_ternary(
    ev: &Evaluator,
    condition: &Expression,
    consequence: &Expression,
    alternative: &Expression,
    scope: &Scope,
    ctx: &EvalContext,
) -> Value {
    let condition = bubble!(condition.eval(ev, scope, ctx));
    if condition.is_truthy() {
        consequence.eval(ev, scope, ctx)
    } else {
        alternative.eval(ev, scope, ctx)
    }
}
