//! Statement evaluation

use super::control::{bubble, locate};
use super::{assign, function, import, index, Evaluate, Evaluator};
use crate::ast::{Statement, StmtKind};
use crate::context::EvalContext;
use crate::scope::Scope;
use crate::value::Value;

impl Evaluate for Statement {
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
        if let Some(err) = ctx.check() {
            return Value::from_error(err.at(self.pos));
        }

        let result = match &self.kind {
            StmtKind::Var { name, value } => {
                assign::eval_declaration(ev, name, value, false, scope, ctx)
            }
            StmtKind::Const { name, value } => {
                assign::eval_declaration(ev, name, value, true, scope, ctx)
            }
            StmtKind::Assign { name, op, value } => {
                assign::eval_assign(ev, name, *op, value, scope, ctx)
            }
            StmtKind::Postfix { name, op } => assign::eval_postfix(name, *op, scope),
            StmtKind::SetItem {
                target,
                index: key,
                value,
            } => {
                let target = bubble!(target.eval(ev, scope, ctx));
                let key = bubble!(key.eval(ev, scope, ctx));
                let value = bubble!(value.eval(ev, scope, ctx));
                index::set_item(&target, &key, value)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => bubble!(expr.eval(ev, scope, ctx)),
                    None => Value::Nil,
                };
                Value::Return(Box::new(value))
            }
            StmtKind::Break => Value::Break,
            StmtKind::Continue => Value::Continue,
            StmtKind::Import { name } => import::eval_import(ev, name, scope, ctx),
            StmtKind::Function(literal) => function::eval_declaration(literal, scope),
            StmtKind::Expression(expr) => expr.eval(ev, scope, ctx),
        };

        locate(result, self.pos)
    }
}
