//! Sentinel propagation, blocks and programs

use tracing::warn;

use super::{Evaluate, Evaluator};
use crate::ast::{Block, Position, Program};
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;
use crate::value::Value;

/// Evaluate to a value, returning early from the enclosing function if
/// the value is a control-flow sentinel.
macro_rules! bubble {
    ($value:expr) => {{
        let value = $value;
        if value.is_sentinel() {
            return value;
        }
        value
    }};
}

pub(crate) use bubble;

/// Record `pos` on an error that does not know where it was raised yet.
pub(crate) fn locate(value: Value, pos: Position) -> Value {
    match value {
        Value::Error(err) if err.position.is_none() => {
            Value::from_error((*err).clone().at(pos))
        }
        other => other,
    }
}

/// The error a stray `break`/`continue` turns into outside a loop.
pub(crate) fn outside_loop(sentinel: &Value) -> Option<Value> {
    let keyword = match sentinel {
        Value::Break => "break",
        Value::Continue => "continue",
        _ => return None,
    };
    Some(Value::error(
        ErrorKind::Eval,
        format!("{keyword} outside of loop"),
    ))
}

/// Evaluate statements in order.
///
/// Stops early on any sentinel and returns it; otherwise the value of
/// the last statement, or nil for an empty block. Blocks do not open a
/// scope of their own.
pub fn eval_block(block: &Block, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
    let mut last = Value::Nil;
    for stmt in &block.statements {
        last = bubble!(stmt.eval(ev, scope, ctx));
    }
    last
}

impl Evaluate for Block {
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
        eval_block(self, ev, scope, ctx)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Programs
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Program {
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
        let mut last = Value::Nil;
        for stmt in &self.statements {
            match stmt.eval(ev, scope, ctx) {
                Value::Return(inner) => return *inner,
                Value::Error(err) => {
                    if ev.keep_going() && !err.is_fatal() {
                        warn!(error = %err, "skipping failed top-level statement");
                        continue;
                    }
                    return Value::Error(err);
                }
                sentinel @ (Value::Break | Value::Continue) => {
                    let err = outside_loop(&sentinel).unwrap_or(sentinel);
                    return locate(err, stmt.pos);
                }
                value => last = value,
            }
        }
        last
    }
}
