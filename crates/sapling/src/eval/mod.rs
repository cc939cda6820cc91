//! Tree-walking evaluation
//!
//! Every node evaluates to a [`Value`]. Expected failures are
//! [`Value::Error`] sentinels that each composite node checks after every
//! subexpression and returns unchanged, so nothing after a failure is
//! evaluated and no host error ever unwinds through the evaluator.

pub mod assign;
pub mod binary;
pub mod call;
pub mod control;
pub mod function;
pub mod hook;
pub mod ident;
pub mod if_expr;
pub mod import;
pub mod index;
pub mod literal;
pub mod loops;
pub mod pipe;
pub mod stmt;
pub mod switch;
pub mod unary;

pub use hook::CallHook;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ast::{ExprKind, Expression, Program};
use crate::builtins::Builtins;
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::importer::Importer;
use crate::scope::Scope;
use crate::value::Value;

/// Trait for evaluating AST nodes to values.
///
/// This is the core abstraction for the tree-walking interpreter.
pub trait Evaluate {
    /// Evaluate this node in `scope`.
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value;
}

/// The evaluation engine.
///
/// Holds the builtin registry and the importer; all evaluation state lives
/// in scopes and the context. Clones share both the registry (including
/// its override table) and the importer.
#[derive(Clone)]
pub struct Evaluator {
    builtins: Builtins,
    importer: Option<Arc<dyn Importer>>,
    keep_going: bool,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator with the default builtins and imports disabled.
    pub fn new() -> Self {
        Self::with_builtins(Builtins::new())
    }

    /// An evaluator using `builtins` as its registry.
    pub fn with_builtins(builtins: Builtins) -> Self {
        Self {
            builtins,
            importer: None,
            keep_going: false,
        }
    }

    /// Install an importer, enabling `import` statements.
    pub fn with_importer(mut self, importer: Arc<dyn Importer>) -> Self {
        self.importer = Some(importer);
        self
    }

    /// Continue with the next top-level statement after a non-fatal error.
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn importer(&self) -> Option<&Arc<dyn Importer>> {
        self.importer.as_ref()
    }

    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    /// Evaluate a program in `scope`.
    ///
    /// A call hook over this evaluator and `scope` is installed into a copy
    /// of `ctx` first, so builtins can re-enter the evaluator. A top-level
    /// `return` ends the program with the returned value; a top-level error
    /// ends it with that error (see [`with_keep_going`](Self::with_keep_going)).
    pub fn evaluate(&self, program: &Program, scope: &Scope, ctx: &EvalContext) -> Value {
        debug!(
            scope = scope.name(),
            statements = program.statements.len(),
            "evaluate program"
        );
        let hook = Arc::new(CallHook::new(self.clone(), scope.clone()));
        let ctx = ctx.with_call_hook(hook);
        let result = program.eval(self, scope, &ctx);
        if let Some(err) = result.as_error() {
            if err.kind == ErrorKind::Deadline {
                warn!(scope = scope.name(), error = %err, "evaluation cancelled");
            }
        }
        result
    }

    /// Call a function or builtin with already-evaluated arguments.
    pub fn apply(&self, callee: &Value, args: Vec<Value>, ctx: &EvalContext) -> Value {
        match callee {
            Value::Function(function) => function::apply_function(self, function, args, ctx),
            Value::Builtin(builtin) => match self.builtins.resolve_call(builtin) {
                Ok(builtin) => builtin.call(ctx, &args),
                Err(err) => err,
            },
            other => Value::error(
                ErrorKind::Type,
                format!("{} object is not callable", other.type_name()),
            ),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Expression {
    fn eval(&self, ev: &Evaluator, scope: &Scope, ctx: &EvalContext) -> Value {
        // Check for cancellation before each expression
        if let Some(err) = ctx.check() {
            return Value::from_error(err.at(self.pos));
        }

        let result = match &self.kind {
            ExprKind::Nil => Value::Nil,
            ExprKind::Bool(b) => Value::Bool(*b),
            ExprKind::Int(n) => Value::Int(*n),
            ExprKind::Float(n) => Value::Float(*n),
            ExprKind::Str(s) => Value::string(s.as_str()),
            ExprKind::List(items) => literal::eval_list(ev, items, scope, ctx),
            ExprKind::Map(entries) => literal::eval_map(ev, entries, scope, ctx),
            ExprKind::Ident(name) => ident::eval_ident(ev, name, scope),
            ExprKind::Prefix { op, right } => unary::eval_prefix(ev, *op, right, scope, ctx),
            ExprKind::Infix { op, left, right } => {
                binary::eval_infix(ev, *op, left, right, scope, ctx)
            }
            ExprKind::If(expr) => expr.eval(ev, scope, ctx),
            ExprKind::Ternary {
                condition,
                consequence,
                alternative,
            } => if_expr::eval_ternary(ev, condition, consequence, alternative, scope, ctx),
            ExprKind::For(expr) => expr.eval(ev, scope, ctx),
            ExprKind::Switch(expr) => expr.eval(ev, scope, ctx),
            ExprKind::Pipe(stages) => pipe::eval_pipe(ev, stages, scope, ctx),
            ExprKind::Function(literal) => function::eval_literal(literal, scope),
            ExprKind::Call { function, args } => call::eval_call(ev, function, args, scope, ctx),
            ExprKind::MethodCall {
                object,
                method,
                args,
            } => call::eval_method_call(ev, object, method, args, scope, ctx),
            ExprKind::GetAttr { object, name } => call::eval_get_attr(ev, object, name, scope, ctx),
            ExprKind::Index { left, index } => index::eval_index(ev, left, index, scope, ctx),
        };

        control::locate(result, self.pos)
    }
}
