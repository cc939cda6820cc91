//! Evaluator re-entry for native code

use tracing::trace;

use super::Evaluator;
use crate::context::EvalContext;
use crate::scope::Scope;
use crate::value::{Invoker, Value};

/// The call hook [`Evaluator::evaluate`] installs into its context.
///
/// Builtins such as `map` or `spawn` receive functions as plain values and
/// call them back through this hook.
pub struct CallHook {
    evaluator: Evaluator,
    scope: Scope,
}

impl CallHook {
    pub fn new(evaluator: Evaluator, scope: Scope) -> Self {
        Self { evaluator, scope }
    }

    /// The scope the installing evaluation ran in.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Invoker for CallHook {
    fn invoke(&self, ctx: &EvalContext, function: &Value, args: Vec<Value>) -> Value {
        trace!(
            function = %function,
            args = args.len(),
            scope = self.scope.name(),
            "invoke via call hook"
        );
        self.evaluator.apply(function, args, ctx)
    }
}
