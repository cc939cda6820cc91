//! Callable value types: functions, builtins, and modules

use std::fmt;
use std::sync::Arc;

use crate::ast::{Block, Expression, FunctionLiteral};
use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::scope::Scope;

use super::Value;

/// Type alias for builtin function pointers to reduce complexity
pub type BuiltinFnPtr = Arc<dyn Fn(&EvalContext, &[Value]) -> Value + Send + Sync>;

/// Re-entry into the evaluator from native code.
///
/// The value layer owns this capability so builtins can call script
/// functions without depending on the evaluator; the evaluator supplies
/// the implementation at each top-level entry point.
pub trait Invoker: Send + Sync {
    /// Call `function` with `args` and return its result.
    fn invoke(&self, ctx: &EvalContext, function: &Value, args: Vec<Value>) -> Value;
}

/// A script function: a literal paired with the scope it was created in.
///
/// The captured scope is fixed at creation time, which is what makes
/// closures work.
pub struct Function {
    /// The literal this function was created from (shared, never copied)
    pub literal: Arc<FunctionLiteral>,

    /// Scope active when the literal was evaluated
    pub scope: Scope,
}

impl Function {
    /// Create a new function value
    pub fn new(literal: Arc<FunctionLiteral>, scope: Scope) -> Self {
        Self { literal, scope }
    }

    /// Declared name, or `"anonymous"`.
    pub fn name(&self) -> &str {
        self.literal.name.as_deref().unwrap_or("anonymous")
    }

    pub fn parameters(&self) -> &[String] {
        &self.literal.parameters
    }

    pub fn defaults(&self) -> &indexmap::IndexMap<String, Expression> {
        &self.literal.defaults
    }

    pub fn body(&self) -> &Block {
        &self.literal.body
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({}/{})", self.name(), self.parameters().len())
    }
}

/// A built-in native function.
///
/// These are Rust functions exposed to the interpreter.
#[derive(Clone)]
pub struct BuiltinFn {
    /// Function name (for display/debugging and override lookup)
    pub name: String,

    /// Arity (-1 for variadic)
    pub arity: i32,

    /// The actual function pointer
    pub func: BuiltinFnPtr,

    /// Receives its arguments even when they evaluated to errors
    pub error_handler: bool,
}

impl BuiltinFn {
    /// Wrap a native function.
    pub fn new<F>(name: impl Into<String>, arity: i32, func: F) -> Self
    where
        F: Fn(&EvalContext, &[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            func: Arc::new(func),
            error_handler: false,
        }
    }

    /// Mark this builtin as an error handler.
    pub fn handling_errors(mut self) -> Self {
        self.error_handler = true;
        self
    }

    /// Check arity, then call the native function.
    pub fn call(&self, ctx: &EvalContext, args: &[Value]) -> Value {
        if self.arity >= 0 && args.len() != self.arity as usize {
            return Value::error(
                ErrorKind::Arity,
                format!(
                    "{}() takes exactly {} argument{} ({} given)",
                    self.name,
                    self.arity,
                    if self.arity == 1 { "" } else { "s" },
                    args.len()
                ),
            );
        }
        (self.func)(ctx, args)
    }

    /// Whether both values wrap the same native function.
    pub fn ptr_eq(&self, other: &BuiltinFn) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}

/// A module: a named scope whose bindings are its members.
#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub scope: Scope,
}

impl Module {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    /// Build a host module from builtins.
    ///
    /// Each builtin becomes a read-only member named by the last
    /// dot-separated part of its name, so `json.marshal` is `marshal`.
    pub fn from_builtins(name: impl Into<String>, builtins: Vec<BuiltinFn>) -> Self {
        let name = name.into();
        let scope = Scope::root(name.clone());
        for builtin in builtins {
            let member = builtin
                .name
                .rsplit('.')
                .next()
                .unwrap_or(builtin.name.as_str())
                .to_string();
            // Names are unique within a host module; a duplicate keeps the first.
            let _ = scope.declare(member, Value::Builtin(builtin), true);
        }
        Self { name, scope }
    }

    /// Look up a member bound directly in the module scope.
    pub fn member(&self, name: &str) -> Option<Value> {
        if self.scope.contains_local(name) {
            self.scope.get(name)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_arity_checked() {
        let double = BuiltinFn::new("double", 1, |_, args| match &args[0] {
            Value::Int(n) => Value::Int(n * 2),
            _ => Value::Nil,
        });
        let ctx = EvalContext::new();
        assert!(matches!(double.call(&ctx, &[Value::Int(4)]), Value::Int(8)));
        let err = double.call(&ctx, &[]);
        assert_eq!(
            err.as_error().unwrap().to_string(),
            "arity error: double() takes exactly 1 argument (0 given)"
        );
    }

    #[test]
    fn test_variadic_builtin_skips_arity() {
        let count = BuiltinFn::new("count", -1, |_, args| Value::Int(args.len() as i64));
        let ctx = EvalContext::new();
        assert!(matches!(
            count.call(&ctx, &[Value::Nil, Value::Nil]),
            Value::Int(2)
        ));
    }

    #[test]
    fn test_module_members() {
        let module = Module::from_builtins(
            "m",
            vec![BuiltinFn::new("one", 0, |_, _| Value::Int(1))],
        );
        assert!(module.member("one").is_some());
        assert!(module.member("two").is_none());
    }
}
