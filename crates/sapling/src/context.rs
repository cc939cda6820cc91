//! Evaluation context configuration

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{ErrorKind, ImportError, ScriptError};
use crate::value::{Invoker, Value};

/// Configuration and state for evaluation.
///
/// This is passed through all evaluation calls and controls
/// behavior like recursion limits, cancellation and re-entry from
/// native code.
#[derive(Clone)]
pub struct EvalContext {
    /// Maximum call depth (stack overflow protection)
    pub max_call_depth: usize,

    /// Interrupt flag - set to true to abort evaluation
    pub interrupt: Arc<AtomicBool>,

    /// Point in time after which evaluation fails with a deadline error
    pub deadline: Option<Instant>,

    /// Current call depth of this evaluation
    depth: Cell<usize>,

    /// Modules whose bodies are being evaluated, outermost first
    importing: RefCell<Vec<String>>,

    /// Callback into the evaluator, installed per top-level evaluation
    call_hook: Option<Arc<dyn Invoker>>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
            interrupt: Arc::new(AtomicBool::new(false)),
            deadline: None,
            depth: Cell::new(0),
            importing: RefCell::new(Vec::new()),
            call_hook: None,
        }
    }
}

impl fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContext")
            .field("max_call_depth", &self.max_call_depth)
            .field("interrupted", &self.is_interrupted())
            .field("deadline", &self.deadline)
            .field("depth", &self.depth.get())
            .field("importing", &self.importing.borrow())
            .field("call_hook", &self.call_hook.is_some())
            .finish()
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            max_call_depth: max_depth,
            ..Default::default()
        }
    }

    /// Create a context from host configuration.
    ///
    /// The deadline, if any, starts counting now.
    pub fn from_config(config: &Config) -> Self {
        let ctx = Self::with_max_call_depth(config.max_call_depth);
        match config.timeout() {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }

    /// Set a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Share an existing interrupt flag, e.g. one owned by the host.
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Check if evaluation has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Request interruption of evaluation.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Reset the interrupt flag.
    pub fn reset_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    /// Non-blocking cancellation poll, performed once per node dispatch.
    ///
    /// Returns the fatal deadline error to bubble when the interrupt flag
    /// is set or the deadline has passed.
    pub fn check(&self) -> Option<ScriptError> {
        if self.is_interrupted() {
            return Some(ScriptError::new(
                ErrorKind::Deadline,
                "evaluation interrupted",
            ));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ScriptError::new(
                ErrorKind::Deadline,
                "context deadline exceeded",
            )),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call depth
    // ═══════════════════════════════════════════════════════════════════

    /// Current call depth.
    pub fn call_depth(&self) -> usize {
        self.depth.get()
    }

    /// Enter a function call, failing once the depth limit is reached.
    ///
    /// The returned guard leaves the call when dropped.
    ///
    /// # Errors
    ///
    /// Returns a recursion error if `max_call_depth` would be exceeded.
    pub fn enter_call(&self) -> Result<CallGuard<'_>, ScriptError> {
        let depth = self.depth.get();
        if depth >= self.max_call_depth {
            return Err(ScriptError::new(
                ErrorKind::Recursion,
                format!("maximum call depth of {} exceeded", self.max_call_depth),
            ));
        }
        self.depth.set(depth + 1);
        Ok(CallGuard { ctx: self })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Import chain
    // ═══════════════════════════════════════════════════════════════════

    /// Start evaluating the body of module `name`.
    ///
    /// The returned guard finishes the import when dropped. Nested
    /// evaluations copy the chain, so a module importing one of its
    /// importers is caught before its body runs again.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Cycle`] if `name` is already being imported.
    pub fn enter_import(&self, name: &str) -> Result<ImportGuard<'_>, ImportError> {
        let mut importing = self.importing.borrow_mut();
        if let Some(start) = importing.iter().position(|m| m == name) {
            let mut chain = importing[start..].join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(name);
            return Err(ImportError::Cycle {
                name: name.to_string(),
                chain,
            });
        }
        importing.push(name.to_string());
        Ok(ImportGuard { ctx: self })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Call hook
    // ═══════════════════════════════════════════════════════════════════

    /// Copy of this context with `hook` installed as the call hook.
    pub fn with_call_hook(&self, hook: Arc<dyn Invoker>) -> Self {
        Self {
            call_hook: Some(hook),
            ..self.clone()
        }
    }

    /// The installed call hook, if any.
    pub fn call_hook(&self) -> Option<&Arc<dyn Invoker>> {
        self.call_hook.as_ref()
    }

    /// Call a script function or builtin through the installed hook.
    ///
    /// Without a hook there is no evaluator to re-enter, which is reported
    /// as an error value.
    pub fn invoke(&self, function: &Value, args: Vec<Value>) -> Value {
        match &self.call_hook {
            Some(hook) => hook.invoke(self, function, args),
            None => Value::error(ErrorKind::Eval, "no call hook installed in context"),
        }
    }

    /// Context for an independently scheduled worker.
    ///
    /// Shares the interrupt flag, deadline and call hook; the call depth
    /// starts over.
    pub fn fork(&self) -> Self {
        Self {
            depth: Cell::new(0),
            ..self.clone()
        }
    }
}

/// Leaves a function call when dropped.
#[must_use = "the call is left as soon as the guard is dropped"]
pub struct CallGuard<'a> {
    ctx: &'a EvalContext,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        let depth = self.ctx.depth.get();
        self.ctx.depth.set(depth.saturating_sub(1));
    }
}

/// Finishes a module import when dropped.
#[must_use = "the import is finished as soon as the guard is dropped"]
pub struct ImportGuard<'a> {
    ctx: &'a EvalContext,
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.ctx.importing.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = EvalContext::new();
        assert_eq!(ctx.max_call_depth, 1000);
        assert!(ctx.deadline.is_none());
        assert!(ctx.check().is_none());
        assert!(ctx.call_hook().is_none());
    }

    #[test]
    fn test_interrupt_trips_check() {
        let ctx = EvalContext::new();
        ctx.interrupt();
        let err = ctx.check().unwrap();
        assert_eq!(err.kind, ErrorKind::Deadline);
        assert!(err.is_fatal());
        ctx.reset_interrupt();
        assert!(ctx.check().is_none());
    }

    #[test]
    fn test_interrupt_is_shared_with_clones() {
        let ctx = EvalContext::new();
        let other = ctx.fork();
        ctx.interrupt();
        assert!(other.is_interrupted());
    }

    #[test]
    fn test_expired_deadline_trips_check() {
        let ctx = EvalContext::new().with_deadline(Instant::now());
        let err = ctx.check().unwrap();
        assert_eq!(err.message, "context deadline exceeded");
    }

    #[test]
    fn test_call_depth_guard() {
        let ctx = EvalContext::with_max_call_depth(2);
        {
            let _a = ctx.enter_call().unwrap();
            let _b = ctx.enter_call().unwrap();
            assert_eq!(ctx.call_depth(), 2);
            let err = ctx.enter_call().err().unwrap();
            assert_eq!(err.kind, ErrorKind::Recursion);
        }
        assert_eq!(ctx.call_depth(), 0);
    }

    #[test]
    fn test_import_chain_detects_cycle() {
        let ctx = EvalContext::new();
        let _a = ctx.enter_import("a").unwrap();
        let nested = ctx.clone();
        let _b = nested.enter_import("b").unwrap();
        let err = nested.enter_import("a").err().unwrap();
        assert_eq!(err.to_string(), "import cycle: a -> b -> a");
    }

    #[test]
    fn test_import_guard_pops_chain() {
        let ctx = EvalContext::new();
        drop(ctx.enter_import("a").unwrap());
        assert!(ctx.enter_import("a").is_ok());
    }

    #[test]
    fn test_fork_resets_depth() {
        let ctx = EvalContext::new();
        let _guard = ctx.enter_call().unwrap();
        assert_eq!(ctx.fork().call_depth(), 0);
    }

    #[test]
    fn test_invoke_without_hook_is_error() {
        let ctx = EvalContext::new();
        let result = ctx.invoke(&Value::Nil, vec![]);
        assert!(result.is_error());
    }
}
