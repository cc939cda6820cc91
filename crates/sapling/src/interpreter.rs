//! Host embedding facade
//!
//! An [`Interpreter`] owns an evaluator configured from a [`Config`] and a
//! global scope that persists across runs, so a host can define values,
//! run several sources against the same globals, and interrupt a run from
//! another thread.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{anyhow, Context as _};
use tracing::{debug, warn};

use crate::ast::Program;
use crate::builtins::json;
use crate::config::Config;
use crate::context::EvalContext;
use crate::error::{SaplingError, ScopeError};
use crate::eval::Evaluator;
use crate::frontend::{Frontend, SaplingFrontend};
use crate::importer::{FileImporter, Importer};
use crate::scope::Scope;
use crate::value::{BuiltinFn, Value};

pub struct Interpreter {
    config: Config,
    evaluator: Evaluator,
    globals: Scope,
    interrupt: Arc<AtomicBool>,
}

impl Interpreter {
    /// Build an interpreter from host configuration.
    ///
    /// Installs a [`FileImporter`] when `import_path` is set and disables
    /// every builtin named in `disabled_builtins`.
    pub fn new(config: Config) -> Self {
        let mut evaluator = Evaluator::new().with_keep_going(config.keep_going);
        if let Some(path) = &config.import_path {
            evaluator = evaluator.with_importer(Arc::new(FileImporter::new(path)));
        }
        for name in &config.disabled_builtins {
            evaluator.builtins().disable(name.as_str());
        }

        let globals = Scope::root("global");
        if let Err(err) = globals.declare("json", Value::Module(Arc::new(json::module())), true) {
            warn!(error = %err, "json module not installed");
        }

        debug!(
            max_call_depth = config.max_call_depth,
            timeout_ms = ?config.timeout_ms,
            imports = config.import_path.is_some(),
            "interpreter created"
        );
        Self {
            config,
            evaluator,
            globals,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the importer, e.g. with a [`MemoryImporter`](crate::MemoryImporter).
    pub fn with_importer(mut self, importer: Arc<dyn Importer>) -> Self {
        self.evaluator = self.evaluator.with_importer(importer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// The flag that interrupts the current and every later run when set.
    ///
    /// Clear it with `store(false, ..)` to run again.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// A fresh context for one run: configured limits, a deadline counting
    /// from now, and the shared interrupt flag.
    pub fn context(&self) -> EvalContext {
        EvalContext::from_config(&self.config).with_interrupt(Arc::clone(&self.interrupt))
    }

    /// Bind a mutable global.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyDeclared`] if the global exists.
    pub fn define(&self, name: impl Into<String>, value: Value) -> Result<(), ScopeError> {
        self.globals.declare(name, value, false)
    }

    /// Bind a host builtin as a read-only global.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyDeclared`] if the global exists.
    pub fn add_builtin(&self, builtin: BuiltinFn) -> Result<(), ScopeError> {
        self.globals.add_builtin(builtin)
    }

    /// Evaluate a parsed program against the globals.
    pub fn eval_program(&self, program: &Program) -> Value {
        self.evaluator.evaluate(program, &self.globals, &self.context())
    }

    /// Parse and evaluate `source`.
    ///
    /// # Errors
    ///
    /// Returns [`SaplingError::Parse`] if the source does not parse, or
    /// [`SaplingError::Script`] if evaluation ends in an error value.
    pub fn run(&self, source: &str) -> Result<Value, SaplingError> {
        let program = SaplingFrontend::default().parse(source)?;
        match self.eval_program(&program) {
            Value::Error(err) => Err(SaplingError::Script((*err).clone())),
            value => Ok(value),
        }
    }

    /// Read, parse and evaluate a script file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, does not parse, or evaluates to an
    /// error; runtime errors are rendered against the file's source.
    pub fn run_file(&self, path: impl AsRef<Path>) -> anyhow::Result<Value> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let frontend = SaplingFrontend::new(path.display().to_string());
        let program = frontend
            .parse(&source)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        match self.eval_program(&program) {
            Value::Error(err) => Err(anyhow!(frontend.format_error(&err, &source))),
            value => Ok(value),
        }
    }
}
