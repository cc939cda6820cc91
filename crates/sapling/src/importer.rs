//! Module importers
//!
//! An importer turns a module name into an evaluated [`Module`]. The
//! evaluator only sees the [`Importer`] trait; where source comes from is
//! up to the implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::context::EvalContext;
use crate::error::ImportError;
use crate::eval::function::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::eval::Evaluator;
use crate::frontend::{Frontend, SaplingFrontend};
use crate::scope::Scope;
use crate::value::{Module, Value};

/// Resolves module names for `import` statements.
pub trait Importer: Send + Sync {
    /// Load and evaluate the module called `name`.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] if the module does not exist, cannot be
    /// read or parsed, or its body evaluates to an error.
    fn import(
        &self,
        evaluator: &Evaluator,
        name: &str,
        ctx: &EvalContext,
    ) -> Result<Arc<Module>, ImportError>;
}

/// Parse `source` and evaluate it into a fresh root scope named `name`.
///
/// Fails with [`ImportError::Cycle`] if `name` is already being imported
/// by an enclosing module.
fn evaluate_module(
    evaluator: &Evaluator,
    name: &str,
    file: &str,
    source: &str,
    ctx: &EvalContext,
) -> Result<Arc<Module>, ImportError> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
        evaluate_module_body(evaluator, name, file, source, ctx)
    })
}

fn evaluate_module_body(
    evaluator: &Evaluator,
    name: &str,
    file: &str,
    source: &str,
    ctx: &EvalContext,
) -> Result<Arc<Module>, ImportError> {
    let _import = ctx.enter_import(name)?;
    let program = SaplingFrontend::new(file)
        .parse(source)
        .map_err(|source| ImportError::Parse {
            name: name.to_string(),
            source,
        })?;

    let _guard = ctx.enter_call().map_err(|source| ImportError::Eval {
        name: name.to_string(),
        source,
    })?;

    let scope = Scope::root(name);
    if let Value::Error(err) = evaluator.evaluate(&program, &scope, ctx) {
        return Err(ImportError::Eval {
            name: name.to_string(),
            source: (*err).clone(),
        });
    }
    Ok(Arc::new(Module::new(name, scope)))
}

// ═══════════════════════════════════════════════════════════════════════
// File importer
// ═══════════════════════════════════════════════════════════════════════

/// Loads `<root>/<name>.sap` and caches each module after its first
/// successful import.
pub struct FileImporter {
    root: PathBuf,
    extension: String,
    cache: DashMap<String, Arc<Module>>,
}

impl FileImporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: SaplingFrontend::default().file_extension().to_string(),
            cache: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn module_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{}", self.extension))
    }
}

impl Importer for FileImporter {
    fn import(
        &self,
        evaluator: &Evaluator,
        name: &str,
        ctx: &EvalContext,
    ) -> Result<Arc<Module>, ImportError> {
        if let Some(module) = self.cache.get(name) {
            debug!(module = name, "import cache hit");
            return Ok(Arc::clone(module.value()));
        }

        // Module names are plain identifiers, so the path stays under root.
        let path = self.module_path(name);
        if !path.is_file() {
            return Err(ImportError::NotFound {
                name: name.to_string(),
            });
        }
        let source = std::fs::read_to_string(&path).map_err(|e| ImportError::Io {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        debug!(module = name, path = %path.display(), "loading module");
        let module = evaluate_module(evaluator, name, &path.display().to_string(), &source, ctx)?;
        self.cache.insert(name.to_string(), Arc::clone(&module));
        Ok(module)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// In-memory importer
// ═══════════════════════════════════════════════════════════════════════

/// Serves module sources from memory. Every import evaluates afresh.
#[derive(Debug, Default, Clone)]
pub struct MemoryImporter {
    sources: HashMap<String, String>,
}

impl MemoryImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module source.
    pub fn with_module(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.sources.insert(name.into(), source.into());
        self
    }
}

impl Importer for MemoryImporter {
    fn import(
        &self,
        evaluator: &Evaluator,
        name: &str,
        ctx: &EvalContext,
    ) -> Result<Arc<Module>, ImportError> {
        let source = self.sources.get(name).ok_or_else(|| ImportError::NotFound {
            name: name.to_string(),
        })?;
        evaluate_module(evaluator, name, name, source, ctx)
    }
}
