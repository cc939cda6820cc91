//! Sapling: an embeddable scripting-language evaluation engine
//!
//! Source text is parsed by the reference [`frontend`] into an immutable
//! [`ast::Program`], which the [`Evaluator`] walks against a chain of
//! [`Scope`]s to produce a [`Value`]. Expected failures never unwind the
//! host: they travel through evaluation as [`Value::Error`] sentinels.
//!
//! ```text
//! source ──► frontend ──► ast::Program ──► Evaluator(Program, Scope, EvalContext) ──► Value
//! ```
//!
//! Most embeddings only need the [`Interpreter`] facade:
//!
//! ```no_run
//! use sapling::{Config, Interpreter};
//!
//! let interp = Interpreter::new(Config::default());
//! let value = interp.run("x := 2\nx * 21").unwrap();
//! assert_eq!(value.to_string(), "42");
//! ```

pub mod ast;
pub mod builtins;
pub mod config;
pub mod context;
pub mod error;
pub mod eval;
pub mod frontend;
pub mod importer;
pub mod interpreter;
pub mod scope;
pub mod value;

pub use builtins::Builtins;
pub use config::Config;
pub use context::EvalContext;
pub use error::{ErrorKind, ImportError, SaplingError, ScopeError, ScriptError};
pub use eval::{CallHook, Evaluate, Evaluator};
pub use frontend::{parse, Frontend, ParseError, SaplingFrontend, SourceLocation};
pub use importer::{FileImporter, Importer, MemoryImporter};
pub use interpreter::Interpreter;
pub use scope::Scope;
pub use value::{BuiltinFn, Function, Invoker, Module, Object, Value};

/// Crate version, as recorded in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
