//! Error types for Sapling evaluation
//!
//! Script-level failures are values, not host errors: the evaluator wraps a
//! [`ScriptError`] in [`Value::Error`](crate::Value::Error) and bubbles it
//! through ordinary evaluation results. The remaining types here are the
//! `Result` errors of the collaborators (scopes, importers) and of the host
//! facade.

use std::fmt;

use thiserror::Error;

use crate::ast::Position;
use crate::frontend::ParseError;

// ═══════════════════════════════════════════════════════════════════════
// Script errors
// ═══════════════════════════════════════════════════════════════════════

/// Classification of a script-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unresolved identifier
    Name,
    /// Operand or argument type mismatch
    Type,
    /// Argument-count mismatch with no applicable defaults
    Arity,
    /// Out-of-range index
    Index,
    /// Missing map key
    Key,
    /// Integer division or modulo by zero
    ZeroDivision,
    /// Module resolution failed or imports are disabled
    Import,
    /// `assert` failed
    Assertion,
    /// Malformed dynamic construct, e.g. an invalid runtime regex
    Syntax,
    /// Unknown attribute on a value
    Attribute,
    /// Call depth limit exceeded
    Recursion,
    /// Deadline passed or evaluation interrupted
    Deadline,
    /// Any other evaluator failure
    Eval,
}

impl ErrorKind {
    /// The message prefix for this kind, e.g. `"name error"`.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Name => "name error",
            ErrorKind::Type => "type error",
            ErrorKind::Arity => "arity error",
            ErrorKind::Index => "index error",
            ErrorKind::Key => "key error",
            ErrorKind::ZeroDivision => "zero division error",
            ErrorKind::Import => "import error",
            ErrorKind::Assertion => "assertion error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Attribute => "attribute error",
            ErrorKind::Recursion => "recursion error",
            ErrorKind::Deadline => "deadline error",
            ErrorKind::Eval => "eval error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload of the `Error` sentinel.
///
/// `fatal` tells the embedding whether it may keep evaluating sibling
/// top-level statements after this error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    /// Taxonomy entry
    pub kind: ErrorKind,

    /// Human-readable message, without the kind prefix
    pub message: String,

    /// Whether evaluation must stop entirely
    pub fatal: bool,

    /// Source position of the node that produced the error, if known
    pub position: Option<Position>,
}

impl ScriptError {
    /// Create a new error. Only deadline errors are fatal by default.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fatal: kind == ErrorKind::Deadline,
            position: None,
        }
    }

    /// Create an error that stops evaluation regardless of embedding policy.
    pub fn fatal(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            fatal: true,
            ..Self::new(kind, message)
        }
    }

    /// Attach a source position unless one is already recorded.
    ///
    /// The innermost node wins, so errors keep the position where they
    /// were first raised while bubbling outward.
    pub fn at(mut self, position: Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self
    }

    /// Whether this error stops evaluation regardless of embedding policy.
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Collaborator errors
// ═══════════════════════════════════════════════════════════════════════

/// Failure of a [`Scope`](crate::Scope) operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The name is already bound in this exact scope
    #[error("variable already exists: {name}")]
    AlreadyDeclared {
        /// Offending name
        name: String,
    },

    /// No scope in the chain owns the name
    #[error("unknown variable: {name}")]
    UnknownVariable {
        /// Offending name
        name: String,
    },

    /// The owning scope marked the binding read-only
    #[error("cannot update {name} since it is read-only")]
    ReadOnly {
        /// Offending name
        name: String,
    },
}

impl ScopeError {
    /// Convert into the script-level error the evaluator reports.
    pub fn into_script_error(self) -> ScriptError {
        let kind = match &self {
            ScopeError::UnknownVariable { .. } => ErrorKind::Name,
            ScopeError::ReadOnly { .. } => ErrorKind::Type,
            ScopeError::AlreadyDeclared { .. } => ErrorKind::Eval,
        };
        ScriptError::new(kind, self.to_string())
    }
}

/// Failure to resolve a module.
#[derive(Error, Debug, Clone)]
pub enum ImportError {
    /// No importer is installed
    #[error("importing is disabled")]
    Disabled,

    /// The importer has no module by that name
    #[error("module not found: {name}")]
    NotFound {
        /// Requested module
        name: String,
    },

    /// The module is already being imported further up the chain
    #[error("import cycle: {chain}")]
    Cycle {
        /// Requested module
        name: String,
        /// Modules in the cycle, e.g. `a -> b -> a`
        chain: String,
    },

    /// The module source could not be read
    #[error("failed to read module {name}: {message}")]
    Io {
        /// Requested module
        name: String,
        /// Underlying I/O message
        message: String,
    },

    /// The module source did not parse
    #[error("failed to parse module {name}: {source}")]
    Parse {
        /// Requested module
        name: String,
        /// Parser diagnostic
        #[source]
        source: ParseError,
    },

    /// The module body produced an error while evaluating
    #[error("module {name} failed to evaluate: {source}")]
    Eval {
        /// Requested module
        name: String,
        /// Error raised by the module body
        #[source]
        source: ScriptError,
    },
}

// ═══════════════════════════════════════════════════════════════════════
// Host-facing errors
// ═══════════════════════════════════════════════════════════════════════

/// Main error type for Sapling host operations
#[derive(Error, Debug)]
pub enum SaplingError {
    /// Source text did not parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Evaluation produced a top-level error value
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Sapling host operations
pub type Result<T> = std::result::Result<T, SaplingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_error_display_has_kind_prefix() {
        let err = ScriptError::new(ErrorKind::Name, "\"x\" is not defined");
        assert_eq!(err.to_string(), "name error: \"x\" is not defined");
    }

    #[test]
    fn test_only_deadline_is_fatal_by_default() {
        assert!(ScriptError::new(ErrorKind::Deadline, "timeout").is_fatal());
        assert!(!ScriptError::new(ErrorKind::Type, "bad").is_fatal());
        assert!(ScriptError::fatal(ErrorKind::Type, "bad").is_fatal());
    }

    #[test]
    fn test_position_innermost_wins() {
        let inner = Position::new(2, 5);
        let outer = Position::new(1, 1);
        let err = ScriptError::new(ErrorKind::Eval, "boom").at(inner).at(outer);
        assert_eq!(err.position, Some(inner));
    }

    #[test]
    fn test_scope_error_messages() {
        let err = ScopeError::ReadOnly { name: "x".into() };
        assert_eq!(err.to_string(), "cannot update x since it is read-only");
        let err = ScopeError::UnknownVariable { name: "y".into() };
        assert_eq!(err.to_string(), "unknown variable: y");
        assert_eq!(err.into_script_error().kind, ErrorKind::Name);
    }

    #[test]
    fn test_import_error_disabled() {
        assert_eq!(ImportError::Disabled.to_string(), "importing is disabled");
    }
}
