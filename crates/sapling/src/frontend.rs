//! Language frontend for Sapling
//!
//! The frontend is the parser collaborator of the evaluation engine: it
//! turns source text into an immutable [`Program`]. The evaluator never
//! depends on it, so embeddings may supply any [`Frontend`] that produces
//! the same AST.
//!
//! ```text
//! Source Code → [Frontend] → ast::Program → [Evaluator] → Value
//! ```

mod lexer;
mod parser;

pub use lexer::{tokenize, Token};
pub use parser::Parser;

use std::fmt;

use crate::ast::Program;
use crate::error::ScriptError;

// ═══════════════════════════════════════════════════════════════════════
// ERROR TYPES
// ═══════════════════════════════════════════════════════════════════════

/// Error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,

    /// Optional source location
    pub location: Option<SourceLocation>,

    /// Optional source snippet for context
    pub snippet: Option<String>,
}

impl ParseError {
    /// Create a new parse error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            snippet: None,
        }
    }

    /// Add location information to the error.
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Add a source snippet for context.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}:{}:{}", loc.file, loc.line, loc.column)?;
        }
        if let Some(snippet) = &self.snippet {
            write!(f, "\n{}", snippet)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Source code location for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// File name or identifier
    pub file: String,

    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location.
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FRONTEND TRAIT
// ═══════════════════════════════════════════════════════════════════════

/// A source language that produces Sapling ASTs.
pub trait Frontend: Send + Sync {
    /// Parse source text into a program.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first syntax error.
    fn parse(&self, source: &str) -> Result<Program, ParseError>;

    /// Render a runtime error against the source it came from.
    fn format_error(&self, error: &ScriptError, source: &str) -> String {
        let mut out = error.to_string();
        if let Some(pos) = error.position {
            out.push_str(&format!("\n  --> {}:{}", self.name(), pos));
            if let Some(line) = source.lines().nth(pos.line.saturating_sub(1)) {
                out.push_str(&format!("\n   | {}\n   | {:>width$}", line, "^", width = pos.column));
            }
        }
        out
    }

    /// Frontend name, used as the file name in diagnostics.
    fn name(&self) -> &str;

    /// Extension of source files, without the dot.
    fn file_extension(&self) -> &str;
}

/// The reference frontend for `.sap` sources.
#[derive(Debug, Clone)]
pub struct SaplingFrontend {
    file: String,
}

impl Default for SaplingFrontend {
    fn default() -> Self {
        Self::new("<input>")
    }
}

impl SaplingFrontend {
    /// A frontend that reports locations in `file`.
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }
}

impl Frontend for SaplingFrontend {
    fn parse(&self, source: &str) -> Result<Program, ParseError> {
        Parser::new(source, &self.file)?.parse_program()
    }

    fn name(&self) -> &str {
        &self.file
    }

    fn file_extension(&self) -> &str {
        "sap"
    }
}

/// Parse source text with the reference frontend.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first syntax error.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    SaplingFrontend::default().parse(source)
}
