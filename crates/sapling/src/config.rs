//! Host-facing configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SaplingError;

/// Settings an embedding applies to an [`Interpreter`](crate::Interpreter).
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```
/// use sapling::Config;
///
/// let config = Config::from_json(r#"{"timeout_ms": 250, "keep_going": true}"#).unwrap();
/// assert_eq!(config.max_call_depth, 1000);
/// assert!(config.keep_going);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum function call depth before a recursion error
    pub max_call_depth: usize,

    /// Per-run deadline in milliseconds
    pub timeout_ms: Option<u64>,

    /// Continue with the next top-level statement after a non-fatal error
    pub keep_going: bool,

    /// Directory searched by the file importer; imports are disabled when unset
    pub import_path: Option<PathBuf>,

    /// Builtins disabled through the evaluator's override table
    pub disabled_builtins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
            timeout_ms: None,
            keep_going: false,
            import_path: None,
            disabled_builtins: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a JSON document into a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SaplingError::Config`] if the document is not valid JSON or
    /// a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, SaplingError> {
        serde_json::from_str(json).map_err(|e| SaplingError::Config(e.to_string()))
    }

    /// The per-run timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
