//! Value representation for runtime values

mod attrs;
mod callable;
mod display;
mod impls;
mod interop;
mod thread;

pub use callable::{BuiltinFn, BuiltinFnPtr, Function, Invoker, Module};
pub use thread::ThreadHandle;
pub(crate) use attrs::{unwrap_result, unwrap_result_or};

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::ScriptError;

/// Runtime value representation for the Sapling interpreter.
///
/// Values are organized into four tiers:
/// - Tier 1: Inline primitives (no allocation)
/// - Tier 2: Shared collections (Arc-wrapped, mutable in place)
/// - Tier 3: Callables, modules and host objects
/// - Tier 4: Control-flow sentinels, which never escape a program or call
#[derive(Clone, Debug)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Primitives
    // ═══════════════════════════════════════════════════════════════════
    /// The absence of a value
    Nil,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Float(f64),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Shared Collections
    // ═══════════════════════════════════════════════════════════════════
    /// Immutable string
    Str(Arc<String>),

    /// List with shared, mutable backing storage
    List(Arc<RwLock<Vec<Value>>>),

    /// String-keyed map in insertion order, shared and mutable
    Map(Arc<RwLock<IndexMap<String, Value>>>),

    /// Compiled regular expression
    Regex(Arc<regex::Regex>),

    /// Explicit success/failure wrapper, catchable by scripts
    Result(Arc<ScriptResult>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 3: Callables, Modules, Host Objects
    // ═══════════════════════════════════════════════════════════════════
    /// Script function with its captured scope
    Function(Arc<Function>),

    /// Host-native function
    Builtin(BuiltinFn),

    /// Imported or host-provided module
    Module(Arc<Module>),

    /// Handle to a spawned worker
    Thread(Arc<ThreadHandle>),

    /// Host-defined object
    Host(Arc<dyn Object>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 4: Control-Flow Sentinels
    // ═══════════════════════════════════════════════════════════════════
    /// Evaluation failure, bubbled as a value
    Error(Arc<ScriptError>),

    /// Value being returned from a function body
    Return(Box<Value>),

    /// Loop termination signal
    Break,

    /// Skip to the next loop iteration
    Continue,
}

/// Payload of [`Value::Result`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptResult {
    Ok(Value),
    Err(Value),
}

/// Capability interface for host-defined values.
///
/// Every [`Value`] exposes the same four capabilities; a host object
/// embedded as [`Value::Host`] provides them through this trait.
pub trait Object: Send + Sync + fmt::Debug {
    /// Type tag reported by `type()`.
    fn type_name(&self) -> &str;

    /// Display form.
    fn inspect(&self) -> String;

    /// Attribute lookup (methods and properties).
    fn get_attr(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Host-native form used for formatting and interop.
    fn interface(&self) -> serde_json::Value {
        serde_json::Value::String(self.inspect())
    }
}
