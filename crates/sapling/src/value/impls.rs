//! Constructors, type tags, truthiness and equality

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{ErrorKind, ScriptError};

use super::{ScriptResult, Value};

// ═══════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Arc::new(s.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items)))
    }

    pub fn map(entries: IndexMap<String, Value>) -> Self {
        Value::Map(Arc::new(RwLock::new(entries)))
    }

    /// A non-fatal error value.
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Value::Error(Arc::new(ScriptError::new(kind, message)))
    }

    pub fn from_error(err: ScriptError) -> Self {
        Value::Error(Arc::new(err))
    }

    pub fn ok(value: Value) -> Self {
        Value::Result(Arc::new(ScriptResult::Ok(value)))
    }

    pub fn err(value: Value) -> Self {
        Value::Result(Arc::new(ScriptResult::Err(value)))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<ScriptError> for Value {
    fn from(err: ScriptError) -> Self {
        Value::from_error(err)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Type tags and sentinel tests
// ═══════════════════════════════════════════════════════════════════════

impl Value {
    /// Type tag, as reported by the `type` builtin.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Regex(_) => "regex",
            Value::Result(_) => "result",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin",
            Value::Module(_) => "module",
            Value::Thread(_) => "thread",
            Value::Host(obj) => obj.type_name(),
            Value::Error(_) => "error",
            Value::Return(_) => "return_value",
            Value::Break => "break_value",
            Value::Continue => "continue_value",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_error(&self) -> Option<&ScriptError> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this value is one of the control-flow sentinels.
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            Value::Error(_) | Value::Return(_) | Value::Break | Value::Continue
        )
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_))
    }

    /// Strip a `Return` wrapper.
    pub fn unwrap_return(self) -> Value {
        match self {
            Value::Return(inner) => *inner,
            other => other,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Truthiness
    // ═══════════════════════════════════════════════════════════════════

    /// Truthiness used by `if`, `for`, `!`, `&&` and `||`.
    ///
    /// Nil, false, numeric zero and empty strings/collections are falsy;
    /// everything else is truthy. An `err` result is falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.read().is_empty(),
            Value::Map(entries) => !entries.read().is_empty(),
            Value::Result(result) => matches!(**result, ScriptResult::Ok(_)),
            _ => true,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Equality
    // ═══════════════════════════════════════════════════════════════════

    /// Script-level `==`: like [`strict_equals`](Self::strict_equals), but
    /// ints and floats compare numerically.
    pub fn equals(&self, other: &Value) -> bool {
        self.compare(other, true, &mut Vec::new())
    }

    /// Structural equality: same type tag and same value.
    ///
    /// Callables, modules, threads and host objects compare by identity.
    /// Collections that contain themselves compare unequal to any other
    /// collection once the walk returns to a pair it is still comparing.
    pub fn strict_equals(&self, other: &Value) -> bool {
        self.compare(other, false, &mut Vec::new())
    }

    /// `active` holds the collection pairs on the current walk.
    fn compare(&self, other: &Value, numeric: bool, active: &mut Vec<(usize, usize)>) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) if numeric => {
                (*a as f64) == *b
            }
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Arc::as_ptr(a) as usize, Arc::as_ptr(b) as usize);
                if active.contains(&pair) {
                    return false;
                }
                active.push(pair);
                let equal = {
                    let (a, b) = (a.read(), b.read());
                    a.len() == b.len()
                        && a.iter()
                            .zip(b.iter())
                            .all(|(x, y)| x.compare(y, numeric, active))
                };
                active.pop();
                equal
            }
            (Value::Map(a), Value::Map(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Arc::as_ptr(a) as usize, Arc::as_ptr(b) as usize);
                if active.contains(&pair) {
                    return false;
                }
                active.push(pair);
                let equal = {
                    let (a, b) = (a.read(), b.read());
                    a.len() == b.len()
                        && a.iter().all(|(k, v)| {
                            b.get(k)
                                .is_some_and(|other| v.compare(other, numeric, active))
                        })
                };
                active.pop();
                equal
            }
            (Value::Regex(a), Value::Regex(b)) => a.as_str() == b.as_str(),
            (Value::Result(a), Value::Result(b)) => match (&**a, &**b) {
                (ScriptResult::Ok(x), ScriptResult::Ok(y)) => x.compare(y, numeric, active),
                (ScriptResult::Err(x), ScriptResult::Err(y)) => x.compare(y, numeric, active),
                _ => false,
            },
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a.ptr_eq(b),
            (Value::Module(a), Value::Module(b)) => Arc::ptr_eq(a, b),
            (Value::Thread(a), Value::Thread(b)) => Arc::ptr_eq(a, b),
            (Value::Host(a), Value::Host(b)) => Arc::ptr_eq(a, b),
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Return(a), Value::Return(b)) => a.compare(b, numeric, active),
            (Value::Break, Value::Break) => true,
            (Value::Continue, Value::Continue) => true,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}
