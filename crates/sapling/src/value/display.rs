//! Display forms for values
//!
//! `Display` is the form `print` writes: strings appear raw. `inspect` is
//! the form used for collection elements: strings appear quoted.

use std::fmt;
use std::sync::Arc;

use super::{ScriptResult, Value};

impl Value {
    /// Display form with strings quoted.
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.render(&mut out, true, &mut Vec::new());
        out
    }

    /// Write this value, quoting strings if `quote` is set.
    ///
    /// `active` holds the collections being written on the current path; a
    /// collection met again inside itself renders as `[...]` or `{...}`.
    fn render(&self, f: &mut dyn fmt::Write, quote: bool, active: &mut Vec<usize>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Str(s) if quote => write!(f, "{:?}", s.as_str()),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                let id = Arc::as_ptr(items) as usize;
                if active.contains(&id) {
                    return write!(f, "[...]");
                }
                active.push(id);
                write!(f, "[")?;
                for (i, item) in items.read().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.render(f, true, active)?;
                }
                active.pop();
                write!(f, "]")
            }
            Value::Map(entries) => {
                let id = Arc::as_ptr(entries) as usize;
                if active.contains(&id) {
                    return write!(f, "{{...}}");
                }
                active.push(id);
                write!(f, "{{")?;
                for (i, (key, value)) in entries.read().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: ", key)?;
                    value.render(f, true, active)?;
                }
                active.pop();
                write!(f, "}}")
            }
            Value::Regex(re) => write!(f, "regex({:?})", re.as_str()),
            Value::Result(result) => {
                let (tag, inner) = match &**result {
                    ScriptResult::Ok(v) => ("ok", v),
                    ScriptResult::Err(v) => ("err", v),
                };
                write!(f, "{}(", tag)?;
                inner.render(f, true, active)?;
                write!(f, ")")
            }
            Value::Function(func) => {
                write!(f, "func ")?;
                if let Some(name) = &func.literal.name {
                    write!(f, "{}", name)?;
                }
                write!(f, "({}) {{ ... }}", func.parameters().join(", "))
            }
            Value::Builtin(b) => write!(f, "builtin({})", b.name),
            Value::Module(m) => write!(f, "module({})", m.name),
            Value::Thread(t) => write!(f, "thread({})", t.name()),
            Value::Host(obj) => write!(f, "{}", obj.inspect()),
            Value::Error(err) => write!(f, "{}", err),
            Value::Return(inner) => inner.render(f, quote, active),
            Value::Break => write!(f, "break"),
            Value::Continue => write!(f, "continue"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, false, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitives() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(Value::string("hi").inspect(), "\"hi\"");
    }

    #[test]
    fn test_collections_inspect_elements() {
        let list = Value::list(vec![Value::Int(1), Value::string("a")]);
        assert_eq!(list.to_string(), "[1, \"a\"]");

        let mut entries = IndexMap::new();
        entries.insert("k".to_string(), Value::Bool(true));
        assert_eq!(Value::map(entries).to_string(), "{\"k\": true}");
    }

    #[test]
    fn test_self_containing_list_renders_marker() {
        let xs = Value::list(vec![Value::Int(1)]);
        if let Value::List(items) = &xs {
            items.write().push(xs.clone());
        }
        assert_eq!(xs.to_string(), "[1, [...]]");
        assert_eq!(Value::ok(xs.clone()).to_string(), "ok([1, [...]])");
    }

    #[test]
    fn test_shared_list_is_not_a_cycle() {
        let inner = Value::list(vec![Value::Int(2)]);
        let outer = Value::list(vec![inner.clone(), inner]);
        assert_eq!(outer.to_string(), "[[2], [2]]");
    }

    #[test]
    fn test_results() {
        assert_eq!(Value::ok(Value::Int(1)).to_string(), "ok(1)");
        assert_eq!(Value::err(Value::string("no")).to_string(), "err(\"no\")");
    }
}
