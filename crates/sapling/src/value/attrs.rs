//! Attribute lookup: properties and bound methods
//!
//! Methods are returned as builtins that capture their receiver, so
//! `xs.append` is an ordinary callable value and `xs.append(1)` is an
//! ordinary call.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::context::EvalContext;
use crate::error::ErrorKind;

use super::{BuiltinFn, ScriptResult, ThreadHandle, Value};

impl Value {
    /// Look up an attribute by name.
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        match self {
            Value::List(items) => list_attr(items, name),
            Value::Str(s) => string_attr(s, name),
            Value::Map(entries) => map_attr(entries, name),
            Value::Result(result) => result_attr(result, name),
            Value::Module(module) => module.member(name),
            Value::Thread(handle) => thread_attr(handle, name),
            Value::Regex(re) => regex_attr(re, name),
            Value::Host(obj) => obj.get_attr(name),
            _ => None,
        }
    }
}

fn method<F>(receiver: &str, name: &str, arity: i32, func: F) -> Option<Value>
where
    F: Fn(&EvalContext, &[Value]) -> Value + Send + Sync + 'static,
{
    Some(Value::Builtin(BuiltinFn::new(
        format!("{receiver}.{name}"),
        arity,
        func,
    )))
}

pub(crate) fn type_error(message: impl Into<String>) -> Value {
    Value::error(ErrorKind::Type, message)
}

fn require_callable(fname: &str, value: &Value) -> Option<Value> {
    if value.is_callable() {
        None
    } else {
        Some(type_error(format!(
            "{fname}() expected a function argument (got {})",
            value.type_name()
        )))
    }
}

fn require_str<'a>(fname: &str, value: &'a Value) -> Result<&'a str, Value> {
    match value {
        Value::Str(s) => Ok(s.as_str()),
        other => Err(type_error(format!(
            "{fname}() expected a string argument (got {})",
            other.type_name()
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Lists
// ═══════════════════════════════════════════════════════════════════════

fn list_attr(items: &Arc<RwLock<Vec<Value>>>, name: &str) -> Option<Value> {
    let items = Arc::clone(items);
    match name {
        "len" => method("list", name, 0, move |_, _| {
            Value::Int(items.read().len() as i64)
        }),
        "append" => method("list", name, -1, move |_, args| {
            items.write().extend(args.iter().cloned());
            Value::List(Arc::clone(&items))
        }),
        "contains" => method("list", name, 1, move |_, args| {
            Value::Bool(items.read().iter().any(|item| item.equals(&args[0])))
        }),
        "reversed" => method("list", name, 0, move |_, _| {
            Value::list(items.read().iter().rev().cloned().collect())
        }),
        "map" => method("list", name, 1, move |ctx, args| {
            if let Some(err) = require_callable("list.map", &args[0]) {
                return err;
            }
            let snapshot = items.read().clone();
            let mut mapped = Vec::with_capacity(snapshot.len());
            for item in snapshot {
                let result = ctx.invoke(&args[0], vec![item]);
                if result.is_error() {
                    return result;
                }
                mapped.push(result);
            }
            Value::list(mapped)
        }),
        "filter" => method("list", name, 1, move |ctx, args| {
            if let Some(err) = require_callable("list.filter", &args[0]) {
                return err;
            }
            let snapshot = items.read().clone();
            let mut kept = Vec::new();
            for item in snapshot {
                let keep = ctx.invoke(&args[0], vec![item.clone()]);
                if keep.is_error() {
                    return keep;
                }
                if keep.is_truthy() {
                    kept.push(item);
                }
            }
            Value::list(kept)
        }),
        "each" => method("list", name, 1, move |ctx, args| {
            if let Some(err) = require_callable("list.each", &args[0]) {
                return err;
            }
            let snapshot = items.read().clone();
            for item in snapshot {
                let result = ctx.invoke(&args[0], vec![item]);
                if result.is_error() {
                    return result;
                }
            }
            Value::Nil
        }),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Strings
// ═══════════════════════════════════════════════════════════════════════

fn string_attr(s: &Arc<String>, name: &str) -> Option<Value> {
    let s = Arc::clone(s);
    match name {
        "len" => method("string", name, 0, move |_, _| {
            Value::Int(s.chars().count() as i64)
        }),
        "upper" => method("string", name, 0, move |_, _| Value::string(s.to_uppercase())),
        "lower" => method("string", name, 0, move |_, _| Value::string(s.to_lowercase())),
        "trim" => method("string", name, 0, move |_, _| Value::string(s.trim())),
        "split" => method("string", name, -1, move |_, args| {
            let parts: Vec<Value> = match args {
                [] => s.split_whitespace().map(Value::string).collect(),
                [sep] => match require_str("string.split", sep) {
                    Ok(sep) => s.split(sep).map(Value::string).collect(),
                    Err(err) => return err,
                },
                _ => {
                    return Value::error(
                        ErrorKind::Arity,
                        format!("string.split() takes at most 1 argument ({} given)", args.len()),
                    )
                }
            };
            Value::list(parts)
        }),
        "contains" => method("string", name, 1, move |_, args| {
            match require_str("string.contains", &args[0]) {
                Ok(sub) => Value::Bool(s.contains(sub)),
                Err(err) => err,
            }
        }),
        "starts_with" => method("string", name, 1, move |_, args| {
            match require_str("string.starts_with", &args[0]) {
                Ok(prefix) => Value::Bool(s.starts_with(prefix)),
                Err(err) => err,
            }
        }),
        "ends_with" => method("string", name, 1, move |_, args| {
            match require_str("string.ends_with", &args[0]) {
                Ok(suffix) => Value::Bool(s.ends_with(suffix)),
                Err(err) => err,
            }
        }),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Maps
// ═══════════════════════════════════════════════════════════════════════

fn map_attr(entries: &Arc<RwLock<IndexMap<String, Value>>>, name: &str) -> Option<Value> {
    let entries = Arc::clone(entries);
    match name {
        "len" => method("map", name, 0, move |_, _| {
            Value::Int(entries.read().len() as i64)
        }),
        "keys" => method("map", name, 0, move |_, _| {
            Value::list(entries.read().keys().map(Value::string).collect())
        }),
        "values" => method("map", name, 0, move |_, _| {
            Value::list(entries.read().values().cloned().collect())
        }),
        "contains" => method("map", name, 1, move |_, args| {
            match require_str("map.contains", &args[0]) {
                Ok(key) => Value::Bool(entries.read().contains_key(key)),
                Err(err) => err,
            }
        }),
        "get" => method("map", name, -1, move |_, args| {
            let (key, default) = match args {
                [key] => (key, Value::Nil),
                [key, default] => (key, default.clone()),
                _ => {
                    return Value::error(
                        ErrorKind::Arity,
                        format!("map.get() takes 1 or 2 arguments ({} given)", args.len()),
                    )
                }
            };
            match require_str("map.get", key) {
                Ok(key) => entries.read().get(key).cloned().unwrap_or(default),
                Err(err) => err,
            }
        }),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Results
// ═══════════════════════════════════════════════════════════════════════

/// The ok value, or an error describing the err value.
pub(crate) fn unwrap_result(result: &ScriptResult) -> Value {
    match result {
        ScriptResult::Ok(value) => value.clone(),
        ScriptResult::Err(value) => Value::error(
            ErrorKind::Eval,
            format!("unwrap called on err result: {}", value),
        ),
    }
}

/// The ok value, or `default`.
pub(crate) fn unwrap_result_or(result: &ScriptResult, default: &Value) -> Value {
    match result {
        ScriptResult::Ok(value) => value.clone(),
        ScriptResult::Err(_) => default.clone(),
    }
}

fn result_attr(result: &Arc<ScriptResult>, name: &str) -> Option<Value> {
    let result = Arc::clone(result);
    match name {
        "is_ok" => method("result", name, 0, move |_, _| {
            Value::Bool(matches!(*result, ScriptResult::Ok(_)))
        }),
        "is_err" => method("result", name, 0, move |_, _| {
            Value::Bool(matches!(*result, ScriptResult::Err(_)))
        }),
        "unwrap" => method("result", name, 0, move |_, _| unwrap_result(&result)),
        "unwrap_or" => method("result", name, 1, move |_, args| {
            unwrap_result_or(&result, &args[0])
        }),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Threads and regexes
// ═══════════════════════════════════════════════════════════════════════

fn thread_attr(handle: &Arc<ThreadHandle>, name: &str) -> Option<Value> {
    let handle = Arc::clone(handle);
    match name {
        "wait" => method("thread", name, 0, move |ctx, _| handle.wait(ctx)),
        _ => None,
    }
}

fn regex_attr(re: &Arc<regex::Regex>, name: &str) -> Option<Value> {
    let re = Arc::clone(re);
    match name {
        "matches" => method("regex", name, 1, move |_, args| {
            match require_str("regex.matches", &args[0]) {
                Ok(s) => Value::Bool(re.is_match(s)),
                Err(err) => err,
            }
        }),
        "find" => method("regex", name, 1, move |_, args| {
            match require_str("regex.find", &args[0]) {
                Ok(s) => re
                    .find(s)
                    .map(|m| Value::string(m.as_str()))
                    .unwrap_or(Value::Nil),
                Err(err) => err,
            }
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(value: &Value, attr: &str, args: &[Value]) -> Value {
        let Some(Value::Builtin(method)) = value.get_attr(attr) else {
            panic!("no method {attr} on {}", value.type_name());
        };
        method.call(&EvalContext::new(), args)
    }

    #[test]
    fn test_list_append_mutates_in_place() {
        let list = Value::list(vec![Value::Int(1)]);
        call(&list, "append", &[Value::Int(2), Value::Int(3)]);
        assert_eq!(list.to_string(), "[1, 2, 3]");
        assert_eq!(call(&list, "len", &[]), Value::Int(3));
    }

    #[test]
    fn test_list_map_without_hook_is_error() {
        let list = Value::list(vec![Value::Int(1)]);
        let f = Value::Builtin(BuiltinFn::new("id", 1, |_, args| args[0].clone()));
        assert!(call(&list, "map", &[f]).is_error());
    }

    #[test]
    fn test_string_methods() {
        let s = Value::string("  Hello World ");
        assert_eq!(call(&s, "trim", &[]), Value::string("Hello World"));
        assert_eq!(
            call(&Value::string("a,b"), "split", &[Value::string(",")]).to_string(),
            "[\"a\", \"b\"]"
        );
        assert_eq!(call(&s, "contains", &[Value::string("World")]), Value::Bool(true));
        assert!(call(&s, "contains", &[Value::Int(1)]).is_error());
    }

    #[test]
    fn test_map_get_with_default() {
        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), Value::Int(1));
        let map = Value::map(entries);
        assert_eq!(call(&map, "get", &[Value::string("a")]), Value::Int(1));
        assert_eq!(
            call(&map, "get", &[Value::string("z"), Value::Int(0)]),
            Value::Int(0)
        );
    }

    #[test]
    fn test_result_methods() {
        let ok = Value::ok(Value::Int(5));
        let err = Value::err(Value::string("bad"));
        assert_eq!(call(&ok, "is_ok", &[]), Value::Bool(true));
        assert_eq!(call(&err, "is_err", &[]), Value::Bool(true));
        assert_eq!(call(&ok, "unwrap", &[]), Value::Int(5));
        assert!(call(&err, "unwrap", &[]).is_error());
        assert_eq!(call(&err, "unwrap_or", &[Value::Int(0)]), Value::Int(0));
    }

    #[test]
    fn test_unknown_attr_is_none() {
        assert!(Value::Int(1).get_attr("len").is_none());
        assert!(Value::list(vec![]).get_attr("nope").is_none());
    }
}
