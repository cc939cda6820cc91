//! Bridge between script values and host-native JSON values

use std::sync::Arc;

use indexmap::IndexMap;

use super::{ScriptResult, Value};

impl Value {
    /// Host-native form of this value.
    ///
    /// Data converts structurally; callables, modules and sentinels convert
    /// to their display string. A collection nested inside itself converts
    /// to the string `"[...]"` or `"{...}"`.
    pub fn interface(&self) -> serde_json::Value {
        self.to_json(&mut Vec::new())
    }

    fn to_json(&self, active: &mut Vec<usize>) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Nil => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s.to_string()),
            Value::List(items) => {
                let id = Arc::as_ptr(items) as usize;
                if active.contains(&id) {
                    return Json::String("[...]".to_string());
                }
                active.push(id);
                let array = items.read().iter().map(|v| v.to_json(active)).collect();
                active.pop();
                Json::Array(array)
            }
            Value::Map(entries) => {
                let id = Arc::as_ptr(entries) as usize;
                if active.contains(&id) {
                    return Json::String("{...}".to_string());
                }
                active.push(id);
                let object = entries
                    .read()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json(active)))
                    .collect();
                active.pop();
                Json::Object(object)
            }
            Value::Result(result) => {
                let (key, inner) = match &**result {
                    ScriptResult::Ok(v) => ("ok", v),
                    ScriptResult::Err(v) => ("err", v),
                };
                let mut obj = serde_json::Map::new();
                obj.insert(key.to_string(), inner.to_json(active));
                Json::Object(obj)
            }
            Value::Host(obj) => obj.interface(),
            Value::Return(inner) => inner.to_json(active),
            other => Json::String(other.to_string()),
        }
    }

    /// Convert a host-native JSON value into a script value.
    pub fn from_json(json: serde_json::Value) -> Value {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::Str(Arc::new(s)),
            Json::Array(items) => Value::list(items.into_iter().map(Value::from_json).collect()),
            Json::Object(entries) => Value::map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect::<IndexMap<_, _>>(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_interface_of_nested_data() {
        let mut entries = IndexMap::new();
        entries.insert(
            "xs".to_string(),
            Value::list(vec![Value::Int(1), Value::Float(1.5), Value::Nil]),
        );
        entries.insert("ok".to_string(), Value::ok(Value::Bool(true)));
        assert_eq!(
            Value::map(entries).interface(),
            json!({"xs": [1, 1.5, null], "ok": {"ok": true}})
        );
    }

    #[test]
    fn test_interface_of_self_containing_list() {
        let xs = Value::list(vec![Value::Int(1)]);
        if let Value::List(items) = &xs {
            items.write().push(xs.clone());
        }
        assert_eq!(xs.interface(), json!([1, "[...]"]));
    }

    #[test]
    fn test_from_json_preserves_key_order() {
        let value = Value::from_json(json!({"b": 1, "a": [true, "s"]}));
        assert_eq!(value.to_string(), "{\"b\": 1, \"a\": [true, \"s\"]}");
    }
}
