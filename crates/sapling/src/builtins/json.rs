//! The `json` host module

use crate::context::EvalContext;
use crate::error::ErrorKind;
use crate::value::{BuiltinFn, Module, Value};

use super::arg_type_error;

/// Build the `json` module with `marshal` and `unmarshal` members.
///
/// Member builtins carry qualified names so an override of a global
/// builtin never replaces a module member by accident.
pub fn module() -> Module {
    Module::from_builtins(
        "json",
        vec![
            BuiltinFn::new("json.marshal", 1, marshal),
            BuiltinFn::new("json.unmarshal", 1, unmarshal),
        ],
    )
}

fn marshal(_ctx: &EvalContext, args: &[Value]) -> Value {
    match serde_json::to_string(&args[0].interface()) {
        Ok(text) => Value::string(text),
        Err(e) => Value::error(ErrorKind::Type, format!("json.marshal() failed: {e}")),
    }
}

fn unmarshal(_ctx: &EvalContext, args: &[Value]) -> Value {
    let Value::Str(text) = &args[0] else {
        return arg_type_error("json.unmarshal", "a string", &args[0]);
    };
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => Value::from_json(json),
        Err(e) => Value::error(ErrorKind::Syntax, format!("json.unmarshal() invalid JSON: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> BuiltinFn {
        match module().member(name) {
            Some(Value::Builtin(builtin)) => builtin,
            other => panic!("missing json member {name}: {other:?}"),
        }
    }

    #[test]
    fn test_marshal_keeps_insertion_order() {
        let value = Value::from_json(serde_json::json!({"z": 1, "a": [true, null]}));
        let text = member("marshal").call(&EvalContext::new(), &[value]);
        assert_eq!(text, Value::string("{\"z\":1,\"a\":[true,null]}"));
    }

    #[test]
    fn test_unmarshal() {
        let value = member("unmarshal")
            .call(&EvalContext::new(), &[Value::string("[1, 2.5, \"x\"]")]);
        assert_eq!(value.to_string(), "[1, 2.5, \"x\"]");
    }

    #[test]
    fn test_unmarshal_invalid() {
        let value = member("unmarshal").call(&EvalContext::new(), &[Value::string("{")]);
        assert_eq!(value.as_error().unwrap().kind, ErrorKind::Syntax);
    }
}
