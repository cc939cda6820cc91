//! Import statement evaluation

use tracing::debug;

use super::Evaluator;
use crate::context::EvalContext;
use crate::error::{ErrorKind, ImportError};
use crate::scope::Scope;
use crate::value::Value;

/// `import name`: resolve the module and bind it read-only under `name`.
pub fn eval_import(ev: &Evaluator, name: &str, scope: &Scope, ctx: &EvalContext) -> Value {
    let Some(importer) = ev.importer() else {
        return Value::error(ErrorKind::Import, ImportError::Disabled.to_string());
    };
    debug!(module = name, scope = scope.name(), "import");

    let module = match importer.import(ev, name, ctx) {
        Ok(module) => module,
        // Cancellation inside the module body cancels the importer too,
        // and a failed nested import keeps its own message.
        Err(ImportError::Eval { source, .. })
            if source.is_fatal() || source.kind == ErrorKind::Import =>
        {
            return Value::from_error(source)
        }
        Err(err) => return Value::error(ErrorKind::Import, err.to_string()),
    };

    let value = Value::Module(module);
    match scope.declare(name, value.clone(), true) {
        Ok(()) => value,
        Err(err) => Value::error(ErrorKind::Import, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse;
    use crate::importer::MemoryImporter;
    use std::sync::Arc;

    fn run(src: &str, ev: &Evaluator) -> Value {
        ev.evaluate(&parse(src).unwrap(), &Scope::root("test"), &EvalContext::new())
    }

    #[test]
    fn test_import_disabled() {
        let result = run("import math", &Evaluator::new());
        assert_eq!(
            result.as_error().unwrap().to_string(),
            "import error: importing is disabled"
        );
    }

    #[test]
    fn test_import_binds_module() {
        let importer = MemoryImporter::new().with_module("math", "func double(x) { x * 2 }");
        let ev = Evaluator::new().with_importer(Arc::new(importer));
        assert_eq!(run("import math\nmath.double(4)", &ev), Value::Int(8));
    }

    #[test]
    fn test_import_unknown_module() {
        let ev = Evaluator::new().with_importer(Arc::new(MemoryImporter::new()));
        let result = run("import nope", &ev);
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::Import);
    }

    #[test]
    fn test_mutual_import_cycle_is_reported() {
        let importer = MemoryImporter::new()
            .with_module("a", "import b")
            .with_module("b", "import a");
        let ev = Evaluator::new().with_importer(Arc::new(importer));
        let result = run("import a", &ev);
        assert_eq!(
            result.as_error().unwrap().to_string(),
            "import error: import cycle: a -> b -> a"
        );
    }

    #[test]
    fn test_reimport_in_same_scope_fails() {
        let importer = MemoryImporter::new().with_module("m", "x := 1");
        let ev = Evaluator::new().with_importer(Arc::new(importer));
        let result = run("import m\nimport m", &ev);
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::Import);
    }

    #[test]
    fn test_module_binding_is_read_only() {
        let importer = MemoryImporter::new().with_module("m", "x := 1");
        let ev = Evaluator::new().with_importer(Arc::new(importer));
        let result = run("import m\nm = 5", &ev);
        assert_eq!(result.as_error().unwrap().kind, ErrorKind::Type);
    }
}
