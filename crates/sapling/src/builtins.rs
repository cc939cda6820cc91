//! Builtin function registry
//!
//! Two tiers: a default table built once per process and shared by every
//! registry, and an override table owned by one registry (and its clones).
//! An override entry either replaces a builtin or disables it, without
//! touching the defaults other evaluators see.

pub mod basic;
pub mod functional;
pub mod json;
pub mod result;

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use indexmap::IndexMap;

use crate::error::ErrorKind;
use crate::value::{BuiltinFn, Value};

/// The two-tier builtin registry.
#[derive(Clone)]
pub struct Builtins {
    defaults: Arc<IndexMap<String, BuiltinFn>>,
    /// `Some` replaces a builtin, `None` disables it
    overrides: Arc<DashMap<String, Option<BuiltinFn>>>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

fn default_table() -> Arc<IndexMap<String, BuiltinFn>> {
    static TABLE: OnceLock<Arc<IndexMap<String, BuiltinFn>>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        let mut table = IndexMap::new();
        for builtin in basic::builtins()
            .into_iter()
            .chain(result::builtins())
            .chain(functional::builtins())
        {
            table.insert(builtin.name.clone(), builtin);
        }
        Arc::new(table)
    });
    Arc::clone(table)
}

impl Builtins {
    /// A registry over the default catalog with no overrides.
    pub fn new() -> Self {
        Self {
            defaults: default_table(),
            overrides: Arc::new(DashMap::new()),
        }
    }

    /// A registry with no defaults at all.
    pub fn empty() -> Self {
        Self {
            defaults: Arc::new(IndexMap::new()),
            overrides: Arc::new(DashMap::new()),
        }
    }

    /// Resolve `name`, override tier first.
    pub fn get(&self, name: &str) -> Option<BuiltinFn> {
        if let Some(entry) = self.overrides.get(name) {
            return entry.value().clone();
        }
        self.defaults.get(name).cloned()
    }

    /// Replace (or add) a builtin for this registry only.
    pub fn set_override(&self, builtin: BuiltinFn) {
        self.overrides.insert(builtin.name.clone(), Some(builtin));
    }

    /// Hide a builtin from this registry.
    pub fn disable(&self, name: impl Into<String>) {
        self.overrides.insert(name.into(), None);
    }

    /// Drop an override, restoring the default.
    pub fn clear_override(&self, name: &str) {
        self.overrides.remove(name);
    }

    /// The override entry for `name`, if any: `Some(None)` means disabled.
    pub fn override_entry(&self, name: &str) -> Option<Option<BuiltinFn>> {
        self.overrides.get(name).map(|entry| entry.value().clone())
    }

    /// The shared default table.
    pub fn defaults(&self) -> &IndexMap<String, BuiltinFn> {
        &self.defaults
    }

    /// Every name currently resolvable, defaults first in catalog order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .defaults
            .keys()
            .filter(|name| !matches!(self.overrides.get(name.as_str()).as_deref(), Some(None)))
            .cloned()
            .collect();
        let mut added: Vec<String> = self
            .overrides
            .iter()
            .filter(|entry| entry.value().is_some() && !self.defaults.contains_key(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        added.sort();
        names.extend(added);
        names
    }

    /// The builtin to run when `builtin` is called.
    ///
    /// A builtin value may have been captured before an override was
    /// installed, so the override tier is consulted again by name.
    ///
    /// # Errors
    ///
    /// Returns a NameError value when the builtin is disabled.
    pub fn resolve_call(&self, builtin: &BuiltinFn) -> Result<BuiltinFn, Value> {
        match self.overrides.get(&builtin.name) {
            Some(entry) => match entry.value() {
                Some(replacement) => Ok(replacement.clone()),
                None => Err(Value::error(
                    ErrorKind::Name,
                    format!("builtin {:?} is disabled", builtin.name),
                )),
            },
            None => Ok(builtin.clone()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Argument helpers shared by the catalog
// ═══════════════════════════════════════════════════════════════════════

pub(crate) fn arg_type_error(fname: &str, expected: &str, got: &Value) -> Value {
    Value::error(
        ErrorKind::Type,
        format!("{fname}() expected {expected} argument (got {})", got.type_name()),
    )
}

pub(crate) fn arg_count_error(fname: &str, expected: &str, got: usize) -> Value {
    Value::error(
        ErrorKind::Arity,
        format!("{fname}() takes {expected} ({got} given)"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvalContext;

    #[test]
    fn test_defaults_are_shared() {
        let a = Builtins::new();
        let b = Builtins::new();
        assert!(Arc::ptr_eq(&a.defaults, &b.defaults));
        assert!(a.get("len").is_some());
    }

    #[test]
    fn test_override_is_local_to_registry() {
        let a = Builtins::new();
        let b = Builtins::new();
        a.set_override(BuiltinFn::new("len", 1, |_, _| Value::Int(-1)));
        let ctx = EvalContext::new();
        let overridden = a.get("len").unwrap().call(&ctx, &[Value::Nil]);
        assert_eq!(overridden, Value::Int(-1));
        let default = b.get("len").unwrap().call(&ctx, &[Value::string("ab")]);
        assert_eq!(default, Value::Int(2));
    }

    #[test]
    fn test_disable_and_restore() {
        let registry = Builtins::new();
        registry.disable("print");
        assert!(registry.get("print").is_none());
        assert!(!registry.names().contains(&"print".to_string()));
        assert_eq!(registry.override_entry("print").map(|e| e.is_none()), Some(true));
        registry.clear_override("print");
        assert!(registry.get("print").is_some());
    }

    #[test]
    fn test_resolve_call_sees_later_override() {
        let registry = Builtins::new();
        let captured = registry.get("len").unwrap();
        registry.disable("len");
        let err = registry.resolve_call(&captured).unwrap_err();
        assert_eq!(err.as_error().unwrap().kind, ErrorKind::Name);
    }

    #[test]
    fn test_clones_share_overrides() {
        let registry = Builtins::new();
        let clone = registry.clone();
        registry.disable("len");
        assert!(clone.get("len").is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = Builtins::empty();
        assert!(registry.get("len").is_none());
        registry.set_override(BuiltinFn::new("answer", 0, |_, _| Value::Int(42)));
        assert_eq!(registry.names(), vec!["answer".to_string()]);
    }
}
