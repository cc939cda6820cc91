//! Lexical scopes: chained symbol tables
//!
//! A [`Scope`] is a cheap, shared handle. Parent links and closure captures
//! are strong references, so a scope stays alive exactly as long as a child
//! scope or a function value still needs it. Child links are weak and exist
//! only for introspection (see [`tree`]).

mod tree;

pub use tree::ScopeNode;

use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::error::ScopeError;
use crate::value::{BuiltinFn, Value};

/// A single binding in a scope.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The bound value
    pub value: Value,

    /// Whether `update` is refused for this binding
    pub readonly: bool,
}

struct ScopeInner {
    name: String,
    bindings: RwLock<IndexMap<String, Binding>>,
    parent: Option<Scope>,
    children: Mutex<Vec<Weak<ScopeInner>>>,
}

/// A named symbol table with an optional parent.
///
/// # Example
///
/// ```
/// use sapling::{Scope, Value};
///
/// let global = Scope::root("global");
/// global.declare("x", Value::Int(1), false).unwrap();
///
/// let inner = global.new_child("inner");
/// inner.declare("x", Value::Int(10), false).unwrap(); // shadows global x
///
/// assert_eq!(inner.get("x").unwrap().to_string(), "10");
/// assert_eq!(global.get("x").unwrap().to_string(), "1");
/// ```
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Create a scope. The parent, if any, does not record it as a child.
    pub fn new(name: impl Into<String>, parent: Option<&Scope>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                name: name.into(),
                bindings: RwLock::new(IndexMap::new()),
                parent: parent.cloned(),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a root scope.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Create a child scope and link it for introspection.
    pub fn new_child(&self, name: impl Into<String>) -> Scope {
        let child = Scope::new(name, Some(self));
        let mut children = self.inner.children.lock();
        // Loop iterations create a child per pass; drop dead links before
        // the list would reallocate.
        if children.len() == children.capacity() {
            children.retain(|c| c.strong_count() > 0);
        }
        children.push(Arc::downgrade(&child.inner));
        child
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&Scope> {
        self.inner.parent.as_ref()
    }

    /// Live child scopes, in creation order.
    pub fn children(&self) -> Vec<Scope> {
        self.inner
            .children
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|inner| Scope { inner })
            .collect()
    }

    /// Whether both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Look up a name here, then in each enclosing scope.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.inner.bindings.read().get(name) {
                return Some(binding.value.clone());
            }
            scope = scope.parent()?;
        }
    }

    /// Whether this exact scope binds `name`.
    pub fn contains_local(&self, name: &str) -> bool {
        self.inner.bindings.read().contains_key(name)
    }

    /// Whether the scope owning `name` marked it read-only.
    pub fn is_readonly(&self, name: &str) -> bool {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.inner.bindings.read().get(name) {
                return binding.readonly;
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return false,
            }
        }
    }

    /// Snapshot of this scope's own bindings, in declaration order.
    pub fn contents(&self) -> IndexMap<String, Value> {
        self.inner
            .bindings
            .read()
            .iter()
            .map(|(name, binding)| (name.clone(), binding.value.clone()))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════

    /// Bind a new name in this scope.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyDeclared`] if this scope already binds
    /// `name`. Bindings in enclosing scopes are shadowed, not rejected.
    pub fn declare(
        &self,
        name: impl Into<String>,
        value: Value,
        readonly: bool,
    ) -> Result<(), ScopeError> {
        let name = name.into();
        let mut bindings = self.inner.bindings.write();
        if bindings.contains_key(&name) {
            return Err(ScopeError::AlreadyDeclared { name });
        }
        bindings.insert(name, Binding { value, readonly });
        Ok(())
    }

    /// Replace the value of the nearest existing binding of `name`.
    ///
    /// Never creates a binding.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::ReadOnly`] if the owning scope marked the
    /// binding read-only, or [`ScopeError::UnknownVariable`] if no scope in
    /// the chain binds `name`.
    pub fn update(&self, name: &str, value: Value) -> Result<(), ScopeError> {
        let mut scope = self;
        loop {
            {
                let mut bindings = scope.inner.bindings.write();
                if let Some(binding) = bindings.get_mut(name) {
                    if binding.readonly {
                        return Err(ScopeError::ReadOnly { name: name.into() });
                    }
                    binding.value = value;
                    return Ok(());
                }
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => {
                    return Err(ScopeError::UnknownVariable { name: name.into() });
                }
            }
        }
    }

    /// Declare a builtin as a read-only binding under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyDeclared`] if the name is taken here.
    pub fn add_builtin(&self, builtin: BuiltinFn) -> Result<(), ScopeError> {
        let name = builtin.name.clone();
        self.declare(name, Value::Builtin(builtin), true)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.inner.name)
            .field(
                "bindings",
                &self.inner.bindings.read().keys().collect::<Vec<_>>(),
            )
            .field("parent", &self.parent().map(|p| p.name().to_string()))
            .finish()
    }
}
