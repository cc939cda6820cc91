//! Scope tree introspection for debugging and stack traces

use std::fmt;

use super::Scope;

/// A snapshot of one scope and its live descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    /// Scope name
    pub name: String,

    /// Names bound directly in the scope, in declaration order
    pub bindings: Vec<String>,

    /// Live child scopes
    pub children: Vec<ScopeNode>,
}

impl Scope {
    /// Snapshot this scope and every live descendant.
    pub fn tree(&self) -> ScopeNode {
        ScopeNode {
            name: self.name().to_string(),
            bindings: self.inner.bindings.read().keys().cloned().collect(),
            children: self.children().iter().map(Scope::tree).collect(),
        }
    }

    /// Scope names from the root down to this scope.
    pub fn path(&self) -> Vec<String> {
        let mut names = vec![self.name().to_string()];
        let mut current = self.parent();
        while let Some(scope) = current {
            names.push(scope.name().to_string());
            current = scope.parent();
        }
        names.reverse();
        names
    }

    /// Number of enclosing scopes.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(scope) = current {
            depth += 1;
            current = scope.parent();
        }
        depth
    }
}

impl ScopeNode {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} [{}]",
            "",
            self.name,
            self.bindings.join(", "),
            indent = indent * 2
        )?;
        for child in &self.children {
            child.write_indented(f, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ScopeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tree_snapshot() {
        let global = Scope::root("global");
        global.declare("x", Value::Int(1), false).unwrap();
        let call = global.new_child("f");
        call.declare("a", Value::Nil, false).unwrap();

        let tree = global.tree();
        assert_eq!(
            tree,
            ScopeNode {
                name: "global".into(),
                bindings: vec!["x".into()],
                children: vec![ScopeNode {
                    name: "f".into(),
                    bindings: vec!["a".into()],
                    children: vec![],
                }],
            }
        );
        assert_eq!(tree.to_string(), "global [x]\n  f [a]\n");
    }

    #[test]
    fn test_path_and_depth() {
        let global = Scope::root("global");
        let f = global.new_child("f");
        let body = f.new_child("for");
        assert_eq!(body.path(), vec!["global", "f", "for"]);
        assert_eq!(body.depth(), 2);
        assert_eq!(global.depth(), 0);
    }
}
