//! Declared identifiers, tracked in a stack of nested scopes.
//!
//! Names are compared after folding to lowercase.  An inner scope may declare
//! a name that an outer scope already holds, the inner one shadows it until
//! the inner scope is exited.

use std::fmt::Display;

use itertools::Itertools;
use thiserror::Error;

use crate::value::Value;

/// The declarative category of an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Constant,
    Variable,
    Type,
    Procedure,
    Parameter,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Constant => "constant",
            Role::Variable => "variable",
            Role::Type => "type",
            Role::Procedure => "procedure",
            Role::Parameter => "parameter",
        })
    }
}

/// A single declared identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolEntry {
    /// The lowercased name
    pub name: String,

    pub role: Role,

    /// Known value, set for constants and for variables after an assignment
    pub value: Option<Value>,
}

impl Display for SymbolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.role)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}

/// The declarations of one lexical region, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    entries: Vec<SymbolEntry>,
}

impl Scope {
    /// Find an entry declared directly in this scope
    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        let name = normalize(name);
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.entries.iter().join(", "))
    }
}

/// Failure of a symbol table operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// The name is already declared in the innermost scope
    #[error("redefinition of already defined identifier [{0}]")]
    Redefinition(String),

    /// No open scope declares the name
    #[error("undefined identifier [{0}] was used")]
    Undefined(String),
}

/// Stack of scopes, innermost last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// An empty table, with no scope open
    pub fn new() -> Self {
        Default::default()
    }

    /// A table with one scope holding the built-in names
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.enter_scope();

        let builtins = [
            ("boolean", Role::Type, None),
            ("char", Role::Type, None),
            ("integer", Role::Type, None),
            ("matrix", Role::Type, None),
            ("print", Role::Procedure, None),
            ("true", Role::Constant, Some(Value::Boolean(true))),
            ("false", Role::Constant, Some(Value::Boolean(false))),
        ];
        for (name, role, value) in builtins {
            // a fresh scope, so there is nothing to clash with
            let _ = table.enter_symbol(name, role, value);
        }

        table
    }

    /// Open a new innermost scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope, returning it.  Returns `None` if no scope
    /// is open, which means enter and exit calls were unbalanced.
    pub fn exit_scope(&mut self) -> Option<Scope> {
        debug_assert!(!self.scopes.is_empty(), "exit_scope without a scope");
        self.scopes.pop()
    }

    /// Declare a name in the innermost scope.  A name already declared in that
    /// scope is left as it was and an error is returned.
    pub fn enter_symbol(
        &mut self,
        name: &str,
        role: Role,
        value: Option<Value>,
    ) -> Result<&SymbolEntry, SymbolError> {
        let name = normalize(name);
        let Some(scope) = self.scopes.last_mut() else {
            tracing::error!("declaration of [{name}] without an open scope");
            return Err(SymbolError::Undefined(name));
        };

        if scope.entries.iter().any(|e| e.name == name) {
            return Err(SymbolError::Redefinition(name));
        }

        scope.entries.push(SymbolEntry { name, role, value });
        Ok(&scope.entries[scope.entries.len() - 1])
    }

    /// Resolve a name, innermost scope first.  A missing name (from a part of
    /// the source that failed to parse) is not an error and finds nothing.
    pub fn find_symbol(&self, name: Option<&str>) -> Result<Option<&SymbolEntry>, SymbolError> {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        match self.lookup(name) {
            Some(entry) => Ok(Some(entry)),
            None => Err(SymbolError::Undefined(normalize(name))),
        }
    }

    /// Resolve a name without reporting anything
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Record a new value for the visible entry with the given name
    pub fn assign(&mut self, name: &str, value: Option<Value>) {
        let name = normalize(name);
        let entry = self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.entries.iter_mut().find(|e| e.name == name));

        if let Some(entry) = entry {
            entry.value = value;
        }
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The outermost scope, holding the built-ins and the top level procedure
    pub fn top_level(&self) -> Option<&Scope> {
        self.scopes.first()
    }

    /// The innermost scope
    pub fn innermost(&self) -> Option<&Scope> {
        self.scopes.last()
    }
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redefinition_keeps_the_original() {
        let mut table = SymbolTable::new();
        table.enter_scope();

        assert!(table.enter_symbol("x", Role::Variable, None).is_ok());
        assert_eq!(
            table.enter_symbol("X", Role::Constant, None),
            Err(SymbolError::Redefinition("x".into()))
        );
        assert_eq!(table.lookup("x").map(|e| e.role), Some(Role::Variable));
        assert_eq!(table.innermost().map(Scope::len), Some(1));
    }

    #[test]
    fn undefined_names_are_errors() {
        let mut table = SymbolTable::new();
        table.enter_scope();

        assert_eq!(
            table.find_symbol(Some("y")),
            Err(SymbolError::Undefined("y".into()))
        );
        assert_eq!(table.find_symbol(None), Ok(None));
        assert_eq!(table.find_symbol(Some("")), Ok(None));
    }

    #[test]
    fn inner_scopes_shadow_outer_ones() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.enter_symbol("x", Role::Variable, None).unwrap();

        table.enter_scope();
        table
            .enter_symbol("x", Role::Constant, Some(Value::Integer(1)))
            .unwrap();
        assert_eq!(table.lookup("x").map(|e| e.role), Some(Role::Constant));

        let inner = table.exit_scope().unwrap();
        assert_eq!(inner.get("x").map(|e| e.role), Some(Role::Constant));
        assert_eq!(table.lookup("x").map(|e| e.role), Some(Role::Variable));
    }

    #[test]
    fn assignment_updates_innermost_entry() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.enter_symbol("x", Role::Variable, None).unwrap();
        table.enter_scope();
        table.enter_symbol("x", Role::Variable, None).unwrap();

        table.assign("X", Some(Value::Integer(4)));
        assert_eq!(table.lookup("x").unwrap().value, Some(Value::Integer(4)));

        table.exit_scope();
        assert_eq!(table.lookup("x").unwrap().value, None);
    }

    #[test]
    fn builtins() {
        let table = SymbolTable::with_builtins();
        assert_eq!(table.depth(), 1);
        assert_eq!(table.lookup("INTEGER").map(|e| e.role), Some(Role::Type));
        assert_eq!(table.lookup("print").map(|e| e.role), Some(Role::Procedure));
        assert_eq!(
            table.lookup("true").and_then(|e| e.value.clone()),
            Some(Value::Boolean(true))
        );
    }

    #[test]
    fn scope_display_lists_entries() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table
            .enter_symbol("n", Role::Constant, Some(Value::Integer(5)))
            .unwrap();
        table.enter_symbol("t", Role::Type, None).unwrap();
        assert_eq!(
            table.innermost().unwrap().to_string(),
            "{n: constant = 5, t: type}"
        );
    }
}
