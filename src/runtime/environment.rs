use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    value::Value,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

struct Scope {
    parent: Option<Environment>,
    bindings: HashMap<String, Value>,
    constants: HashSet<String>,
}

/// A lexical scope. Cloning yields another handle to the same scope, so a
/// function value and the frame that declared it observe the same bindings.
#[derive(Clone)]
pub struct Environment {
    scope: Rc<RefCell<Scope>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self::from_parent(None)
    }

    pub fn with_parent(parent: &Environment) -> Self {
        Self::from_parent(Some(parent.clone()))
    }

    fn from_parent(parent: Option<Environment>) -> Self {
        Self {
            scope: Rc::new(RefCell::new(Scope {
                parent,
                bindings: HashMap::new(),
                constants: HashSet::new(),
            })),
        }
    }

    pub fn parent(&self) -> Option<Environment> {
        self.scope.borrow().parent.clone()
    }

    /// Introduces `name` in this scope. Shadowing an outer binding is fine,
    /// redeclaring in the same scope is not.
    pub fn declare(&self, name: &str, value: Value, constant: bool) -> RuntimeResult<Value> {
        let mut scope = self.scope.borrow_mut();
        if scope.bindings.contains_key(name) {
            return Err(RuntimeError::DuplicateDeclaration {
                name: name.to_string(),
            });
        }
        scope.bindings.insert(name.to_string(), value.clone());
        if constant {
            scope.constants.insert(name.to_string());
        }
        Ok(value)
    }

    /// Rebinds `name` in the nearest scope that holds it.
    pub fn assign(&self, name: &str, value: Value) -> RuntimeResult<Value> {
        let owner = self.resolve(name)?;
        let mut scope = owner.scope.borrow_mut();
        if scope.constants.contains(name) {
            return Err(RuntimeError::ConstantAssignment {
                name: name.to_string(),
            });
        }
        scope.bindings.insert(name.to_string(), value.clone());
        Ok(value)
    }

    pub fn lookup(&self, name: &str) -> RuntimeResult<Value> {
        let owner = self.resolve(name)?;
        let scope = owner.scope.borrow();
        scope
            .bindings
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnresolvedName {
                name: name.to_string(),
            })
    }

    /// Finds the nearest scope, starting here and walking outward, that
    /// declares `name`.
    pub fn resolve(&self, name: &str) -> RuntimeResult<Environment> {
        let mut current = self.clone();
        loop {
            if current.scope.borrow().bindings.contains_key(name) {
                return Ok(current);
            }
            let parent = current.parent();
            match parent {
                Some(parent) => current = parent,
                None => {
                    return Err(RuntimeError::UnresolvedName {
                        name: name.to_string(),
                    })
                }
            }
        }
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.scope, &other.scope)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.scope.borrow();
        let mut names: Vec<&String> = scope.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_then_lookup() {
        let env = Environment::new();
        env.declare("x", Value::Number(1.0), false).expect("declare");
        assert_eq!(env.lookup("x"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn redeclaring_in_same_scope_fails() {
        let env = Environment::new();
        env.declare("x", Value::Null, false).expect("declare");
        assert_eq!(
            env.declare("x", Value::Null, true),
            Err(RuntimeError::DuplicateDeclaration { name: "x".into() })
        );
    }

    #[test]
    fn child_scope_may_shadow_parent() {
        let parent = Environment::new();
        parent.declare("x", Value::Number(1.0), true).expect("declare");
        let child = Environment::with_parent(&parent);
        child.declare("x", Value::Number(2.0), false).expect("shadow");
        assert_eq!(child.lookup("x"), Ok(Value::Number(2.0)));
        assert_eq!(parent.lookup("x"), Ok(Value::Number(1.0)));
    }

    #[test]
    fn assign_updates_the_declaring_scope() {
        let parent = Environment::new();
        parent.declare("count", Value::Number(0.0), false).expect("declare");
        let child = Environment::with_parent(&parent);
        child.assign("count", Value::Number(3.0)).expect("assign");
        assert_eq!(parent.lookup("count"), Ok(Value::Number(3.0)));
        assert!(child.resolve("count").expect("resolve").ptr_eq(&parent));
    }

    #[test]
    fn constants_reject_assignment() {
        let env = Environment::new();
        env.declare("pi", Value::Number(1.5), true).expect("declare");
        assert_eq!(
            env.assign("pi", Value::Number(3.0)),
            Err(RuntimeError::ConstantAssignment { name: "pi".into() })
        );
        assert_eq!(env.lookup("pi"), Ok(Value::Number(1.5)));
    }

    #[test]
    fn missing_names_are_unresolved() {
        let env = Environment::with_parent(&Environment::new());
        assert_eq!(
            env.lookup("ghost"),
            Err(RuntimeError::UnresolvedName { name: "ghost".into() })
        );
        assert!(matches!(
            env.assign("ghost", Value::Null),
            Err(RuntimeError::UnresolvedName { .. })
        ));
    }
}
