use crate::value::Value;
use indexmap::IndexMap;

/// Bindings of a single scope frame, in definition order.
pub type Scope = IndexMap<String, Value>;

/// Lexical scope chain.
///
/// Frames live in a stack: the frame at index `i` is the parent of the frame
/// at `i + 1`, so a frame never outlives the frame that encloses it. Index 0
/// is the global scope and is never popped.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let mut scopes = Vec::with_capacity(8);
        scopes.push(Scope::new());
        Self { scopes }
    }

    /// Enter a child scope of the current one.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Leave the current scope, discarding its bindings.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the current scope, shadowing any outer binding.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(current_scope) = self.scopes.last_mut() {
            current_scope.insert(name.to_string(), value);
        }
    }

    /// Overwrite the innermost existing binding of `name`.
    /// Returns false when no scope on the chain defines it.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        false
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn globals(&self) -> &Scope {
        &self.scopes[0]
    }

    pub fn into_globals(mut self) -> Scope {
        self.scopes.swap_remove(0)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_define_lookup() {
        let mut env = Environment::new();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.lookup("x"), Some(&Value::Number(42.0)));
        assert_eq!(env.lookup("y"), None);
    }

    #[test]
    fn test_define_shadows_outer() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));

        env.push_scope();
        env.define("x", Value::Number(2.0));
        assert_eq!(env.lookup("x"), Some(&Value::Number(2.0)));

        env.pop_scope();
        assert_eq!(env.lookup("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_assign_updates_outer_scope() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));

        env.push_scope();
        assert!(env.assign("x", Value::Number(2.0)));
        assert!(env.scopes[1].is_empty());

        env.pop_scope();
        assert_eq!(env.lookup("x"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_assign_hits_innermost_binding() {
        let mut env = Environment::new();
        env.define("x", Value::Number(1.0));
        env.push_scope();
        env.define("x", Value::Number(2.0));
        assert!(env.assign("x", Value::Number(3.0)));
        env.pop_scope();
        assert_eq!(env.lookup("x"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_assign_never_creates() {
        let mut env = Environment::new();
        assert!(!env.assign("x", Value::Null));
        assert_eq!(env.lookup("x"), None);
    }

    #[test]
    fn test_global_scope_survives_pop() {
        let mut env = Environment::new();
        env.pop_scope();
        env.define("x", Value::Bool(true));
        assert_eq!(env.scope_depth(), 1);
        assert_eq!(env.into_globals().get("x"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_globals_keep_definition_order() {
        let mut env = Environment::new();
        env.define("b", Value::Null);
        env.define("a", Value::Null);
        env.define("b", Value::Number(1.0));
        let names: Vec<&str> = env.globals().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
