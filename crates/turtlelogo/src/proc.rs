use std::sync::Arc;

use crate::typ::{ArithEnv, FnEnv, State, Stmt};

/// A handle to a closure in a [`Procs`] arena.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct ProcId(usize);

/// A user-defined procedure, together with the bindings that were visible where it was defined.
#[derive(Clone, Debug)]
pub struct Closure {
    pub name: String,
    pub params: Vec<String>,
    pub body: Arc<Stmt>,
    pub arith_env: ArithEnv,
    // Includes this closure itself, which is how procedures recurse.
    pub fn_env: FnEnv,
}

impl Closure {
    /// The variables seen by one activation of this procedure: the captured ones, plus the
    /// parameters bound in order. Extra arguments are dropped. Parameters without an argument are
    /// unbound, even if the captured environment had them, and so read as zero.
    pub fn activation_env(&self, args: &[f64]) -> ArithEnv {
        self.params
            .iter()
            .enumerate()
            .fold(self.arith_env.clone(), |env, (i, name)| match args.get(i) {
                Some(val) => env.bind(name, *val),
                None => env.unbind(name),
            })
    }
}

/// All the closures created during one evaluation.
///
/// Closures refer to each other (and to themselves) by [`ProcId`], not by owning each other.
#[derive(Debug, Default)]
pub struct Procs {
    closures: Vec<Closure>,
}

impl Procs {
    /// Creates a closure for `name` as seen from `state`, and returns `state`'s procedure
    /// environment extended with it.
    pub fn define(&mut self, name: &str, params: &[String], body: &Arc<Stmt>, state: &State) -> FnEnv {
        let id = ProcId(self.closures.len());
        let fn_env = state.fn_env.bind(name, id);
        self.closures.push(Closure {
            name: name.to_owned(),
            params: params.to_vec(),
            body: Arc::clone(body),
            arith_env: state.arith_env.clone(),
            fn_env: fn_env.clone(),
        });
        fn_env
    }

    pub fn get(&self, id: ProcId) -> Option<&Closure> {
        self.closures.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.closures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typ::AExp;

    fn body() -> Arc<Stmt> {
        Arc::new(Stmt::Forward(AExp::Variable("x".to_owned())))
    }

    #[test]
    fn closure_sees_itself() {
        let mut procs = Procs::default();
        let state = State::default();
        let fn_env = procs.define("f", &[], &body(), &state);

        let id = fn_env.lookup("f").unwrap();
        let closure = procs.get(id).unwrap();
        assert_eq!(closure.fn_env.lookup("f"), Some(id));
        assert!(state.fn_env.is_empty());
    }

    #[test]
    fn later_definitions_are_invisible() {
        let mut procs = Procs::default();
        let mut state = State::default();
        state.fn_env = procs.define("f", &[], &body(), &state);
        state.fn_env = procs.define("g", &[], &body(), &state);

        let f = procs.get(state.fn_env.lookup("f").unwrap()).unwrap();
        let g = procs.get(state.fn_env.lookup("g").unwrap()).unwrap();
        assert!(!f.fn_env.contains("g"));
        assert!(g.fn_env.contains("f"));
        assert_eq!(procs.len(), 2);
    }

    #[test]
    fn redefinition_shadows() {
        let mut procs = Procs::default();
        let mut state = State::default();
        let first = procs.define("f", &[], &body(), &state);
        state.fn_env = first.clone();
        let second = procs.define("f", &[], &body(), &state);
        assert_ne!(first.lookup("f"), second.lookup("f"));
    }

    #[test]
    fn activation_binds_params_in_order() {
        let mut procs = Procs::default();
        let mut state = State::default();
        state.arith_env = state.arith_env.bind("z", 9.0).bind("x", 100.0);
        let params = vec!["x".to_owned(), "y".to_owned()];
        let fn_env = procs.define("f", &params, &body(), &state);
        let closure = procs.get(fn_env.lookup("f").unwrap()).unwrap();

        let env = closure.activation_env(&[1.0, 2.0, 3.0]);
        assert_eq!(env.get("x"), Some(1.0));
        assert_eq!(env.get("y"), Some(2.0));
        assert_eq!(env.get("z"), Some(9.0));
        assert_eq!(env.len(), 3);

        let env = closure.activation_env(&[5.0]);
        assert_eq!(env.get("x"), Some(5.0));
        assert_eq!(env.get("y"), None);
        assert_eq!(env.lookup("y"), 0.0);
    }

    #[test]
    fn missing_arguments_hide_captured_values() {
        let mut procs = Procs::default();
        let mut state = State::default();
        state.arith_env = state.arith_env.bind("x", 5.0).bind("y", 6.0);
        let params = vec!["x".to_owned(), "y".to_owned()];
        let fn_env = procs.define("f", &params, &body(), &state);
        let closure = procs.get(fn_env.lookup("f").unwrap()).unwrap();

        let env = closure.activation_env(&[1.0]);
        assert_eq!(env.get("x"), Some(1.0));
        assert_eq!(env.get("y"), None);

        let env = closure.activation_env(&[]);
        assert!(env.is_empty());
        assert_eq!(closure.name, "f");
    }
}
