use std::sync::Arc;

use kurbo::Vec2;

use crate::{
    canvas::Canvas,
    config::Limits,
    proc::Procs,
    typ::{AExp, State, Stmt},
};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("I don't know how to {name}")]
    UnknownProcedure { name: String },
    #[error("gave up after {limit} steps")]
    StepLimit { limit: u64 },
    #[error("procedure calls nested more than {limit} deep")]
    RecursionLimit { limit: usize },
    #[error("couldn't start the evaluator: {msg}")]
    Thread { msg: String },
}

/// Walks a program, drawing on a canvas as it goes.
///
/// The interpreter itself only holds what outlives a single statement: the canvas, the closures
/// defined so far, and the resource counters. Everything a statement can observe is in the
/// [`State`] that's passed in and returned.
pub struct Interpreter<'c, C: Canvas + ?Sized> {
    canvas: &'c mut C,
    procs: Procs,
    limits: Limits,
    steps: u64,
    depth: usize,
}

impl<'c, C: Canvas + ?Sized> Interpreter<'c, C> {
    pub fn new(canvas: &'c mut C, limits: Limits) -> Self {
        Interpreter {
            canvas,
            procs: Procs::default(),
            limits,
            steps: 0,
            depth: 0,
        }
    }

    pub fn procs(&self) -> &Procs {
        &self.procs
    }

    /// The number of statements evaluated so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn exec(&mut self, stmt: &Stmt, state: State) -> Result<State, EvalError> {
        self.tick()?;
        match stmt {
            Stmt::Forward(dist) => {
                let dist = dist.eval(&state.arith_env);
                let heading = state.heading.to_radians();
                let to = state.position + Vec2::new(heading.sin(), -heading.cos()) * dist;
                log::trace!("line from {:?} to {:?}", state.position, to);
                self.canvas.draw_line(state.position, to);
                Ok(State {
                    position: to,
                    terminated: false,
                    ..state
                })
            }
            Stmt::Rotate(degrees) => {
                let heading = state.heading + degrees.eval(&state.arith_env);
                Ok(State { heading, ..state })
            }
            Stmt::SetHeading(degrees) => {
                let heading = degrees.eval(&state.arith_env);
                Ok(State { heading, ..state })
            }
            Stmt::Seq(first, second) => {
                // Sequences nest to the right, so walk down that spine instead of recursing.
                let mut state = self.exec(first, state)?;
                let mut rest: &Stmt = &**second;
                loop {
                    if state.terminated {
                        return Ok(state);
                    }
                    match rest {
                        Stmt::Seq(first, second) => {
                            self.tick()?;
                            state = self.exec(first, state)?;
                            rest = &**second;
                        }
                        last => return self.exec(last, state),
                    }
                }
            }
            Stmt::Repeat(times, body) => {
                let count = repeat_count(times.eval(&state.arith_env));
                let mut state = state;
                for _ in 0..count {
                    state = self.exec(body, state)?;
                    if state.terminated {
                        break;
                    }
                }
                Ok(state)
            }
            Stmt::Function { name, params, body } => {
                log::debug!("defining {name} with {} parameter(s)", params.len());
                let fn_env = self.procs.define(name, params, body, &state);
                Ok(State { fn_env, ..state })
            }
            Stmt::Call { name, args } => self.call(name, args, state),
            Stmt::If(cond, body) => {
                if cond.eval(&state.arith_env) {
                    self.exec(body, state)
                } else {
                    Ok(State {
                        terminated: false,
                        ..state
                    })
                }
            }
            Stmt::Stop => {
                log::debug!("stop");
                Ok(State {
                    terminated: true,
                    ..state
                })
            }
        }
    }

    fn call(&mut self, name: &str, args: &[AExp], state: State) -> Result<State, EvalError> {
        let closure = state
            .fn_env
            .lookup(name)
            .and_then(|id| self.procs.get(id))
            .ok_or_else(|| EvalError::UnknownProcedure {
                name: name.to_owned(),
            })?;

        let vals: Vec<f64> = args.iter().map(|arg| arg.eval(&state.arith_env)).collect();
        let callee = State {
            position: state.position,
            heading: state.heading,
            arith_env: closure.activation_env(&vals),
            fn_env: closure.fn_env.clone(),
            terminated: false,
        };
        let body = Arc::clone(&closure.body);
        log::debug!("calling {} with {vals:?}", closure.name);

        if let Some(limit) = self.limits.max_depth {
            if self.depth >= limit {
                return Err(EvalError::RecursionLimit { limit });
            }
        }
        self.depth += 1;
        let ret = self.exec(&body, callee);
        self.depth -= 1;
        let ret = ret?;

        // Bindings are the caller's again. Position, heading and `stop` are the callee's.
        Ok(State {
            position: ret.position,
            heading: ret.heading,
            terminated: ret.terminated,
            ..state
        })
    }

    fn tick(&mut self) -> Result<(), EvalError> {
        self.steps += 1;
        match self.limits.max_steps {
            Some(limit) if self.steps > limit => Err(EvalError::StepLimit { limit }),
            _ => Ok(()),
        }
    }
}

// The body runs once for each whole number `i` with `0 <= i < times`. Negative counts and NaN
// mean no iterations at all.
fn repeat_count(times: f64) -> u64 {
    if times > 0.0 {
        times.ceil() as u64
    } else {
        0
    }
}
