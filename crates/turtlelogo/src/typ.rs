use std::{fmt, mem, sync::Arc};

use kurbo::Point;

use crate::proc::ProcId;

#[derive(Clone, Debug, PartialEq)]
pub enum AExp {
    Constant(f64),
    Variable(String),
    Sub(Box<AExp>, Box<AExp>),
    Div(Box<AExp>, Box<AExp>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum BExp {
    Eq(AExp, AExp),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Forward(AExp),
    Rotate(AExp),
    SetHeading(AExp),
    Seq(Box<Stmt>, Box<Stmt>),
    Repeat(AExp, Box<Stmt>),
    Function {
        name: String,
        params: Vec<String>,
        // Shared with every closure made from this definition.
        body: Arc<Stmt>,
    },
    Call {
        name: String,
        args: Vec<AExp>,
    },
    If(BExp, Box<Stmt>),
    Stop,
}

impl AExp {
    pub fn eval(&self, env: &ArithEnv) -> f64 {
        match self {
            AExp::Constant(x) => *x,
            AExp::Variable(name) => env.lookup(name),
            AExp::Sub(lhs, rhs) => lhs.eval(env) - rhs.eval(env),
            // Dividing by zero gives inf or NaN, like any other float division.
            AExp::Div(lhs, rhs) => lhs.eval(env) / rhs.eval(env),
        }
    }
}

impl BExp {
    pub fn eval(&self, env: &ArithEnv) -> bool {
        match self {
            BExp::Eq(lhs, rhs) => lhs.eval(env) == rhs.eval(env),
        }
    }
}

impl Stmt {
    pub fn seq(first: Stmt, second: Stmt) -> Stmt {
        Stmt::Seq(Box::new(first), Box::new(second))
    }

    // Moves the halves of a sequence into `pending`, leaving `stop`s behind.
    fn take_halves(&mut self, pending: &mut Vec<Stmt>) {
        if let Stmt::Seq(first, second) = self {
            pending.push(mem::replace(&mut **first, Stmt::Stop));
            pending.push(mem::replace(&mut **second, Stmt::Stop));
        }
    }
}

// A long program is a long chain of `Seq`s. The derived drop would recurse down all of it.
impl Drop for Stmt {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_halves(&mut pending);
        while let Some(mut stmt) = pending.pop() {
            stmt.take_halves(&mut pending);
        }
    }
}

/// The variables visible to the statement being evaluated.
///
/// This is a persistent map, so taking a snapshot for a closure is cheap and nothing done to
/// the snapshot is visible through the original.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArithEnv {
    vars: im::HashMap<String, f64>,
}

impl ArithEnv {
    /// The value of a variable. Variables that were never bound read as zero.
    pub fn lookup(&self, name: &str) -> f64 {
        self.get(name).unwrap_or(0.0)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    pub fn bind(&self, name: &str, val: f64) -> ArithEnv {
        ArithEnv {
            vars: self.vars.update(name.to_owned(), val),
        }
    }

    /// The same bindings, minus `name`.
    pub fn unbind(&self, name: &str) -> ArithEnv {
        ArithEnv {
            vars: self.vars.without(name),
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// The procedures visible to the statement being evaluated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FnEnv {
    procs: im::HashMap<String, ProcId>,
}

impl FnEnv {
    pub fn lookup(&self, name: &str) -> Option<ProcId> {
        self.procs.get(name).copied()
    }

    pub fn bind(&self, name: &str, id: ProcId) -> FnEnv {
        FnEnv {
            procs: self.procs.update(name.to_owned(), id),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
}

/// Everything a statement reads, and everything it can change.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub position: Point,
    /// In degrees, clockwise from "up". Never wrapped into `[0, 360)`.
    pub heading: f64,
    pub arith_env: ArithEnv,
    pub fn_env: FnEnv,
    /// Set by `stop`: the statements after this one shouldn't run.
    pub terminated: bool,
}

impl State {
    pub fn new(position: Point, heading: f64) -> State {
        State {
            position,
            heading,
            arith_env: ArithEnv::default(),
            fn_env: FnEnv::default(),
            terminated: false,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        State::new(Point::ORIGIN, 0.0)
    }
}

impl fmt::Display for AExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AExp::Constant(x) => write!(f, "{x}"),
            AExp::Variable(name) => write!(f, ":{name}"),
            AExp::Sub(lhs, rhs) => write!(f, "{lhs} - {rhs}"),
            AExp::Div(lhs, rhs) => write!(f, "{lhs} / {rhs}"),
        }
    }
}

impl fmt::Display for BExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BExp::Eq(lhs, rhs) => write!(f, "{lhs} = {rhs}"),
        }
    }
}

// Bodies of `repeat` and `if` are a single statement, so a sequence needs brackets there.
struct Single<'a>(&'a Stmt);

impl fmt::Display for Single<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            stmt @ Stmt::Seq(..) => write!(f, "[{stmt}]"),
            stmt => write!(f, "{stmt}"),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Forward(x) => write!(f, "fd {x}"),
            Stmt::Rotate(x) => write!(f, "rt {x}"),
            Stmt::SetHeading(x) => write!(f, "seth {x}"),
            // Sequences parse as right-nested, so a nested one on the left gets brackets.
            Stmt::Seq(first, second) => {
                write!(f, "{}", Single(first))?;
                let mut rest: &Stmt = &**second;
                while let Stmt::Seq(first, second) = rest {
                    write!(f, " {}", Single(first))?;
                    rest = &**second;
                }
                write!(f, " {rest}")
            }
            Stmt::Repeat(times, body) => write!(f, "repeat {times} {}", Single(body)),
            Stmt::Function { name, params, body } => {
                write!(f, "to {name}")?;
                for p in params {
                    write!(f, " :{p}")?;
                }
                write!(f, " {body} end")
            }
            Stmt::Call { name, args } => {
                f.write_str(name)?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Stmt::If(cond, body) => write!(f, "if {cond} {}", Single(body)),
            Stmt::Stop => f.write_str("stop"),
        }
    }
}
