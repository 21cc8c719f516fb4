//! A small turtle-graphics LOGO.
//!
//! Programs are parsed into a [`Stmt`] and then evaluated against a [`State`], drawing on a
//! [`Canvas`] as the turtle moves:
//!
//! ```
//! use turtlelogo::{Program, Recorder};
//!
//! let prog = Program::parse("to sq :n repeat 4 [fd :n rt 90] end sq 10").unwrap();
//! let mut rec = Recorder::default();
//! let state = prog.exec(&mut rec).unwrap();
//! assert_eq!(rec.segments.len(), 4);
//! assert_eq!(state.heading, 360.0);
//! ```

use std::{fmt, panic, thread};

use nom::Slice;

pub mod canvas;
pub mod combinator;
pub mod config;
pub mod eval;
pub mod parse;
pub mod proc;
pub mod typ;

pub use canvas::{Canvas, Recorder, Segment, SvgCanvas};
pub use combinator::Span;
pub use config::{Config, Limits};
pub use eval::{EvalError, Interpreter};
pub use typ::{AExp, ArithEnv, BExp, FnEnv, State, Stmt};

/// Where a program stopped making sense.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("syntax error at line {line}, column {column}: unexpected {found}")]
pub struct SyntaxError {
    pub offset: usize,
    pub line: u32,
    pub column: usize,
    pub found: String,
}

impl SyntaxError {
    fn at(span: Span) -> SyntaxError {
        let token: String = span
            .fragment()
            .chars()
            .take_while(|c| !c.is_whitespace())
            .take(16)
            .collect();
        SyntaxError {
            offset: span.location_offset(),
            line: span.location_line(),
            column: span.get_utf8_column(),
            found: if token.is_empty() {
                "end of input".to_owned()
            } else {
                format!("`{token}`")
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    code: Stmt,
}

impl Program {
    pub fn parse(s: &str) -> Result<Program, SyntaxError> {
        let input = Span::new(s);
        match parse::program(input) {
            Ok((_, code)) => Ok(Program { code }),
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(SyntaxError::at(e.input)),
            Err(nom::Err::Incomplete(_)) => Err(SyntaxError::at(input.slice(s.len()..))),
        }
    }

    pub fn code(&self) -> &Stmt {
        &self.code
    }

    /// Runs the program from `state`, returning the state it finished in.
    ///
    /// Evaluation recurses once per nested procedure call, so it happens on a thread of its own
    /// with a `limits.stack_size` stack. This blocks until that thread is done.
    pub fn run<C: Canvas + Send + ?Sized>(
        &self,
        canvas: &mut C,
        state: State,
        limits: Limits,
    ) -> Result<State, EvalError> {
        let code = &self.code;
        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("turtlelogo-eval".to_owned())
                .stack_size(limits.stack_size)
                .spawn_scoped(scope, move || Interpreter::new(canvas, limits).exec(code, state))
                .map_err(|e| EvalError::Thread { msg: e.to_string() })?;
            worker
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))
        })
    }

    /// Runs the program with the turtle at the origin, facing up, and default limits.
    pub fn exec<C: Canvas + Send + ?Sized>(&self, canvas: &mut C) -> Result<State, EvalError> {
        self.run(canvas, State::default(), Limits::default())
    }
}

impl From<Stmt> for Program {
    fn from(code: Stmt) -> Program {
        Program { code }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
