use std::sync::Arc;

use nom::{
    combinator::map,
    error::ErrorKind,
    sequence::{preceded, tuple},
};

use crate::{
    combinator::{
        at_eof, binary_left, binary_right, brackets, choice, many, no_match, satisfy, span,
        symbol, whitespace, Boundary, ParseResult, Span,
    },
    typ::{AExp, BExp, Stmt},
};

const RESERVED: &[&str] = &["to", "end", "if", "stop", "repeat", "fd", "rt", "seth"];

pub fn number(input: Span) -> ParseResult<f64> {
    span(
        satisfy(|c| c.is_ascii_digit()),
        |digits: Vec<char>| {
            digits.into_iter().fold(0.0, |acc, d| {
                acc * 10.0 + f64::from(d.to_digit(10).unwrap_or(0))
            })
        },
        Boundary::Optional,
    )(input)
}

/// Any run of letters, reserved or not.
pub fn name(input: Span) -> ParseResult<String> {
    span(
        satisfy(|c| c.is_ascii_alphabetic()),
        |letters: Vec<char>| letters.into_iter().collect(),
        Boundary::Required,
    )(input)
}

/// A name that can be given to a procedure.
pub fn ident(input: Span) -> ParseResult<String> {
    match name(input)? {
        (_, word) if RESERVED.contains(&word.as_str()) => no_match(input, ErrorKind::Verify),
        ok => Ok(ok),
    }
}

pub fn variable(input: Span) -> ParseResult<String> {
    preceded(satisfy(|c| c == ':'), name)(input)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(Span<'a>) -> ParseResult<'a, ()> {
    move |input: Span<'a>| match name(input)? {
        (rest, word) if word == kw => Ok((rest, ())),
        _ => no_match(input, ErrorKind::Tag),
    }
}

fn constant(input: Span) -> ParseResult<AExp> {
    map(number, AExp::Constant)(input)
}

fn var(input: Span) -> ParseResult<AExp> {
    map(variable, AExp::Variable)(input)
}

fn operand(input: Span) -> ParseResult<AExp> {
    choice((constant, var))(input)
}

fn quotient(input: Span) -> ParseResult<AExp> {
    binary_left(operand, symbol('/'), |lhs: AExp, rhs: AExp| {
        AExp::Div(Box::new(lhs), Box::new(rhs))
    })(input)
}

/// An arithmetic expression. Division binds tighter than subtraction; both associate to the left.
pub fn aexp(input: Span) -> ParseResult<AExp> {
    binary_left(quotient, symbol('-'), |lhs: AExp, rhs: AExp| {
        AExp::Sub(Box::new(lhs), Box::new(rhs))
    })(input)
}

pub fn bexp(input: Span) -> ParseResult<BExp> {
    map(tuple((aexp, symbol('='), aexp)), |(lhs, _, rhs)| {
        BExp::Eq(lhs, rhs)
    })(input)
}

fn command<'a>(kw: &'static str, build: fn(AExp) -> Stmt) -> impl FnMut(Span<'a>) -> ParseResult<'a, Stmt> {
    map(preceded(keyword(kw), aexp), build)
}

fn forward(input: Span) -> ParseResult<Stmt> {
    command("fd", Stmt::Forward)(input)
}

fn rotate(input: Span) -> ParseResult<Stmt> {
    command("rt", Stmt::Rotate)(input)
}

fn set_heading(input: Span) -> ParseResult<Stmt> {
    command("seth", Stmt::SetHeading)(input)
}

fn repeat(input: Span) -> ParseResult<Stmt> {
    map(
        tuple((keyword("repeat"), aexp, statement)),
        |((), times, body)| Stmt::Repeat(times, Box::new(body)),
    )(input)
}

fn procedure_def(input: Span) -> ParseResult<Stmt> {
    map(
        tuple((
            keyword("to"),
            ident,
            many(variable),
            statements,
            keyword("end"),
        )),
        |((), name, params, body, ())| Stmt::Function {
            name,
            params,
            body: Arc::new(body),
        },
    )(input)
}

fn if_statement(input: Span) -> ParseResult<Stmt> {
    map(tuple((keyword("if"), bexp, statement)), |((), cond, body)| {
        Stmt::If(cond, Box::new(body))
    })(input)
}

fn stop(input: Span) -> ParseResult<Stmt> {
    map(keyword("stop"), |()| Stmt::Stop)(input)
}

fn procedure_call(input: Span) -> ParseResult<Stmt> {
    map(tuple((ident, many(aexp))), |(name, args)| Stmt::Call {
        name,
        args,
    })(input)
}

fn block(input: Span) -> ParseResult<Stmt> {
    brackets('[', statements, ']')(input)
}

pub fn statement(input: Span) -> ParseResult<Stmt> {
    // Everything that starts with a reserved word comes before the procedure call, which would
    // otherwise refuse them anyway.
    choice((
        forward,
        rotate,
        set_heading,
        repeat,
        procedure_def,
        if_statement,
        stop,
        procedure_call,
        block,
    ))(input)
}

/// One or more statements, one after the other.
pub fn statements(input: Span) -> ParseResult<Stmt> {
    binary_right(statement, Stmt::seq)(input)
}

/// A whole program. Fails unless all of the input is used.
pub fn program(input: Span) -> ParseResult<Stmt> {
    at_eof(preceded(whitespace, statements))(input)
}
