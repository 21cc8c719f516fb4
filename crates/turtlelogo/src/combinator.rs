//! Generic parser combinators.
//!
//! A parser is anything of the shape `FnMut(Span) -> ParseResult<T>`: it either fails to match
//! (`nom::Err::Error`, carrying the position where it gave up) or it matches and returns the
//! unconsumed rest of the input along with its output. Nothing in here knows about the LOGO
//! grammar; that lives in [`crate::parse`].

use nom::{error::ErrorKind, Slice};

pub type Span<'a> = nom_locate::LocatedSpan<&'a str>;
pub type ParseError<'a> = nom::error::Error<Span<'a>>;
pub type ParseResult<'a, T> = nom::IResult<Span<'a>, T>;

/// What has to follow a token.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Boundary {
    /// The token must end at a word boundary: whitespace, a symbol, or the end of input.
    /// This is what stops `fd20` from being read as `fd` followed by `20`.
    Required,
    /// Anything may follow.
    Optional,
}

pub(crate) fn no_match<'a, T>(input: Span<'a>, kind: ErrorKind) -> ParseResult<'a, T> {
    Err(nom::Err::Error(ParseError::new(input, kind)))
}

/// Symbols are single characters that are neither alphanumeric nor whitespace.
pub fn is_symbol(c: char) -> bool {
    !c.is_whitespace() && !c.is_ascii_alphanumeric()
}

fn at_word_boundary(input: &Span) -> bool {
    match input.fragment().chars().next() {
        None => true,
        Some(c) => !c.is_ascii_alphanumeric(),
    }
}

/// Matches exactly one character satisfying `pred`.
pub fn satisfy<'a>(pred: impl Fn(char) -> bool) -> impl FnMut(Span<'a>) -> ParseResult<'a, char> {
    move |input: Span<'a>| match input.fragment().chars().next() {
        Some(c) if pred(c) => Ok((input.slice(c.len_utf8()..), c)),
        _ => no_match(input, ErrorKind::Satisfy),
    }
}

/// Applies `inner` for as long as it matches. Never fails.
pub fn many<'a, T, P>(mut inner: P) -> impl FnMut(Span<'a>) -> ParseResult<'a, Vec<T>>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, T>,
{
    move |mut input: Span<'a>| {
        let mut items = Vec::new();
        while let Ok((rest, item)) = inner(input) {
            // A match that consumes nothing would match forever.
            if rest.location_offset() == input.location_offset() {
                break;
            }
            items.push(item);
            input = rest;
        }
        Ok((input, items))
    }
}

/// Turns a match of zero items into a failure.
pub fn fail_on_empty<'a, T, P>(mut inner: P) -> impl FnMut(Span<'a>) -> ParseResult<'a, Vec<T>>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, Vec<T>>,
{
    move |input: Span<'a>| match inner(input)? {
        (_, items) if items.is_empty() => no_match(input, ErrorKind::Many1),
        done => Ok(done),
    }
}

/// Skips any amount of whitespace, including none.
pub fn whitespace(input: Span) -> ParseResult<()> {
    let (rest, _) = many(satisfy(char::is_whitespace))(input)?;
    Ok((rest, ()))
}

/// Runs `inner` and then eats the whitespace after it.
pub fn lexeme<'a, T, P>(mut inner: P, boundary: Boundary) -> impl FnMut(Span<'a>) -> ParseResult<'a, T>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, T>,
{
    move |input: Span<'a>| {
        let (rest, token) = inner(input)?;
        if boundary == Boundary::Required && !at_word_boundary(&rest) {
            return no_match(rest, ErrorKind::Space);
        }
        let (rest, ()) = whitespace(rest)?;
        Ok((rest, token))
    }
}

/// A token made of one or more characters matched by `inner`, glued together by `combine`.
pub fn span<'a, C, T, P, F>(
    inner: P,
    combine: F,
    boundary: Boundary,
) -> impl FnMut(Span<'a>) -> ParseResult<'a, T>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, C>,
    F: Fn(Vec<C>) -> T,
{
    let mut chars = fail_on_empty(many(inner));
    lexeme(
        move |input: Span<'a>| {
            let (rest, cs) = chars(input)?;
            Ok((rest, combine(cs)))
        },
        boundary,
    )
}

/// A single symbol character, equal to `expected`.
pub fn symbol<'a>(expected: char) -> impl FnMut(Span<'a>) -> ParseResult<'a, char> {
    lexeme(
        satisfy(move |c| c == expected && is_symbol(c)),
        Boundary::Optional,
    )
}

/// A tuple of parsers with the same output, tried in order by [`choice`].
pub trait Alternatives<'a, T> {
    fn try_each(&mut self, input: Span<'a>) -> ParseResult<'a, T>;
}

// Keeps whichever failure got further into the input. Ties go to the earlier one.
fn further<'a>(best: Option<ParseError<'a>>, e: ParseError<'a>) -> Option<ParseError<'a>> {
    match best {
        Some(b) if b.input.location_offset() >= e.input.location_offset() => Some(b),
        _ => Some(e),
    }
}

macro_rules! alternatives_for_tuple {
    ($($p:ident $idx:tt),+) => {
        impl<'a, T, $($p),+> Alternatives<'a, T> for ($($p,)+)
        where
            $($p: FnMut(Span<'a>) -> ParseResult<'a, T>),+
        {
            fn try_each(&mut self, input: Span<'a>) -> ParseResult<'a, T> {
                let mut furthest = None;
                $(
                    match (self.$idx)(input) {
                        Err(nom::Err::Error(e)) => furthest = further(furthest, e),
                        done => return done,
                    }
                )+
                Err(nom::Err::Error(
                    furthest.unwrap_or_else(|| ParseError::new(input, ErrorKind::Alt)),
                ))
            }
        }
    };
}

alternatives_for_tuple!(A 0, B 1);
alternatives_for_tuple!(A 0, B 1, C 2);
alternatives_for_tuple!(A 0, B 1, C 2, D 3);
alternatives_for_tuple!(A 0, B 1, C 2, D 3, E 4);
alternatives_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
alternatives_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
alternatives_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
alternatives_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
alternatives_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);

/// Ordered choice: the first alternative that matches wins.
///
/// If nothing matches, the failure that made it furthest into the input is the one reported.
pub fn choice<'a, T, A>(mut alternatives: A) -> impl FnMut(Span<'a>) -> ParseResult<'a, T>
where
    A: Alternatives<'a, T>,
{
    move |input: Span<'a>| alternatives.try_each(input)
}

/// Parses `base (op base)*` and folds to the left.
///
/// An operator that isn't followed by an operand is left in the input.
pub fn binary_left<'a, T, O, P, Q, F>(
    mut base: P,
    mut op: Q,
    combine: F,
) -> impl FnMut(Span<'a>) -> ParseResult<'a, T>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, T>,
    Q: FnMut(Span<'a>) -> ParseResult<'a, O>,
    F: Fn(T, T) -> T,
{
    move |input: Span<'a>| {
        let (mut rest, mut acc) = base(input)?;
        loop {
            let Ok((after_op, _)) = op(rest) else { break };
            let Ok((after_rhs, rhs)) = base(after_op) else { break };
            acc = combine(acc, rhs);
            rest = after_rhs;
        }
        Ok((rest, acc))
    }
}

/// Parses `base base*`, with nothing in between, and folds to the right.
pub fn binary_right<'a, T, P, F>(mut base: P, combine: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, T>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, T>,
    F: Fn(T, T) -> T,
{
    move |input: Span<'a>| {
        let (mut rest, first) = base(input)?;
        let mut tail = Vec::new();
        while let Ok((next, item)) = base(rest) {
            if next.location_offset() == rest.location_offset() {
                break;
            }
            tail.push(item);
            rest = next;
        }
        let folded = match tail.pop() {
            None => first,
            Some(last) => {
                let tail = tail
                    .into_iter()
                    .rev()
                    .fold(last, |acc, item| combine(item, acc));
                combine(first, tail)
            }
        };
        Ok((rest, folded))
    }
}

/// `inner`, surrounded by the symbols `open` and `close`.
pub fn brackets<'a, T, P>(open: char, mut inner: P, close: char) -> impl FnMut(Span<'a>) -> ParseResult<'a, T>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, T>,
{
    let mut open = symbol(open);
    let mut close = symbol(close);
    move |input: Span<'a>| {
        let (rest, _) = open(input)?;
        let (rest, out) = inner(rest)?;
        let (rest, _) = close(rest)?;
        Ok((rest, out))
    }
}

/// Succeeds only if `inner` matches the whole input.
pub fn at_eof<'a, T, P>(mut inner: P) -> impl FnMut(Span<'a>) -> ParseResult<'a, T>
where
    P: FnMut(Span<'a>) -> ParseResult<'a, T>,
{
    move |input: Span<'a>| {
        let (rest, out) = inner(input)?;
        if rest.fragment().is_empty() {
            Ok((rest, out))
        } else {
            no_match(rest, ErrorKind::Eof)
        }
    }
}
