//! Recursive-descent parser for Datalog surface syntax.
//!
//! ```text
//! identifier := [a-z]+
//! variable   := [A-Z][A-Za-z]*
//! term       := identifier | variable
//! args       := '(' (term (',' term)*)? ')'
//! atom       := identifier args?
//! command    := atom ':-' atom (',' atom)* '.'
//!             | atom '.'
//!             | atom '?'
//! program    := command* end-of-input
//! ```
//!
//! Whitespace is skipped before every token. The first error aborts the whole
//! parse; nothing of a malformed program is returned.

use crate::error::ParseError;
use crate::term::{Atom, Command, Rule, Term};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::satisfy,
    combinator::{cut, map, opt, recognize},
    error::{ErrorKind, ParseError as NomParseError},
    multi::many0,
    sequence::{pair, preceded, terminated},
    Finish, IResult,
};
use std::borrow::Cow;

type Res<'a, T> = IResult<&'a str, T, Failure<'a>>;

/// Internal error: what was expected and the input left at that point
#[derive(Debug, Clone, PartialEq)]
struct Failure<'a> {
    expected: Cow<'static, str>,
    rest: &'a str,
}

impl<'a> Failure<'a> {
    fn expected(expected: impl Into<Cow<'static, str>>, rest: &'a str) -> Self {
        Self {
            expected: expected.into(),
            rest,
        }
    }
}

impl<'a> NomParseError<&'a str> for Failure<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        Self::expected(kind.description().to_lowercase(), input)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    /// Alternatives failing at the same spot are reported together; otherwise
    /// the one that got further wins.
    fn or(self, other: Self) -> Self {
        match self.rest.len().cmp(&other.rest.len()) {
            std::cmp::Ordering::Equal => Self::expected(
                format!("{} or {}", self.expected, other.expected),
                self.rest,
            ),
            std::cmp::Ordering::Less => self,
            std::cmp::Ordering::Greater => other,
        }
    }
}

fn space(input: &str) -> Res<'_, &str> {
    take_while(char::is_whitespace)(input)
}

/// A token: skip whitespace, run `parser`, and report `label` on failure
fn lexeme<'a, O>(
    label: &'static str,
    mut parser: impl FnMut(&'a str) -> Res<'a, O>,
) -> impl FnMut(&'a str) -> Res<'a, O> {
    move |input: &'a str| {
        let (input, _) = space(input)?;
        parser(input).map_err(|err| err.map(|_| Failure::expected(label, input)))
    }
}

fn symbol<'a>(literal: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    move |input: &'a str| {
        let (input, _) = space(input)?;
        tag(literal)(input)
            .map_err(|err| err.map(|_: Failure<'a>| Failure::expected(format!("'{literal}'"), input)))
    }
}

fn end_of_input<'a>(label: &'static str) -> impl FnMut(&'a str) -> Res<'a, ()> {
    move |input: &'a str| {
        let (input, _) = space(input)?;
        if input.is_empty() {
            Ok((input, ()))
        } else {
            Err(nom::Err::Error(Failure::expected(label, input)))
        }
    }
}

fn identifier(input: &str) -> Res<'_, &str> {
    lexeme("identifier", take_while1(|c: char| c.is_ascii_lowercase()))(input)
}

fn variable(input: &str) -> Res<'_, &str> {
    lexeme(
        "variable",
        recognize(pair(
            satisfy(|c| c.is_ascii_uppercase()),
            take_while(|c: char| c.is_ascii_alphabetic()),
        )),
    )(input)
}

fn term(input: &str) -> Res<'_, Term> {
    alt((
        map(identifier, Term::symbol),
        map(variable, Term::variable),
    ))(input)
}

fn terms(input: &str) -> Res<'_, Vec<Term>> {
    map(
        pair(term, many0(preceded(symbol(","), cut(term)))),
        |(first, rest)| std::iter::once(first).chain(rest).collect(),
    )(input)
}

fn args(input: &str) -> Res<'_, Vec<Term>> {
    preceded(
        symbol("("),
        cut(terminated(
            map(opt(terms), Option::unwrap_or_default),
            symbol(")"),
        )),
    )(input)
}

fn atom(input: &str) -> Res<'_, Atom> {
    map(pair(identifier, opt(args)), |(predicate, args)| {
        Atom::new(predicate, args.unwrap_or_default())
    })(input)
}

fn atoms(input: &str) -> Res<'_, Vec<Atom>> {
    map(
        pair(atom, many0(preceded(symbol(","), cut(atom)))),
        |(first, rest)| std::iter::once(first).chain(rest).collect(),
    )(input)
}

/// Every command starts with an atom; the token after it decides the kind
fn command(input: &str) -> Res<'_, Command> {
    let (input, head) = atom(input)?;
    let (input, terminator) = cut(alt((symbol(":-"), symbol("."), symbol("?"))))(input)?;
    match terminator {
        ":-" => {
            let (input, body) = cut(terminated(atoms, symbol(".")))(input)?;
            Ok((input, Command::Assertion(Rule::new(head, body))))
        }
        "." => Ok((input, Command::Assertion(Rule::fact(head)))),
        _ => Ok((input, Command::Query(head))),
    }
}

fn finish<T>(source: &str, result: Res<'_, T>) -> Result<T, ParseError> {
    result
        .finish()
        .map(|(_, value)| value)
        .map_err(|failure| ParseError::new(source, failure.rest, failure.expected))
}

/// Parse a whole program into its commands, in source order
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first malformed construct
pub fn parse_program(source: &str) -> Result<Vec<Command>, ParseError> {
    finish(
        source,
        terminated(many0(command), end_of_input("atom or end of input"))(source),
    )
}

/// Parse a single atom such as `path(a, X)` or `p`
///
/// # Errors
///
/// Returns a [`ParseError`] if the input is not exactly one atom
pub fn parse_atom(source: &str) -> Result<Atom, ParseError> {
    finish(source, terminated(atom, end_of_input("end of input"))(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Term {
        Term::symbol(name)
    }

    fn var(name: &str) -> Term {
        Term::variable(name)
    }

    #[test]
    fn test_parse_fact_rule_and_query() {
        let program = parse_program(
            "edge(a, b).\n\
             path(X, Y) :- edge(X, Z), path(Z, Y).\n\
             path(X, Y)?",
        )
        .unwrap();

        assert_eq!(
            program,
            vec![
                Command::Assertion(Rule::fact(Atom::new("edge", vec![sym("a"), sym("b")]))),
                Command::Assertion(Rule::new(
                    Atom::new("path", vec![var("X"), var("Y")]),
                    vec![
                        Atom::new("edge", vec![var("X"), var("Z")]),
                        Atom::new("path", vec![var("Z"), var("Y")]),
                    ],
                )),
                Command::Query(Atom::new("path", vec![var("X"), var("Y")])),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_free_form() {
        let compact = parse_program("edge(a,b).path(X,Y):-edge(X,Y).path(a,Y)?").unwrap();
        let spaced = parse_program(
            "  edge ( a , b ) .\n\tpath(X,Y)\n  :-  edge(X,Y) .\npath( a, Y ) ?  \n",
        )
        .unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(compact.len(), 3);
    }

    #[test]
    fn test_zero_arity_spellings_are_equivalent() {
        let program = parse_program("p. p(). p :- q. p() :- q().").unwrap();
        assert_eq!(program[0], program[1]);
        assert_eq!(program[2], program[3]);
        assert_eq!(program[0], Command::Assertion(Rule::fact(Atom::proposition("p"))));
    }

    #[test]
    fn test_mixed_case_variable_names() {
        let atom = parse_atom("learns(Species, icebeam)").unwrap();
        assert_eq!(
            atom,
            Atom::new("learns", vec![var("Species"), sym("icebeam")])
        );
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(parse_program("").unwrap(), Vec::new());
        assert_eq!(parse_program("  \n ").unwrap(), Vec::new());
    }

    #[test]
    fn test_missing_terminator_fails() {
        let err = parse_program("edge(a,b)").unwrap_err();
        assert_eq!(err.expected, "':-' or '.' or '?'");
        assert_eq!(err.rest, "");
        assert_eq!(err.offset, 9);
    }

    #[test]
    fn test_failure_aborts_whole_program() {
        let err = parse_program("edge(a,b).\nedge(b c).\nedge(c,d).").unwrap_err();
        assert_eq!(err.expected, "')'");
        assert!(err.rest.starts_with("c)."));
        assert_eq!((err.line, err.column), (2, 8));
    }

    #[test]
    fn test_bad_argument_reports_term() {
        let err = parse_program("edge(a, 1).").unwrap_err();
        assert_eq!(err.expected, "identifier or variable");
        assert!(err.rest.starts_with("1)."));
    }

    #[test]
    fn test_dangling_comma_in_body() {
        let err = parse_program("p(X) :- q(X), .").unwrap_err();
        assert_eq!(err.expected, "identifier");
        assert_eq!(err.rest, ".");
    }

    #[test]
    fn test_garbage_between_commands() {
        let err = parse_program("p. Q.").unwrap_err();
        assert_eq!(err.expected, "atom or end of input");
        assert_eq!(err.rest, "Q.");
    }

    #[test]
    fn test_parse_atom_rejects_trailing_input() {
        assert_eq!(parse_atom("p").unwrap(), Atom::proposition("p"));
        let err = parse_atom("p(a) q").unwrap_err();
        assert_eq!(err.expected, "end of input");
        assert_eq!(err.rest, "q");
    }

    #[test]
    fn test_parsed_commands_print_back() {
        let source = "species(nidoking). learns(Species, icebeam)? p :- q, r.";
        let printed: Vec<String> = parse_program(source)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            printed,
            vec![
                "species(nidoking).",
                "learns(Species, icebeam)?",
                "p() :- q(), r().",
            ]
        );
    }
}
