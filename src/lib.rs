//! # Naivelog
//!
//! A small in-memory Datalog engine in Rust.
//!
//! ## Features
//!
//! - Recursive-descent parser for facts, rules and queries
//! - Unification with occurs-check over persistent substitutions
//! - Naive bottom-up evaluation to the least fixpoint
//!
//! ## Example
//!
//! ```rust
//! use naivelog::{eval_program, parse_program};
//!
//! let program = parse_program(
//!     "edge(a, b). edge(b, c).
//!      path(X, Y) :- edge(X, Y).
//!      path(X, Y) :- path(X, Z), path(Z, Y).
//!      path(a, Y)?",
//! )?;
//!
//! let answers: Vec<String> = eval_program(program)?
//!     .iter()
//!     .map(|answer| format!("{answer}."))
//!     .collect();
//! assert_eq!(answers, ["path(a, b).", "path(a, c)."]);
//! # Ok::<(), naivelog::Error>(())
//! ```

/// Fact storage.
pub mod database;
/// Datalog engine.
pub mod engine;
/// Error types.
pub mod error;
/// Surface syntax parser.
pub mod parser;
/// Terms, atoms, rules and commands.
pub mod term;
/// Unification.
pub mod unify;

pub use database::Database;
pub use engine::{eval_program, evaluate_naive, immediate_consequence, Answers, DatalogEngine};
pub use error::{Error, ParseError, Result};
pub use parser::{parse_atom, parse_program};
pub use term::{Atom, Command, Rule, Term};
pub use unify::{substitute, unify, unify_atoms, unify_variable, Substitution};
