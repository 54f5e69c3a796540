use indexmap::IndexSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A Datalog term
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Term {
    /// A variable scoped to one rule or query (e.g., `X`, `Species`)
    Variable(String),
    /// A concrete symbol/constant (e.g., `nidoking`, `icebeam`)
    Symbol(String),
    /// A compound term: a predicate applied to arguments
    Compound(Atom),
}

impl Term {
    /// Creates a constant term
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Creates a variable term
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Returns true when the term contains no variables
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Symbol(_) => true,
            Self::Variable(_) => false,
            Self::Compound(atom) => atom.is_ground(),
        }
    }

    fn collect_variables<'a>(&'a self, out: &mut IndexSet<&'a str>) {
        match self {
            Self::Variable(name) => {
                out.insert(name);
            }
            Self::Symbol(_) => {}
            Self::Compound(atom) => {
                for term in &atom.terms {
                    term.collect_variables(out);
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) | Self::Symbol(name) => f.write_str(name),
            Self::Compound(atom) => write!(f, "{atom}"),
        }
    }
}

/// A Datalog predicate application (e.g., `edge(a, b)`)
///
/// Equality and hashing are structural and argument order is significant.
/// A zero-arity atom (`p`) and an empty argument list (`p()`) are the same
/// value.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Atom {
    /// The name of the predicate (e.g., `"edge"`, `"path"`)
    pub predicate: String,
    /// The arguments/terms of the predicate
    pub terms: Vec<Term>,
}

impl Atom {
    /// Creates an atom from a predicate name and its arguments
    pub fn new(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            terms,
        }
    }

    /// Creates a zero-arity atom
    pub fn proposition(predicate: impl Into<String>) -> Self {
        Self::new(predicate, Vec::new())
    }

    /// Number of arguments
    #[must_use]
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Returns true when every argument is ground
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }

    /// Distinct variable names in first-occurrence order, including variables
    /// nested inside compound arguments
    #[must_use]
    pub fn variables(&self) -> IndexSet<&str> {
        let mut out = IndexSet::new();
        for term in &self.terms {
            term.collect_variables(&mut out);
        }
        out
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}

/// A Datalog rule (e.g., `path(X, Y) :- edge(X, Y)`)
///
/// A rule with an empty body is a fact.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rule {
    /// The conclusion/consequent of the rule
    pub head: Atom,
    /// The conditions/antecedents that must be satisfied
    pub body: Vec<Atom>,
}

impl Rule {
    /// Creates a rule from a head and a body
    #[must_use]
    pub fn new(head: Atom, body: Vec<Atom>) -> Self {
        Self { head, body }
    }

    /// Creates a rule with an empty body
    #[must_use]
    pub fn fact(head: Atom) -> Self {
        Self::new(head, Vec::new())
    }

    /// Returns true when the body is empty
    #[must_use]
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// Variables appearing in the head
    #[must_use]
    pub fn head_variables(&self) -> IndexSet<&str> {
        self.head.variables()
    }

    /// Variables appearing anywhere in the body, in first-occurrence order
    #[must_use]
    pub fn body_variables(&self) -> IndexSet<&str> {
        self.body.iter().flat_map(Atom::variables).collect()
    }

    /// Head variables that never occur in the body
    #[must_use]
    pub fn unbound_head_variables(&self) -> Vec<&str> {
        let body = self.body_variables();
        self.head_variables()
            .into_iter()
            .filter(|var| !body.contains(var))
            .collect()
    }

    /// A rule is safe when every head variable also occurs in the body.
    /// For facts this means the head is ground.
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.unbound_head_variables().is_empty()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if self.body.is_empty() {
            return Ok(());
        }
        f.write_str(" :- ")?;
        for (idx, atom) in self.body.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{atom}")?;
        }
        Ok(())
    }
}

/// One statement of a Datalog program
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    /// Adds a rule (or fact) to the program, written `rule.`
    Assertion(Rule),
    /// Asks for every derived atom matching the pattern, written `atom?`
    Query(Atom),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assertion(rule) => write!(f, "{rule}."),
            Self::Query(atom) => write!(f, "{atom}?"),
        }
    }
}
