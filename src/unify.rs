//! First-order unification with occurs-check.
//!
//! Substitutions are persistent: binding a variable returns a new
//! [`Substitution`] and leaves the original untouched, so one partial result
//! can be reused across several candidate branches. Unification failure is a
//! plain `None`, so steps chain with `?` and `try_fold`.
//!
//! # Example
//!
//! ```rust
//! use naivelog::{unify_atoms, Atom, Substitution, Term};
//!
//! // learns(nidoking, icebeam) = learns(Species, icebeam)
//! let fact = Atom::new("learns", vec![Term::symbol("nidoking"), Term::symbol("icebeam")]);
//! let query = Atom::new("learns", vec![Term::variable("Species"), Term::symbol("icebeam")]);
//!
//! let subst = unify_atoms(&query, &fact, &Substitution::new()).unwrap();
//! assert_eq!(subst.get("Species"), Some(&Term::symbol("nidoking")));
//! ```

use crate::term::{Atom, Term};
use rpds::HashTrieMap;

/// A persistent mapping from variable name to term
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    bindings: HashTrieMap<String, Term>,
}

impl Default for Substitution {
    fn default() -> Self {
        Self::new()
    }
}

impl Substitution {
    /// Creates an empty substitution
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashTrieMap::new(),
        }
    }

    /// Returns a new substitution extended with `var ↦ term`
    #[must_use]
    pub fn bind(&self, var: &str, term: Term) -> Self {
        Self {
            bindings: self.bindings.insert(var.to_owned(), term),
        }
    }

    /// Get the binding for a variable
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.bindings.get(var)
    }

    /// Number of bound variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.size()
    }

    /// Check if substitution is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over bindings
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(var, term)| (var.as_str(), term))
    }

    /// Apply the substitution to a term, following chains of bindings.
    /// Unbound variables are left as they are.
    #[must_use]
    pub fn resolve(&self, term: &Term) -> Term {
        match term {
            Term::Variable(var) => match self.get(var) {
                Some(bound) => self.resolve(bound),
                None => term.clone(),
            },
            Term::Symbol(_) => term.clone(),
            Term::Compound(atom) => Term::Compound(substitute(atom, self)),
        }
    }
}

impl<'a> FromIterator<(&'a str, Term)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (&'a str, Term)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |subst, (var, term)| subst.bind(var, term))
    }
}

/// Unify two terms under `subst`, returning the extended substitution
#[must_use]
pub fn unify(x: &Term, y: &Term, subst: &Substitution) -> Option<Substitution> {
    if x == y {
        return Some(subst.clone());
    }
    match (x, y) {
        (Term::Variable(var), other) | (other, Term::Variable(var)) => {
            unify_variable(var, other, subst)
        }
        (Term::Compound(a), Term::Compound(b)) => unify_atoms(a, b, subst),
        _ => None,
    }
}

/// Unify two atoms: predicate names and arities must match, then arguments are
/// unified left to right, each pair seeing the bindings made by earlier pairs
#[must_use]
pub fn unify_atoms(x: &Atom, y: &Atom, subst: &Substitution) -> Option<Substitution> {
    if x.predicate != y.predicate || x.terms.len() != y.terms.len() {
        return None;
    }
    x.terms
        .iter()
        .zip(&y.terms)
        .try_fold(subst.clone(), |subst, (a, b)| unify(a, b, &subst))
}

/// Unify the variable `var` with `term`
#[must_use]
pub fn unify_variable(var: &str, term: &Term, subst: &Substitution) -> Option<Substitution> {
    if let Some(bound) = subst.get(var) {
        return unify(bound, term, subst);
    }
    if let Term::Variable(other) = term {
        if let Some(bound) = subst.get(other) {
            return unify(&Term::Variable(var.to_owned()), bound, subst);
        }
    }
    if occurs_check(var, term, subst) {
        return None;
    }
    Some(subst.bind(var, term.clone()))
}

/// Does `var` occur in `term` once the bindings of `subst` are followed?
#[must_use]
pub fn occurs_check(var: &str, term: &Term, subst: &Substitution) -> bool {
    match term {
        Term::Variable(name) if name == var => true,
        Term::Variable(name) => subst
            .get(name)
            .is_some_and(|bound| occurs_check(var, bound, subst)),
        Term::Compound(atom) => atom.terms.iter().any(|arg| occurs_check(var, arg, subst)),
        Term::Symbol(_) => false,
    }
}

/// Rebuild `atom` with every bound variable replaced by its value
#[must_use]
pub fn substitute(atom: &Atom, subst: &Substitution) -> Atom {
    Atom {
        predicate: atom.predicate.clone(),
        terms: atom.terms.iter().map(|term| subst.resolve(term)).collect(),
    }
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

    fn app(predicate: &str, terms: Vec<Term>) -> Term {
        Term::Compound(Atom::new(predicate, terms))
    }

    #[test]
    fn test_identical_terms_keep_substitution() {
        let subst = Substitution::new().bind("Z", sym("z"));
        let result = unify(&app("f", vec![sym("a")]), &app("f", vec![sym("a")]), &subst);
        assert_eq!(result, Some(subst));
    }

    #[test]
    fn test_variable_binds_to_constant() {
        let result = unify(&app("f", vec![var("A")]), &app("f", vec![app("g", vec![])]), &Substitution::new())
            .expect("f(A) should unify with f(g())");
        assert_eq!(result.get("A"), Some(&app("g", vec![])));
    }

    #[test]
    fn test_bindings_thread_left_to_right() {
        // f(a, b, bar(c)) = f(a, V, X)
        let left = app("f", vec![sym("a"), sym("b"), app("bar", vec![sym("c")])]);
        let right = app("f", vec![sym("a"), var("V"), var("X")]);
        let result = unify(&left, &right, &Substitution::new()).expect("should unify");
        assert_eq!(result.get("V"), Some(&sym("b")));
        assert_eq!(result.get("X"), Some(&app("bar", vec![sym("c")])));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_repeated_variable_must_agree() {
        let pattern = app("same", vec![var("X"), var("X")]);
        assert!(unify(&pattern, &app("same", vec![sym("a"), sym("b")]), &Substitution::new()).is_none());

        let result = unify(&pattern, &app("same", vec![sym("c"), sym("c")]), &Substitution::new())
            .expect("same(X, X) should match same(c, c)");
        assert_eq!(result.get("X"), Some(&sym("c")));
    }

    #[test]
    fn test_mismatched_names_or_arity_fail() {
        let empty = Substitution::new();
        assert!(unify(&app("ancestor", vec![var("A")]), &app("parent", vec![var("A")]), &empty).is_none());
        assert!(unify(&app("f", vec![sym("a")]), &app("f", vec![sym("a"), sym("b")]), &empty).is_none());
        assert!(unify(&sym("a"), &sym("b"), &empty).is_none());
        assert!(unify(&sym("a"), &app("a", vec![]), &empty).is_none());
    }

    #[test]
    fn test_occurs_check_rejects_cyclic_binding() {
        let empty = Substitution::new();
        assert!(unify(&var("X"), &app("f", vec![var("X")]), &empty).is_none());
        assert!(unify(&app("f", vec![var("X")]), &var("X"), &empty).is_none());

        // Indirect: Y ↦ f(X), then X = Y
        let subst = empty.bind("Y", app("f", vec![var("X")]));
        assert!(unify(&var("X"), &var("Y"), &subst).is_none());
    }

    #[test]
    fn test_bound_variable_is_followed() {
        let subst = Substitution::new().bind("X", sym("a"));
        assert!(unify(&var("X"), &sym("a"), &subst).is_some());
        assert!(unify(&var("X"), &sym("b"), &subst).is_none());
        assert!(unify(&var("Y"), &var("X"), &subst)
            .is_some_and(|s| s.resolve(&var("Y")) == sym("a")));
    }

    #[test]
    fn test_binding_does_not_mutate_input() {
        let base = Substitution::new().bind("X", sym("a"));
        let extended = unify(&var("Y"), &sym("b"), &base).expect("should unify");
        assert_eq!(base.len(), 1);
        assert!(base.get("Y").is_none());
        assert_eq!(extended.len(), 2);
    }

    #[test]
    fn test_substitute_leaves_unbound_variables() {
        let atom = Atom::new("path", vec![var("X"), var("Y"), app("f", vec![var("X")])]);
        let subst = Substitution::new().bind("X", sym("a"));
        assert_eq!(
            substitute(&atom, &subst),
            Atom::new("path", vec![sym("a"), var("Y"), app("f", vec![sym("a")])])
        );
    }

    #[test]
    fn test_collect_substitution_from_pairs() {
        let subst: Substitution = [("X", sym("a")), ("Y", sym("b"))].into_iter().collect();
        let mut pairs: Vec<(String, Term)> = subst
            .iter()
            .map(|(v, t)| (v.to_string(), t.clone()))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![("X".to_string(), sym("a")), ("Y".to_string(), sym("b"))]
        );
    }
}
