use crate::term::{Atom, Term};
use crate::unify::{substitute, unify_atoms, Substitution};
use indexmap::{IndexMap, IndexSet};
use std::ops::Sub;

/// A store of ground atoms grouped by predicate name
///
/// Every atom stored under `predicate` has that predicate name and is ground.
/// The set of constants seen across all stored atoms is maintained on `add` and
/// bounds the grounding step of evaluation. `Clone` produces an independent
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: IndexMap<String, IndexSet<Atom>>,
    constants: IndexSet<Term>,
}

impl Database {
    /// Create an empty database
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a ground atom, returning true if it was not already present
    ///
    /// # Panics
    ///
    /// Panics if the atom contains any variables
    pub fn add(&mut self, atom: Atom) -> bool {
        assert!(atom.is_ground(), "Database atoms must be ground: {atom}");
        collect_constants(&atom.terms, &mut self.constants);
        self.tables
            .entry(atom.predicate.clone())
            .or_default()
            .insert(atom)
    }

    /// Membership test
    #[must_use]
    pub fn contains(&self, atom: &Atom) -> bool {
        self.tables
            .get(&atom.predicate)
            .is_some_and(|table| table.contains(atom))
    }

    /// Stored atoms matching `query`
    ///
    /// A ground query yields itself when present. Otherwise every atom in the
    /// query's table is unified against it and each match yields the query
    /// with its variables filled in.
    pub fn search<'a>(&'a self, query: &'a Atom) -> impl Iterator<Item = Atom> + 'a {
        let table = self.tables.get(&query.predicate);
        let ground = query.is_ground();

        let exact = ground
            .then(|| table.and_then(|table| table.get(query)))
            .flatten()
            .cloned();
        let matches = (!ground)
            .then_some(table)
            .flatten()
            .into_iter()
            .flatten()
            .filter_map(move |atom| {
                unify_atoms(query, atom, &Substitution::new())
                    .map(|bindings| substitute(query, &bindings))
            });

        exact.into_iter().chain(matches)
    }

    /// Atoms in `self` that are not in `other`
    #[must_use]
    pub fn difference(&self, other: &Database) -> Database {
        let mut out = Database::new();
        for atom in self.iter().filter(|atom| !other.contains(atom)) {
            out.add(atom.clone());
        }
        out
    }

    /// The table for one predicate
    #[must_use]
    pub fn table(&self, predicate: &str) -> Option<&IndexSet<Atom>> {
        self.tables.get(predicate)
    }

    /// Every distinct constant appearing in a stored atom
    #[must_use]
    pub fn constants(&self) -> &IndexSet<Term> {
        &self.constants
    }

    /// Predicate names with at least one stored atom
    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.tables
            .iter()
            .filter(|(_, table)| !table.is_empty())
            .map(|(predicate, _)| predicate.as_str())
    }

    /// All stored atoms
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Atom> {
        self.tables.values().flatten()
    }

    /// Total number of stored atoms
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.values().map(IndexSet::len).sum()
    }

    /// Returns true when no atom is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_constants(terms: &[Term], out: &mut IndexSet<Term>) {
    for term in terms {
        match term {
            Term::Symbol(_) => {
                out.insert(term.clone());
            }
            Term::Compound(atom) => collect_constants(&atom.terms, out),
            Term::Variable(_) => {}
        }
    }
}

impl PartialEq for Database {
    /// Same predicates holding the same atoms, regardless of insertion order
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.tables.iter().all(|(predicate, table)| {
                other
                    .tables
                    .get(predicate)
                    .map_or(table.is_empty(), |theirs| theirs == table)
            })
    }
}

impl Eq for Database {}

impl Sub for &Database {
    type Output = Database;

    fn sub(self, other: &Database) -> Database {
        self.difference(other)
    }
}

impl Extend<Atom> for Database {
    fn extend<I: IntoIterator<Item = Atom>>(&mut self, iter: I) {
        for atom in iter {
            self.add(atom);
        }
    }
}

impl FromIterator<Atom> for Database {
    fn from_iter<I: IntoIterator<Item = Atom>>(iter: I) -> Self {
        let mut db = Database::new();
        db.extend(iter);
        db
    }
}
