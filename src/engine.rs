use crate::database::Database;
use crate::error::{Error, Result};
use crate::term::{Atom, Command, Rule, Term};
use crate::unify::{substitute, Substitution};
use log::{debug, trace, warn};

/// The Datalog evaluation engine
///
/// The only long-lived state is the list of asserted rules. Every query
/// recomputes the fixpoint from scratch into a fresh [`Database`].
#[derive(Debug, Default)]
pub struct DatalogEngine {
    rules: Vec<Rule>,
}

impl DatalogEngine {
    /// Create a new Datalog engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule (or fact) to the program
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonGroundFact`] for a fact whose head contains
    /// variables and [`Error::UnsafeRule`] for a rule whose head uses variables
    /// absent from its body. A rejected rule is not added.
    pub fn assert_rule(&mut self, rule: Rule) -> Result<()> {
        if rule.is_fact() && !rule.head.is_ground() {
            warn!("rejecting non-ground fact `{rule}`");
            return Err(Error::NonGroundFact {
                rule: rule.to_string(),
            });
        }

        let unbound = rule.unbound_head_variables();
        if !unbound.is_empty() {
            warn!("rejecting unsafe rule `{rule}`");
            return Err(Error::UnsafeRule {
                rule: rule.to_string(),
                variables: unbound.into_iter().map(str::to_owned).collect(),
            });
        }

        debug!("asserted `{rule}`");
        self.rules.push(rule);
        Ok(())
    }

    /// Add a fact to the program
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonGroundFact`] if the atom contains variables
    pub fn assert_fact(&mut self, atom: Atom) -> Result<()> {
        self.assert_rule(Rule::fact(atom))
    }

    /// Rules asserted so far, in program order
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Compute the least fixpoint of the current rule set
    #[must_use]
    pub fn evaluate(&self) -> Database {
        evaluate_naive(&self.rules)
    }

    /// Returns every derived atom matching `query`, with its variables filled in
    #[must_use]
    pub fn ask(&self, query: &Atom) -> Vec<Atom> {
        let db = self.evaluate();
        let answers: Vec<Atom> = db.search(query).collect();
        debug!("`{query}?` has {} answer(s)", answers.len());
        answers
    }

    /// Process commands in order: assertions extend the program and each query
    /// is answered against the rules asserted before it
    ///
    /// The returned iterator is lazy; a command is only processed once the
    /// answers of the previous query have been consumed.
    pub fn run<I>(&mut self, commands: I) -> Answers<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Command>,
    {
        Answers {
            engine: self,
            commands: commands.into_iter(),
            pending: Vec::new().into_iter(),
        }
    }
}

/// Answers produced by [`DatalogEngine::run`]
///
/// Yields each query answer in turn, or the error of a rejected assertion.
/// Iteration may continue after an error with the remaining commands.
#[derive(Debug)]
pub struct Answers<'e, I> {
    engine: &'e mut DatalogEngine,
    commands: I,
    pending: std::vec::IntoIter<Atom>,
}

impl<I> Iterator for Answers<'_, I>
where
    I: Iterator<Item = Command>,
{
    type Item = Result<Atom>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(answer) = self.pending.next() {
                return Some(Ok(answer));
            }
            match self.commands.next()? {
                Command::Assertion(rule) => {
                    if let Err(err) = self.engine.assert_rule(rule) {
                        return Some(Err(err));
                    }
                }
                Command::Query(query) => {
                    self.pending = self.engine.ask(&query).into_iter();
                }
            }
        }
    }
}

/// Run a whole program against a fresh engine, collecting every answer
///
/// # Errors
///
/// Stops at the first rejected assertion
pub fn eval_program<I>(commands: I) -> Result<Vec<Atom>>
where
    I: IntoIterator<Item = Command>,
{
    DatalogEngine::new().run(commands).collect()
}

/// Naive fixpoint: start from the heads of all facts and apply
/// [`immediate_consequence`] until the database stops changing
#[must_use]
pub fn evaluate_naive(rules: &[Rule]) -> Database {
    let mut db: Database = rules
        .iter()
        .filter(|rule| rule.is_fact())
        .map(|rule| rule.head.clone())
        .collect();

    let mut iteration = 0_usize;
    loop {
        iteration += 1;
        let next = immediate_consequence(rules, &db);
        if next == db {
            debug!(
                "fixpoint reached after {iteration} iteration(s) with {} atom(s)",
                db.len()
            );
            return db;
        }
        debug!(
            "iteration {iteration}: {} new atom(s)",
            next.len() - db.len()
        );
        db = next;
    }
}

/// One application of every non-fact rule to `db`
///
/// Each rule's body variables range over every constant in `db`. An assignment
/// fires the rule when every instantiated body atom is ground and present in
/// `db`; the instantiated head is then added to the result. This grounding is
/// `O(|constants|^v)` per rule where `v` is the number of body variables.
#[must_use]
pub fn immediate_consequence(rules: &[Rule], db: &Database) -> Database {
    let mut next = db.clone();
    let constants: Vec<&Term> = db.constants().iter().collect();

    for rule in rules.iter().filter(|rule| !rule.is_fact()) {
        let variables: Vec<&str> = rule.body_variables().into_iter().collect();

        for assignment in Assignments::new(variables.len(), constants.len()) {
            let binding: Substitution = variables
                .iter()
                .zip(assignment)
                .map(|(var, idx)| (*var, constants[idx].clone()))
                .collect();

            let satisfied = rule.body.iter().all(|atom| {
                let bound = substitute(atom, &binding);
                bound.is_ground() && db.contains(&bound)
            });
            if !satisfied {
                continue;
            }

            let derived = substitute(&rule.head, &binding);
            // An unsafe rule leaves head variables unbound and derives nothing.
            if !derived.is_ground() {
                continue;
            }
            if !db.contains(&derived) {
                trace!("`{rule}` derived `{derived}`");
            }
            next.add(derived);
        }
    }
    next
}

/// Every tuple of `width` indices into `0..base`, in odometer order
#[derive(Debug)]
struct Assignments {
    digits: Vec<usize>,
    base: usize,
    exhausted: bool,
}

impl Assignments {
    fn new(width: usize, base: usize) -> Self {
        Self {
            digits: vec![0; width],
            base,
            exhausted: width > 0 && base == 0,
        }
    }
}

impl Iterator for Assignments {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let current = self.digits.clone();

        self.exhausted = true;
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.base {
                self.exhausted = false;
                break;
            }
            *digit = 0;
        }
        Some(current)
    }
}
