use thiserror::Error;

/// Errors raised while parsing or asserting a program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The program text is malformed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A rule whose head uses variables the body never binds
    #[error("unsafe rule `{rule}`: head variables {} do not occur in the body", .variables.join(", "))]
    UnsafeRule {
        /// The rejected rule in surface syntax
        rule: String,
        /// Head variables missing from the body
        variables: Vec<String>,
    },

    /// A fact whose head still contains variables
    #[error("fact `{rule}` is not ground")]
    NonGroundFact {
        /// The rejected fact in surface syntax
        rule: String,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Where and why parsing stopped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} at line {line}, column {column}, found {}", found(.rest))]
pub struct ParseError {
    /// The construct the parser was looking for
    pub expected: String,
    /// Unconsumed input starting at the failure point
    pub rest: String,
    /// Byte offset of the failure point in the source
    pub offset: usize,
    /// 1-based line of the failure point
    pub line: usize,
    /// 1-based column (in characters) of the failure point
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(source: &str, rest: &str, expected: impl Into<String>) -> Self {
        let offset = source.len() - rest.len();
        let consumed = &source[..offset];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        Self {
            expected: expected.into(),
            rest: rest.to_owned(),
            offset,
            line,
            column,
        }
    }
}

fn found(rest: &str) -> String {
    let snippet: String = rest.lines().next().unwrap_or("").chars().take(20).collect();
    if snippet.is_empty() {
        "end of input".to_owned()
    } else {
        format!("`{snippet}`")
    }
}
