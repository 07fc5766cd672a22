//! Boolean query grammar.
//!
//! ```text
//! query := and ("OR" and)*
//! and   := atom (["AND"] atom)*
//! atom  := "tag:" value | term
//! ```
//!
//! `AND` and `OR` are operators only when written in upper case.

use std::error::Error;
use std::fmt::{Display, Formatter};

const AND: &str = "AND";
const OR: &str = "OR";
const TAG_PREFIX: &str = "tag:";

/// Parsed query tree; terms and tags are lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Term(String),
    Tag(String),
    And(Box<Query>, Box<Query>),
    Or(Box<Query>, Box<Query>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    Empty,
    /// An operator without an operand on one side.
    DanglingOperator(String),
    EmptyTag,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "query is empty"),
            Self::DanglingOperator(operator) => {
                write!(f, "operator `{operator}` is missing an operand")
            }
            Self::EmptyTag => write!(f, "`tag:` requires a value"),
        }
    }
}

impl Error for QueryError {}

/// Parses `text` into a [`Query`].
///
/// # Errors
/// - [`QueryError::Empty`] for blank input.
/// - [`QueryError::DanglingOperator`] for a leading, trailing or doubled operator.
/// - [`QueryError::EmptyTag`] for a bare `tag:`.
pub fn parse_query(text: &str) -> Result<Query, QueryError> {
    let tokens = text.split_whitespace().collect::<Vec<_>>();
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }

    let mut disjuncts = Vec::new();
    for clause in tokens.split(|token| *token == OR) {
        if clause.is_empty() {
            return Err(QueryError::DanglingOperator(OR.to_string()));
        }
        disjuncts.push(parse_conjunction(clause)?);
    }

    disjuncts
        .into_iter()
        .reduce(|left, right| Query::Or(Box::new(left), Box::new(right)))
        .ok_or(QueryError::Empty)
}

fn parse_conjunction(tokens: &[&str]) -> Result<Query, QueryError> {
    let mut operands = Vec::new();
    for clause in tokens.split(|token| *token == AND) {
        if clause.is_empty() {
            return Err(QueryError::DanglingOperator(AND.to_string()));
        }
        for token in clause {
            operands.push(parse_atom(token)?);
        }
    }

    operands
        .into_iter()
        .reduce(|left, right| Query::And(Box::new(left), Box::new(right)))
        .ok_or_else(|| QueryError::DanglingOperator(AND.to_string()))
}

fn parse_atom(token: &str) -> Result<Query, QueryError> {
    let lowered = token.to_lowercase();
    match lowered.strip_prefix(TAG_PREFIX) {
        Some("") => Err(QueryError::EmptyTag),
        Some(tag) => Ok(Query::Tag(tag.to_string())),
        None => Ok(Query::Term(lowered)),
    }
}
