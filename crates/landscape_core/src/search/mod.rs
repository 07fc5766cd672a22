//! Boolean search over landscape items.
//!
//! # Responsibility
//! - Parse small boolean queries (terms, `tag:` filters, `AND`/`OR`).
//! - Answer them from an inverted index rebuilt per committed landscape.

pub mod index;
pub mod query;

pub use index::SearchIndex;
pub use query::{parse_query, Query, QueryError};
