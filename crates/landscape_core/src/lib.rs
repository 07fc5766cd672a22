//! Landscape reconciliation core.
//! Turns declarative landscape descriptions into a reconciled item graph,
//! lays it out and makes it searchable.

pub mod input;
pub mod layout;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;

pub use input::description::{
    DescriptionError, GroupDescription, ItemDescription, LandscapeDescription,
    RelationDescription,
};
pub use input::process_log::{LogEntry, LogLevel, ProcessLog};
pub use layout::{layout_landscape, LandscapeLayout, LayoutError, LayoutResult, Rect};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::group::{Group, COMMON_GROUP};
pub use model::identity::{FullyQualifiedIdentifier, ItemMatcher};
pub use model::item::{Interface, Item, Relation, RelationType};
pub use model::landscape::{Landscape, LandscapeConfig, LayoutConfig};
pub use search::{parse_query, Query, QueryError, SearchIndex};
pub use service::diff_processor::ReconcileReport;
pub use service::indexer::{index_landscape, LandscapeRegistry, LandscapeSnapshot, ProcessOutcome};
pub use service::{ProcessingError, ProcessingResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
