//! Processing pipeline services.
//!
//! # Responsibility
//! - Resolve groups, reconcile items and resolve relations of one description.
//! - Serialize runs per landscape and publish committed snapshots.
//!
//! # Invariants
//! - A failed run never changes the committed landscape.

use crate::input::description::DescriptionError;
use crate::layout::LayoutError;
use crate::model::identity::FullyQualifiedIdentifier;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod diff_processor;
pub mod group_resolver;
pub mod indexer;
pub mod relation_resolver;

pub type ProcessingResult<T> = Result<T, ProcessingError>;

/// Fatal failure of one processing run.
#[derive(Debug)]
pub enum ProcessingError {
    /// Description failed declaration-level validation.
    InvalidDescription {
        landscape: String,
        source: DescriptionError,
    },
    /// Full update keeps an item no description matches.
    OrphanedItem {
        landscape: String,
        item: FullyQualifiedIdentifier,
    },
    /// Layout could not be computed for the reconciled landscape.
    Layout {
        landscape: String,
        source: LayoutError,
    },
}

impl ProcessingError {
    /// Identifier of the landscape whose run failed.
    pub fn landscape(&self) -> &str {
        match self {
            Self::InvalidDescription { landscape, .. }
            | Self::OrphanedItem { landscape, .. }
            | Self::Layout { landscape, .. } => landscape,
        }
    }
}

impl Display for ProcessingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDescription { landscape, source } => {
                write!(f, "invalid description for landscape `{landscape}`: {source}")
            }
            Self::OrphanedItem { landscape, item } => write!(
                f,
                "item not found in description of landscape `{landscape}`: {item}"
            ),
            Self::Layout { landscape, source } => {
                write!(f, "layout of landscape `{landscape}` failed: {source}")
            }
        }
    }
}

impl Error for ProcessingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDescription { source, .. } => Some(source),
            Self::OrphanedItem { .. } => None,
            Self::Layout { source, .. } => Some(source),
        }
    }
}
