//! Force-directed landscape layout.
//!
//! # Responsibility
//! - Compute item rectangles inside each group and group rectangles inside
//!   the landscape.
//! - Pull groups together along virtual edges derived from cross-group
//!   relations.
//!
//! # Invariants
//! - Layout is deterministic for a given landscape and seed.
//! - Every coordinate is finite; sibling rectangles never overlap.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bounds;
pub mod landscape_layout;
pub mod organic;

pub use bounds::{ComponentBounds, ComponentId, Rect};
pub use landscape_layout::{layout_landscape, GroupConnections, LandscapeLayout};
pub use organic::{LayoutStats, OrganicLayout, OrganicParams};

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A virtual edge references a group with no computed bounds.
    MissingGroupGeometry { group: String },
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGroupGeometry { group } => {
                write!(f, "no layout geometry for group `{group}`")
            }
        }
    }
}

impl Error for LayoutError {}
