//! Item identity and similarity matching.
//!
//! # Responsibility
//! - Define the canonical `(landscape, group, item)` identity of an item.
//! - Decide whether a described item refers to an existing one.
//!
//! # Invariants
//! - A `FullyQualifiedIdentifier` always carries a non-blank group.
//! - Similarity is symmetric and ignores case and surrounding whitespace.
//! - A missing component on either side acts as a wildcard.

use crate::model::group::COMMON_GROUP;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const SEPARATOR: char = '/';

/// Canonical identity of an item across all landscapes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FullyQualifiedIdentifier {
    pub landscape: String,
    pub group: String,
    pub item: String,
}

impl FullyQualifiedIdentifier {
    /// Builds an identifier, falling back to the common group for blank groups.
    pub fn new(
        landscape: impl Into<String>,
        group: impl Into<String>,
        item: impl Into<String>,
    ) -> Self {
        let group = group.into();
        let group = if group.trim().is_empty() {
            COMMON_GROUP.to_string()
        } else {
            group
        };

        Self {
            landscape: landscape.into(),
            group,
            item: item.into(),
        }
    }

    /// Returns a matcher pinned to every component of this identifier.
    pub fn matcher(&self) -> ItemMatcher {
        ItemMatcher::for_target(self)
    }
}

impl Display for FullyQualifiedIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.landscape, self.group, self.item
        )
    }
}

/// Normalized, partially specified identity used for lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMatcher {
    landscape: Option<String>,
    group: Option<String>,
    item: String,
}

impl ItemMatcher {
    /// Creates a matcher; blank optional components become wildcards.
    pub fn new(landscape: Option<&str>, group: Option<&str>, item: &str) -> Self {
        Self {
            landscape: landscape.and_then(normalize),
            group: group.and_then(normalize),
            item: normalize(item).unwrap_or_default(),
        }
    }

    pub fn for_target(fqi: &FullyQualifiedIdentifier) -> Self {
        Self::new(Some(&fqi.landscape), Some(&fqi.group), &fqi.item)
    }

    /// Parses a relation reference: `item`, `group/item` or `landscape/group/item`.
    ///
    /// Returns `None` for blank references, blank item segments or more than
    /// three segments.
    pub fn parse(reference: &str) -> Option<Self> {
        let segments = reference.trim().split(SEPARATOR).collect::<Vec<_>>();
        let matcher = match segments.as_slice() {
            [item] => Self::new(None, None, item),
            [group, item] => Self::new(None, Some(group), item),
            [landscape, group, item] => Self::new(Some(landscape), Some(group), item),
            _ => return None,
        };
        if matcher.item.is_empty() {
            return None;
        }
        Some(matcher)
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns whether this matcher and `fqi` may denote the same item.
    pub fn is_similar_to(&self, fqi: &FullyQualifiedIdentifier) -> bool {
        self.overlaps(&Self::for_target(fqi))
    }

    /// Symmetric comparison of two partially specified identities.
    pub fn overlaps(&self, other: &ItemMatcher) -> bool {
        !self.item.is_empty()
            && self.item == other.item
            && component_matches(&self.group, &other.group)
            && component_matches(&self.landscape, &other.landscape)
    }
}

impl Display for ItemMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let landscape = self.landscape.as_deref().unwrap_or("*");
        let group = self.group.as_deref().unwrap_or("*");
        write!(f, "{landscape}{SEPARATOR}{group}{SEPARATOR}{}", self.item)
    }
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

fn component_matches(left: &Option<String>, right: &Option<String>) -> bool {
    match (left, right) {
        (Some(left), Some(right)) => left == right,
        _ => true,
    }
}
