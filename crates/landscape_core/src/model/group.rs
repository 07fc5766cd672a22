//! Group model and merge policy.
//!
//! # Responsibility
//! - Define named partitions of items and their descriptive attributes.
//! - Merge partial group sources with "first non-empty value wins".
//!
//! # Invariants
//! - A group identifier is never blank; blank input maps to `Common`.
//! - After `ensure_color`, every group carries a color.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of the default/fallback group.
pub const COMMON_GROUP: &str = "Common";

const GROUP_COLORS: &[&str] = &[
    "5f9ea0", "cd5c5c", "6b8e23", "4682b4", "d2691e", "9370db", "2e8b57", "b8860b", "708090",
    "c71585", "1e90ff", "8b4513",
];

/// Named partition of items.
///
/// Membership is kept on the owning [`crate::model::landscape::Landscape`],
/// not on the group itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    identifier: String,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub color: Option<String>,
    pub links: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

impl Group {
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let identifier = if identifier.trim().is_empty() {
            COMMON_GROUP.to_string()
        } else {
            identifier.trim().to_string()
        };

        Self {
            identifier,
            owner: None,
            description: None,
            contact: None,
            color: None,
            links: BTreeMap::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn common() -> Self {
        let mut group = Self::new(COMMON_GROUP);
        group.ensure_color();
        group
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_common(&self) -> bool {
        self.identifier == COMMON_GROUP
    }

    /// Fills every absent value of `self` from `other`.
    ///
    /// Values already present on `self` are never overwritten.
    pub fn merge(&mut self, other: &Group) {
        fill_if_absent(&mut self.owner, &other.owner);
        fill_if_absent(&mut self.description, &other.description);
        fill_if_absent(&mut self.contact, &other.contact);
        fill_if_absent(&mut self.color, &other.color);
        for (key, value) in &other.links {
            self.links.entry(key.clone()).or_insert_with(|| value.clone());
        }
        for (key, value) in &other.labels {
            self.labels.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self.ensure_color();
    }

    /// Assigns the identifier-derived color when none is set.
    pub fn ensure_color(&mut self) {
        if self.color.as_deref().map_or(true, |color| color.trim().is_empty()) {
            self.color = Some(group_color(&self.identifier).to_string());
        }
    }
}

/// Deterministic palette color for a group identifier.
pub fn group_color(identifier: &str) -> &'static str {
    // FNV-1a keeps the color stable across runs and platforms.
    let hash = identifier
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        });
    GROUP_COLORS[(hash % GROUP_COLORS.len() as u64) as usize]
}

fn fill_if_absent(target: &mut Option<String>, source: &Option<String>) {
    let target_is_empty = target.as_deref().map_or(true, |value| value.trim().is_empty());
    if !target_is_empty {
        return;
    }
    if let Some(value) = source.as_deref().filter(|value| !value.trim().is_empty()) {
        *target = Some(value.to_string());
    }
}
