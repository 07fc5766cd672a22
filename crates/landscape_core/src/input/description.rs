//! Landscape description value objects.
//!
//! # Responsibility
//! - Carry the typed input produced by external format layers.
//! - Validate declaration-level invariants before processing.
//!
//! # Invariants
//! - Absent optional fields mean "do not change", never "clear".
//! - Item descriptions without a group resolve to `Common`.

use crate::model::group::{Group, COMMON_GROUP};
use crate::model::identity::ItemMatcher;
use crate::model::item::{Interface, RelationType};
use crate::model::landscape::LandscapeConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Declaration-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    /// Landscape identifier is blank after trim.
    BlankIdentifier,
    /// Item description at `index` has a blank identifier.
    BlankItemIdentifier { index: usize },
    /// Group declaration key is blank after trim.
    BlankGroupIdentifier,
}

impl Display for DescriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankIdentifier => write!(f, "landscape identifier must not be blank"),
            Self::BlankItemIdentifier { index } => {
                write!(f, "item description #{index} has a blank identifier")
            }
            Self::BlankGroupIdentifier => write!(f, "group identifier must not be blank"),
        }
    }
}

impl Error for DescriptionError {}

/// Full or partial description of one landscape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeDescription {
    pub identifier: String,
    pub name: Option<String>,
    pub contact: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub links: BTreeMap<String, String>,
    /// Incremental update: existing items not described are kept.
    pub partial: bool,
    pub items: Vec<ItemDescription>,
    /// Explicit group declarations keyed by group identifier.
    pub groups: BTreeMap<String, GroupDescription>,
    pub config: LandscapeConfig,
}

impl LandscapeDescription {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Matcher for an item description within this landscape.
    ///
    /// A description without group matches the item in any group.
    pub fn item_matcher(&self, item: &ItemDescription) -> ItemMatcher {
        ItemMatcher::new(
            Some(&self.identifier),
            item.group.as_deref(),
            &item.identifier,
        )
    }

    pub fn validate(&self) -> Result<(), DescriptionError> {
        if self.identifier.trim().is_empty() {
            return Err(DescriptionError::BlankIdentifier);
        }
        if let Some(index) = self
            .items
            .iter()
            .position(|item| item.identifier.trim().is_empty())
        {
            return Err(DescriptionError::BlankItemIdentifier { index });
        }
        if self.groups.keys().any(|key| key.trim().is_empty()) {
            return Err(DescriptionError::BlankGroupIdentifier);
        }
        Ok(())
    }
}

/// Description of one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDescription {
    pub identifier: String,
    pub group: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub links: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub relations: Vec<RelationDescription>,
    /// References to items providing this one.
    pub provided_by: Vec<String>,
    pub interfaces: Vec<Interface>,
}

impl ItemDescription {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Declared group, or `Common` when blank or absent.
    pub fn effective_group(&self) -> &str {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .unwrap_or(COMMON_GROUP)
    }
}

/// Outgoing relation declared on an item description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationDescription {
    /// `item`, `group/item` or `landscape/group/item`.
    pub target: String,
    #[serde(rename = "type")]
    pub kind: Option<RelationType>,
    pub format: Option<String>,
    pub description: Option<String>,
}

impl RelationDescription {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }
}

/// Explicit group declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDescription {
    pub owner: Option<String>,
    pub description: Option<String>,
    pub contact: Option<String>,
    pub color: Option<String>,
    pub links: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
}

impl GroupDescription {
    /// Materializes the declaration as a group named `identifier`.
    pub fn to_group(&self, identifier: &str) -> Group {
        let mut group = Group::new(identifier);
        group.owner = self.owner.clone();
        group.description = self.description.clone();
        group.contact = self.contact.clone();
        group.color = self.color.clone();
        group.links = self.links.clone();
        group.labels = self.labels.clone();
        group
    }
}

#[cfg(test)]
mod tests {
    use super::{DescriptionError, ItemDescription, LandscapeDescription};

    #[test]
    fn effective_group_defaults_to_common() {
        assert_eq!(ItemDescription::new("a").effective_group(), "Common");
        assert_eq!(ItemDescription::new("a").in_group(" ").effective_group(), "Common");
        assert_eq!(ItemDescription::new("a").in_group("ops").effective_group(), "ops");
    }

    #[test]
    fn validate_rejects_blank_identifiers() {
        assert_eq!(
            LandscapeDescription::new(" ").validate(),
            Err(DescriptionError::BlankIdentifier)
        );

        let mut description = LandscapeDescription::new("acme");
        description.items.push(ItemDescription::new("web"));
        description.items.push(ItemDescription::new(""));
        assert_eq!(
            description.validate(),
            Err(DescriptionError::BlankItemIdentifier { index: 1 })
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let description: LandscapeDescription = serde_json::from_value(serde_json::json!({
            "identifier": "acme",
            "partial": true,
            "items": [
                {
                    "identifier": "web",
                    "type": "webserver",
                    "relations": [{ "target": "db", "type": "provider" }]
                }
            ],
            "config": { "group_blacklist": ["test.*"] }
        }))
        .unwrap();

        assert!(description.partial);
        assert_eq!(description.items[0].kind.as_deref(), Some("webserver"));
        assert_eq!(description.items[0].relations[0].target, "db");
        assert_eq!(description.config.group_blacklist, vec!["test.*".to_string()]);
        assert!(description.config.layout.max_iterations.is_none());
    }
}
