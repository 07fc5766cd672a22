//! Item, relation and interface model.
//!
//! # Responsibility
//! - Define the node shape of a landscape and its outgoing relations.
//! - Provide tag and relation helpers used by search and layout.
//!
//! # Invariants
//! - Item identity (`fqi`) is fixed at construction.
//! - At most one relation per `(target, kind)` pair is stored on an item.

use crate::model::identity::FullyQualifiedIdentifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label key prefix marking a label as a tag.
pub const TAG_LABEL_PREFIX: &str = "tag.";

/// Relation semantics between two items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Source provides (hosts, runs) the target.
    Provider,
    /// Generic data flow from source to target.
    #[default]
    Dataflow,
}

/// Directed edge between two items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub source: FullyQualifiedIdentifier,
    pub target: FullyQualifiedIdentifier,
    pub kind: RelationType,
    pub format: Option<String>,
    pub description: Option<String>,
}

impl Relation {
    pub fn new(
        source: FullyQualifiedIdentifier,
        target: FullyQualifiedIdentifier,
        kind: RelationType,
    ) -> Self {
        Self {
            source,
            target,
            kind,
            format: None,
            description: None,
        }
    }
}

/// Interface exposed by an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    pub description: Option<String>,
    pub format: Option<String>,
    pub url: Option<String>,
}

/// A service/component node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    fqi: FullyQualifiedIdentifier,
    pub name: Option<String>,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub contact: Option<String>,
    /// Serialized as `type` to match description naming.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub links: BTreeMap<String, String>,
    pub relations: Vec<Relation>,
    pub interfaces: Vec<Interface>,
}

impl Item {
    /// Creates an item with empty attributes.
    pub fn new(fqi: FullyQualifiedIdentifier) -> Self {
        Self {
            fqi,
            name: None,
            description: None,
            owner: None,
            contact: None,
            kind: None,
            labels: BTreeMap::new(),
            links: BTreeMap::new(),
            relations: Vec::new(),
            interfaces: Vec::new(),
        }
    }

    pub fn fqi(&self) -> &FullyQualifiedIdentifier {
        &self.fqi
    }

    pub fn identifier(&self) -> &str {
        &self.fqi.item
    }

    pub fn group(&self) -> &str {
        &self.fqi.group
    }

    /// Name for display, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.identifier())
    }

    /// Returns tag values stored under the tag label prefix.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(|(key, _)| key.starts_with(TAG_LABEL_PREFIX))
            .map(|(key, value)| {
                if value.trim().is_empty() {
                    &key[TAG_LABEL_PREFIX.len()..]
                } else {
                    value.as_str()
                }
            })
    }

    pub fn set_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() {
            return;
        }
        self.labels
            .insert(format!("{TAG_LABEL_PREFIX}{tag}"), tag.to_string());
    }

    /// Inserts or replaces the relation with the same target and kind.
    ///
    /// Returns `true` when an existing relation was replaced.
    pub fn upsert_relation(&mut self, relation: Relation) -> bool {
        if let Some(existing) = self
            .relations
            .iter_mut()
            .find(|existing| existing.target == relation.target && existing.kind == relation.kind)
        {
            *existing = relation;
            return true;
        }
        self.relations.push(relation);
        false
    }

    pub fn relations_of(&self, kind: RelationType) -> impl Iterator<Item = &Relation> {
        self.relations
            .iter()
            .filter(move |relation| relation.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::{Item, Relation, RelationType};
    use crate::model::identity::FullyQualifiedIdentifier;

    fn fqi(item: &str) -> FullyQualifiedIdentifier {
        FullyQualifiedIdentifier::new("test", "g", item)
    }

    #[test]
    fn display_name_falls_back_to_identifier() {
        let mut item = Item::new(fqi("web"));
        assert_eq!(item.display_name(), "web");
        item.name = Some("Web Server".to_string());
        assert_eq!(item.display_name(), "Web Server");
    }

    #[test]
    fn tags_are_stored_as_prefixed_labels() {
        let mut item = Item::new(fqi("web"));
        item.set_tag(" strong ");
        item.set_tag("");
        item.labels.insert("team".to_string(), "ops".to_string());

        assert_eq!(item.tags().collect::<Vec<_>>(), vec!["strong"]);
        assert_eq!(item.labels.get("tag.strong").map(String::as_str), Some("strong"));
    }

    #[test]
    fn upsert_relation_replaces_same_target_and_kind() {
        let mut item = Item::new(fqi("web"));
        let mut relation = Relation::new(fqi("web"), fqi("db"), RelationType::Dataflow);
        assert!(!item.upsert_relation(relation.clone()));

        relation.format = Some("sql".to_string());
        assert!(item.upsert_relation(relation));
        assert!(!item.upsert_relation(Relation::new(fqi("web"), fqi("db"), RelationType::Provider)));

        assert_eq!(item.relations.len(), 2);
        assert_eq!(item.relations[0].format.as_deref(), Some("sql"));
        assert_eq!(item.relations_of(RelationType::Provider).count(), 1);
    }
}
