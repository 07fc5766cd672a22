//! Landscape aggregate: groups, item arena and membership index.
//!
//! # Responsibility
//! - Own every group and item of one described system.
//! - Keep `Item::group` and the group membership index in agreement.
//!
//! # Invariants
//! - The `Common` group always exists.
//! - Every item's group exists in the group map.
//! - `membership[g]` contains an item iff `item.group() == g`.
//! - Item collections are replaced wholesale via [`Landscape::set_items`].

use crate::model::group::{Group, COMMON_GROUP};
use crate::model::identity::{FullyQualifiedIdentifier, ItemMatcher};
use crate::model::item::{Item, Relation, RelationType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Landscape-level processing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Regex (or literal fallback) patterns excluding groups.
    pub group_blacklist: Vec<String>,
    /// Regex (or literal fallback) patterns excluding item labels by key.
    pub label_blacklist: Vec<String>,
    pub layout: LayoutConfig,
}

/// Optional tuning knobs of the organic layout.
///
/// Every unset value falls back to a default that yields a finite,
/// non-overlapping layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Scales attraction along edges.
    pub edge_length_cost_factor: Option<f64>,
    /// Scales pairwise repulsion.
    pub node_distribution_cost_factor: Option<f64>,
    /// Scales the pull towards the layout centroid.
    pub border_line_cost_factor: Option<f64>,
    /// Candidate positions sampled per grid cell during initial placement.
    pub tries_per_cell: Option<u32>,
    pub max_iterations: Option<u32>,
    pub initial_temp: Option<f64>,
    /// Multiplies the scale-specific force constant.
    pub force_constant_factor: Option<f64>,
    /// Multiplies the minimum distance used in repulsion.
    pub min_distance_limit_factor: Option<f64>,
    /// Seed of the initial placement.
    pub seed: Option<u64>,
}

/// Reconciled model of one described system.
#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    identifier: String,
    pub name: Option<String>,
    pub contact: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub links: BTreeMap<String, String>,
    pub config: LandscapeConfig,
    groups: BTreeMap<String, Group>,
    items: BTreeMap<FullyQualifiedIdentifier, Item>,
    membership: BTreeMap<String, BTreeSet<FullyQualifiedIdentifier>>,
}

impl Landscape {
    /// Creates an empty landscape holding only the common group.
    pub fn new(identifier: impl Into<String>) -> Self {
        let mut landscape = Self {
            identifier: identifier.into(),
            name: None,
            contact: None,
            owner: None,
            description: None,
            labels: BTreeMap::new(),
            links: BTreeMap::new(),
            config: LandscapeConfig::default(),
            groups: BTreeMap::new(),
            items: BTreeMap::new(),
            membership: BTreeMap::new(),
        };
        landscape.insert_group(Group::common());
        landscape
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group(&self, identifier: &str) -> Option<&Group> {
        self.groups.get(identifier)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Inserts or replaces a group, keeping its current members.
    pub fn insert_group(&mut self, mut group: Group) {
        group.ensure_color();
        let identifier = group.identifier().to_string();
        self.membership.entry(identifier.clone()).or_default();
        self.groups.insert(identifier, group);
    }

    /// Creates an empty group when missing. Returns `true` if created.
    pub fn ensure_group(&mut self, identifier: &str) -> bool {
        let group = Group::new(identifier);
        if self.groups.contains_key(group.identifier()) {
            return false;
        }
        self.insert_group(group);
        true
    }

    /// Removes a group and every item it holds.
    ///
    /// The common group is never removed; its items are dropped instead.
    /// Returns the identifiers of the dropped items.
    pub fn remove_group(&mut self, identifier: &str) -> Vec<FullyQualifiedIdentifier> {
        let members = self
            .membership
            .get(identifier)
            .map(|members| members.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        for fqi in &members {
            self.items.remove(fqi);
        }

        if identifier == COMMON_GROUP {
            self.membership.entry(identifier.to_string()).or_default().clear();
        } else {
            self.membership.remove(identifier);
            self.groups.remove(identifier);
        }
        members
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn item(&self, fqi: &FullyQualifiedIdentifier) -> Option<&Item> {
        self.items.get(fqi)
    }

    pub fn item_mut(&mut self, fqi: &FullyQualifiedIdentifier) -> Option<&mut Item> {
        self.items.get_mut(fqi)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items of one group, in identifier order.
    pub fn group_items(&self, group: &str) -> Vec<&Item> {
        self.membership
            .get(group)
            .map(|members| members.iter().filter_map(|fqi| self.items.get(fqi)).collect())
            .unwrap_or_default()
    }

    /// All items similar to `matcher`.
    pub fn find_items(&self, matcher: &ItemMatcher) -> Vec<&Item> {
        self.items
            .values()
            .filter(|item| matcher.is_similar_to(item.fqi()))
            .collect()
    }

    /// Picks the single item with `identifier`, optionally within `group`.
    ///
    /// Returns `None` when nothing or more than one item matches.
    pub fn pick(&self, identifier: &str, group: Option<&str>) -> Option<&Item> {
        let matcher = ItemMatcher::new(None, group, identifier);
        let mut matches = self.find_items(&matcher).into_iter();
        match (matches.next(), matches.next()) {
            (Some(item), None) => Some(item),
            _ => None,
        }
    }

    /// Atomically replaces the item collection and rebuilds membership.
    ///
    /// Groups referenced by the new items are created when missing.
    pub fn set_items(&mut self, items: impl IntoIterator<Item = Item>) {
        let items = items
            .into_iter()
            .map(|item| (item.fqi().clone(), item))
            .collect::<BTreeMap<_, _>>();

        for item in items.values() {
            self.ensure_group(item.group());
        }
        for members in self.membership.values_mut() {
            members.clear();
        }
        for fqi in items.keys() {
            self.membership
                .entry(fqi.group.clone())
                .or_default()
                .insert(fqi.clone());
        }
        self.items = items;
    }

    /// Relations from any item pointing at `target`.
    pub fn relations_to(&self, target: &FullyQualifiedIdentifier) -> Vec<&Relation> {
        self.items
            .values()
            .flat_map(|item| item.relations.iter())
            .filter(|relation| &relation.target == target)
            .collect()
    }

    /// Items providing `target` via `Provider` relations.
    pub fn provided_by(&self, target: &FullyQualifiedIdentifier) -> Vec<&Item> {
        self.relations_to(target)
            .into_iter()
            .filter(|relation| relation.kind == RelationType::Provider)
            .filter_map(|relation| self.items.get(&relation.source))
            .collect()
    }

    /// Drops relations whose source or target is no longer part of the landscape.
    ///
    /// Returns the dropped relations so callers can report them.
    pub fn prune_dangling_relations(&mut self) -> Vec<Relation> {
        let known = self.items.keys().cloned().collect::<BTreeSet<_>>();
        let mut dropped = Vec::new();
        for item in self.items.values_mut() {
            let (kept, removed): (Vec<_>, Vec<_>) = item
                .relations
                .drain(..)
                .partition(|relation| {
                    known.contains(&relation.target) && known.contains(&relation.source)
                });
            item.relations = kept;
            dropped.extend(removed);
        }
        dropped
    }

    /// Checks that item groups and the membership index agree.
    pub fn membership_is_consistent(&self) -> bool {
        let indexed = self
            .membership
            .iter()
            .all(|(group, members)| {
                self.groups.contains_key(group)
                    && members
                        .iter()
                        .all(|fqi| self.items.get(fqi).is_some_and(|item| item.group() == group))
            });
        let covered = self.items.values().all(|item| {
            self.membership
                .iter()
                .filter(|(_, members)| members.contains(item.fqi()))
                .count()
                == 1
        });
        indexed && covered && self.groups.contains_key(COMMON_GROUP)
    }
}

#[cfg(test)]
mod tests {
    use super::Landscape;
    use crate::model::identity::FullyQualifiedIdentifier;
    use crate::model::item::{Item, Relation, RelationType};

    fn item(group: &str, identifier: &str) -> Item {
        Item::new(FullyQualifiedIdentifier::new("test", group, identifier))
    }

    #[test]
    fn new_landscape_has_common_group() {
        let landscape = Landscape::new("test");
        assert_eq!(landscape.group_count(), 1);
        assert!(landscape.group("Common").is_some());
        assert!(landscape.membership_is_consistent());
    }

    #[test]
    fn set_items_creates_groups_and_rebuilds_membership() {
        let mut landscape = Landscape::new("test");
        landscape.set_items(vec![item("a", "one"), item("b", "two")]);
        assert!(landscape.group("a").is_some());
        assert_eq!(landscape.group_items("a").len(), 1);

        landscape.set_items(vec![item("b", "two")]);
        assert!(landscape.group_items("a").is_empty());
        assert_eq!(landscape.item_count(), 1);
        assert!(landscape.membership_is_consistent());
    }

    #[test]
    fn pick_requires_unique_match() {
        let mut landscape = Landscape::new("test");
        landscape.set_items(vec![item("a", "web"), item("b", "web"), item("a", "db")]);
        assert!(landscape.pick("web", None).is_none());
        assert_eq!(landscape.pick("web", Some("b")).unwrap().group(), "b");
        assert!(landscape.pick("db", None).is_some());
    }

    #[test]
    fn remove_group_drops_members_but_keeps_common() {
        let mut landscape = Landscape::new("test");
        landscape.set_items(vec![item("a", "one"), item("Common", "two")]);

        assert_eq!(landscape.remove_group("a").len(), 1);
        assert!(landscape.group("a").is_none());
        assert_eq!(landscape.remove_group("Common").len(), 1);
        assert!(landscape.group("Common").is_some());
        assert_eq!(landscape.item_count(), 0);
        assert!(landscape.membership_is_consistent());
    }

    #[test]
    fn prune_drops_relations_to_missing_items() {
        let mut landscape = Landscape::new("test");
        let mut web = item("a", "web");
        let db = item("a", "db");
        let gone = FullyQualifiedIdentifier::new("test", "a", "gone");
        web.relations.push(Relation::new(web.fqi().clone(), db.fqi().clone(), RelationType::Provider));
        web.relations.push(Relation::new(web.fqi().clone(), gone, RelationType::Dataflow));
        let db_fqi = db.fqi().clone();
        landscape.set_items(vec![web, db]);

        let dropped = landscape.prune_dangling_relations();
        assert_eq!(dropped.len(), 1);
        assert_eq!(landscape.relations_to(&db_fqi).len(), 1);
        assert_eq!(landscape.provided_by(&db_fqi).len(), 1);
    }
}
