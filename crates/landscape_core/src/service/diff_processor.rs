//! Diff/reconciliation of a description against the landscape items.
//!
//! # Responsibility
//! - Partition items into added, kept (updated or unchanged) and removed.
//! - Apply present description fields onto kept items.
//! - Commit the new item set in one step.
//!
//! # Invariants
//! - Partial runs never remove items here; blacklisted groups are purged
//!   earlier by the group resolver.
//! - Full runs keep only described items; the rest are counted as removed.
//! - Absent description fields never overwrite existing values.
//! - Nothing is committed when the run fails.

use crate::input::description::{ItemDescription, LandscapeDescription};
use crate::input::process_log::ProcessLog;
use crate::model::identity::{FullyQualifiedIdentifier, ItemMatcher};
use crate::model::item::Item;
use crate::model::landscape::Landscape;
use crate::service::{ProcessingError, ProcessingResult};
use std::collections::BTreeMap;

/// Identifiers touched by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<FullyQualifiedIdentifier>,
    pub updated: Vec<FullyQualifiedIdentifier>,
    pub unchanged: Vec<FullyQualifiedIdentifier>,
    /// Items left out of a full run, plus items of newly blacklisted groups.
    pub removed: Vec<FullyQualifiedIdentifier>,
}

impl ReconcileReport {
    /// Number of items in the committed landscape.
    pub fn item_count(&self) -> usize {
        self.added.len() + self.updated.len() + self.unchanged.len()
    }
}

/// Reconciles the item descriptions of `input` into `landscape`.
///
/// # Errors
/// - Returns [`ProcessingError::OrphanedItem`] when a full run keeps an item
///   that no description matches. The landscape is left untouched.
pub fn reconcile(
    input: &LandscapeDescription,
    landscape: &mut Landscape,
    log: &mut ProcessLog,
) -> ProcessingResult<ReconcileReport> {
    let existing = landscape.items().cloned().collect::<Vec<_>>();
    let matchers = input
        .items
        .iter()
        .map(|item| input.item_matcher(item))
        .collect::<Vec<_>>();
    let mut report = ReconcileReport::default();
    let mut in_landscape = BTreeMap::<FullyQualifiedIdentifier, Item>::new();

    let added = added(&matchers, &existing);
    log.info(format!(
        "Adding {} items in landscape {}",
        added.len(),
        landscape.identifier()
    ));
    for index in added {
        let description = &input.items[index];
        let fqi = FullyQualifiedIdentifier::new(
            landscape.identifier(),
            description.effective_group(),
            description.identifier.trim(),
        );
        let known = in_landscape
            .keys()
            .find(|known| matchers[index].is_similar_to(known))
            .cloned();
        if let Some(item) = known.and_then(|known| in_landscape.get_mut(&known)) {
            log.warn(format!(
                "Item {} is described more than once, last description wins",
                item.fqi()
            ));
            apply_description(item, description);
            continue;
        }

        log.info(format!("Creating new item {fqi}"));
        let mut item = Item::new(fqi.clone());
        apply_description(&mut item, description);
        report.added.push(fqi.clone());
        in_landscape.insert(fqi, item);
    }

    let kept = if input.partial {
        existing.clone()
    } else {
        kept(&matchers, &existing)
    };
    log.info(format!(
        "Updating {} items in landscape {}",
        kept.len(),
        landscape.identifier()
    ));
    for item in kept {
        let matching = matching_descriptions(&matchers, item.fqi());
        if matching.is_empty() {
            if input.partial {
                report.unchanged.push(item.fqi().clone());
                in_landscape.insert(item.fqi().clone(), item);
                continue;
            }
            return Err(ProcessingError::OrphanedItem {
                landscape: landscape.identifier().to_string(),
                item: item.fqi().clone(),
            });
        }
        if matching.len() > 1 {
            log.warn(format!(
                "Item {} matches {} descriptions, applying in order, last wins",
                item.fqi(),
                matching.len()
            ));
        }

        let mut updated = item.clone();
        for index in matching {
            apply_description(&mut updated, &input.items[index]);
        }
        if updated == item {
            report.unchanged.push(item.fqi().clone());
        } else {
            log.info(format!("Updating item {}", item.fqi()));
            report.updated.push(item.fqi().clone());
        }
        in_landscape.insert(updated.fqi().clone(), updated);
    }

    if input.partial {
        log.info("Incremental change, will not remove any unreferenced items.");
    } else {
        report.removed = existing
            .iter()
            .map(Item::fqi)
            .filter(|fqi| !in_landscape.contains_key(*fqi))
            .cloned()
            .collect();
        for fqi in &report.removed {
            log.info(format!("Removing item {fqi} from landscape"));
        }
    }

    landscape.set_items(in_landscape.into_values());
    for relation in landscape.prune_dangling_relations() {
        log.warn(format!(
            "Dropping relation {} -> {}: endpoint no longer exists",
            relation.source, relation.target
        ));
    }

    Ok(report)
}

/// Indexes of descriptions with no similar existing item.
fn added(matchers: &[ItemMatcher], existing: &[Item]) -> Vec<usize> {
    matchers
        .iter()
        .enumerate()
        .filter(|(_, matcher)| !existing.iter().any(|item| matcher.is_similar_to(item.fqi())))
        .map(|(index, _)| index)
        .collect()
}

/// Existing items matched by at least one description.
fn kept(matchers: &[ItemMatcher], existing: &[Item]) -> Vec<Item> {
    existing
        .iter()
        .filter(|item| !matching_descriptions(matchers, item.fqi()).is_empty())
        .cloned()
        .collect()
}

fn matching_descriptions(matchers: &[ItemMatcher], fqi: &FullyQualifiedIdentifier) -> Vec<usize> {
    matchers
        .iter()
        .enumerate()
        .filter(|(_, matcher)| matcher.is_similar_to(fqi))
        .map(|(index, _)| index)
        .collect()
}

/// Copies every present field of `description` onto `item`.
///
/// Labels and links merge per key; interfaces are replaced when listed.
pub fn apply_description(item: &mut Item, description: &ItemDescription) {
    assign_present(&mut item.name, &description.name);
    assign_present(&mut item.description, &description.description);
    assign_present(&mut item.owner, &description.owner);
    assign_present(&mut item.contact, &description.contact);
    assign_present(&mut item.kind, &description.kind);

    for (key, value) in &description.labels {
        item.labels.insert(key.clone(), value.clone());
    }
    for (key, value) in &description.links {
        item.links.insert(key.clone(), value.clone());
    }
    for tag in &description.tags {
        item.set_tag(tag);
    }
    if !description.interfaces.is_empty() {
        item.interfaces = description.interfaces.clone();
    }
}

fn assign_present(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|value| !value.trim().is_empty()) {
        *target = Some(value.to_string());
    }
}
