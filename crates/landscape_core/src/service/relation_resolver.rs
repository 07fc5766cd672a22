//! Relation resolution against the reconciled item set.

use crate::input::description::LandscapeDescription;
use crate::input::process_log::ProcessLog;
use crate::model::identity::{FullyQualifiedIdentifier, ItemMatcher};
use crate::model::item::{Item, Relation, RelationType};
use crate::model::landscape::Landscape;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a relation reference could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    Malformed(String),
    NotFound(String),
    Ambiguous { reference: String, candidates: usize },
}

impl Display for ReferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(reference) => write!(f, "malformed item reference `{reference}`"),
            Self::NotFound(reference) => write!(f, "no item matches `{reference}`"),
            Self::Ambiguous {
                reference,
                candidates,
            } => write!(f, "`{reference}` is ambiguous, {candidates} items match"),
        }
    }
}

impl Error for ReferenceError {}

/// Resolves a reference (`item`, `group/item`, `landscape/group/item`) to one item.
pub fn resolve_reference(
    landscape: &Landscape,
    reference: &str,
) -> Result<FullyQualifiedIdentifier, ReferenceError> {
    let matcher = ItemMatcher::parse(reference)
        .ok_or_else(|| ReferenceError::Malformed(reference.to_string()))?;
    let candidates = landscape.find_items(&matcher);
    match candidates.as_slice() {
        [] => Err(ReferenceError::NotFound(reference.to_string())),
        [item] => Ok(item.fqi().clone()),
        many => Err(ReferenceError::Ambiguous {
            reference: reference.to_string(),
            candidates: many.len(),
        }),
    }
}

/// Materializes relation and provider declarations of `input`.
///
/// Unresolvable references are dropped with a warning. Returns the number of
/// relations written.
pub fn resolve_relations(
    input: &LandscapeDescription,
    landscape: &mut Landscape,
    log: &mut ProcessLog,
) -> usize {
    let mut resolved = Vec::new();

    for description in &input.items {
        let sources = landscape
            .find_items(&input.item_matcher(description))
            .into_iter()
            .map(Item::fqi)
            .cloned()
            .collect::<Vec<_>>();

        for relation in &description.relations {
            let target = match resolve_reference(landscape, &relation.target) {
                Ok(target) => target,
                Err(err) => {
                    log.warn(format!(
                        "Dropping relation of item {}: {err}",
                        description.identifier
                    ));
                    continue;
                }
            };
            for source in &sources {
                let mut resolved_relation = Relation::new(
                    source.clone(),
                    target.clone(),
                    relation.kind.unwrap_or_default(),
                );
                resolved_relation.format = relation.format.clone();
                resolved_relation.description = relation.description.clone();
                resolved.push(resolved_relation);
            }
        }

        for provider in &description.provided_by {
            let provider = match resolve_reference(landscape, provider) {
                Ok(provider) => provider,
                Err(err) => {
                    log.warn(format!(
                        "Dropping provider of item {}: {err}",
                        description.identifier
                    ));
                    continue;
                }
            };
            for source in &sources {
                resolved.push(Relation::new(
                    provider.clone(),
                    source.clone(),
                    RelationType::Provider,
                ));
            }
        }
    }

    let count = resolved.len();
    for relation in resolved {
        let source = relation.source.clone();
        match landscape.item_mut(&source) {
            Some(item) => {
                item.upsert_relation(relation);
            }
            None => log.warn(format!("Dropping relation from unknown item {source}")),
        }
    }
    log.info(format!("Resolved {count} relations"));
    count
}
