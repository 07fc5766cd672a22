//! Pipeline orchestration and per-landscape snapshot registry.
//!
//! # Responsibility
//! - Run group resolution, reconciliation, relation resolution, layout and
//!   indexing for one description.
//! - Serialize runs per landscape identifier and publish committed snapshots.
//!
//! # Invariants
//! - A run mutates a private copy; the committed snapshot is replaced only on
//!   success.
//! - Runs for different landscape identifiers never wait on each other beyond
//!   the slot lookup.

use crate::input::description::{DescriptionError, LandscapeDescription};
use crate::input::process_log::ProcessLog;
use crate::layout::{layout_landscape, LandscapeLayout};
use crate::model::identity::FullyQualifiedIdentifier;
use crate::model::landscape::Landscape;
use crate::search::SearchIndex;
use crate::service::diff_processor::{reconcile, ReconcileReport};
use crate::service::group_resolver::resolve_groups;
use crate::service::relation_resolver::resolve_relations;
use crate::service::{ProcessingError, ProcessingResult};
use log::{error, info};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Committed, read-only result of one successful run.
#[derive(Debug, Clone)]
pub struct LandscapeSnapshot {
    pub landscape: Landscape,
    pub layout: LandscapeLayout,
    pub search_index: SearchIndex,
}

/// Result handed back to the caller of a successful run.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub snapshot: Arc<LandscapeSnapshot>,
    pub report: ReconcileReport,
    pub log: ProcessLog,
}

/// Runs the full pipeline for `input` on top of `existing`.
///
/// `existing` is never modified; the returned snapshot holds the new state.
///
/// # Errors
/// - [`ProcessingError::InvalidDescription`] when `input` fails validation.
/// - [`ProcessingError::OrphanedItem`] from full reconciliation.
/// - [`ProcessingError::Layout`] when the layout cannot be computed.
pub fn index_landscape(
    mut input: LandscapeDescription,
    existing: Option<&Landscape>,
    log: &mut ProcessLog,
) -> ProcessingResult<(LandscapeSnapshot, ReconcileReport)> {
    input
        .validate()
        .map_err(|source| ProcessingError::InvalidDescription {
            landscape: input.identifier.clone(),
            source,
        })?;

    let mut landscape = match existing {
        Some(existing) => existing.clone(),
        None => {
            log.info(format!("Creating new landscape {}", input.identifier));
            Landscape::new(input.identifier.trim())
        }
    };
    adopt_metadata(&input, &mut landscape);

    let blacklisted = resolve_groups(&mut input, &mut landscape, log);
    let mut report = reconcile(&input, &mut landscape, log)?;
    report.removed.extend(blacklisted);
    resolve_relations(&input, &mut landscape, log);

    let layout = layout_landscape(&landscape).map_err(|source| ProcessingError::Layout {
        landscape: landscape.identifier().to_string(),
        source,
    })?;
    let search_index = SearchIndex::build(&landscape);

    log.info(format!(
        "Processed landscape {}: {} added, {} updated, {} removed",
        landscape.identifier(),
        report.added.len(),
        report.updated.len(),
        report.removed.len()
    ));
    Ok((
        LandscapeSnapshot {
            landscape,
            layout,
            search_index,
        },
        report,
    ))
}

/// Landscape metadata and config always follow the latest description.
fn adopt_metadata(input: &LandscapeDescription, landscape: &mut Landscape) {
    fn present(value: &Option<String>) -> Option<String> {
        value.clone().filter(|value| !value.trim().is_empty())
    }

    if let Some(name) = present(&input.name) {
        landscape.name = Some(name);
    }
    if let Some(contact) = present(&input.contact) {
        landscape.contact = Some(contact);
    }
    if let Some(owner) = present(&input.owner) {
        landscape.owner = Some(owner);
    }
    if let Some(description) = present(&input.description) {
        landscape.description = Some(description);
    }
    landscape.labels.extend(input.labels.clone());
    landscape.links.extend(input.links.clone());
    landscape.config = input.config.clone();
}

type Slot = Arc<Mutex<Option<Arc<LandscapeSnapshot>>>>;

/// Per-landscape serialized entry point holding the committed snapshots.
#[derive(Debug, Default)]
pub struct LandscapeRegistry {
    slots: Mutex<BTreeMap<String, Slot>>,
}

impl LandscapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles `input` into its landscape and publishes the new snapshot.
    ///
    /// Blocks while another run for the same landscape is in flight.
    ///
    /// # Errors
    /// - Any [`ProcessingError`] of the run; the previous snapshot stays
    ///   published.
    pub fn reconcile(&self, input: LandscapeDescription) -> ProcessingResult<ProcessOutcome> {
        let identifier = input.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(ProcessingError::InvalidDescription {
                landscape: identifier,
                source: DescriptionError::BlankIdentifier,
            });
        }

        let slot = self.slot(&identifier);
        let mut committed = lock(&slot);
        let mut log = ProcessLog::new(identifier.as_str());
        info!(
            "event=reconcile_start module=service status=ok landscape={} run_id={} partial={} items={}",
            identifier,
            log.run_id(),
            input.partial,
            input.items.len()
        );

        let existing = committed.as_ref().map(|snapshot| &snapshot.landscape);
        match index_landscape(input, existing, &mut log) {
            Ok((snapshot, report)) => {
                let snapshot = Arc::new(snapshot);
                *committed = Some(Arc::clone(&snapshot));
                info!(
                    "event=reconcile_commit module=service status=ok landscape={} run_id={} items={} groups={}",
                    identifier,
                    log.run_id(),
                    snapshot.landscape.item_count(),
                    snapshot.landscape.group_count()
                );
                Ok(ProcessOutcome {
                    snapshot,
                    report,
                    log,
                })
            }
            Err(err) => {
                error!(
                    "event=reconcile_failed module=service status=error landscape={} run_id={} error={}",
                    identifier,
                    log.run_id(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Latest committed snapshot of `identifier`.
    pub fn snapshot(&self, identifier: &str) -> Option<Arc<LandscapeSnapshot>> {
        let slot = lock(&self.slots).get(identifier.trim()).cloned()?;
        // Bound first so the guard drops before `slot`.
        let snapshot = lock(&slot).clone();
        snapshot
    }

    /// Identifiers with a committed snapshot.
    pub fn identifiers(&self) -> Vec<String> {
        let slots = lock(&self.slots)
            .iter()
            .map(|(identifier, slot)| (identifier.clone(), Arc::clone(slot)))
            .collect::<Vec<_>>();
        slots
            .into_iter()
            .filter(|(_, slot)| lock(slot).is_some())
            .map(|(identifier, _)| identifier)
            .collect()
    }

    /// Searches the committed snapshot of `identifier`.
    ///
    /// Unknown landscapes yield an empty set.
    pub fn search(&self, identifier: &str, query: &str) -> BTreeSet<FullyQualifiedIdentifier> {
        self.snapshot(identifier)
            .map(|snapshot| snapshot.search_index.search(query))
            .unwrap_or_default()
    }

    fn slot(&self, identifier: &str) -> Slot {
        Arc::clone(lock(&self.slots).entry(identifier.to_string()).or_default())
    }
}

/// Committed state is only replaced wholesale, so a poisoned lock still
/// guards a consistent value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
