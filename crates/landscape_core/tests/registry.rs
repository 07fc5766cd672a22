use landscape_core::{
    ItemDescription, LandscapeDescription, LandscapeRegistry, ProcessingError,
};
use std::sync::Arc;
use std::thread;

fn description(identifier: &str, items: &[&str]) -> LandscapeDescription {
    let mut input = LandscapeDescription::new(identifier);
    input.items = items
        .iter()
        .map(|item| ItemDescription::new(*item).in_group("services"))
        .collect();
    input
}

#[test]
fn different_landscapes_reconcile_concurrently() {
    let registry = Arc::new(LandscapeRegistry::new());
    let handles = (0..4)
        .map(|index| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let identifier = format!("landscape-{index}");
                registry
                    .reconcile(description(&identifier, &["web", "db"]))
                    .map(|outcome| outcome.snapshot.landscape.item_count())
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 2);
    }
    assert_eq!(registry.identifiers().len(), 4);
}

#[test]
fn runs_for_the_same_landscape_are_serialized() {
    let registry = Arc::new(LandscapeRegistry::new());
    let handles = ["a", "b", "c", "d", "e"]
        .into_iter()
        .map(|item| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut input = description("shared", &[item]);
                input.partial = true;
                registry.reconcile(input).map(|_| ())
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    let snapshot = registry.snapshot("shared").unwrap();
    assert_eq!(snapshot.landscape.item_count(), 5);
    assert!(snapshot.landscape.membership_is_consistent());
}

#[test]
fn failed_run_keeps_previous_snapshot() {
    let registry = LandscapeRegistry::new();
    registry
        .reconcile(description("acme", &["web", "db"]))
        .unwrap();
    let before = registry.snapshot("acme").unwrap();

    let broken = description("acme", &["cache", "  "]);
    let err = registry.reconcile(broken).unwrap_err();

    assert!(matches!(err, ProcessingError::InvalidDescription { .. }));
    assert_eq!(err.landscape(), "acme");
    let after = registry.snapshot("acme").unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.landscape.item_count(), 2);
}

#[test]
fn search_uses_the_committed_snapshot() {
    let registry = LandscapeRegistry::new();
    assert!(registry.search("acme", "web").is_empty());

    registry
        .reconcile(description("acme", &["web", "db"]))
        .unwrap();

    assert_eq!(registry.search("acme", "web").len(), 1);
    assert!(registry.snapshot("unknown").is_none());
}

#[test]
fn outcome_carries_the_process_log() {
    let registry = LandscapeRegistry::new();
    let outcome = registry
        .reconcile(description("acme", &["web"]))
        .unwrap();

    assert_eq!(outcome.log.landscape(), "acme");
    assert!(!outcome.log.is_empty());
    assert_eq!(outcome.report.added.len(), 1);
}
