use landscape_core::service::group_resolver::resolve_groups;
use landscape_core::{
    index_landscape, GroupDescription, ItemDescription, LandscapeDescription, ProcessLog,
    COMMON_GROUP,
};

fn description() -> LandscapeDescription {
    let mut input = LandscapeDescription::new("acme");
    input.items = vec![
        ItemDescription::new("web").in_group("frontend"),
        ItemDescription::new("api").in_group("backend"),
        ItemDescription::new("tool").in_group("infra-internal"),
        ItemDescription::new("lonely"),
    ];
    input
}

#[test]
fn blacklisted_groups_and_their_items_are_excluded() {
    let mut input = description();
    input.config.group_blacklist = vec![".*internal.*".to_string()];
    let mut log = ProcessLog::new("acme");

    let (snapshot, _) = index_landscape(input, None, &mut log).unwrap();
    let landscape = snapshot.landscape;

    assert!(landscape.group("infra-internal").is_none());
    assert!(landscape.pick("tool", None).is_none());
    assert_eq!(landscape.item_count(), 3);
    assert!(landscape.group("frontend").is_some());
    assert!(landscape.group(COMMON_GROUP).is_some());
}

#[test]
fn regex_blacklist_must_match_the_whole_group_name() {
    let mut input = description();
    input.config.group_blacklist = vec!["front".to_string()];
    let mut log = ProcessLog::new("acme");

    let (snapshot, _) = index_landscape(input, None, &mut log).unwrap();

    assert!(snapshot.landscape.group("frontend").is_some());
    assert_eq!(snapshot.landscape.item_count(), 4);
}

#[test]
fn invalid_pattern_falls_back_to_literal_and_warns() {
    let mut input = description();
    input.config.group_blacklist = vec!["infra-internal[".to_string()];
    input.items.push(ItemDescription::new("sidecar").in_group("infra-internal[x"));
    let mut log = ProcessLog::new("acme");

    let (snapshot, _) = index_landscape(input, None, &mut log).unwrap();

    assert!(snapshot.landscape.group("infra-internal[x").is_none());
    assert!(snapshot.landscape.group("infra-internal").is_some());
    assert!(log
        .warnings()
        .any(|entry| entry.message.contains("infra-internal[")));
}

#[test]
fn declared_groups_merge_with_existing_ones() {
    let mut first = description();
    first.groups.insert(
        "backend".to_string(),
        GroupDescription {
            owner: Some("team-a".to_string()),
            contact: Some("a@example.com".to_string()),
            ..GroupDescription::default()
        },
    );
    let mut log = ProcessLog::new("acme");
    let (snapshot, _) = index_landscape(first, None, &mut log).unwrap();

    let mut second = description();
    second.partial = true;
    second.groups.insert(
        "backend".to_string(),
        GroupDescription {
            owner: Some("team-b".to_string()),
            ..GroupDescription::default()
        },
    );
    let (snapshot, _) = index_landscape(second, Some(&snapshot.landscape), &mut log).unwrap();

    let backend = snapshot.landscape.group("backend").unwrap();
    assert_eq!(backend.owner.as_deref(), Some("team-b"));
    assert_eq!(backend.contact.as_deref(), Some("a@example.com"));
    assert!(backend.color.is_some());
}

#[test]
fn implicit_groups_are_created_and_blank_groups_fall_back_to_common() {
    let mut input = description();
    let mut log = ProcessLog::new("acme");
    let mut landscape = landscape_core::Landscape::new("acme");

    resolve_groups(&mut input, &mut landscape, &mut log);

    for group in ["frontend", "backend", "infra-internal", COMMON_GROUP] {
        assert!(landscape.group(group).is_some(), "missing group {group}");
    }
    assert_eq!(input.items[3].effective_group(), COMMON_GROUP);
}

#[test]
fn blacklisted_label_keys_are_stripped() {
    let mut input = description();
    input.config.label_blacklist = vec!["secret\\..*".to_string()];
    input.items[0]
        .labels
        .insert("secret.token".to_string(), "xyz".to_string());
    input.items[0]
        .labels
        .insert("team".to_string(), "web".to_string());
    let mut log = ProcessLog::new("acme");

    let (snapshot, _) = index_landscape(input, None, &mut log).unwrap();

    let web = snapshot.landscape.pick("web", Some("frontend")).unwrap();
    assert!(!web.labels.contains_key("secret.token"));
    assert_eq!(web.labels.get("team").map(String::as_str), Some("web"));
}

#[test]
fn relations_into_blacklisted_groups_are_dropped() {
    let mut input = description();
    input.config.group_blacklist = vec![".*internal.*".to_string()];
    input.items[0]
        .relations
        .push(landscape_core::RelationDescription::to("tool"));
    input.items[0]
        .relations
        .push(landscape_core::RelationDescription::to("api"));
    let mut log = ProcessLog::new("acme");

    let (snapshot, _) = index_landscape(input, None, &mut log).unwrap();

    let web = snapshot.landscape.pick("web", None).unwrap();
    assert_eq!(web.relations.len(), 1);
    assert_eq!(web.relations[0].target.item, "api");
    assert!(log.warnings().any(|entry| entry.message.contains("tool")));
}

#[test]
fn blacklisting_an_existing_group_counts_its_items_as_removed() {
    let mut log = ProcessLog::new("acme");
    let (first, _) = index_landscape(description(), None, &mut log).unwrap();
    let before = first.landscape.item_count();

    let mut rerun = description();
    rerun.config.group_blacklist = vec!["infra-internal".to_string()];
    let (second, report) = index_landscape(rerun, Some(&first.landscape), &mut log).unwrap();

    assert_eq!(second.landscape.item_count(), before - 1);
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].item, "tool");
    assert_eq!(report.item_count() + report.removed.len(), before);
    assert!(second.landscape.group("infra-internal").is_none());
}

#[test]
fn blacklisting_an_existing_group_in_a_partial_run_counts_its_items_as_removed() {
    let mut log = ProcessLog::new("acme");
    let (first, _) = index_landscape(description(), None, &mut log).unwrap();
    let before = first.landscape.item_count();

    let mut rerun = LandscapeDescription::new("acme");
    rerun.partial = true;
    rerun.config.group_blacklist = vec!["infra-.*".to_string()];
    let (second, report) = index_landscape(rerun, Some(&first.landscape), &mut log).unwrap();

    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.item_count() + report.removed.len(), before);
    assert_eq!(second.landscape.item_count(), before - 1);
}
