use landscape_core::{
    index_landscape, ItemDescription, Landscape, LandscapeDescription, ProcessLog,
    RelationDescription,
};

fn item(identifier: &str, group: &str, name: &str) -> ItemDescription {
    let mut item = ItemDescription::new(identifier).in_group(group);
    item.name = Some(name.to_string());
    item
}

fn wordpress() -> LandscapeDescription {
    let mut input = LandscapeDescription::new("wordpress");
    input.items = vec![
        item("wordpress-web", "content", "Wordpress Web"),
        item("wordpress-db", "content", "Wordpress Database"),
        item("redis", "infrastructure", "Redis Cache"),
    ];
    input.items[0]
        .relations
        .push(RelationDescription::to("wordpress-db"));
    input
}

fn process(input: LandscapeDescription, existing: Option<&Landscape>) -> Landscape {
    let mut log = ProcessLog::new(input.identifier.clone());
    let (snapshot, _) = index_landscape(input, existing, &mut log).unwrap();
    snapshot.landscape
}

#[test]
fn reconciling_an_unchanged_description_is_idempotent() {
    let first = process(wordpress(), None);
    let mut log = ProcessLog::new("wordpress");
    let (snapshot, report) = index_landscape(wordpress(), Some(&first), &mut log).unwrap();

    assert_eq!(snapshot.landscape, first);
    assert!(report.added.is_empty());
    assert!(report.updated.is_empty());
    assert!(report.removed.is_empty());
    assert_eq!(report.unchanged.len(), 3);
}

#[test]
fn partial_update_adds_one_item_and_renames_one() {
    let existing = process(wordpress(), None);
    let before = existing.item_count();

    let mut update = LandscapeDescription::new("wordpress");
    update.partial = true;
    update.items.push(item("blog-server", "blog", "Blog Server"));
    let mut rename = ItemDescription::new("wordpress-web");
    rename.name = Some("Wordpress Frontend".to_string());
    update.items.push(rename);

    let updated = process(update, Some(&existing));

    assert_eq!(updated.item_count(), before + 1);
    let web = updated.pick("wordpress-web", None).unwrap();
    assert_eq!(web.name.as_deref(), Some("Wordpress Frontend"));
    assert_eq!(web.group(), "content");
    assert_eq!(web.relations.len(), 1);
    for other in existing.items() {
        if other.identifier() == "wordpress-web" {
            continue;
        }
        assert_eq!(updated.item(other.fqi()), Some(other));
    }
    assert!(updated.group("blog").is_some());
}

#[test]
fn partial_update_never_shrinks_the_landscape() {
    let existing = process(wordpress(), None);
    let mut update = LandscapeDescription::new("wordpress");
    update.partial = true;

    let updated = process(update, Some(&existing));

    assert_eq!(updated.item_count(), existing.item_count());
}

#[test]
fn full_update_removes_undescribed_items_and_their_relations() {
    let existing = process(wordpress(), None);
    let mut update = wordpress();
    update.items.retain(|item| item.identifier != "wordpress-db");
    update.items[0].relations.clear();
    let mut log = ProcessLog::new("wordpress");

    let (snapshot, report) = index_landscape(update, Some(&existing), &mut log).unwrap();

    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].item, "wordpress-db");
    assert_eq!(
        report.item_count() + report.removed.len(),
        existing.item_count()
    );
    let web = snapshot.landscape.pick("wordpress-web", None).unwrap();
    assert!(web.relations.is_empty());
    assert!(log
        .warnings()
        .any(|entry| entry.message.contains("wordpress-db")));
}

#[test]
fn item_groups_agree_with_membership() {
    let mut input = wordpress();
    input.items.push(ItemDescription::new("orphan"));
    let landscape = process(input, None);

    assert!(landscape.membership_is_consistent());
    for item in landscape.items() {
        assert!(landscape
            .group_items(item.group())
            .iter()
            .any(|member| member.fqi() == item.fqi()));
    }
    assert_eq!(landscape.pick("orphan", None).unwrap().group(), "Common");
}

#[test]
fn unresolvable_relation_is_dropped_with_warning() {
    let mut input = wordpress();
    input.items[2]
        .relations
        .push(RelationDescription::to("does-not-exist"));
    let mut log = ProcessLog::new("wordpress");

    let (snapshot, _) = index_landscape(input, None, &mut log).unwrap();

    let redis = snapshot.landscape.pick("redis", None).unwrap();
    assert!(redis.relations.is_empty());
    assert!(log
        .warnings()
        .any(|entry| entry.message.contains("does-not-exist")));
}

#[test]
fn provided_by_creates_provider_relations() {
    let mut input = wordpress();
    input.items[0].provided_by.push("redis".to_string());

    let landscape = process(input, None);

    let web = landscape.pick("wordpress-web", None).unwrap();
    let providers = landscape.provided_by(web.fqi());
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].identifier(), "redis");
}

#[test]
fn matching_is_case_insensitive() {
    let existing = process(wordpress(), None);
    let mut update = LandscapeDescription::new("wordpress");
    update.partial = true;
    let mut shout = ItemDescription::new("REDIS");
    shout.owner = Some("ops".to_string());
    update.items.push(shout);

    let updated = process(update, Some(&existing));

    assert_eq!(updated.item_count(), existing.item_count());
    assert_eq!(
        updated.pick("redis", None).unwrap().owner.as_deref(),
        Some("ops")
    );
}

#[test]
fn tags_are_stored_as_prefixed_labels() {
    let mut input = wordpress();
    input.items[0].tags = vec!["cms".to_string()];

    let landscape = process(input, None);

    let web = landscape.pick("wordpress-web", None).unwrap();
    assert_eq!(web.tags().collect::<Vec<_>>(), vec!["cms"]);
    assert_eq!(web.labels.get("tag.cms").map(String::as_str), Some("cms"));
}

#[test]
fn moving_an_item_to_a_new_group_in_a_partial_run_creates_a_new_item() {
    let mut input = wordpress();
    input.items.push(item("blog-server", "content", "Blog Server"));
    let existing = process(input, None);
    let old_blog = existing.pick("blog-server", Some("content")).unwrap().clone();

    let mut update = LandscapeDescription::new("wordpress");
    update.partial = true;
    update
        .items
        .push(item("blog-server", "completelyNewGroup", "Blog Server Moved"));
    let updated = process(update, Some(&existing));

    assert_eq!(updated.item_count(), existing.item_count() + 1);
    assert_eq!(updated.item(old_blog.fqi()), Some(&old_blog));
    let moved = updated
        .pick("blog-server", Some("completelyNewGroup"))
        .unwrap();
    assert_eq!(moved.name.as_deref(), Some("Blog Server Moved"));
    assert!(updated.group("completelyNewGroup").is_some());
}
