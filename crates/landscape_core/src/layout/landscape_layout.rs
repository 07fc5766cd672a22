//! Two-level layout: items inside groups, then groups inside the landscape.

use crate::layout::bounds::{ComponentBounds, ComponentId, Rect};
use crate::layout::organic::{LayoutStats, OrganicLayout, OrganicParams};
use crate::layout::{LayoutError, LayoutResult};
use crate::model::identity::FullyQualifiedIdentifier;
use crate::model::landscape::Landscape;
use log::{debug, warn};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

pub const ITEM_SIZE: f64 = 50.0;
pub const GROUP_PADDING: f64 = 20.0;
const ITEM_FORCE_CONSTANT: f64 = 50.0;
const ITEM_MAX_DISTANCE: f64 = 300.0;
const ITEM_SPACING: f64 = 10.0;
const GROUP_FORCE_CONSTANT: f64 = 250.0;
const GROUP_MAX_DISTANCE: f64 = 1000.0;
const GROUP_SPACING: f64 = 40.0;

/// Absolute rectangles of every group and item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LandscapeLayout {
    #[serde(serialize_with = "serialize_components")]
    components: BTreeMap<ComponentId, Rect>,
    bounds: Rect,
}

impl LandscapeLayout {
    pub fn group(&self, identifier: &str) -> Option<&Rect> {
        self.components
            .get(&ComponentId::Group(identifier.to_string()))
    }

    pub fn item(&self, fqi: &FullyQualifiedIdentifier) -> Option<&Rect> {
        self.components.get(&ComponentId::Item(fqi.clone()))
    }

    /// Box enclosing every laid out group.
    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, &Rect)> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Map keys are written as `group:<id>` / `item:<fqi>` strings.
fn serialize_components<S: Serializer>(
    components: &BTreeMap<ComponentId, Rect>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        components
            .iter()
            .map(|(component, rect)| (component.to_string(), rect)),
    )
}

/// Unordered pairs of groups connected by at least one cross-group relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupConnections {
    pairs: BTreeSet<(String, String)>,
}

impl GroupConnections {
    /// Collects group pairs from every relation whose endpoints exist.
    pub fn from_landscape(landscape: &Landscape) -> Self {
        let mut connections = Self::default();
        for item in landscape.items() {
            for relation in &item.relations {
                let Some(target) = landscape.item(&relation.target) else {
                    warn!(
                        "event=layout_edge module=layout status=skip reason=missing_target source={} target={}",
                        relation.source, relation.target
                    );
                    continue;
                };
                connections.connect(item.group(), target.group());
            }
        }
        connections
    }

    /// Records a virtual edge; same-group pairs are ignored.
    pub fn connect(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        self.pairs.insert(ordered_pair(a, b))
    }

    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        self.pairs.contains(&ordered_pair(a, b))
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(left, right)| (left.as_str(), right.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn ordered_pair(a: &str, b: &str) -> (String, String) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Lays out every group's items, then the groups themselves.
///
/// # Errors
/// - Returns [`LayoutError::MissingGroupGeometry`] when a connected group has
///   no computed geometry.
pub fn layout_landscape(landscape: &Landscape) -> LayoutResult<LandscapeLayout> {
    let config = &landscape.config.layout;
    let item_layout = OrganicLayout::new(OrganicParams::from_config(
        config,
        ITEM_FORCE_CONSTANT,
        ITEM_MAX_DISTANCE,
        ITEM_SPACING,
    ));

    let mut group_contents = BTreeMap::<String, Vec<ComponentBounds>>::new();
    let mut group_nodes = Vec::new();
    for group in landscape.groups() {
        let identifier = group.identifier().to_string();
        let mut items = item_bounds(landscape, &identifier);
        let stats = item_layout.execute(&mut items);
        log_stats("items", &identifier, &stats);

        let (width, height) = match Rect::enclosing(items.iter().map(|item| &item.rect)) {
            Some(inner) => (
                inner.width + 2.0 * GROUP_PADDING,
                inner.height + 2.0 * GROUP_PADDING,
            ),
            None => (ITEM_SIZE + 2.0 * GROUP_PADDING, ITEM_SIZE + 2.0 * GROUP_PADDING),
        };
        group_nodes.push(ComponentBounds::new(
            ComponentId::Group(identifier.clone()),
            width,
            height,
        ));
        group_contents.insert(identifier, items);
    }

    let connections = GroupConnections::from_landscape(landscape);
    for (a, b) in connections.pairs() {
        let index_of = |identifier: &str| {
            group_nodes.iter().position(|node| {
                matches!(node.component(), ComponentId::Group(group) if group == identifier)
            })
        };
        let (Some(ia), Some(ib)) = (index_of(a), index_of(b)) else {
            let missing = if index_of(a).is_none() { a } else { b };
            return Err(LayoutError::MissingGroupGeometry {
                group: missing.to_string(),
            });
        };
        group_nodes[ia].connect(ComponentId::Group(b.to_string()));
        group_nodes[ib].connect(ComponentId::Group(a.to_string()));
    }

    let group_layout = OrganicLayout::new(OrganicParams::from_config(
        config,
        GROUP_FORCE_CONSTANT,
        GROUP_MAX_DISTANCE,
        GROUP_SPACING,
    ));
    let stats = group_layout.execute(&mut group_nodes);
    log_stats("groups", landscape.identifier(), &stats);

    let mut layout = LandscapeLayout {
        bounds: Rect::enclosing(group_nodes.iter().map(|node| &node.rect)).unwrap_or_default(),
        ..LandscapeLayout::default()
    };
    for group in group_nodes {
        let ComponentId::Group(identifier) = group.component() else {
            continue;
        };
        let origin = group.rect;
        for item in group_contents.remove(identifier).unwrap_or_default() {
            let rect = item
                .rect
                .translated(origin.x + GROUP_PADDING, origin.y + GROUP_PADDING);
            layout.components.insert(item.component().clone(), rect);
        }
        layout.components.insert(group.component().clone(), origin);
    }
    Ok(layout)
}

/// Item nodes of one group, connected along intra-group relations.
fn item_bounds(landscape: &Landscape, group: &str) -> Vec<ComponentBounds> {
    landscape
        .group_items(group)
        .into_iter()
        .map(|item| {
            let mut bounds =
                ComponentBounds::new(ComponentId::Item(item.fqi().clone()), ITEM_SIZE, ITEM_SIZE);
            for relation in &item.relations {
                let other = if &relation.source == item.fqi() {
                    &relation.target
                } else {
                    &relation.source
                };
                if other.group == group && landscape.item(other).is_some() {
                    bounds.connect(ComponentId::Item(other.clone()));
                }
            }
            bounds
        })
        .collect()
}

fn log_stats(scope: &str, identifier: &str, stats: &LayoutStats) {
    debug!(
        "event=layout module=layout status=ok scope={} id={} iterations={} converged={} displacement={:.3}",
        scope, identifier, stats.iterations, stats.converged, stats.displacement
    );
}

#[cfg(test)]
mod tests {
    use super::{layout_landscape, GroupConnections};
    use crate::model::landscape::Landscape;

    #[test]
    fn group_connections_are_unordered_and_skip_self_pairs() {
        let mut connections = GroupConnections::default();
        assert!(connections.connect("b", "a"));
        assert!(!connections.connect("a", "b"));
        assert!(!connections.connect("a", "a"));
        assert!(connections.is_connected("a", "b"));
        assert_eq!(connections.len(), 1);
    }

    #[test]
    fn is_connected_ignores_argument_order() {
        let mut connections = GroupConnections::default();
        connections.connect("data", "api");
        assert!(connections.is_connected("data", "api"));
        assert!(connections.is_connected("api", "data"));
        assert!(!connections.is_connected("api", "web"));
    }

    #[test]
    fn layout_serializes_to_json_with_component_keys() {
        let layout = layout_landscape(&Landscape::new("acme")).unwrap();

        let json = serde_json::to_value(&layout).unwrap();

        let common = &json["components"]["group:Common"];
        assert_eq!(common["x"], 0.0);
        assert!(common["width"].as_f64().unwrap() > 0.0);
        assert!(json["bounds"]["height"].as_f64().unwrap() > 0.0);
    }
}
