//! Rectangles and layout-time component wrappers.

use crate::model::identity::FullyQualifiedIdentifier;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `(cx, cy)`.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict overlap; rectangles sharing only an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Smallest rectangle covering all `rects`, or `None` when empty.
    pub fn enclosing<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().copied().reduce(|acc, rect| acc.union(&rect))
    }
}

/// Component addressed by the layout.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentId {
    Group(String),
    Item(FullyQualifiedIdentifier),
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group(identifier) => write!(f, "group:{identifier}"),
            Self::Item(fqi) => write!(f, "item:{fqi}"),
        }
    }
}

/// A component with its rectangle and the components it is pulled towards.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentBounds {
    component: ComponentId,
    pub rect: Rect,
    opposites: Vec<ComponentId>,
}

impl ComponentBounds {
    pub fn new(component: ComponentId, width: f64, height: f64) -> Self {
        Self {
            component,
            rect: Rect::new(0.0, 0.0, width, height),
            opposites: Vec::new(),
        }
    }

    pub fn component(&self) -> &ComponentId {
        &self.component
    }

    pub fn opposites(&self) -> &[ComponentId] {
        &self.opposites
    }

    /// Adds a force connection; duplicates and self-connections are ignored.
    pub fn connect(&mut self, other: ComponentId) {
        if other != self.component && !self.opposites.contains(&other) {
            self.opposites.push(other);
        }
    }
}
