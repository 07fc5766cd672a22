//! Organic (force-directed) placement of components.
//!
//! # Responsibility
//! - Place a set of component bounds so connected components end up close
//!   and unconnected ones spread out.
//!
//! # Invariants
//! - Same input and same seed produce the same rectangles.
//! - Output rectangles are finite and pairwise non-overlapping.
//! - The top-left corner of the enclosing box is `(0, 0)`.

use crate::layout::bounds::{ComponentBounds, ComponentId, Rect};
use crate::model::landscape::LayoutConfig;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_SEED: u64 = 0x6c61_6e64_7363_6170;
const DEFAULT_MAX_ITERATIONS: u32 = 200;
const DEFAULT_INITIAL_TEMP: f64 = 200.0;
const DEFAULT_TRIES_PER_CELL: u32 = 8;
const DEFAULT_MIN_DISTANCE_LIMIT: f64 = 2.0;
const CONVERGENCE_PER_NODE: f64 = 0.5;
const CENTERING_RATE: f64 = 0.01;
const OVERLAP_PASSES: usize = 100;

/// Resolved simulation parameters for one scale (items or groups).
#[derive(Debug, Clone, PartialEq)]
pub struct OrganicParams {
    pub force_constant: f64,
    pub min_distance_limit: f64,
    /// Edges longer than this exert no attraction.
    pub max_distance_limit: f64,
    /// Minimum gap between two rectangles after overlap removal.
    pub spacing: f64,
    pub initial_temp: f64,
    pub max_iterations: u32,
    pub edge_length_cost_factor: f64,
    pub node_distribution_cost_factor: f64,
    pub border_line_cost_factor: f64,
    pub tries_per_cell: u32,
    /// Per-node displacement below which the simulation stops.
    pub convergence_threshold: f64,
    pub seed: u64,
}

impl OrganicParams {
    /// Applies `config` on top of the scale defaults.
    ///
    /// Non-finite or non-positive values fall back to defaults.
    pub fn from_config(
        config: &LayoutConfig,
        force_constant: f64,
        max_distance_limit: f64,
        spacing: f64,
    ) -> Self {
        let force_factor = positive_or(config.force_constant_factor, 1.0);
        let min_distance_factor = positive_or(config.min_distance_limit_factor, 1.0);

        Self {
            force_constant: force_constant * force_factor,
            min_distance_limit: DEFAULT_MIN_DISTANCE_LIMIT * min_distance_factor,
            max_distance_limit,
            spacing,
            initial_temp: positive_or(config.initial_temp, DEFAULT_INITIAL_TEMP),
            max_iterations: config
                .max_iterations
                .filter(|iterations| *iterations > 0)
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
            edge_length_cost_factor: positive_or(config.edge_length_cost_factor, 1.0),
            node_distribution_cost_factor: positive_or(config.node_distribution_cost_factor, 1.0),
            border_line_cost_factor: non_negative_or(config.border_line_cost_factor, 1.0),
            tries_per_cell: config
                .tries_per_cell
                .filter(|tries| *tries > 0)
                .unwrap_or(DEFAULT_TRIES_PER_CELL),
            convergence_threshold: CONVERGENCE_PER_NODE,
            seed: config.seed.unwrap_or(DEFAULT_SEED),
        }
    }
}

/// Outcome of one simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutStats {
    pub iterations: u32,
    pub converged: bool,
    /// Total displacement of the last iteration.
    pub displacement: f64,
}

/// Fruchterman-Reingold style simulation with seeded initial placement.
#[derive(Debug, Clone)]
pub struct OrganicLayout {
    params: OrganicParams,
}

impl OrganicLayout {
    pub fn new(params: OrganicParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &OrganicParams {
        &self.params
    }

    /// Moves every node's rectangle; sizes are left untouched.
    pub fn execute(&self, nodes: &mut [ComponentBounds]) -> LayoutStats {
        let count = nodes.len();
        let mut stats = LayoutStats {
            iterations: 0,
            converged: true,
            displacement: 0.0,
        };
        if count == 0 {
            return stats;
        }

        let edges = edge_indexes(nodes);
        let radii = nodes
            .iter()
            .map(|node| node.rect.width.hypot(node.rect.height) / 2.0)
            .collect::<Vec<_>>();
        let mut positions = self.initial_positions(nodes);

        if count > 1 {
            stats = self.simulate(&mut positions, &radii, &edges);
        }

        for (node, (x, y)) in nodes.iter_mut().zip(&positions) {
            node.rect = Rect::centered(*x, *y, node.rect.width, node.rect.height);
        }
        remove_overlaps(nodes, self.params.spacing);
        normalize_origin(nodes);

        debug!(
            "event=organic_layout module=layout status=ok nodes={} edges={} iterations={} converged={}",
            count,
            edges.len(),
            stats.iterations,
            stats.converged
        );
        stats
    }

    fn simulate(
        &self,
        positions: &mut [(f64, f64)],
        radii: &[f64],
        edges: &[(usize, usize)],
    ) -> LayoutStats {
        let params = &self.params;
        let count = positions.len();
        let k = params.force_constant;
        let threshold = params.convergence_threshold * count as f64;
        let mut temperature = params.initial_temp;
        let mut stats = LayoutStats {
            iterations: 0,
            converged: false,
            displacement: 0.0,
        };

        for iteration in 0..params.max_iterations {
            let mut displacement = vec![(0.0_f64, 0.0_f64); count];

            for i in 0..count {
                for j in (i + 1)..count {
                    let (ux, uy, length) = direction(positions[i], positions[j], i, j);
                    let distance = (length - radii[i] - radii[j]).max(params.min_distance_limit);
                    let force = params.node_distribution_cost_factor * k * k / distance;
                    displacement[i].0 += ux * force;
                    displacement[i].1 += uy * force;
                    displacement[j].0 -= ux * force;
                    displacement[j].1 -= uy * force;
                }
            }

            for &(i, j) in edges {
                let (ux, uy, length) = direction(positions[i], positions[j], i, j);
                let distance = length - radii[i] - radii[j];
                if distance <= 0.0 || distance > params.max_distance_limit {
                    continue;
                }
                let force = params.edge_length_cost_factor * distance * distance / k;
                displacement[i].0 -= ux * force;
                displacement[i].1 -= uy * force;
                displacement[j].0 += ux * force;
                displacement[j].1 += uy * force;
            }

            let (cx, cy) = centroid(positions);
            let pull = params.border_line_cost_factor * CENTERING_RATE;
            for (delta, (x, y)) in displacement.iter_mut().zip(positions.iter()) {
                delta.0 += pull * (cx - x);
                delta.1 += pull * (cy - y);
            }

            let mut total = 0.0;
            for (position, (dx, dy)) in positions.iter_mut().zip(&displacement) {
                let length = dx.hypot(*dy);
                if !length.is_finite() || length <= f64::EPSILON {
                    continue;
                }
                let step = length.min(temperature);
                position.0 += dx / length * step;
                position.1 += dy / length * step;
                total += step;
            }

            stats.iterations = iteration + 1;
            stats.displacement = total;
            let progress = f64::from(iteration + 1) / f64::from(params.max_iterations);
            temperature = params.initial_temp * (1.0 - progress).max(0.0);
            if total < threshold {
                stats.converged = true;
                break;
            }
        }
        stats
    }

    /// Grid placement with `tries_per_cell` seeded jitter candidates per cell,
    /// keeping the candidate farthest from already placed nodes.
    fn initial_positions(&self, nodes: &[ComponentBounds]) -> Vec<(f64, f64)> {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let columns = ((nodes.len() as f64).sqrt().ceil() as usize).max(1);
        let largest = nodes
            .iter()
            .map(|node| node.rect.width.max(node.rect.height))
            .fold(0.0_f64, f64::max);
        let cell = largest + self.params.force_constant;

        let mut placed: Vec<(f64, f64)> = Vec::with_capacity(nodes.len());
        for index in 0..nodes.len() {
            let column = (index % columns) as f64;
            let row = (index / columns) as f64;
            let origin = (column * cell + cell / 2.0, row * cell + cell / 2.0);

            let mut best = origin;
            let mut best_score = f64::NEG_INFINITY;
            for _ in 0..self.params.tries_per_cell {
                let candidate = (
                    origin.0 + rng.gen_range(-0.25..0.25) * cell,
                    origin.1 + rng.gen_range(-0.25..0.25) * cell,
                );
                let score = placed
                    .iter()
                    .map(|other| (other.0 - candidate.0).hypot(other.1 - candidate.1))
                    .fold(f64::INFINITY, f64::min);
                if score > best_score {
                    best = candidate;
                    best_score = score;
                }
            }
            placed.push(best);
        }
        placed
    }
}

/// Unique undirected edges as index pairs `(low, high)`.
fn edge_indexes(nodes: &[ComponentBounds]) -> Vec<(usize, usize)> {
    let index = nodes
        .iter()
        .enumerate()
        .map(|(position, node)| (node.component().clone(), position))
        .collect::<BTreeMap<ComponentId, usize>>();

    let mut edges = BTreeSet::new();
    for (i, node) in nodes.iter().enumerate() {
        for opposite in node.opposites() {
            match index.get(opposite) {
                Some(&j) if j != i => {
                    edges.insert((i.min(j), i.max(j)));
                }
                Some(_) => {}
                None => debug!(
                    "event=organic_layout module=layout status=skip reason=unknown_opposite component={} opposite={}",
                    node.component(),
                    opposite
                ),
            }
        }
    }
    edges.into_iter().collect()
}

/// Unit vector from `b` to `a` and the distance; coincident points get a
/// fixed index-derived direction.
fn direction(a: (f64, f64), b: (f64, f64), i: usize, j: usize) -> (f64, f64, f64) {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    let length = dx.hypot(dy);
    if length < 1e-9 {
        let angle = (i * 7 + j * 13) as f64;
        return (angle.cos(), angle.sin(), 0.0);
    }
    (dx / length, dy / length, length)
}

fn centroid(positions: &[(f64, f64)]) -> (f64, f64) {
    let count = positions.len().max(1) as f64;
    let (sx, sy) = positions
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    (sx / count, sy / count)
}

fn padded(rect: &Rect, spacing: f64) -> Rect {
    Rect::new(
        rect.x - spacing / 2.0,
        rect.y - spacing / 2.0,
        rect.width + spacing,
        rect.height + spacing,
    )
}

/// Pushes overlapping pairs apart along their axis of least penetration;
/// falls back to a grid when passes run out.
fn remove_overlaps(nodes: &mut [ComponentBounds], spacing: f64) {
    for _ in 0..OVERLAP_PASSES {
        let mut moved = false;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let a = padded(&nodes[i].rect, spacing);
                let b = padded(&nodes[j].rect, spacing);
                if !a.intersects(&b) {
                    continue;
                }
                let overlap_x = a.right().min(b.right()) - a.x.max(b.x);
                let overlap_y = a.bottom().min(b.bottom()) - a.y.max(b.y);
                let (acx, acy) = a.center();
                let (bcx, bcy) = b.center();
                if overlap_x <= overlap_y {
                    let sign = if acx <= bcx { -1.0 } else { 1.0 };
                    let shift = overlap_x / 2.0 + 1e-6;
                    nodes[i].rect.x += sign * shift;
                    nodes[j].rect.x -= sign * shift;
                } else {
                    let sign = if acy <= bcy { -1.0 } else { 1.0 };
                    let shift = overlap_y / 2.0 + 1e-6;
                    nodes[i].rect.y += sign * shift;
                    nodes[j].rect.y -= sign * shift;
                }
                moved = true;
            }
        }
        if !moved {
            return;
        }
    }

    if has_overlap(nodes) || nodes.iter().any(|node| !node.rect.is_finite()) {
        debug!(
            "event=organic_layout module=layout status=fallback reason=overlap nodes={}",
            nodes.len()
        );
        grid_fallback(nodes, spacing);
    }
}

fn has_overlap(nodes: &[ComponentBounds]) -> bool {
    (0..nodes.len()).any(|i| ((i + 1)..nodes.len()).any(|j| nodes[i].rect.intersects(&nodes[j].rect)))
}

fn grid_fallback(nodes: &mut [ComponentBounds], spacing: f64) {
    let columns = ((nodes.len() as f64).sqrt().ceil() as usize).max(1);
    let cell_width = nodes.iter().map(|node| node.rect.width).fold(0.0, f64::max) + spacing;
    let cell_height = nodes.iter().map(|node| node.rect.height).fold(0.0, f64::max) + spacing;
    for (index, node) in nodes.iter_mut().enumerate() {
        node.rect.x = (index % columns) as f64 * cell_width;
        node.rect.y = (index / columns) as f64 * cell_height;
    }
}

fn normalize_origin(nodes: &mut [ComponentBounds]) {
    let Some(enclosing) = Rect::enclosing(nodes.iter().map(|node| &node.rect)) else {
        return;
    };
    for node in nodes.iter_mut() {
        node.rect = node.rect.translated(-enclosing.x, -enclosing.y);
    }
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(default)
}

fn non_negative_or(value: Option<f64>, default: f64) -> f64 {
    value
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(default)
}
