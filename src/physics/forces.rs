use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::quadtree::QuadNode;
use super::{Body, SimEdge};

const JIGGLE_SCALE: f32 = 1e-6;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) theta: f32,
    pub(super) distance_min_sq: f32,
    pub(super) alpha: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_distance_sq: f32,
}

/// Tiny antisymmetric offset used to separate coincident bodies without an RNG.
pub(super) fn jiggle(a: usize, b: usize) -> Vec2 {
    let (x, y) = stable_pair((a.min(b), a.max(b)));
    let direction = if x == 0.0 && y == 0.0 {
        vec2(1.0, 0.0)
    } else {
        vec2(x, y).normalized()
    };
    let signed = if a < b { direction } else { -direction };
    signed * JIGGLE_SCALE
}

fn charge(offset: Vec2, weight: f32, params: ChargeParams) -> Vec2 {
    let mut distance_sq = offset.length_sq();
    if distance_sq < params.distance_min_sq {
        distance_sq = (params.distance_min_sq * distance_sq).sqrt();
    }
    offset * (weight * params.alpha / distance_sq)
}

/// Many-body term for one body. `offset` points from the body toward the
/// other mass, so a negative strength pushes the body away.
pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    delta: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let mut offset = positions[other_index] - point;
            if offset.length_sq() == 0.0 {
                offset = jiggle(other_index, index);
            }
            *delta += charge(offset, params.strength, params);
        }
        return;
    }

    let offset = node.center_of_mass - point;
    let side = node.bounds.side_length();
    let can_approximate = !node.bounds.contains(point)
        && (side * side) < (params.theta * params.theta) * offset.length_sq();

    if can_approximate {
        *delta += charge(offset, params.strength * node.mass, params);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge_for_node(child, index, positions, params, delta);
    }
}

/// Springs pull each edge toward its rest length. Applied in place on
/// velocities using the positions predicted for the next step.
pub(super) fn apply_links(edges: &[SimEdge], bodies: &mut [Body], rest_length: f32, alpha: f32) {
    for edge in edges {
        let (Some(from), Some(to)) = (edge.source.index(), edge.target.index()) else {
            continue;
        };
        if from == to || from >= bodies.len() || to >= bodies.len() {
            continue;
        }

        let source = bodies[from];
        let target = bodies[to];
        let mut offset = (target.position + target.velocity) - (source.position + source.velocity);
        if offset.length_sq() == 0.0 {
            offset = jiggle(from, to);
        }

        let distance = offset.length();
        let correction = offset * ((distance - rest_length) / distance * alpha * edge.strength);

        bodies[to].velocity -= correction * edge.bias;
        bodies[from].velocity += correction * (1.0 - edge.bias);
    }
}

/// Translates every body so the centroid lands on `center`.
pub(super) fn apply_centering(bodies: &mut [Body], center: Vec2, strength: f32) {
    if bodies.is_empty() {
        return;
    }

    let centroid = bodies
        .iter()
        .fold(Vec2::ZERO, |sum, body| sum + body.position)
        / bodies.len() as f32;
    let shift = (center - centroid) * strength;
    if shift.length_sq() <= f32::EPSILON {
        return;
    }
    for body in bodies {
        body.position += shift;
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    let mut offset = predicted[from] - predicted[to];
    let mut distance_sq = offset.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }
    if distance_sq == 0.0 {
        offset = jiggle(to, from);
        distance_sq = offset.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = offset * ((min_distance - distance) / distance * strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq);

    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

/// Pairwise overlap resolution, pruning cell pairs whose bounds are farther
/// apart than the largest possible contact distance.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (position, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[(position + 1)..] {
                    resolve_overlap(from, to, predicted, radii, params.strength, deltas);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, predicted, radii, params.strength, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_deref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, predicted, radii, params, deltas);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_deref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a, child_b, false, predicted, radii, params, deltas,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, predicted, radii, params, deltas);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, predicted, radii, params, deltas);
        }
    }
}
