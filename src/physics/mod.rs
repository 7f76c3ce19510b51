mod forces;
mod quadtree;

use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::filter::Subgraph;
use crate::graph::{EdgeType, Node, NodeId, ResolvedEdge};

use forces::{
    ChargeParams, CollisionParams, accumulate_charge_for_node, accumulate_collision_pairs,
    apply_centering, apply_links,
};
use quadtree::QuadNode;

const INITIAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Many-body strength; negative values repel.
    pub charge: f32,
    pub link_distance: f32,
    /// Per-body collision radius; two bodies keep `2 * collide_radius` apart.
    pub collide_radius: f32,
    pub collide_strength: f32,
    pub center_strength: f32,
    pub theta: f32,
    pub distance_min: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    /// Energy level held while a body is being dragged.
    pub drag_alpha_target: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            charge: -400.0,
            link_distance: 120.0,
            collide_radius: 35.0,
            collide_strength: 1.0,
            center_strength: 1.0,
            theta: 0.9,
            distance_min: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimulationId(u64);

impl SimulationId {
    pub fn first() -> Self {
        Self(0)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Edge endpoint as seen by the simulation: a raw id until the edge is bound
/// to the node arena, an arena index afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Id(NodeId),
    Index(usize),
}

impl Endpoint {
    pub fn id<'a>(&'a self, nodes: &'a [Node]) -> Option<&'a str> {
        match self {
            Self::Id(id) => Some(id.as_str()),
            Self::Index(index) => nodes.get(*index).map(|node| node.id.as_str()),
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Id(_) => None,
            Self::Index(index) => Some(*index),
        }
    }

    fn bind(&mut self, index_by_id: &HashMap<NodeId, usize>) -> bool {
        if let Self::Id(id) = self {
            match index_by_id.get(id) {
                Some(&index) => *self = Self::Index(index),
                None => return false,
            }
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimEdge {
    pub source: Endpoint,
    pub target: Endpoint,
    pub edge_type: EdgeType,
    pub description: Option<String>,
    strength: f32,
    bias: f32,
}

/// Mutable layout state of one node, kept apart from the domain record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub pin: Option<Vec2>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Stepped,
    Settled,
    Superseded,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    deltas: Vec<Vec2>,
    radii: Vec<f32>,
}

pub struct Simulation {
    id: SimulationId,
    config: LayoutConfig,
    center: Vec2,
    nodes: Vec<Node>,
    edges: Vec<SimEdge>,
    bodies: Vec<Body>,
    index_by_id: HashMap<NodeId, usize>,
    incident: Vec<Vec<usize>>,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    scratch: PhysicsScratch,
}

impl Simulation {
    /// Fresh simulation over clones of the subgraph, laid out on a
    /// phyllotaxis spiral around `center`.
    pub fn new(id: SimulationId, subgraph: &Subgraph, center: Vec2, config: LayoutConfig) -> Self {
        let nodes = subgraph.nodes.clone();
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let initial_angle = PI * (3.0 - 5.0_f32.sqrt());
        let bodies = (0..nodes.len())
            .map(|index| {
                let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * initial_angle;
                Body {
                    position: center + vec2(angle.cos(), angle.sin()) * radius,
                    ..Body::default()
                }
            })
            .collect::<Vec<_>>();

        let mut edges = subgraph
            .edges
            .iter()
            .filter_map(|edge| {
                let mut source = Endpoint::Id(edge.source.clone());
                let mut target = Endpoint::Id(edge.target.clone());
                (source.bind(&index_by_id) && target.bind(&index_by_id)).then(|| SimEdge {
                    source,
                    target,
                    edge_type: edge.edge_type.clone(),
                    description: edge.description.clone(),
                    strength: 1.0,
                    bias: 0.5,
                })
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0usize; nodes.len()];
        let mut incident = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            if let (Some(from), Some(to)) = (edge.source.index(), edge.target.index()) {
                degree[from] += 1;
                degree[to] += 1;
                incident[from].push(edge_index);
                if to != from {
                    incident[to].push(edge_index);
                }
            }
        }
        for edge in &mut edges {
            if let (Some(from), Some(to)) = (edge.source.index(), edge.target.index()) {
                let (source_degree, target_degree) = (degree[from] as f32, degree[to] as f32);
                edge.strength = 1.0 / source_degree.min(target_degree);
                edge.bias = source_degree / (source_degree + target_degree);
            }
        }

        let running = !nodes.is_empty();
        debug!(
            simulation = id.0,
            nodes = nodes.len(),
            edges = edges.len(),
            "layout simulation started"
        );

        Self {
            id,
            config,
            center,
            nodes,
            edges,
            bodies,
            index_by_id,
            incident,
            alpha: 1.0,
            alpha_target: 0.0,
            running,
            scratch: PhysicsScratch::default(),
        }
    }

    pub fn id(&self) -> SimulationId {
        self.id
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SimEdge] {
        &self.edges
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Indices into [`Self::edges`] of every edge touching the body.
    pub fn incident_edges(&self, index: usize) -> &[usize] {
        self.incident.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn resolve_edge(&self, edge_index: usize) -> Option<ResolvedEdge> {
        let edge = self.edges.get(edge_index)?;
        let source = self.nodes.get(edge.source.index()?)?;
        let target = self.nodes.get(edge.target.index()?)?;
        Some(ResolvedEdge {
            source: source.clone(),
            target: target.clone(),
            edge_type: edge.edge_type.clone(),
            description: edge.description.clone(),
        })
    }

    pub fn position_of(&self, id: &str) -> Option<Vec2> {
        self.index_of(id).map(|index| self.bodies[index].position)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn kinetic_energy(&self) -> f32 {
        self.bodies
            .iter()
            .map(|body| body.velocity.length_sq() * 0.5)
            .sum()
    }

    /// Moves the layout rigidly with the new center without adding energy.
    pub fn set_center(&mut self, center: Vec2) {
        let shift = center - self.center;
        self.center = center;
        for body in &mut self.bodies {
            body.position += shift;
            if let Some(pin) = body.pin.as_mut() {
                *pin += shift;
            }
        }
    }

    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target.clamp(0.0, 1.0);
    }

    pub fn restart(&mut self) {
        self.running = !self.nodes.is_empty();
    }

    /// Raises the target energy so the graph keeps moving while a body is held.
    pub fn reheat(&mut self) {
        self.set_alpha_target(self.config.drag_alpha_target);
        self.restart();
    }

    pub fn cool(&mut self) {
        self.set_alpha_target(0.0);
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pin = Some(position);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.pin = None;
        }
    }

    /// Advances one step. A tick addressed to another simulation is refused
    /// without touching any body.
    pub fn tick(&mut self, expected: SimulationId) -> TickOutcome {
        if expected != self.id {
            return TickOutcome::Superseded;
        }
        if !self.running {
            return TickOutcome::Settled;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.step_forces();

        if self.alpha < self.config.alpha_min {
            self.running = false;
            debug!(simulation = self.id.0, "layout simulation settled");
            return TickOutcome::Settled;
        }
        TickOutcome::Stepped
    }

    fn step_forces(&mut self) {
        let node_count = self.bodies.len();
        let config = self.config;
        let alpha = self.alpha;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.bodies.iter().map(|body| body.position));
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);

        if node_count > 1
            && let Some(tree) = QuadNode::build(&scratch.positions)
        {
            let params = ChargeParams {
                strength: config.charge,
                theta: config.theta,
                distance_min_sq: config.distance_min * config.distance_min,
                alpha,
            };
            for (index, delta) in scratch.deltas.iter_mut().enumerate() {
                accumulate_charge_for_node(&tree, index, &scratch.positions, params, delta);
            }
        }
        for (body, delta) in self.bodies.iter_mut().zip(&scratch.deltas) {
            body.velocity += *delta;
        }

        apply_links(&self.edges, &mut self.bodies, config.link_distance, alpha);
        apply_centering(&mut self.bodies, self.center, config.center_strength);

        if node_count > 1 && config.collide_radius > 0.0 {
            scratch.positions.clear();
            scratch.positions.extend(
                self.bodies
                    .iter()
                    .map(|body| body.position + body.velocity),
            );
            scratch.radii.clear();
            scratch.radii.resize(node_count, config.collide_radius);
            scratch.deltas.fill(Vec2::ZERO);

            if let Some(tree) = QuadNode::build(&scratch.positions) {
                let reach = config.collide_radius * 2.0;
                accumulate_collision_pairs(
                    &tree,
                    &tree,
                    true,
                    &scratch.positions,
                    &scratch.radii,
                    CollisionParams {
                        strength: config.collide_strength,
                        max_distance_sq: reach * reach,
                    },
                    &mut scratch.deltas,
                );
            }
            for (body, delta) in self.bodies.iter_mut().zip(&scratch.deltas) {
                body.velocity += *delta;
            }
        }

        let retained = 1.0 - config.velocity_decay;
        for body in &mut self.bodies {
            if let Some(pin) = body.pin {
                body.position = pin;
                body.velocity = Vec2::ZERO;
            } else {
                body.velocity *= retained;
                body.position += body.velocity;
            }
        }
    }
}
