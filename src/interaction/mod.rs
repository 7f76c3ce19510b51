mod hit;
mod input;
mod viewport;

use eframe::egui::{Pos2, Rect};
use tracing::debug;

use crate::filter::Subgraph;
use crate::graph::{Node, NodeId, ResolvedEdge};
use crate::physics::{Simulation, SimulationId};

pub use hit::{Hit, hit_test, point_segment_distance};
pub use input::{HostInput, InputSource, QueuedInput};
pub use viewport::Viewport;

/// What a click on the already-selected node or edge does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReclickPolicy {
    /// Re-selects it; the state is unchanged.
    #[default]
    Replace,
    /// Returns to idle.
    Toggle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionConfig {
    pub reclick: ReclickPolicy,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub node_radius: f32,
    pub edge_hit_width: f32,
    /// Screen distance a press may travel and still count as a click.
    pub click_tolerance: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reclick: ReclickPolicy::default(),
            min_zoom: 0.1,
            max_zoom: 4.0,
            node_radius: 12.0,
            edge_hit_width: 20.0,
            click_tolerance: 3.0,
        }
    }
}

/// The single selection; node and edge selection exclude each other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Node(NodeId),
    Edge { source: NodeId, target: NodeId },
}

impl Selection {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn edge_ids(&self) -> Option<(&NodeId, &NodeId)> {
        match self {
            Self::Edge { source, target } => Some((source, target)),
            _ => None,
        }
    }
}

/// Notifications raised for the panels around the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
    NodeClicked(Node),
    EdgeClicked(ResolvedEdge),
    PanelClosed,
    SearchFocusRequested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Pressed { pos: Pos2, button: PointerButton },
    Moved { pos: Pos2 },
    Released { pos: Pos2 },
    Wheel { pos: Pos2, delta: f32 },
    Left,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Gesture {
    #[default]
    None,
    Node {
        simulation: SimulationId,
        index: usize,
        origin: Pos2,
        dragging: bool,
    },
    Edge {
        simulation: SimulationId,
        index: usize,
        origin: Pos2,
    },
    Pan {
        last: Pos2,
        origin: Pos2,
        clickable: bool,
    },
}

fn travelled(origin: Pos2, pos: Pos2, tolerance: f32) -> bool {
    origin.distance(pos) > tolerance
}

pub struct Interaction {
    config: InteractionConfig,
    selection: Selection,
    hover: Option<Hit>,
    gesture: Gesture,
    viewport: Viewport,
    events: Vec<GraphEvent>,
}

impl Interaction {
    pub fn new(config: InteractionConfig, rect: Rect) -> Self {
        Self {
            config,
            selection: Selection::Idle,
            hover: None,
            gesture: Gesture::None,
            viewport: Viewport::new(rect),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn hover(&self) -> Option<Hit> {
        self.hover
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn dragged_node(&self) -> Option<usize> {
        match self.gesture {
            Gesture::Node {
                index,
                dragging: true,
                ..
            } => Some(index),
            _ => None,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    fn transition(&mut self, next: Selection) {
        if self.selection == next {
            return;
        }
        debug!(from = ?self.selection, to = ?next, "selection changed");
        let closing = next.is_idle();
        self.selection = next;
        if closing {
            self.events.push(GraphEvent::PanelClosed);
        }
    }

    pub fn click_node(&mut self, node: &Node) {
        if self.config.reclick == ReclickPolicy::Toggle
            && self.selection.node_id() == Some(&node.id)
        {
            self.transition(Selection::Idle);
            return;
        }

        self.transition(Selection::Node(node.id.clone()));
        self.events.push(GraphEvent::NodeClicked(node.clone()));
    }

    pub fn click_edge(&mut self, edge: ResolvedEdge) {
        let next = Selection::Edge {
            source: edge.source.id.clone(),
            target: edge.target.id.clone(),
        };
        if self.config.reclick == ReclickPolicy::Toggle && self.selection == next {
            self.transition(Selection::Idle);
            return;
        }

        self.transition(next);
        self.events.push(GraphEvent::EdgeClicked(edge));
    }

    pub fn close(&mut self) {
        self.transition(Selection::Idle);
    }

    /// Host-driven selection; raises no click notification.
    pub fn set_selected_node(&mut self, id: Option<NodeId>) {
        match id {
            Some(id) => self.transition(Selection::Node(id)),
            None => self.transition(Selection::Idle),
        }
    }

    /// A selection whose node or edge is no longer visible is implicitly closed.
    pub fn revalidate(&mut self, subgraph: &Subgraph) {
        let visible = match &self.selection {
            Selection::Idle => true,
            Selection::Node(id) => subgraph.contains_node(id.as_str()),
            Selection::Edge { source, target } => {
                subgraph.contains_edge(source.as_str(), target.as_str())
            }
        };
        if !visible {
            self.close();
        }
    }

    /// Drops any gesture and hover state bound to a torn-down simulation.
    pub fn reset_gesture(&mut self) {
        self.gesture = Gesture::None;
        self.hover = None;
    }

    pub fn set_viewport_rect(&mut self, rect: Rect) {
        self.viewport.rect = rect;
    }

    pub fn handle_host_input(&mut self, input: HostInput) {
        match input {
            HostInput::Resized(rect) => self.set_viewport_rect(rect),
            HostInput::FocusSearch => self.events.push(GraphEvent::SearchFocusRequested),
            HostInput::Escape => self.close(),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, simulation: &mut Simulation) {
        match event {
            PointerEvent::Pressed { pos, button } => self.pointer_pressed(pos, button, simulation),
            PointerEvent::Moved { pos } => self.pointer_moved(pos, simulation),
            PointerEvent::Released { pos } => self.pointer_released(pos, simulation),
            PointerEvent::Wheel { pos, delta } => {
                self.viewport
                    .zoom_at(pos, delta, self.config.min_zoom, self.config.max_zoom);
            }
            PointerEvent::Left => self.hover = None,
        }
    }

    fn hit_at(&self, pos: Pos2, simulation: &Simulation) -> Option<Hit> {
        hit_test(
            simulation,
            self.viewport.screen_to_world(pos),
            self.config.node_radius,
            self.config.edge_hit_width,
        )
    }

    fn pointer_pressed(&mut self, pos: Pos2, button: PointerButton, simulation: &mut Simulation) {
        if button != PointerButton::Primary {
            self.gesture = Gesture::Pan {
                last: pos,
                origin: pos,
                clickable: false,
            };
            return;
        }

        self.gesture = match self.hit_at(pos, simulation) {
            Some(Hit::Node(index)) => {
                let current = simulation.bodies()[index].position;
                simulation.pin(index, current);
                simulation.reheat();
                Gesture::Node {
                    simulation: simulation.id(),
                    index,
                    origin: pos,
                    dragging: false,
                }
            }
            Some(Hit::Edge(index)) => Gesture::Edge {
                simulation: simulation.id(),
                index,
                origin: pos,
            },
            None => Gesture::Pan {
                last: pos,
                origin: pos,
                clickable: true,
            },
        };
    }

    fn pointer_moved(&mut self, pos: Pos2, simulation: &mut Simulation) {
        let tolerance = self.config.click_tolerance;
        match self.gesture {
            Gesture::None => {}
            Gesture::Node {
                simulation: owner,
                index,
                origin,
                dragging,
            } => {
                if owner == simulation.id() {
                    let dragging = dragging || travelled(origin, pos, tolerance);
                    if dragging {
                        simulation.pin(index, self.viewport.screen_to_world(pos));
                    }
                    self.gesture = Gesture::Node {
                        simulation: owner,
                        index,
                        origin,
                        dragging,
                    };
                }
                return;
            }
            Gesture::Edge { origin, .. } => {
                if travelled(origin, pos, tolerance) {
                    self.gesture = Gesture::Pan {
                        last: pos,
                        origin: pos,
                        clickable: false,
                    };
                }
            }
            Gesture::Pan {
                last,
                origin,
                clickable,
            } => {
                self.viewport.pan_by(pos - last);
                self.gesture = Gesture::Pan {
                    last: pos,
                    origin,
                    clickable: clickable && !travelled(origin, pos, tolerance),
                };
                return;
            }
        }

        self.hover = self.hit_at(pos, simulation);
    }

    fn pointer_released(&mut self, pos: Pos2, simulation: &mut Simulation) {
        let tolerance = self.config.click_tolerance;
        match std::mem::take(&mut self.gesture) {
            Gesture::None => {}
            Gesture::Node {
                simulation: owner,
                index,
                origin,
                dragging,
            } => {
                if owner != simulation.id() {
                    return;
                }
                simulation.unpin(index);
                simulation.cool();
                if !dragging
                    && !travelled(origin, pos, tolerance)
                    && let Some(node) = simulation.nodes().get(index).cloned()
                {
                    self.click_node(&node);
                }
            }
            Gesture::Edge {
                simulation: owner,
                index,
                origin,
            } => {
                if owner == simulation.id()
                    && !travelled(origin, pos, tolerance)
                    && let Some(edge) = simulation.resolve_edge(index)
                {
                    self.click_edge(edge);
                }
            }
            Gesture::Pan {
                origin, clickable, ..
            } => {
                if clickable && !travelled(origin, pos, tolerance) {
                    self.close();
                }
            }
        }

        self.hover = self.hit_at(pos, simulation);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::graph::EdgeType;
    use crate::graph::fixtures::{edge, node};
    use crate::physics::{LayoutConfig, TickOutcome};

    fn settled_simulation() -> Simulation {
        let subgraph = Subgraph {
            nodes: vec![node("a", "memory"), node("b", "memory"), node("c", "memory")],
            edges: vec![edge("a", "b", EdgeType::DependsOn)],
        };
        let mut simulation = Simulation::new(
            SimulationId::first(),
            &subgraph,
            vec2(400.0, 300.0),
            LayoutConfig::default(),
        );
        let id = simulation.id();
        while simulation.tick(id) == TickOutcome::Stepped {}
        simulation
    }

    fn interaction(reclick: ReclickPolicy) -> Interaction {
        Interaction::new(
            InteractionConfig {
                reclick,
                ..InteractionConfig::default()
            },
            Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)),
        )
    }

    fn screen_of(interaction: &Interaction, simulation: &Simulation, id: &str) -> Pos2 {
        interaction
            .viewport()
            .world_to_screen(simulation.position_of(id).unwrap())
    }

    fn click(interaction: &mut Interaction, simulation: &mut Simulation, pos: Pos2) {
        interaction.handle_pointer(
            PointerEvent::Pressed {
                pos,
                button: PointerButton::Primary,
            },
            simulation,
        );
        interaction.handle_pointer(PointerEvent::Released { pos }, simulation);
    }

    #[test]
    fn node_and_edge_selection_exclude_each_other() {
        let mut simulation = settled_simulation();
        let mut interaction = interaction(ReclickPolicy::Replace);

        let a = screen_of(&interaction, &simulation, "a");
        click(&mut interaction, &mut simulation, a);
        assert_eq!(interaction.selection(), &Selection::Node(NodeId::from("a")));

        let b = screen_of(&interaction, &simulation, "b");
        let midpoint = a + (b - a) * 0.5;
        click(&mut interaction, &mut simulation, midpoint);
        assert_eq!(
            interaction.selection(),
            &Selection::Edge {
                source: NodeId::from("a"),
                target: NodeId::from("b"),
            }
        );
        assert!(interaction.selection().node_id().is_none());

        click(&mut interaction, &mut simulation, b);
        assert_eq!(interaction.selection(), &Selection::Node(NodeId::from("b")));
        assert!(interaction.selection().edge_ids().is_none());

        let events = interaction.drain_events();
        assert!(matches!(events[0], GraphEvent::NodeClicked(ref node) if node.id.as_str() == "a"));
        assert!(matches!(events[1], GraphEvent::EdgeClicked(ref edge) if edge.target.id.as_str() == "b"));
        assert!(matches!(events[2], GraphEvent::NodeClicked(ref node) if node.id.as_str() == "b"));
        assert!(interaction.drain_events().is_empty());
    }

    #[test]
    fn background_click_and_escape_return_to_idle() {
        let mut simulation = settled_simulation();
        let mut interaction = interaction(ReclickPolicy::Replace);

        let a = screen_of(&interaction, &simulation, "a");
        click(&mut interaction, &mut simulation, a);
        click(&mut interaction, &mut simulation, pos2(1.0, 1.0));
        assert!(interaction.selection().is_idle());

        click(&mut interaction, &mut simulation, a);
        interaction.handle_host_input(HostInput::Escape);
        assert!(interaction.selection().is_idle());

        let closes = interaction
            .drain_events()
            .into_iter()
            .filter(|event| *event == GraphEvent::PanelClosed)
            .count();
        assert_eq!(closes, 2);
    }

    #[test]
    fn reclick_policy_decides_between_replace_and_toggle() {
        let mut simulation = settled_simulation();

        let mut replace = interaction(ReclickPolicy::Replace);
        let a = screen_of(&replace, &simulation, "a");
        click(&mut replace, &mut simulation, a);
        click(&mut replace, &mut simulation, a);
        assert_eq!(replace.selection(), &Selection::Node(NodeId::from("a")));

        let mut toggle = interaction(ReclickPolicy::Toggle);
        click(&mut toggle, &mut simulation, a);
        click(&mut toggle, &mut simulation, a);
        assert!(toggle.selection().is_idle());
    }

    #[test]
    fn dragging_pins_reheats_and_does_not_select() {
        let mut simulation = settled_simulation();
        assert!(!simulation.is_running());
        let mut interaction = interaction(ReclickPolicy::Replace);
        let index = simulation.index_of("c").unwrap();
        let start = screen_of(&interaction, &simulation, "c");

        interaction.handle_pointer(
            PointerEvent::Pressed {
                pos: start,
                button: PointerButton::Primary,
            },
            &mut simulation,
        );
        assert!(simulation.is_running());

        let target = start + vec2(60.0, 40.0);
        interaction.handle_pointer(PointerEvent::Moved { pos: target }, &mut simulation);
        assert_eq!(interaction.dragged_node(), Some(index));
        assert_eq!(
            simulation.bodies()[index].pin,
            Some(interaction.viewport().screen_to_world(target))
        );

        let id = simulation.id();
        for _ in 0..20 {
            simulation.tick(id);
        }
        assert_eq!(
            simulation.bodies()[index].position,
            interaction.viewport().screen_to_world(target)
        );

        interaction.handle_pointer(PointerEvent::Released { pos: target }, &mut simulation);
        assert!(simulation.bodies()[index].pin.is_none());
        assert!(interaction.dragged_node().is_none());
        assert!(interaction.selection().is_idle());
        assert!(interaction.drain_events().is_empty());
    }

    #[test]
    fn background_drag_pans_without_moving_bodies() {
        let mut simulation = settled_simulation();
        let before = simulation.bodies().to_vec();
        let mut interaction = interaction(ReclickPolicy::Replace);

        interaction.handle_pointer(
            PointerEvent::Pressed {
                pos: pos2(2.0, 2.0),
                button: PointerButton::Primary,
            },
            &mut simulation,
        );
        interaction.handle_pointer(PointerEvent::Moved { pos: pos2(52.0, 22.0) }, &mut simulation);
        interaction.handle_pointer(PointerEvent::Released { pos: pos2(52.0, 22.0) }, &mut simulation);

        assert_eq!(interaction.viewport().pan, vec2(50.0, 20.0));
        assert_eq!(simulation.bodies(), before.as_slice());
        assert!(interaction.drain_events().is_empty());
    }

    #[test]
    fn revalidation_closes_hidden_selection() {
        let mut interaction = interaction(ReclickPolicy::Replace);
        interaction.set_selected_node(Some(NodeId::from("a")));
        assert!(interaction.drain_events().is_empty());

        let visible = Subgraph {
            nodes: vec![node("a", "memory")],
            edges: Vec::new(),
        };
        interaction.revalidate(&visible);
        assert_eq!(interaction.selection(), &Selection::Node(NodeId::from("a")));

        interaction.revalidate(&Subgraph::default());
        assert!(interaction.selection().is_idle());
        assert_eq!(interaction.drain_events(), vec![GraphEvent::PanelClosed]);
    }

    #[test]
    fn hover_tracks_pointer_and_clears_on_leave() {
        let mut simulation = settled_simulation();
        let mut interaction = interaction(ReclickPolicy::Replace);
        let a = screen_of(&interaction, &simulation, "a");

        interaction.handle_pointer(PointerEvent::Moved { pos: a }, &mut simulation);
        assert_eq!(
            interaction.hover(),
            Some(Hit::Node(simulation.index_of("a").unwrap()))
        );
        interaction.handle_pointer(PointerEvent::Left, &mut simulation);
        assert_eq!(interaction.hover(), None);
    }
}
