use eframe::egui::{Color32, Pos2};

use crate::graph::meta::link_type_color;
use crate::graph::{CategoryTable, EdgeType, NodeId};
use crate::highlight::{HighlightKind, HighlightState};
use crate::interaction::{Hit, Viewport};
use crate::physics::Simulation;

pub(crate) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity).round() as u8,
    )
}

/// Sizes are in simulation units and scale with zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    pub node_radius: f32,
    pub hover_node_radius: f32,
    pub node_stroke: f32,
    pub hover_node_stroke: f32,
    pub label_size: f32,
    pub hover_label_size: f32,
    pub edge_width: f32,
    pub edge_opacity: f32,
    pub highlight_edge_width: f32,
    pub faded_edge_opacity: f32,
    pub faded_node_opacity: f32,
    pub hover_edge_extra_width: f32,
    pub edge_hit_width: f32,
    pub accent: Color32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            node_radius: 12.0,
            hover_node_radius: 14.0,
            node_stroke: 2.0,
            hover_node_stroke: 3.0,
            label_size: 11.0,
            hover_label_size: 13.0,
            edge_width: 2.0,
            edge_opacity: 0.4,
            highlight_edge_width: 3.0,
            faded_edge_opacity: 0.1,
            faded_node_opacity: 0.15,
            hover_edge_extra_width: 1.0,
            edge_hit_width: 20.0,
            accent: Color32::from_rgb(0xf5, 0x9e, 0x0b),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodePrimitive {
    pub id: NodeId,
    pub label: String,
    pub center: Pos2,
    pub radius: f32,
    pub fill: Color32,
    pub stroke_width: f32,
    pub opacity: f32,
    pub label_size: f32,
    pub selected: bool,
}

/// Visible line plus the invisible hit band sharing the same endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgePrimitive {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: EdgeType,
    pub from: Pos2,
    pub to: Pos2,
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
    pub hit_width: f32,
    /// Screen radius of the target circle, for arrowhead placement.
    pub target_radius: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub nodes: Vec<NodePrimitive>,
    pub edges: Vec<EdgePrimitive>,
}

pub struct RenderInput<'a> {
    pub simulation: &'a Simulation,
    pub highlight: Option<&'a HighlightState>,
    pub hover: Option<Hit>,
    pub viewport: &'a Viewport,
    pub categories: &'a CategoryTable,
    pub style: &'a RenderStyle,
}

pub fn build_draw_list(input: &RenderInput<'_>) -> DrawList {
    let RenderInput {
        simulation,
        highlight,
        hover,
        viewport,
        categories,
        style,
    } = *input;
    let zoom = viewport.zoom;
    let bodies = simulation.bodies();

    let node_radius = |index: usize| {
        if hover == Some(Hit::Node(index)) {
            style.hover_node_radius
        } else {
            style.node_radius
        }
    };

    let edges = simulation
        .edges()
        .iter()
        .enumerate()
        .filter_map(|(index, edge)| {
            let from_index = edge.source.index()?;
            let to_index = edge.target.index()?;
            let from = viewport.world_to_screen(bodies.get(from_index)?.position);
            let to = viewport.world_to_screen(bodies.get(to_index)?.position);

            let base_color = link_type_color(&edge.edge_type);
            let (mut color, mut width, mut opacity) = match highlight {
                None => (base_color, style.edge_width, style.edge_opacity),
                Some(state) if state.contains_edge(index) => {
                    let color = match state.kind {
                        HighlightKind::Edge => style.accent,
                        HighlightKind::Node => base_color,
                    };
                    (color, style.highlight_edge_width, 1.0)
                }
                Some(_) => (base_color, style.edge_width, style.faded_edge_opacity),
            };

            if hover == Some(Hit::Edge(index)) {
                color = blend_color(color, Color32::WHITE, 0.25);
                width += style.hover_edge_extra_width;
                opacity = 1.0;
            }

            Some(EdgePrimitive {
                source: simulation.nodes()[from_index].id.clone(),
                target: simulation.nodes()[to_index].id.clone(),
                edge_type: edge.edge_type.clone(),
                from,
                to,
                color,
                width: width * zoom,
                opacity,
                hit_width: style.edge_hit_width * zoom,
                target_radius: node_radius(to_index) * zoom,
            })
        })
        .collect();

    let selected = highlight.and_then(|state| state.focus);
    let nodes = simulation
        .nodes()
        .iter()
        .zip(bodies)
        .enumerate()
        .map(|(index, (node, body))| {
            let hovered = hover == Some(Hit::Node(index));
            let opacity = match highlight {
                Some(state) if !state.contains_node(index) => style.faded_node_opacity,
                _ => 1.0,
            };

            NodePrimitive {
                id: node.id.clone(),
                label: node.name.clone(),
                center: viewport.world_to_screen(body.position),
                radius: node_radius(index) * zoom,
                fill: categories.color(&node.category),
                stroke_width: if hovered {
                    style.hover_node_stroke
                } else {
                    style.node_stroke
                } * zoom,
                opacity,
                label_size: if hovered {
                    style.hover_label_size
                } else {
                    style.label_size
                } * zoom,
                selected: selected == Some(index),
            }
        })
        .collect();

    DrawList { nodes, edges }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Rect, pos2, vec2};

    use super::*;
    use crate::filter::Subgraph;
    use crate::graph::fixtures::{edge, node};
    use crate::graph::{CategoryId, NodeId};
    use crate::highlight::build_highlight_state;
    use crate::interaction::Selection;
    use crate::physics::{LayoutConfig, SimulationId};

    struct Scene {
        simulation: Simulation,
        viewport: Viewport,
        categories: CategoryTable,
        style: RenderStyle,
    }

    fn scene() -> Scene {
        let subgraph = Subgraph {
            nodes: vec![node("A", "memory"), node("B", "memory"), node("C", "unknown")],
            edges: vec![
                edge("A", "B", EdgeType::DependsOn),
                edge("B", "C", EdgeType::Impacts),
            ],
        };
        let viewport = Viewport::new(Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0)));
        Scene {
            simulation: Simulation::new(
                SimulationId::first(),
                &subgraph,
                viewport.world_center(),
                LayoutConfig::default(),
            ),
            viewport,
            categories: CategoryTable::new(&[]),
            style: RenderStyle::default(),
        }
    }

    fn draw(scene: &Scene, selection: &Selection, hover: Option<Hit>) -> DrawList {
        let highlight = build_highlight_state(&scene.simulation, selection);
        build_draw_list(&RenderInput {
            simulation: &scene.simulation,
            highlight: highlight.as_ref(),
            hover,
            viewport: &scene.viewport,
            categories: &scene.categories,
            style: &scene.style,
        })
    }

    #[test]
    fn idle_draw_uses_baseline_styling() {
        let scene = scene();
        let list = draw(&scene, &Selection::Idle, None);

        assert_eq!(list.nodes.len(), 3);
        assert_eq!(list.edges.len(), 2);
        assert!(list.nodes.iter().all(|node| node.opacity == 1.0 && node.radius == 12.0));
        assert!(list.nodes.iter().all(|node| !node.selected));
        for edge in &list.edges {
            assert_eq!(edge.opacity, 0.4);
            assert_eq!(edge.width, 2.0);
            assert_eq!(edge.hit_width, 20.0);
            assert_eq!(edge.color, link_type_color(&edge.edge_type));
        }
        assert_eq!(list.nodes[0].fill, scene.categories.color(&CategoryId::from("memory")));
        assert_eq!(list.nodes[2].fill, Color32::from_rgb(0x99, 0x99, 0x99));
    }

    #[test]
    fn node_selection_fades_everything_outside_neighborhood() {
        let scene = scene();
        let list = draw(&scene, &Selection::Node(NodeId::from("A")), None);

        let opacity = |id: &str| {
            list.nodes
                .iter()
                .find(|node| node.id.as_str() == id)
                .map(|node| node.opacity)
        };
        assert_eq!(opacity("A"), Some(1.0));
        assert_eq!(opacity("B"), Some(1.0));
        assert_eq!(opacity("C"), Some(0.15));
        assert!(list.nodes[0].selected);
        assert!(!list.nodes[1].selected);

        assert_eq!(list.edges[0].opacity, 1.0);
        assert_eq!(list.edges[0].width, 3.0);
        assert_eq!(list.edges[1].opacity, 0.1);
        assert_eq!(list.edges[1].width, 2.0);
    }

    #[test]
    fn edge_selection_uses_accent_color() {
        let scene = scene();
        let list = draw(
            &scene,
            &Selection::Edge {
                source: NodeId::from("B"),
                target: NodeId::from("C"),
            },
            None,
        );

        assert_eq!(list.edges[1].color, scene.style.accent);
        assert_eq!(list.edges[0].color, link_type_color(&EdgeType::DependsOn));
        assert_eq!(list.edges[0].opacity, 0.1);
        assert_eq!(list.nodes[0].opacity, 0.15);
        assert!(list.nodes.iter().all(|node| !node.selected));
    }

    #[test]
    fn hover_enlarges_without_changing_selection_styling() {
        let scene = scene();
        let selection = Selection::Node(NodeId::from("A"));
        let plain = draw(&scene, &selection, None);
        let hovered = draw(&scene, &selection, Some(Hit::Node(2)));

        assert_eq!(hovered.nodes[2].radius, 14.0);
        assert_eq!(hovered.nodes[2].stroke_width, 3.0);
        assert_eq!(hovered.nodes[2].label_size, 13.0);
        assert_eq!(hovered.nodes[2].opacity, plain.nodes[2].opacity);
        assert_eq!(hovered.edges[1].target_radius, 14.0);

        let hovered_edge = draw(&scene, &Selection::Idle, Some(Hit::Edge(0)));
        assert_eq!(hovered_edge.edges[0].opacity, 1.0);
        assert_eq!(hovered_edge.edges[0].width, 3.0);
        assert_eq!(hovered_edge.edges[1].opacity, 0.4);
    }

    #[test]
    fn sizes_follow_zoom() {
        let mut scene = scene();
        scene.viewport.zoom = 2.0;
        let list = draw(&scene, &Selection::Idle, None);

        assert_eq!(list.nodes[0].radius, 24.0);
        assert_eq!(list.edges[0].hit_width, 40.0);
        let expected = scene
            .viewport
            .world_to_screen(scene.simulation.bodies()[0].position);
        assert_eq!(list.nodes[0].center, expected);
    }

    #[test]
    fn opacity_scales_alpha_channel() {
        let color = with_opacity(Color32::from_rgb(10, 20, 30), 0.5);
        assert_eq!(color.a(), 128);
        assert_eq!(blend_color(Color32::BLACK, Color32::WHITE, 2.0), Color32::WHITE);
    }
}
