use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui, vec2};

use concept_graph::interaction::Hit;
use concept_graph::physics::TickOutcome;
use concept_graph::render::{EdgePrimitive, NodePrimitive, with_opacity};

use super::super::ViewModel;
use super::super::render_utils::{arrowhead, circle_visible, draw_background, edge_visible};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.input.observe_canvas(rect);
        self.engine.pump_input(&mut self.input);
        self.forward_pointer(ui, rect, &response);

        let outcome = self.engine.tick();
        if outcome == TickOutcome::Stepped || self.pointer_captured {
            ui.ctx().request_repaint();
        }

        let painter = ui.painter_at(rect);
        let viewport = *self.engine.interaction().viewport();
        draw_background(&painter, rect, viewport.pan, viewport.zoom);

        if self.engine.subgraph().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No concepts match the current filters.",
                FontId::proportional(14.0),
                Color32::from_gray(170),
            );
            return;
        }

        let list = self.engine.draw_list();
        for edge in &list.edges {
            if edge_visible(rect, edge.from, edge.to, edge.width) {
                paint_edge(&painter, edge);
            }
        }
        let accent = self.engine.style().accent;
        for node in &list.nodes {
            if circle_visible(rect, node.center, node.radius) {
                paint_node(&painter, node, accent);
            }
        }

        if let Some(hit) = self.engine.interaction().hover() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });

            let hover_text = match hit {
                Hit::Node(index) => self.engine.simulation().nodes().get(index).map(|node| {
                    let category = self.engine.dataset().categories().resolve(&node.category);
                    format!("{}  |  {}", node.name, category.label)
                }),
                Hit::Edge(index) => self
                    .engine
                    .simulation()
                    .resolve_edge(index)
                    .map(|edge| edge.summary()),
            };
            if let Some(hover_text) = hover_text {
                painter.text(
                    rect.left_top() + vec2(10.0, 10.0),
                    Align2::LEFT_TOP,
                    hover_text,
                    FontId::proportional(13.0),
                    Color32::from_gray(240),
                );
            }
        }
    }
}

fn paint_edge(painter: &egui::Painter, edge: &EdgePrimitive) {
    let color = with_opacity(edge.color, edge.opacity);
    painter.line_segment([edge.from, edge.to], Stroke::new(edge.width, color));

    if let Some(points) = arrowhead(edge.from, edge.to, edge.target_radius, edge.width) {
        painter.add(Shape::convex_polygon(points.to_vec(), color, Stroke::NONE));
    }
}

fn paint_node(painter: &egui::Painter, node: &NodePrimitive, accent: Color32) {
    painter.circle_filled(node.center, node.radius, with_opacity(node.fill, node.opacity));
    painter.circle_stroke(
        node.center,
        node.radius,
        Stroke::new(node.stroke_width, with_opacity(Color32::WHITE, node.opacity)),
    );

    if node.selected {
        painter.circle_stroke(
            node.center,
            node.radius + 4.0,
            Stroke::new(2.0, with_opacity(accent, 0.85)),
        );
    }

    painter.text(
        node.center + vec2(node.radius + 4.0, 0.0),
        Align2::LEFT_CENTER,
        node.label.as_str(),
        FontId::proportional(node.label_size),
        with_opacity(Color32::from_gray(232), node.opacity),
    );
}
