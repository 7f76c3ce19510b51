use eframe::egui::{self, Align, Layout, RichText, Ui};

use concept_graph::graph::meta::{link_type_color, link_type_label};
use concept_graph::graph::{Node, NodeId, ResolvedEdge};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let mut close = false;
        ui.horizontal(|ui| {
            ui.heading("Details");
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                close = ui.button("✕").on_hover_text("Close (Esc)").clicked();
            });
        });
        ui.add_space(6.0);

        let mut navigate: Option<NodeId> = None;
        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(node) = self.engine.selected_node() {
                    navigate = self.draw_node_details(ui, node);
                } else if let Some(edge) = self.engine.selected_edge() {
                    navigate = draw_edge_details(ui, &edge);
                }
            });

        if close {
            self.engine.close_panel();
        } else if let Some(id) = navigate {
            self.engine.set_selected_node_id(Some(id.as_str()));
        }
    }

    fn draw_node_details(&self, ui: &mut Ui, node: &Node) -> Option<NodeId> {
        let category = self.engine.dataset().categories().resolve(&node.category);
        let mut navigate = None;

        ui.label(RichText::new(&node.name).strong().size(18.0));
        let badge = match category.icon {
            Some(icon) => format!("{icon} {}", category.label),
            None => category.label.clone(),
        };
        ui.label(RichText::new(badge).color(category.color));
        ui.add_space(6.0);

        if !node.description.is_empty() {
            ui.label(node.description.as_str());
        }

        for (title, body) in [
            ("Technical details", node.technical.as_deref()),
            ("Magnitudes", node.magnitudes.as_deref()),
            ("Trade-offs", node.tradeoffs.as_deref()),
        ] {
            if let Some(body) = body {
                ui.separator();
                ui.label(RichText::new(title).strong());
                ui.label(body);
            }
        }

        if !node.references.is_empty() {
            ui.separator();
            ui.label(RichText::new("References").strong());
            for reference in &node.references {
                ui.label(format!("- {reference}"));
            }
        }

        if !node.source_lines.is_empty() {
            let lines = node
                .source_lines
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            ui.small(format!("Source lines: {lines}"));
        }

        let related = self.engine.related_nodes(node.id.as_str());
        ui.separator();
        ui.label(RichText::new("Related concepts").strong());
        if related.is_empty() {
            ui.weak("No linked concepts.");
        }
        for other in related {
            let visible = self.engine.subgraph().contains_node(other.id.as_str());
            let color = self.engine.dataset().categories().color(&other.category);
            let response = ui.add_enabled(
                visible,
                egui::Button::new(RichText::new(other.name.as_str()).color(color)),
            );
            if response
                .on_disabled_hover_text("Hidden by the current filters")
                .clicked()
            {
                navigate = Some(other.id.clone());
            }
        }

        navigate
    }
}

fn draw_edge_details(ui: &mut Ui, edge: &ResolvedEdge) -> Option<NodeId> {
    let mut navigate = None;

    ui.label(
        RichText::new(link_type_label(&edge.edge_type))
            .strong()
            .color(link_type_color(&edge.edge_type)),
    );
    ui.add_space(6.0);
    ui.label(edge.summary());
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("From");
        if ui.link(edge.source.name.as_str()).clicked() {
            navigate = Some(edge.source.id.clone());
        }
    });
    ui.horizontal(|ui| {
        ui.label("To");
        if ui.link(edge.target.name.as_str()).clicked() {
            navigate = Some(edge.target.id.clone());
        }
    });

    navigate
}
