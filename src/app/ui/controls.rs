use std::collections::BTreeSet;

use eframe::egui::{self, RichText, Ui};

use concept_graph::graph::meta::{link_type_color, link_type_label};
use concept_graph::graph::{CategoryId, EdgeType, NodeId};

use super::super::ViewModel;

enum FilterChange {
    Categories(BTreeSet<CategoryId>),
    LinkTypes(BTreeSet<EdgeType>),
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Explore");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);

        ui.separator();
        let mut change = self.draw_category_filters(ui);

        ui.separator();
        change = self.draw_link_type_filters(ui).or(change);

        match change {
            Some(FilterChange::Categories(categories)) => {
                self.engine.set_active_categories(categories);
            }
            Some(FilterChange::LinkTypes(link_types)) => {
                self.engine.set_active_link_types(link_types);
            }
            None => {}
        }
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search")
            .on_hover_text("Filters the graph by name, description and technical notes.");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .id(self.search_id)
                .hint_text("Search concepts…"),
        );
        if self.focus_search {
            response.request_focus();
            self.focus_search = false;
        }
        if response.changed() {
            self.engine.set_search_text(self.search.clone());
        }

        if self.search.trim().is_empty() {
            return;
        }

        let suggestions = self
            .engine
            .suggestions()
            .into_iter()
            .map(|node| {
                let category = self.engine.dataset().categories().resolve(&node.category);
                (node.id.clone(), node.name.clone(), category)
            })
            .collect::<Vec<_>>();

        if suggestions.is_empty() {
            ui.weak("No matching concepts.");
            return;
        }

        let mut picked: Option<NodeId> = None;
        ui.add_space(4.0);
        for (id, name, category) in suggestions {
            let label = format!("{} {name}", category.icon.unwrap_or("•"));
            if ui
                .selectable_label(false, RichText::new(label).color(category.color))
                .on_hover_text(category.label)
                .clicked()
            {
                picked = Some(id);
            }
        }

        if let Some(id) = picked {
            self.search.clear();
            self.engine.set_search_text("");
            self.engine.set_selected_node_id(Some(id.as_str()));
        }
    }

    fn draw_category_filters(&self, ui: &mut Ui) -> Option<FilterChange> {
        let active = &self.engine.criteria().categories;
        let mut next = None;

        ui.horizontal(|ui| {
            ui.label(RichText::new("Categories").strong());
            if ui.small_button("All").clicked() {
                next = Some(self.categories.iter().cloned().collect());
            }
            if ui.small_button("None").clicked() {
                next = Some(BTreeSet::new());
            }
        });

        for id in &self.categories {
            let info = self.engine.dataset().categories().resolve(id);
            let mut checked = active.contains(id);
            let text = match info.icon {
                Some(icon) => format!("{icon} {}", info.label),
                None => info.label.clone(),
            };
            if ui
                .checkbox(&mut checked, RichText::new(text).color(info.color))
                .changed()
            {
                let mut categories = active.clone();
                if checked {
                    categories.insert(id.clone());
                } else {
                    categories.remove(id);
                }
                next = Some(categories);
            }
        }

        next.map(FilterChange::Categories)
    }

    fn draw_link_type_filters(&self, ui: &mut Ui) -> Option<FilterChange> {
        let active = self.engine.criteria().link_types.as_ref();
        let mut next = None;

        ui.label(RichText::new("Relationships").strong());
        for edge_type in &self.link_types {
            let mut checked = active.is_none_or(|types| types.contains(edge_type));
            let label = RichText::new(link_type_label(edge_type)).color(link_type_color(edge_type));
            if ui.checkbox(&mut checked, label).changed() {
                let mut link_types = active
                    .cloned()
                    .unwrap_or_else(|| self.link_types.iter().cloned().collect());
                if checked {
                    link_types.insert(edge_type.clone());
                } else {
                    link_types.remove(edge_type);
                }
                next = Some(link_types);
            }
        }

        next.map(FilterChange::LinkTypes)
    }
}
