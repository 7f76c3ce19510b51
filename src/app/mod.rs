use eframe::egui::{self, Context, Id, Rect, pos2, vec2};
use tracing::debug;

use concept_graph::GraphEngine;
use concept_graph::graph::{CategoryId, Dataset, EdgeType};
use concept_graph::interaction::{GraphEvent, InteractionConfig};
use concept_graph::physics::LayoutConfig;

mod graph;
mod input;
mod render_utils;
mod ui;

use input::EguiInput;

pub struct ConceptGraphApp {
    view: ViewModel,
}

struct ViewModel {
    engine: GraphEngine,
    input: EguiInput,
    search: String,
    search_id: Id,
    focus_search: bool,
    pointer_captured: bool,
    categories: Vec<CategoryId>,
    link_types: Vec<EdgeType>,
}

impl ConceptGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        dataset: Dataset,
        layout: LayoutConfig,
        interaction: InteractionConfig,
    ) -> Self {
        Self {
            view: ViewModel::new(dataset, layout, interaction),
        }
    }
}

impl ViewModel {
    fn new(dataset: Dataset, layout: LayoutConfig, interaction: InteractionConfig) -> Self {
        // Replaced by the real canvas rect on the first frame.
        let initial_canvas = Rect::from_min_size(pos2(0.0, 0.0), vec2(1440.0, 920.0));
        let engine = GraphEngine::new(dataset, layout, interaction, initial_canvas);

        let mut categories = engine
            .dataset()
            .categories()
            .ids()
            .cloned()
            .collect::<Vec<_>>();
        for id in &engine.criteria().categories {
            if !categories.contains(id) {
                categories.push(id.clone());
            }
        }
        let link_types = engine
            .criteria()
            .link_types
            .iter()
            .flatten()
            .cloned()
            .collect();

        Self {
            engine,
            input: EguiInput::default(),
            search: String::new(),
            search_id: Id::new("concept_search"),
            focus_search: false,
            pointer_captured: false,
            categories,
            link_types,
        }
    }

    fn handle_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                GraphEvent::NodeClicked(node) => debug!(node = %node.id, "node clicked"),
                GraphEvent::EdgeClicked(edge) => debug!(
                    source = %edge.source.id,
                    target = %edge.target.id,
                    "edge clicked"
                ),
                GraphEvent::PanelClosed => debug!("detail panel closed"),
                GraphEvent::SearchFocusRequested => self.focus_search = true,
            }
        }
    }
}

impl eframe::App for ConceptGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.view.input.capture(ctx);
        self.view.show(ctx);
        self.view.handle_events();
        if self.view.focus_search {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use concept_graph::graph::GraphData;

    use super::*;

    #[test]
    fn toggles_cover_dataset_and_builtin_types() {
        let data: GraphData = serde_json::from_str(
            r##"{
                "nodes": [{"id": "a", "name": "A", "category": "custom"}],
                "links": [{"source": "a", "target": "a", "type": "extends"}],
                "categories": [{"id": "custom", "label": "Custom", "color": "#123456"}]
            }"##,
        )
        .unwrap();
        let view = ViewModel::new(
            Dataset::new(data).unwrap(),
            LayoutConfig::default(),
            InteractionConfig::default(),
        );

        assert_eq!(view.categories.first().map(CategoryId::as_str), Some("custom"));
        assert_eq!(view.categories.len(), 7);
        assert_eq!(view.link_types.len(), 6);
        assert!(view.link_types.contains(&EdgeType::Other("extends".to_owned())));
    }

    #[test]
    fn select_all_keeps_categories_missing_from_metadata() {
        let data: GraphData = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": "r", "name": "R", "category": "retrieval"},
                    {"id": "m", "name": "M", "category": "memory"}
                ],
                "links": [],
                "categories": []
            }"#,
        )
        .unwrap();
        let mut view = ViewModel::new(
            Dataset::new(data).unwrap(),
            LayoutConfig::default(),
            InteractionConfig::default(),
        );
        assert_eq!(view.engine.subgraph().nodes.len(), 2);

        let retrieval = CategoryId::from("retrieval");
        assert_eq!(view.categories.last(), Some(&retrieval));
        assert_eq!(view.categories.first().map(CategoryId::as_str), Some("architecture"));

        view.engine.set_active_categories(Vec::<CategoryId>::new());
        assert!(view.engine.subgraph().is_empty());

        view.engine.set_active_categories(view.categories.clone());
        assert_eq!(view.engine.subgraph().nodes.len(), 2);
    }
}
