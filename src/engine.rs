use std::collections::BTreeSet;

use eframe::egui::Rect;
use tracing::debug;

use crate::filter::{FilterCriteria, Subgraph, filter_graph, search_suggestions};
use crate::graph::{CategoryId, Dataset, EdgeType, Node, NodeId, ResolvedEdge};
use crate::highlight::{HighlightState, build_highlight_state};
use crate::interaction::{
    GraphEvent, HostInput, InputSource, Interaction, InteractionConfig, PointerEvent, Selection,
};
use crate::physics::{LayoutConfig, Simulation, SimulationId, TickOutcome};
use crate::render::{DrawList, RenderInput, RenderStyle, build_draw_list};

/// Owns the dataset, the current filtered subgraph and the simulation laid
/// out over it, plus the interaction state driving selection and the view.
pub struct GraphEngine {
    dataset: Dataset,
    criteria: FilterCriteria,
    subgraph: Subgraph,
    simulation: Simulation,
    interaction: Interaction,
    style: RenderStyle,
    pending_input: Vec<HostInput>,
}

impl GraphEngine {
    pub fn new(
        dataset: Dataset,
        layout: LayoutConfig,
        interaction: InteractionConfig,
        viewport: Rect,
    ) -> Self {
        let criteria = FilterCriteria::all(&dataset);
        let subgraph = filter_graph(&dataset, &criteria);
        let interaction = Interaction::new(interaction, viewport);
        let simulation = Simulation::new(
            SimulationId::first(),
            &subgraph,
            interaction.viewport().world_center(),
            layout,
        );
        let style = RenderStyle {
            node_radius: interaction.config().node_radius,
            edge_hit_width: interaction.config().edge_hit_width,
            ..RenderStyle::default()
        };

        Self {
            dataset,
            criteria,
            subgraph,
            simulation,
            interaction,
            style,
            pending_input: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn subgraph(&self) -> &Subgraph {
        &self.subgraph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_id(&self) -> SimulationId {
        self.simulation.id()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn selection(&self) -> &Selection {
        self.interaction.selection()
    }

    pub fn set_active_categories(&mut self, categories: impl IntoIterator<Item = CategoryId>) {
        self.criteria.categories = categories.into_iter().collect();
        self.refilter();
    }

    pub fn set_active_link_types(&mut self, link_types: impl IntoIterator<Item = EdgeType>) {
        self.criteria.link_types = Some(link_types.into_iter().collect::<BTreeSet<_>>());
        self.refilter();
    }

    pub fn set_search_text(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search == self.criteria.search {
            return;
        }
        self.criteria.search = search;
        self.refilter();
    }

    /// Host-driven selection. An id outside the visible subgraph leaves the
    /// engine idle.
    pub fn set_selected_node_id(&mut self, id: Option<&str>) {
        let visible = id.filter(|id| self.subgraph.contains_node(id));
        self.interaction.set_selected_node(visible.map(NodeId::from));
    }

    pub fn close_panel(&mut self) {
        self.interaction.close();
    }

    fn refilter(&mut self) {
        let subgraph = filter_graph(&self.dataset, &self.criteria);
        if subgraph != self.subgraph {
            let id = self.simulation.id().next();
            debug!(
                nodes = subgraph.nodes.len(),
                edges = subgraph.edges.len(),
                "filtered subgraph changed; restarting layout"
            );
            self.simulation.stop();
            self.simulation = Simulation::new(
                id,
                &subgraph,
                self.interaction.viewport().world_center(),
                *self.simulation.config(),
            );
            self.subgraph = subgraph;
            self.interaction.reset_gesture();
        }
        self.interaction.revalidate(&self.subgraph);
    }

    /// Advances the current simulation by one frame.
    pub fn tick(&mut self) -> TickOutcome {
        let id = self.simulation.id();
        self.simulation.tick(id)
    }

    /// Steps on behalf of a scheduler that captured `id` earlier; refused
    /// once that simulation has been replaced.
    pub fn tick_simulation(&mut self, id: SimulationId) -> TickOutcome {
        self.simulation.tick(id)
    }

    pub fn is_animating(&self) -> bool {
        self.simulation.is_running()
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.interaction.handle_pointer(event, &mut self.simulation);
    }

    pub fn pump_input(&mut self, source: &mut dyn InputSource) {
        source.poll(&mut self.pending_input);
        for input in std::mem::take(&mut self.pending_input) {
            self.interaction.handle_host_input(input);
            if let HostInput::Resized(_) = input {
                let center = self.interaction.viewport().world_center();
                self.simulation.set_center(center);
            }
        }
    }

    pub fn highlight(&self) -> Option<HighlightState> {
        build_highlight_state(&self.simulation, self.interaction.selection())
    }

    pub fn draw_list(&self) -> DrawList {
        let highlight = self.highlight();
        build_draw_list(&RenderInput {
            simulation: &self.simulation,
            highlight: highlight.as_ref(),
            hover: self.interaction.hover(),
            viewport: self.interaction.viewport(),
            categories: self.dataset.categories(),
            style: &self.style,
        })
    }

    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        self.interaction.drain_events()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        let id = self.interaction.selection().node_id()?;
        self.subgraph.nodes.iter().find(|node| node.id == *id)
    }

    pub fn selected_edge(&self) -> Option<ResolvedEdge> {
        let (source, target) = self.interaction.selection().edge_ids()?;
        let edge = self
            .subgraph
            .edges
            .iter()
            .find(|edge| edge.connects(source.as_str(), target.as_str()))?;
        self.dataset.resolve_edge(edge)
    }

    pub fn suggestions(&self) -> Vec<&Node> {
        search_suggestions(&self.dataset, &self.criteria.search)
    }

    pub fn related_nodes(&self, id: &str) -> Vec<&Node> {
        self.dataset.related_nodes(id)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::graph::fixtures::{dataset, edge, node};
    use crate::interaction::{PointerButton, QueuedInput};

    fn engine() -> GraphEngine {
        let mut technical = node("D", "memory");
        technical.technical = Some("paged KV cache".to_owned());
        GraphEngine::new(
            dataset(
                vec![
                    node("A", "memory"),
                    node("B", "training"),
                    node("C", "memory"),
                    technical,
                ],
                vec![
                    edge("A", "B", EdgeType::DependsOn),
                    edge("A", "C", EdgeType::Optimizes),
                ],
            ),
            LayoutConfig::default(),
            InteractionConfig::default(),
            Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0)),
        )
    }

    fn settle(engine: &mut GraphEngine) {
        let mut ticks = 0;
        while engine.tick() == TickOutcome::Stepped {
            ticks += 1;
            assert!(ticks < 2_000);
        }
    }

    fn click_at(engine: &mut GraphEngine, id: &str) {
        let position = engine.simulation().position_of(id).unwrap();
        let screen = engine.interaction().viewport().world_to_screen(position);
        engine.handle_pointer(PointerEvent::Pressed {
            pos: screen,
            button: PointerButton::Primary,
        });
        engine.handle_pointer(PointerEvent::Released { pos: screen });
    }

    #[test]
    fn starts_with_everything_visible() {
        let engine = engine();
        assert_eq!(engine.subgraph().nodes.len(), 4);
        assert_eq!(engine.subgraph().edges.len(), 2);
        assert!(engine.is_animating());
        assert!(engine.selection().is_idle());
    }

    #[test]
    fn category_change_restarts_layout_under_new_id() {
        let mut engine = engine();
        let first = engine.simulation_id();

        engine.set_active_categories([CategoryId::from("memory")]);

        assert_ne!(engine.simulation_id(), first);
        assert_eq!(engine.tick_simulation(first), TickOutcome::Superseded);
        assert_eq!(engine.subgraph().nodes.len(), 3);
        assert_eq!(engine.subgraph().edges.len(), 1);
    }

    #[test]
    fn unchanged_subgraph_keeps_running_simulation() {
        let mut engine = engine();
        let first = engine.simulation_id();
        let all = engine.criteria().categories.clone();

        engine.set_active_categories(all);

        assert_eq!(engine.simulation_id(), first);
    }

    #[test]
    fn filtering_out_selection_closes_panel() {
        let mut engine = engine();
        engine.set_selected_node_id(Some("B"));
        assert_eq!(engine.selected_node().map(|node| node.id.as_str()), Some("B"));
        assert!(engine.drain_events().is_empty());

        engine.set_active_categories([CategoryId::from("memory")]);

        assert!(engine.selection().is_idle());
        assert!(engine.selected_node().is_none());
        assert_eq!(engine.drain_events(), vec![GraphEvent::PanelClosed]);
    }

    #[test]
    fn selection_survives_filter_that_keeps_it() {
        let mut engine = engine();
        engine.set_selected_node_id(Some("A"));
        engine.set_active_link_types([EdgeType::DependsOn]);

        assert_eq!(engine.selected_node().map(|node| node.id.as_str()), Some("A"));
        assert_eq!(engine.subgraph().edges.len(), 1);
    }

    #[test]
    fn technical_match_filters_but_never_suggests() {
        let mut engine = engine();
        engine.set_search_text("cache");

        let visible = engine
            .subgraph()
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(visible, vec!["D"]);
        assert!(engine.suggestions().is_empty());
    }

    #[test]
    fn unknown_host_selection_stays_idle() {
        let mut engine = engine();
        engine.set_selected_node_id(Some("missing"));
        assert!(engine.selection().is_idle());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn clicking_node_then_edge_switches_selection() {
        let mut engine = engine();
        settle(&mut engine);

        click_at(&mut engine, "A");
        assert_eq!(engine.selected_node().map(|node| node.id.as_str()), Some("A"));
        assert!(matches!(
            engine.drain_events().as_slice(),
            [GraphEvent::NodeClicked(node)] if node.id.as_str() == "A"
        ));

        let a = engine.simulation().position_of("A").unwrap();
        let b = engine.simulation().position_of("B").unwrap();
        let midpoint = engine.interaction().viewport().world_to_screen((a + b) * 0.5);
        engine.handle_pointer(PointerEvent::Pressed {
            pos: midpoint,
            button: PointerButton::Primary,
        });
        engine.handle_pointer(PointerEvent::Released { pos: midpoint });

        assert!(engine.selected_node().is_none());
        let selected = engine.selected_edge().unwrap();
        assert_eq!(selected.source.id.as_str(), "A");
        assert_eq!(selected.target.id.as_str(), "B");
    }

    #[test]
    fn draw_list_reflects_selection() {
        let mut engine = engine();
        engine.set_selected_node_id(Some("B"));
        let list = engine.draw_list();

        let faded = list
            .nodes
            .iter()
            .filter(|node| node.opacity < 1.0)
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(faded, vec!["C", "D"]);
        assert_eq!(list.edges.len(), 2);
    }

    #[test]
    fn host_input_is_forwarded() {
        let mut engine = engine();
        settle(&mut engine);
        engine.set_selected_node_id(Some("A"));
        let before = engine.simulation().position_of("A").unwrap();

        let mut input = QueuedInput::default();
        input.push(HostInput::Resized(Rect::from_min_size(
            pos2(0.0, 0.0),
            vec2(1000.0, 600.0),
        )));
        input.push(HostInput::FocusSearch);
        input.push(HostInput::Escape);
        engine.pump_input(&mut input);

        let after = engine.simulation().position_of("A").unwrap();
        assert!((after.x - before.x - 100.0).abs() < 1e-3);
        assert!(!engine.is_animating());
        assert!(engine.selection().is_idle());
        assert_eq!(
            engine.drain_events(),
            vec![GraphEvent::SearchFocusRequested, GraphEvent::PanelClosed]
        );
    }
}
