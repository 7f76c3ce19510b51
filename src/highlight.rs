use std::collections::HashSet;

use crate::interaction::Selection;
use crate::physics::Simulation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightKind {
    Node,
    Edge,
}

/// Arena indices that stay opaque for the current selection; everything
/// outside these sets is faded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightState {
    pub kind: HighlightKind,
    /// The selected node for node highlights.
    pub focus: Option<usize>,
    pub nodes: HashSet<usize>,
    pub edges: HashSet<usize>,
}

impl HighlightState {
    pub fn contains_node(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    pub fn contains_edge(&self, index: usize) -> bool {
        self.edges.contains(&index)
    }
}

/// `None` means nothing is emphasized: idle, or the selection is not part of
/// the running simulation.
pub fn build_highlight_state(
    simulation: &Simulation,
    selection: &Selection,
) -> Option<HighlightState> {
    match selection {
        Selection::Idle => None,
        Selection::Node(id) => {
            let selected = simulation.index_of(id.as_str())?;
            let mut nodes = HashSet::from([selected]);
            let mut edges = HashSet::new();
            for &edge_index in simulation.incident_edges(selected) {
                let edge = &simulation.edges()[edge_index];
                edges.insert(edge_index);
                nodes.extend(edge.source.index());
                nodes.extend(edge.target.index());
            }
            Some(HighlightState {
                kind: HighlightKind::Node,
                focus: Some(selected),
                nodes,
                edges,
            })
        }
        Selection::Edge { source, target } => {
            let from = simulation.index_of(source.as_str())?;
            let to = simulation.index_of(target.as_str())?;
            let edges = simulation
                .incident_edges(from)
                .iter()
                .copied()
                .filter(|&edge_index| {
                    let edge = &simulation.edges()[edge_index];
                    edge.source.index() == Some(from) && edge.target.index() == Some(to)
                })
                .collect::<HashSet<_>>();
            if edges.is_empty() {
                return None;
            }
            Some(HighlightState {
                kind: HighlightKind::Edge,
                focus: None,
                nodes: HashSet::from([from, to]),
                edges,
            })
        }
    }
}
