use std::collections::{BTreeSet, HashSet};

use crate::graph::{CategoryId, Dataset, Edge, EdgeType, Node};

pub const SUGGESTION_LIMIT: usize = 8;

/// Inputs of the filter stage. `link_types == None` disables link-type
/// filtering; an empty set hides every edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub categories: BTreeSet<CategoryId>,
    pub link_types: Option<BTreeSet<EdgeType>>,
    pub search: String,
}

impl FilterCriteria {
    /// Every category and link type present in the dataset or its metadata.
    pub fn all(dataset: &Dataset) -> Self {
        let mut categories = dataset.categories().ids().cloned().collect::<BTreeSet<_>>();
        categories.extend(dataset.nodes().iter().map(|node| node.category.clone()));

        let mut link_types = EdgeType::BUILTIN.into_iter().collect::<BTreeSet<_>>();
        link_types.extend(dataset.links().iter().map(|edge| edge.edge_type.clone()));

        Self {
            categories,
            link_types: Some(link_types),
            search: String::new(),
        }
    }

    pub fn search_query(&self) -> Option<String> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subgraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id.as_str() == id)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edges.iter().any(|edge| edge.connects(source, target))
    }
}

/// Derives the displayable subgraph. Relative dataset order is preserved and
/// edges whose endpoints did not survive are dropped.
pub fn filter_graph(dataset: &Dataset, criteria: &FilterCriteria) -> Subgraph {
    let query = criteria.search_query();

    let nodes = dataset
        .nodes()
        .iter()
        .filter(|node| criteria.categories.contains(&node.category))
        .filter(|node| {
            query.as_deref().is_none_or(|needle| {
                node.summary_fields()
                    .chain(node.detail_fields())
                    .any(|field| contains_folded(field, needle))
            })
        })
        .cloned()
        .collect::<Vec<_>>();

    let kept = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let edges = dataset
        .links()
        .iter()
        .filter(|edge| {
            criteria
                .link_types
                .as_ref()
                .is_none_or(|types| types.contains(&edge.edge_type))
        })
        .filter(|edge| kept.contains(edge.source.as_str()) && kept.contains(edge.target.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    Subgraph { nodes, edges }
}

/// Suggestion list for the search box: name/description matches across the
/// whole dataset, first [`SUGGESTION_LIMIT`] in dataset order.
pub fn search_suggestions<'a>(dataset: &'a Dataset, search: &str) -> Vec<&'a Node> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    dataset
        .nodes()
        .iter()
        .filter(|node| node.summary_fields().any(|field| contains_folded(field, &needle)))
        .take(SUGGESTION_LIMIT)
        .collect()
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}
