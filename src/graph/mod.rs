use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;

mod load;
pub mod meta;

pub use load::{load_graph, parse_graph};
pub use meta::{CategoryInfo, CategoryTable};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(NodeId);
string_id!(CategoryId);

/// Relation kind carried by an edge. Unrecognized kinds are kept verbatim so
/// they can still be labeled and filtered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeType {
    DependsOn,
    Optimizes,
    TradesOff,
    Impacts,
    RelatedTo,
    Other(String),
}

impl EdgeType {
    pub const BUILTIN: [EdgeType; 5] = [
        EdgeType::DependsOn,
        EdgeType::Optimizes,
        EdgeType::TradesOff,
        EdgeType::Impacts,
        EdgeType::RelatedTo,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::DependsOn => "depends_on",
            Self::Optimizes => "optimizes",
            Self::TradesOff => "trades_off",
            Self::Impacts => "impacts",
            Self::RelatedTo => "related_to",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for EdgeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "depends_on" => Self::DependsOn,
            "optimizes" => Self::Optimizes,
            "trades_off" => Self::TradesOff,
            "impacts" => Self::Impacts,
            "related_to" => Self::RelatedTo,
            _ => Self::Other(value),
        }
    }
}

impl From<EdgeType> for String {
    fn from(value: EdgeType) -> Self {
        match value {
            EdgeType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub category: CategoryId,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitudes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradeoffs: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_lines: Vec<u32>,
}

impl Node {
    /// Name and description only; these feed the suggestion list.
    pub fn summary_fields(&self) -> impl Iterator<Item = &str> {
        [self.name.as_str(), self.description.as_str()].into_iter()
    }

    pub fn detail_fields(&self) -> impl Iterator<Item = &str> {
        [&self.technical, &self.magnitudes, &self.tradeoffs]
            .into_iter()
            .filter_map(|field| field.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Edge {
    pub fn touches(&self, id: &str) -> bool {
        self.source.as_str() == id || self.target.as_str() == id
    }

    pub fn connects(&self, source: &str, target: &str) -> bool {
        self.source.as_str() == source && self.target.as_str() == target
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub label: String,
    pub color: String,
}

/// Raw dataset exactly as supplied by the loader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Edge>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// An edge paired with both of its endpoint records, built for detail display.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEdge {
    pub source: Node,
    pub target: Node,
    pub edge_type: EdgeType,
    pub description: Option<String>,
}

impl ResolvedEdge {
    pub fn summary(&self) -> String {
        if let Some(description) = self.description.as_deref().filter(|text| !text.is_empty()) {
            return description.to_owned();
        }

        format!(
            "{} {} {}.",
            self.source.name,
            meta::link_type_label(&self.edge_type).to_lowercase(),
            self.target.name
        )
    }
}

/// Read-only dataset plus the indexes derived from it at load.
#[derive(Clone, Debug)]
pub struct Dataset {
    data: GraphData,
    index_by_id: HashMap<NodeId, usize>,
    categories: CategoryTable,
}

impl Dataset {
    pub fn new(data: GraphData) -> Result<Self> {
        let mut index_by_id = HashMap::with_capacity(data.nodes.len());
        for (index, node) in data.nodes.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                bail!("duplicate node id {:?} in dataset", node.id.as_str());
            }
        }

        let dangling = data
            .links
            .iter()
            .filter(|edge| {
                !index_by_id.contains_key(&edge.source) || !index_by_id.contains_key(&edge.target)
            })
            .count();
        if dangling > 0 {
            warn!(dangling, "dataset has edges referencing unknown nodes; they will not be shown");
        }

        let categories = CategoryTable::new(&data.categories);
        Ok(Self {
            data,
            index_by_id,
            categories,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.data.nodes
    }

    pub fn links(&self) -> &[Edge] {
        &self.data.links
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_by_id.get(id).map(|&index| &self.data.nodes[index])
    }

    pub fn node_count(&self) -> usize {
        self.data.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.data.links.len()
    }

    /// Nodes directly linked to `id` in either direction, in dataset order.
    pub fn related_nodes(&self, id: &str) -> Vec<&Node> {
        let neighbors = self
            .data
            .links
            .iter()
            .filter_map(|edge| {
                if edge.source.as_str() == id {
                    Some(edge.target.as_str())
                } else if edge.target.as_str() == id {
                    Some(edge.source.as_str())
                } else {
                    None
                }
            })
            .collect::<HashSet<_>>();

        self.data
            .nodes
            .iter()
            .filter(|node| node.id.as_str() != id && neighbors.contains(node.id.as_str()))
            .collect()
    }

    pub fn resolve_edge(&self, edge: &Edge) -> Option<ResolvedEdge> {
        let source = self.node(edge.source.as_str())?;
        let target = self.node(edge.target.as_str())?;
        Some(ResolvedEdge {
            source: source.clone(),
            target: target.clone(),
            edge_type: edge.edge_type.clone(),
            description: edge.description.clone(),
        })
    }
}
