use std::borrow::Cow;
use std::collections::HashMap;

use eframe::egui::Color32;

use crate::util::parse_hex_color;

use super::{Category, CategoryId, EdgeType};

pub const FALLBACK_CATEGORY_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);
pub const FALLBACK_LINK_COLOR: Color32 = Color32::from_rgb(0x64, 0x74, 0x8b);

pub struct CategoryMeta {
    pub id: &'static str,
    pub label: &'static str,
    pub color: Color32,
    pub icon: &'static str,
}

pub const BUILTIN_CATEGORIES: [CategoryMeta; 6] = [
    CategoryMeta {
        id: "architecture",
        label: "Architecture",
        color: Color32::from_rgb(0x63, 0x66, 0xf1),
        icon: "🏗",
    },
    CategoryMeta {
        id: "inference",
        label: "Inference",
        color: Color32::from_rgb(0x8b, 0x5c, 0xf6),
        icon: "⚡",
    },
    CategoryMeta {
        id: "memory",
        label: "Memory",
        color: Color32::from_rgb(0xec, 0x48, 0x99),
        icon: "💾",
    },
    CategoryMeta {
        id: "training",
        label: "Training",
        color: Color32::from_rgb(0x10, 0xb9, 0x81),
        icon: "🎓",
    },
    CategoryMeta {
        id: "parallelism",
        label: "Parallelism",
        color: Color32::from_rgb(0xf5, 0x9e, 0x0b),
        icon: "🔀",
    },
    CategoryMeta {
        id: "observability",
        label: "Observability",
        color: Color32::from_rgb(0x06, 0xb6, 0xd4),
        icon: "📊",
    },
];

pub fn link_type_label(edge_type: &EdgeType) -> Cow<'_, str> {
    match edge_type {
        EdgeType::DependsOn => Cow::Borrowed("Depends On"),
        EdgeType::Optimizes => Cow::Borrowed("Optimizes"),
        EdgeType::TradesOff => Cow::Borrowed("Trades Off With"),
        EdgeType::Impacts => Cow::Borrowed("Impacts"),
        EdgeType::RelatedTo => Cow::Borrowed("Related To"),
        EdgeType::Other(raw) => Cow::Borrowed(raw.as_str()),
    }
}

pub fn link_type_color(edge_type: &EdgeType) -> Color32 {
    match edge_type {
        EdgeType::DependsOn => Color32::from_rgb(0xef, 0x44, 0x44),
        EdgeType::Optimizes => Color32::from_rgb(0x10, 0xb9, 0x81),
        EdgeType::TradesOff => Color32::from_rgb(0xf5, 0x9e, 0x0b),
        EdgeType::Impacts => Color32::from_rgb(0x63, 0x66, 0xf1),
        EdgeType::RelatedTo | EdgeType::Other(_) => FALLBACK_LINK_COLOR,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryInfo {
    pub label: String,
    pub color: Color32,
    pub icon: Option<&'static str>,
}

/// Category lookup merged from the dataset's own table and the built-in one.
/// Dataset entries win; ids known to neither resolve to a gray fallback.
#[derive(Clone, Debug, Default)]
pub struct CategoryTable {
    entries: HashMap<CategoryId, CategoryInfo>,
    order: Vec<CategoryId>,
}

impl CategoryTable {
    pub fn new(categories: &[Category]) -> Self {
        let mut table = Self::default();

        for category in categories {
            let builtin = builtin_category(category.id.as_str());
            let color = parse_hex_color(&category.color)
                .or(builtin.map(|meta| meta.color))
                .unwrap_or(FALLBACK_CATEGORY_COLOR);
            table.insert(
                category.id.clone(),
                CategoryInfo {
                    label: category.label.clone(),
                    color,
                    icon: builtin.map(|meta| meta.icon),
                },
            );
        }

        for meta in &BUILTIN_CATEGORIES {
            table.insert(
                CategoryId::from(meta.id),
                CategoryInfo {
                    label: meta.label.to_owned(),
                    color: meta.color,
                    icon: Some(meta.icon),
                },
            );
        }

        table
    }

    fn insert(&mut self, id: CategoryId, info: CategoryInfo) {
        if self.entries.contains_key(&id) {
            return;
        }
        self.order.push(id.clone());
        self.entries.insert(id, info);
    }

    pub fn resolve(&self, id: &CategoryId) -> CategoryInfo {
        self.entries.get(id).cloned().unwrap_or_else(|| CategoryInfo {
            label: id.as_str().to_owned(),
            color: FALLBACK_CATEGORY_COLOR,
            icon: None,
        })
    }

    pub fn color(&self, id: &CategoryId) -> Color32 {
        self.entries
            .get(id)
            .map(|info| info.color)
            .unwrap_or(FALLBACK_CATEGORY_COLOR)
    }

    pub fn ids(&self) -> impl Iterator<Item = &CategoryId> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn builtin_category(id: &str) -> Option<&'static CategoryMeta> {
    BUILTIN_CATEGORIES.iter().find(|meta| meta.id == id)
}
