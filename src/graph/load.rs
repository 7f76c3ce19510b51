use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use tracing::info;

use super::{Dataset, GraphData};

pub fn load_graph(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph dataset {}", path.display()))?;

    let dataset = parse_graph(&raw)
        .with_context(|| format!("failed to parse graph dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = dataset.node_count(),
        edges = dataset.edge_count(),
        "loaded graph dataset"
    );
    Ok(dataset)
}

pub fn parse_graph(raw: &str) -> Result<Dataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in graph dataset")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("graph dataset must be a JSON object with nodes and links"))?;

    if !object.contains_key("nodes") {
        bail!("graph dataset has no \"nodes\" array");
    }

    let data: GraphData = serde_json::from_value(parsed)
        .context("graph dataset does not match the node/link schema")?;
    Dataset::new(data)
}
