//! Layout and interaction engine for labeled, directed concept graphs: a
//! filter pipeline, a force-directed simulation, a selection state machine
//! with hit-testing, and a render adapter producing flat draw lists.

pub mod engine;
pub mod filter;
pub mod graph;
pub mod highlight;
pub mod interaction;
pub mod physics;
pub mod render;
pub mod util;

pub use engine::GraphEngine;
pub use graph::{load_graph, parse_graph};
