mod app;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use concept_graph::interaction::{InteractionConfig, ReclickPolicy};
use concept_graph::load_graph;
use concept_graph::physics::LayoutConfig;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Reclick {
    Replace,
    Toggle,
}

impl From<Reclick> for ReclickPolicy {
    fn from(value: Reclick) -> Self {
        match value {
            Reclick::Replace => ReclickPolicy::Replace,
            Reclick::Toggle => ReclickPolicy::Toggle,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON dataset with `nodes`, `links` and `categories`.
    #[arg(long)]
    data: PathBuf,
    /// What clicking the already-selected node or edge does.
    #[arg(long, value_enum, default_value = "replace")]
    reclick: Reclick,
    #[arg(long, default_value_t = -400.0, allow_negative_numbers = true)]
    charge: f32,
    #[arg(long, default_value_t = 120.0)]
    link_distance: f32,
    #[arg(long, default_value_t = 35.0)]
    collide_radius: f32,
}

impl Args {
    fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            charge: self.charge,
            link_distance: self.link_distance,
            collide_radius: self.collide_radius,
            ..LayoutConfig::default()
        }
    }

    fn interaction(&self) -> InteractionConfig {
        InteractionConfig {
            reclick: self.reclick.into(),
            ..InteractionConfig::default()
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let dataset = load_graph(&args.data)?;
    let layout = args.layout();
    let interaction = args.interaction();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "concept-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ConceptGraphApp::new(
                cc,
                dataset,
                layout,
                interaction,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to run the graph viewer: {error}"))
}
