use eframe::egui::{self, Align, Context, Layout};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("concept-graph");
                    ui.separator();
                    ui.label(format!(
                        "concepts: {}/{}",
                        self.engine.subgraph().nodes.len(),
                        self.engine.dataset().node_count()
                    ));
                    ui.label(format!(
                        "links: {}/{}",
                        self.engine.subgraph().edges.len(),
                        self.engine.dataset().edge_count()
                    ));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.engine.is_animating() {
                            ui.label("settling…");
                        }
                        ui.small("Ctrl+K search · Esc close");
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        if !self.engine.selection().is_idle() {
            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(360.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }
}
