use std::path::Path;

use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AirQualityApp {
    pub state: AppState,
}

impl AirQualityApp {
    /// Start with the dataset at `path`. A failed load leaves the app showing
    /// the error instead of the dashboard.
    pub fn with_dataset(path: &Path) -> Self {
        let mut app = Self::default();
        app.state.open(path);
        app
    }
}

impl eframe::App for AirQualityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tabs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Air Quality Analysis Dashboard");
            ui.separator();
            tabs::dashboard(ui, &mut self.state);
        });
    }
}
