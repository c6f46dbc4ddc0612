use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{map, output, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WellMapApp {
    pub state: AppState,
}

impl WellMapApp {
    /// Build the app and load the dataset named in the config, if any.
    pub fn new(config: AppConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_configured_dataset();
        Self { state }
    }
}

impl eframe::App for WellMapApp {
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

        // ---- Bottom panel: selection output ----
        egui::TopBottomPanel::bottom("selection_panel")
            .resizable(true)
            .min_height(120.0)
            .show(ctx, |ui| {
                output::selection_panel(ui, &self.state);
            });

        // ---- Central panel: map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::well_map(ui, &mut self.state);
        });
    }
}
