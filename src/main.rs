mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::WellMapApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Well Curve Map – Log Availability Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(WellMapApp::new(config)))),
    )
}
