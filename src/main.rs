mod app;
mod color;
mod state;
mod ui;

use app::RustyPillarsApp;
use eframe::egui;
use rusty_pillars::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!("Starting dashboard with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "COVID-19: Three Pillars Analysis Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RustyPillarsApp::new(config)))),
    )
}
