use eframe::egui;
use rusty_pillars::config::DashboardConfig;
use rusty_pillars::data::loader::CachedLoader;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyPillarsApp {
    pub state: AppState,
}

impl RustyPillarsApp {
    pub fn new(config: DashboardConfig) -> Self {
        let loader = CachedLoader::new(config.data_path.clone());
        let mut state = AppState::new(config);
        state.load_initial(&loader);
        Self { state }
    }
}

impl eframe::App for RustyPillarsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: dashboard controls ----
        egui::SidePanel::left("controls_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, chart, data sample ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::pillar_header(ui, &self.state);
            panels::metric_cards(ui, &self.state);
            ui.separator();
            plot::pillar_plot(ui, &self.state);
            panels::data_sample(ui, &self.state);
        });
    }
}
