use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_pillars::Pillar;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – dashboard controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard Controls");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Country ----
            ui.strong("Select Country:");
            let mut country = state.country.clone();
            egui::ComboBox::from_id_salt("country")
                .selected_text(country.as_str())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for c in dataset.countries() {
                        ui.selectable_value(&mut country, c.clone(), c.as_str());
                    }
                });
            state.set_country(country);
            ui.add_space(8.0);

            // ---- Year range ----
            ui.strong("Select Year Range:");
            if let Some((lo, hi)) = state.year_bounds() {
                let mut min_year = state.min_year;
                let mut max_year = state.max_year;
                ui.add(egui::Slider::new(&mut min_year, lo..=hi).text("from"));
                ui.add(egui::Slider::new(&mut max_year, lo..=hi).text("to"));
                state.set_years(min_year, max_year);
            }
            ui.add_space(8.0);

            // ---- Pillar ----
            ui.strong("Focus Analysis Pillar:");
            let mut pillar = state.pillar;
            for p in Pillar::ALL {
                ui.radio_value(&mut pillar, p, p.title());
            }
            state.set_pillar(pillar);

            ui.separator();
            key_insights(ui);
        });
}

fn key_insights(ui: &mut Ui) {
    ui.heading("Key Insights");
    ui.label(RichText::new("Three Pillars Framework:").strong());
    ui.label("• Burden: case numbers, mortality rates, peak impacts");
    ui.label("• System Strain: hospital capacity, ICU utilization");
    ui.label("• Government Response: restrictions, testing, vaccination");
}

// ---------------------------------------------------------------------------
// Central panel – header, metric cards, data sample
// ---------------------------------------------------------------------------

pub fn pillar_header(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        return;
    }
    ui.heading(format!("{} Analysis: {}", state.pillar.title(), state.country));
    ui.add_space(4.0);
}

/// One card per metric; a warning instead when the pillar has no data.
pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    let Some(eval) = &state.evaluation else {
        return;
    };

    if let Some(message) = eval.message {
        ui.label(RichText::new(message).color(Color32::from_rgb(230, 160, 30)));
        return;
    }

    let metrics: Vec<_> = eval.metrics.iter().collect();
    ui.columns(metrics.len().max(1), |columns| {
        for (col, metric) in columns.iter_mut().zip(&metrics) {
            col.group(|ui: &mut Ui| {
                ui.label(metric.label);
                ui.label(RichText::new(metric.display()).size(22.0).strong());
            });
        }
    });
}

/// Collapsible tail of the filtered rows.
pub fn data_sample(ui: &mut Ui, state: &AppState) {
    let Some(sample) = &state.sample else {
        return;
    };

    egui::CollapsingHeader::new("View Data Sample")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if sample.rows.is_empty() {
                ui.label("No data available for the selected filters");
                return;
            }
            egui::Grid::new("data_sample")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("date");
                    for c in &sample.columns {
                        ui.strong(c.name());
                    }
                    ui.end_row();

                    for row in &sample.rows {
                        ui.label(row.date.to_string());
                        for v in &row.values {
                            ui.label(v.map(|v| v.to_string()).unwrap_or_default());
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state.evaluation.as_ref().map_or(0, |e| e.rows);
            ui.label(format!(
                "{} rows loaded, {} countries, {visible} selected",
                ds.len(),
                ds.countries().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open COVID-19 dataset")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
