use std::path::Path;
use std::sync::Arc;

use rusty_pillars::config::DashboardConfig;
use rusty_pillars::data::filter::DataSample;
use rusty_pillars::data::loader::{CachedLoader, load_file};
use rusty_pillars::pillar::{Evaluation, Pillar, Query, evaluate_view};
use rusty_pillars::Dataset;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Current selection.
    pub country: String,
    pub min_year: i32,
    pub max_year: i32,
    pub pillar: Pillar,

    /// Result for the current selection (cached until the selection changes).
    pub evaluation: Option<Evaluation>,

    /// Tail of the filtered view for the data-sample table.
    pub sample: Option<DataSample>,

    /// Colours for the active pillar's series.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            country: String::new(),
            min_year: 0,
            max_year: 0,
            pillar: Pillar::Burden,
            evaluation: None,
            sample: None,
            color_map: ColorMap::for_pillar(Pillar::Burden),
            status_message: None,
        }
    }

    /// Load the configured dataset once at start-up. A missing file is not
    /// fatal: the user can still open one from the menu.
    pub fn load_initial(&mut self, loader: &CachedLoader) {
        match loader.load() {
            Ok(ds) => self.set_dataset(ds),
            Err(e) => {
                log::warn!("No dataset at start-up: {e:#}");
                self.status_message = Some(format!(
                    "Could not load {}: {e:#}",
                    loader.path().display()
                ));
            }
        }
    }

    /// Replace the dataset with the contents of `path`.
    pub fn load_path(&mut self, path: &Path) {
        match load_file(path) {
            Ok(ds) => self.set_dataset(Arc::new(ds)),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the selection to defaults.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.country = self.config.initial_country(&dataset).unwrap_or_default();
        let (lo, hi) = dataset.year_bounds().unwrap_or((0, 0));
        self.min_year = lo;
        self.max_year = hi;

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.dataset.as_ref().and_then(|ds| ds.year_bounds())
    }

    pub fn set_country(&mut self, country: String) {
        if country != self.country {
            self.country = country;
            self.refresh();
        }
    }

    /// Update the year range, dragging the other end along so the range
    /// never inverts.
    pub fn set_years(&mut self, min_year: i32, max_year: i32) {
        let (min_year, max_year) = if min_year != self.min_year {
            (min_year, max_year.max(min_year))
        } else {
            (min_year.min(max_year), max_year)
        };
        if (min_year, max_year) != (self.min_year, self.max_year) {
            self.min_year = min_year;
            self.max_year = max_year;
            self.refresh();
        }
    }

    pub fn set_pillar(&mut self, pillar: Pillar) {
        if pillar != self.pillar {
            self.pillar = pillar;
            self.color_map = ColorMap::for_pillar(pillar);
            self.refresh();
        }
    }

    /// Re-run the pipeline for the current selection.
    pub fn refresh(&mut self) {
        let Some(ds) = &self.dataset else {
            self.evaluation = None;
            self.sample = None;
            return;
        };

        let query = Query::new(self.country.clone(), self.min_year, self.max_year, self.pillar);
        match query.view(ds) {
            Ok(view) => {
                self.status_message = None;
                self.evaluation = Some(evaluate_view(&query, &view));
                self.sample = Some(view.tail_sample(self.config.sample_rows));
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(e.to_string());
                self.evaluation = None;
                self.sample = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rusty_pillars::{Column, Record};

    use super::*;

    fn state() -> AppState {
        let day = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let ds = Dataset::with_full_schema(vec![
            Record::new("United States", day).with(Column::TotalCases, 100.0)
        ]);
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(Arc::new(ds));
        state
    }

    #[test]
    fn inverted_range_reports_then_clears_on_next_good_refresh() {
        let mut state = state();
        assert_eq!(state.country, "United States");
        assert!(state.evaluation.is_some());

        state.min_year = 2022;
        state.max_year = 2019;
        state.refresh();
        assert!(state.evaluation.is_none());
        assert!(state.status_message.is_some());

        state.min_year = 2021;
        state.max_year = 2021;
        state.refresh();
        assert!(state.status_message.is_none());
        assert_eq!(
            state.evaluation.unwrap().metrics.value("total_cases"),
            Some(100.0)
        );
    }

    #[test]
    fn year_sliders_never_invert() {
        let mut state = state();
        state.set_years(2021, 2021);
        state.set_years(2021, 2020);
        assert_eq!((state.min_year, state.max_year), (2020, 2020));
        state.set_years(2023, 2020);
        assert_eq!((state.min_year, state.max_year), (2023, 2023));
    }
}
