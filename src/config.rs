use std::env;
use std::path::PathBuf;

use crate::data::model::Dataset;

/// Start-up settings for the dashboard, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Dataset loaded at start-up (`RUSTY_PILLARS_DATA`).
    pub data_path: PathBuf,
    /// Country selected initially when present (`RUSTY_PILLARS_COUNTRY`).
    pub default_country: String,
    /// Rows in the data-sample table (`RUSTY_PILLARS_SAMPLE_ROWS`).
    pub sample_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("covid-data.csv"),
            default_country: "United States".to_string(),
            sample_rows: 10,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let sample_rows = match lookup("RUSTY_PILLARS_SAMPLE_ROWS") {
            None => defaults.sample_rows,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!(
                    "RUSTY_PILLARS_SAMPLE_ROWS={raw:?} is not a row count, using {}",
                    defaults.sample_rows
                );
                defaults.sample_rows
            }),
        };

        Self {
            data_path: lookup("RUSTY_PILLARS_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            default_country: lookup("RUSTY_PILLARS_COUNTRY").unwrap_or(defaults.default_country),
            sample_rows,
        }
    }

    /// The configured country if the dataset has it, else the first one
    /// alphabetically.
    pub fn initial_country(&self, dataset: &Dataset) -> Option<String> {
        let countries = dataset.countries();
        countries
            .iter()
            .find(|c| **c == self.default_country)
            .or_else(|| countries.first())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::Record;

    fn from_map(pairs: &[(&str, &str)]) -> DashboardConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(from_map(&[]), DashboardConfig::default());
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let cfg = from_map(&[
            ("RUSTY_PILLARS_DATA", "/data/owid.parquet"),
            ("RUSTY_PILLARS_COUNTRY", "France"),
            ("RUSTY_PILLARS_SAMPLE_ROWS", "many"),
        ]);
        assert_eq!(cfg.data_path, PathBuf::from("/data/owid.parquet"));
        assert_eq!(cfg.default_country, "France");
        assert_eq!(cfg.sample_rows, 10);
    }

    #[test]
    fn initial_country_falls_back_to_first() {
        let day = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let ds = Dataset::with_full_schema(vec![
            Record::new("Peru", day),
            Record::new("Chile", day),
        ]);
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.initial_country(&ds).as_deref(), Some("Chile"));

        let cfg = DashboardConfig {
            default_country: "Peru".into(),
            ..DashboardConfig::default()
        };
        assert_eq!(cfg.initial_country(&ds).as_deref(), Some("Peru"));
    }
}
