//! Pillar query pipeline.
//!
//! ```text
//!  Dataset + Query
//!        │  validate (min_year <= max_year)
//!        ▼
//!   FilteredView     country + year range, date-ordered
//!        │  guard (per pillar)
//!        ▼
//!   PillarDef        metric + series formulas
//!        │
//!        ▼
//!   Evaluation       MetricSet, SeriesSet, no-data flag
//! ```
//!
//! Evaluation is pure: the dataset is only read, and every call allocates
//! its own outputs.

mod aggregate;
mod formulas;
mod output;

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::filter::FilteredView;
use crate::data::model::Dataset;

use formulas::PillarDef;

pub use output::{Metric, MetricFormat, MetricSet, Series, SeriesPoint, SeriesSet};

// ---------------------------------------------------------------------------
// Pillar
// ---------------------------------------------------------------------------

/// The analytical lens selecting which metrics and series are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Burden,
    Strain,
    Response,
}

impl Pillar {
    pub const ALL: [Pillar; 3] = [Pillar::Burden, Pillar::Strain, Pillar::Response];

    fn def(self) -> &'static PillarDef {
        match self {
            Pillar::Burden => &formulas::BURDEN,
            Pillar::Strain => &formulas::STRAIN,
            Pillar::Response => &formulas::RESPONSE,
        }
    }

    /// Human readable name, e.g. "Disease Burden".
    pub fn title(self) -> &'static str {
        self.def().title
    }

    pub fn y_axis_label(self) -> &'static str {
        self.def().y_axis_label
    }

    pub fn no_data_message(self) -> &'static str {
        self.def().no_data_message
    }

    pub fn chart_title(self, country: &str) -> String {
        format!("{} {country}", self.def().chart_title_prefix)
    }

    /// Metric keys in output order.
    pub fn metric_keys(self) -> impl Iterator<Item = &'static str> {
        self.def().metrics.iter().map(|m| m.key)
    }

    /// Series keys in output order.
    pub fn series_keys(self) -> impl Iterator<Item = &'static str> {
        self.def().series.iter().map(|s| s.key)
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Pillar {
    type Err = InvalidQuery;

    /// Accepts the short names (`burden`, `strain`, `response`) and the
    /// display titles, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Pillar::ALL
            .into_iter()
            .find(|p| {
                let short = match p {
                    Pillar::Burden => "burden",
                    Pillar::Strain => "strain",
                    Pillar::Response => "response",
                };
                wanted.eq_ignore_ascii_case(short) || wanted.eq_ignore_ascii_case(p.title())
            })
            .ok_or_else(|| InvalidQuery::UnknownPillar(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Errors for queries that violate the caller contract. Absence of data is
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQuery {
    #[error("invalid query: year range {min_year}..={max_year} has min > max")]
    YearRange { min_year: i32, max_year: i32 },
    #[error("invalid query: unknown pillar '{0}'")]
    UnknownPillar(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Matched exactly against `location`.
    pub country: String,
    pub min_year: i32,
    pub max_year: i32,
    pub pillar: Pillar,
}

impl Query {
    pub fn new(country: impl Into<String>, min_year: i32, max_year: i32, pillar: Pillar) -> Self {
        Query {
            country: country.into(),
            min_year,
            max_year,
            pillar,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidQuery> {
        if self.min_year > self.max_year {
            return Err(InvalidQuery::YearRange {
                min_year: self.min_year,
                max_year: self.max_year,
            });
        }
        Ok(())
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.min_year..=self.max_year
    }

    /// Validate, then filter `dataset` down to this query's rows.
    pub fn view<'a>(&self, dataset: &'a Dataset) -> Result<FilteredView<'a>, InvalidQuery> {
        self.validate()?;
        Ok(FilteredView::new(dataset, &self.country, self.years()))
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Result of one pipeline pass. Metric and series keys are always the full
/// set for the pillar; only values vary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub pillar: Pillar,
    pub country: String,
    pub min_year: i32,
    pub max_year: i32,
    /// Rows in the filtered view.
    pub rows: usize,
    /// Set when the pillar's data guard failed; metrics are then all null
    /// and series carry no points.
    pub no_data: bool,
    pub message: Option<&'static str>,
    pub chart_title: String,
    pub metrics: MetricSet,
    pub series: SeriesSet,
}

/// Filter `dataset` by `query` and compute the pillar's metrics and series.
pub fn evaluate(dataset: &Dataset, query: &Query) -> Result<Evaluation, InvalidQuery> {
    let view = query.view(dataset)?;
    Ok(evaluate_view(query, &view))
}

/// Compute a pillar over an already filtered view.
pub fn evaluate_view(query: &Query, view: &FilteredView<'_>) -> Evaluation {
    let def = query.pillar.def();
    let has_data = (def.has_data)(view);

    log::debug!(
        "evaluate {:?} for '{}' {}..={}: {} rows, has_data={has_data}",
        query.pillar,
        query.country,
        query.min_year,
        query.max_year,
        view.len()
    );

    let mut metrics = MetricSet::default();
    let mut series = SeriesSet::default();

    if has_data {
        let values = (def.metric_values)(view);
        debug_assert_eq!(values.len(), def.metrics.len());
        for (m, value) in def.metrics.iter().zip(values) {
            metrics.push(Metric {
                key: m.key,
                label: m.label,
                format: m.format,
                value: value.filter(|v| v.is_finite()),
            });
        }
        for s in (def.series_values)(view) {
            series.push(s);
        }
    } else {
        for m in def.metrics {
            metrics.push(Metric {
                key: m.key,
                label: m.label,
                format: m.format,
                value: None,
            });
        }
        for s in def.series {
            series.push(Series::excluded(s.key, s.label));
        }
    }

    Evaluation {
        pillar: query.pillar,
        country: query.country.clone(),
        min_year: query.min_year,
        max_year: query.max_year,
        rows: view.len(),
        no_data: !has_data,
        message: (!has_data).then_some(def.no_data_message),
        chart_title: query.pillar.chart_title(&query.country),
        metrics,
        series,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{Column, Record};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn testland() -> Dataset {
        Dataset::with_full_schema(vec![
            Record::new("Testland", date(2021, 3, 1))
                .with(Column::TotalCases, 100.0)
                .with(Column::TotalDeaths, 5.0)
                .with(Column::NewCases, 10.0),
        ])
    }

    #[test]
    fn pillar_parses_short_names_and_titles() {
        assert_eq!("burden".parse::<Pillar>(), Ok(Pillar::Burden));
        assert_eq!("Healthcare System Strain".parse::<Pillar>(), Ok(Pillar::Strain));
        assert_eq!(" RESPONSE ".parse::<Pillar>(), Ok(Pillar::Response));
        assert_eq!(
            "vibes".parse::<Pillar>(),
            Err(InvalidQuery::UnknownPillar("vibes".to_string()))
        );
    }

    #[test]
    fn keys_follow_pillar_definitions() {
        let ds = testland();
        for pillar in Pillar::ALL {
            let eval = evaluate(&ds, &Query::new("Testland", 2021, 2021, pillar)).unwrap();
            assert_eq!(
                eval.metrics.keys().collect::<Vec<_>>(),
                pillar.metric_keys().collect::<Vec<_>>()
            );
            assert_eq!(
                eval.series.keys().collect::<Vec<_>>(),
                pillar.series_keys().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn no_data_carries_pillar_message() {
        let ds = testland();
        let eval = evaluate(&ds, &Query::new("Testland", 2021, 2021, Pillar::Strain)).unwrap();
        assert!(eval.no_data);
        assert_eq!(eval.message, Some(Pillar::Strain.no_data_message()));
        assert_eq!(eval.chart_title, "Hospital System Strain in Testland");
    }

    #[test]
    fn inverted_range_is_rejected_before_filtering() {
        let ds = testland();
        let err = evaluate(&ds, &Query::new("Testland", 2022, 2019, Pillar::Burden)).unwrap_err();
        assert_eq!(
            err,
            InvalidQuery::YearRange {
                min_year: 2022,
                max_year: 2019
            }
        );
    }
}
