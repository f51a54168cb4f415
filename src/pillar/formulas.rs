//! Metric and series tables for the three pillars.
//!
//! Each pillar is a [`PillarDef`]: display metadata, the ordered metric and
//! series keys, a data guard, and the functions computing values over a
//! non-empty view that passed the guard.

use crate::data::filter::FilteredView;
use crate::data::model::Column;

use super::aggregate::{any_present, max, mean};
use super::output::{MetricFormat, Series, SeriesPoint};

pub(crate) struct MetricDef {
    pub key: &'static str,
    pub label: &'static str,
    pub format: MetricFormat,
}

pub(crate) struct SeriesDef {
    pub key: &'static str,
    pub label: &'static str,
    pub column: Column,
    /// Drawn whenever the pillar has data; otherwise only when the view has
    /// at least one value in `column`.
    pub required: bool,
}

pub(crate) struct PillarDef {
    pub title: &'static str,
    pub chart_title_prefix: &'static str,
    pub y_axis_label: &'static str,
    pub no_data_message: &'static str,
    pub metrics: &'static [MetricDef],
    pub series: &'static [SeriesDef],
    pub has_data: fn(&FilteredView<'_>) -> bool,
    /// Aligned with `metrics`.
    pub metric_values: fn(&FilteredView<'_>) -> Vec<Option<f64>>,
    /// Aligned with `series`.
    pub series_values: fn(&FilteredView<'_>) -> Vec<Series>,
}

const NO_DATA: &str = "No data available for the selected filters";

fn not_empty(view: &FilteredView<'_>) -> bool {
    !view.is_empty()
}

fn plot(
    view: &FilteredView<'_>,
    key: &'static str,
    label: &'static str,
    column: Column,
    included: bool,
) -> Series {
    if !included {
        return Series::excluded(key, label);
    }
    Series {
        key,
        label,
        included,
        points: view
            .points(column)
            .map(|(date, value)| SeriesPoint { date, value })
            .collect(),
    }
}

fn line(view: &FilteredView<'_>, def: &SeriesDef) -> Series {
    let included = def.required || any_present(view.values(def.column));
    plot(view, def.key, def.label, def.column, included)
}

fn table_series(def: &PillarDef, view: &FilteredView<'_>) -> Vec<Series> {
    def.series.iter().map(|s| line(view, s)).collect()
}

// ---------------------------------------------------------------------------
// Disease burden
// ---------------------------------------------------------------------------

pub(crate) static BURDEN: PillarDef = PillarDef {
    title: "Disease Burden",
    chart_title_prefix: "COVID-19 Cases in",
    y_axis_label: "Daily Cases",
    no_data_message: NO_DATA,
    metrics: &[
        MetricDef {
            key: "total_cases",
            label: "Total Cases",
            format: MetricFormat::Count,
        },
        MetricDef {
            key: "total_deaths",
            label: "Total Deaths",
            format: MetricFormat::Count,
        },
        MetricDef {
            key: "mortality_rate",
            label: "Mortality Rate",
            format: MetricFormat::Percent2,
        },
        MetricDef {
            key: "peak_daily_cases",
            label: "Peak Daily Cases",
            format: MetricFormat::Count,
        },
    ],
    series: &[SeriesDef {
        key: "cases",
        label: "Daily Cases",
        column: Column::NewCases,
        required: true,
    }],
    has_data: not_empty,
    metric_values: burden_metrics,
    series_values: burden_series,
};

fn burden_metrics(view: &FilteredView<'_>) -> Vec<Option<f64>> {
    let total_cases = max(view.values(Column::TotalCases));
    let total_deaths = max(view.values(Column::TotalDeaths));
    let mortality_rate = match total_cases {
        Some(cases) if cases > 0.0 => total_deaths.map(|deaths| deaths / cases * 100.0),
        _ => Some(0.0),
    };
    let peak_daily_cases = max(view.values(Column::NewCases));

    vec![total_cases, total_deaths, mortality_rate, peak_daily_cases]
}

fn burden_series(view: &FilteredView<'_>) -> Vec<Series> {
    // Fall back only when the smoothed column is missing from the schema,
    // not when it is null on some rows.
    let smoothed = view.has_column(Column::NewCasesSmoothed);
    BURDEN
        .series
        .iter()
        .map(|def| {
            if smoothed {
                plot(
                    view,
                    def.key,
                    "Daily Cases (smoothed)",
                    Column::NewCasesSmoothed,
                    true,
                )
            } else {
                line(view, def)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Healthcare system strain
// ---------------------------------------------------------------------------

pub(crate) static STRAIN: PillarDef = PillarDef {
    title: "Healthcare System Strain",
    chart_title_prefix: "Hospital System Strain in",
    y_axis_label: "Patients",
    no_data_message: "Hospitalization data not available for selected country/time period",
    metrics: &[
        MetricDef {
            key: "peak_hospital_patients",
            label: "Peak Hospital Patients",
            format: MetricFormat::Count,
        },
        MetricDef {
            key: "beds_per_1000",
            label: "Hospital Beds per 1000",
            format: MetricFormat::Decimal1,
        },
        MetricDef {
            key: "peak_strain_ratio",
            label: "Peak Strain Ratio",
            format: MetricFormat::Ratio,
        },
    ],
    series: &[
        SeriesDef {
            key: "hospital_patients",
            label: "Hospital Patients",
            column: Column::HospPatients,
            required: true,
        },
        SeriesDef {
            key: "icu_patients",
            label: "ICU Patients",
            column: Column::IcuPatients,
            required: false,
        },
    ],
    has_data: strain_has_data,
    metric_values: strain_metrics,
    series_values: strain_series,
};

fn strain_has_data(view: &FilteredView<'_>) -> bool {
    !view.is_empty() && any_present(view.values(Column::HospPatients))
}

fn strain_metrics(view: &FilteredView<'_>) -> Vec<Option<f64>> {
    let peak_hospital_patients = max(view.values(Column::HospPatients));

    // Bed capacity is a per-country constant in the source data, so the
    // earliest row stands for the whole view.
    let beds_per_1000 = if any_present(view.values(Column::HospitalBedsPerThousand)) {
        view.rows()
            .first()
            .and_then(|r| r.get(Column::HospitalBedsPerThousand))
    } else {
        Some(0.0)
    };

    let peak_strain_ratio = match (peak_hospital_patients, beds_per_1000) {
        (Some(peak), Some(beds)) if beds > 0.0 => Some(peak / (beds * 10.0)),
        _ => Some(0.0),
    };

    vec![peak_hospital_patients, beds_per_1000, peak_strain_ratio]
}

fn strain_series(view: &FilteredView<'_>) -> Vec<Series> {
    table_series(&STRAIN, view)
}

// ---------------------------------------------------------------------------
// Government response
// ---------------------------------------------------------------------------

pub(crate) static RESPONSE: PillarDef = PillarDef {
    title: "Government Response",
    chart_title_prefix: "Government Response in",
    y_axis_label: "Stringency Index / Vaccinated %",
    no_data_message: NO_DATA,
    metrics: &[
        MetricDef {
            key: "avg_stringency",
            label: "Average Stringency",
            format: MetricFormat::Score100,
        },
        MetricDef {
            key: "max_vaccination",
            label: "Max Vaccination Rate",
            format: MetricFormat::Percent1,
        },
        MetricDef {
            key: "avg_tests_per_case",
            label: "Avg Tests per Case",
            format: MetricFormat::Decimal1,
        },
    ],
    series: &[
        SeriesDef {
            key: "stringency",
            label: "Stringency Index",
            column: Column::StringencyIndex,
            required: false,
        },
        SeriesDef {
            key: "vaccinated_pct",
            label: "Fully Vaccinated %",
            column: Column::PeopleFullyVaccinatedPerHundred,
            required: false,
        },
    ],
    has_data: not_empty,
    metric_values: response_metrics,
    series_values: response_series,
};

fn response_metrics(view: &FilteredView<'_>) -> Vec<Option<f64>> {
    let avg_stringency = mean(view.values(Column::StringencyIndex)).unwrap_or(0.0);
    let max_vaccination = max(view.values(Column::PeopleFullyVaccinatedPerHundred)).unwrap_or(0.0);
    let avg_tests_per_case = mean(view.values(Column::TestsPerCase)).unwrap_or(0.0);

    vec![
        Some(avg_stringency),
        Some(max_vaccination),
        Some(avg_tests_per_case),
    ]
}

fn response_series(view: &FilteredView<'_>) -> Vec<Series> {
    table_series(&RESPONSE, view)
}
