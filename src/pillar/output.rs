use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

// ---------------------------------------------------------------------------
// Metric display formats
// ---------------------------------------------------------------------------

/// How a metric is rendered on a dashboard card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricFormat {
    /// `1,234,567`
    Count,
    /// `3.45%`
    Percent2,
    /// `67.3%`
    Percent1,
    /// `2.4x`
    Ratio,
    /// `54.2/100`
    Score100,
    /// `2.9`
    Decimal1,
}

impl MetricFormat {
    pub fn render(self, value: Option<f64>) -> String {
        let Some(v) = value else {
            return "n/a".to_string();
        };
        match self {
            MetricFormat::Count => group_thousands(v),
            MetricFormat::Percent2 => format!("{v:.2}%"),
            MetricFormat::Percent1 => format!("{v:.1}%"),
            MetricFormat::Ratio => format!("{v:.1}x"),
            MetricFormat::Score100 => format!("{v:.1}/100"),
            MetricFormat::Decimal1 => format!("{v:.1}"),
        }
    }
}

/// Round to an integer and insert `,` every three digits.
fn group_thousands(v: f64) -> String {
    let digits = format!("{:.0}", v.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if v.is_sign_negative() && digits != "0" {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// MetricSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub key: &'static str,
    pub label: &'static str,
    pub format: MetricFormat,
    pub value: Option<f64>,
}

impl Metric {
    pub fn display(&self) -> String {
        self.format.render(self.value)
    }
}

/// Ordered metric name → nullable value. Serializes as a map in pillar
/// order with `null` for missing values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricSet(Vec<Metric>);

impl MetricSet {
    pub(crate) fn push(&mut self, metric: Metric) {
        self.0.push(metric);
    }

    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.0.iter().find(|m| m.key == key)
    }

    /// Value of `key`; `None` both for a null value and an unknown key.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|m| m.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|m| m.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for MetricSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for m in &self.0 {
            map.serialize_entry(m.key, &m.value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// SeriesSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// One chart line. A series that is left out of the chart keeps its key
/// with `included == false` and no points.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Series {
    #[serde(skip)]
    pub key: &'static str,
    pub label: &'static str,
    pub included: bool,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub(crate) fn excluded(key: &'static str, label: &'static str) -> Self {
        Series {
            key,
            label,
            included: false,
            points: Vec::new(),
        }
    }
}

/// Ordered series name → date-ascending points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesSet(Vec<Series>);

impl SeriesSet {
    pub(crate) fn push(&mut self, series: Series) {
        self.0.push(series);
    }

    pub fn get(&self, key: &str) -> Option<&Series> {
        self.0.iter().find(|s| s.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|s| s.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.0.iter()
    }

    /// Series that should be drawn.
    pub fn included(&self) -> impl Iterator<Item = &Series> {
        self.0.iter().filter(|s| s.included)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SeriesSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for s in &self.0 {
            map.serialize_entry(s.key, s)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(103_436_829.0), "103,436,829");
        assert_eq!(group_thousands(-12_345.4), "-12,345");
    }

    #[test]
    fn formats_match_dashboard_cards() {
        assert_eq!(MetricFormat::Percent2.render(Some(1.0866)), "1.09%");
        assert_eq!(MetricFormat::Ratio.render(Some(24.0)), "24.0x");
        assert_eq!(MetricFormat::Score100.render(Some(54.25)), "54.2/100");
        assert_eq!(MetricFormat::Count.render(None), "n/a");
    }

    #[test]
    fn metric_set_serializes_in_insertion_order_with_nulls() {
        let mut set = MetricSet::default();
        set.push(Metric {
            key: "zeta",
            label: "Zeta",
            format: MetricFormat::Count,
            value: Some(1.0),
        });
        set.push(Metric {
            key: "alpha",
            label: "Alpha",
            format: MetricFormat::Count,
            value: None,
        });
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"zeta":1.0,"alpha":null}"#);
    }

    #[test]
    fn series_set_serializes_points_with_iso_dates() {
        let mut set = SeriesSet::default();
        set.push(Series {
            key: "cases",
            label: "Daily Cases",
            included: true,
            points: vec![SeriesPoint {
                date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
                value: None,
            }],
        });
        set.push(Series::excluded("icu_patients", "ICU Patients"));

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["cases"]["points"][0]["date"], "2021-03-01");
        assert!(json["cases"]["points"][0]["value"].is_null());
        assert_eq!(json["icu_patients"]["included"], false);
        assert_eq!(json["icu_patients"]["points"].as_array().unwrap().len(), 0);
    }
}
