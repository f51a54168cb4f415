use std::ops::RangeInclusive;

use chrono::NaiveDate;

use super::model::{Column, Dataset, Record};

// ---------------------------------------------------------------------------
// FilteredView – the rows matching one country and a year range
// ---------------------------------------------------------------------------

/// Borrowed subsequence of a [`Dataset`], ordered by date (stable, so rows
/// sharing a date keep their dataset order).
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    rows: Vec<&'a Record>,
}

impl<'a> FilteredView<'a> {
    /// Rows where `location == country` and `year` lies in `years`.
    ///
    /// An unknown country or a range without rows yields an empty view. An
    /// inverted range simply matches nothing; callers that need to reject it
    /// validate before filtering.
    pub fn new(dataset: &'a Dataset, country: &str, years: RangeInclusive<i32>) -> Self {
        let mut rows: Vec<&Record> = dataset
            .records()
            .iter()
            .filter(|r| r.location == country && years.contains(&r.year))
            .collect();
        rows.sort_by_key(|r| r.date);
        FilteredView { dataset, rows }
    }

    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the underlying dataset's schema carries `column`.
    pub fn has_column(&self, column: Column) -> bool {
        self.dataset.has_column(column)
    }

    /// Values of `column` in view order. A column absent from the schema
    /// reads as all-null.
    pub fn values(&self, column: Column) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |r| r.get(column))
    }

    /// `(date, value)` pairs of `column` in view order.
    pub fn points(&self, column: Column) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.rows.iter().map(move |r| (r.date, r.get(column)))
    }

    /// The last `n` rows as a small table for display.
    pub fn tail_sample(&self, n: usize) -> DataSample {
        let mut columns = vec![Column::NewCases, Column::TotalDeaths];
        for optional in [Column::HospPatients, Column::StringencyIndex] {
            if self.has_column(optional) {
                columns.push(optional);
            }
        }

        let start = self.rows.len().saturating_sub(n);
        let rows = self.rows[start..]
            .iter()
            .map(|r| SampleRow {
                date: r.date,
                values: columns.iter().map(|&c| r.get(c)).collect(),
            })
            .collect();

        DataSample { columns, rows }
    }
}

// ---------------------------------------------------------------------------
// DataSample – tail of the view for the "View Data Sample" table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DataSample {
    /// Value columns after the leading `date` column.
    pub columns: Vec<Column>,
    pub rows: Vec<SampleRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub date: NaiveDate,
    /// Aligned with [`DataSample::columns`].
    pub values: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(
            vec![
                Record::new("Testland", date(2021, 6, 1)).with(Column::NewCases, 3.0),
                Record::new("Otherland", date(2021, 1, 1)).with(Column::NewCases, 99.0),
                Record::new("Testland", date(2020, 12, 31)).with(Column::NewCases, 1.0),
                Record::new("Testland", date(2021, 1, 1)).with(Column::NewCases, 2.0),
                Record::new("Testland", date(2022, 1, 1)).with(Column::NewCases, 4.0),
            ],
            [Column::NewCases, Column::TotalDeaths, Column::StringencyIndex]
                .into_iter()
                .collect::<BTreeSet<_>>(),
        )
    }

    #[test]
    fn filters_by_country_and_inclusive_years_sorted_by_date() {
        let ds = dataset();
        let view = FilteredView::new(&ds, "Testland", 2020..=2021);
        let cases: Vec<_> = view.values(Column::NewCases).collect();
        assert_eq!(cases, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn unknown_country_and_inverted_range_are_empty() {
        let ds = dataset();
        assert!(FilteredView::new(&ds, "Nowhere", 2020..=2022).is_empty());
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = 2022..=2019;
        assert!(FilteredView::new(&ds, "Testland", inverted).is_empty());
    }

    #[test]
    fn absent_column_reads_as_null() {
        let ds = dataset();
        let view = FilteredView::new(&ds, "Testland", 2020..=2022);
        assert!(!view.has_column(Column::HospPatients));
        assert!(view.values(Column::HospPatients).all(|v| v.is_none()));
    }

    #[test]
    fn tail_sample_keeps_last_rows_and_optional_columns() {
        let ds = dataset();
        let view = FilteredView::new(&ds, "Testland", 2020..=2022);
        let sample = view.tail_sample(2);

        assert_eq!(
            sample.columns,
            vec![Column::NewCases, Column::TotalDeaths, Column::StringencyIndex]
        );
        assert_eq!(sample.rows.len(), 2);
        assert_eq!(sample.rows[0].date, date(2021, 6, 1));
        assert_eq!(sample.rows[1].values[0], Some(4.0));

        assert_eq!(view.tail_sample(50).rows.len(), 4);
    }
}
