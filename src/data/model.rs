use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Column – the numeric fields of a record
// ---------------------------------------------------------------------------

/// A nullable numeric column of the epidemiological dataset.
///
/// `location` and `date` are structural and always present, so they are not
/// listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    TotalCases,
    TotalDeaths,
    NewCases,
    NewCasesSmoothed,
    HospPatients,
    IcuPatients,
    HospitalBedsPerThousand,
    StringencyIndex,
    PeopleFullyVaccinatedPerHundred,
    TestsPerCase,
}

impl Column {
    pub const COUNT: usize = 10;

    /// Every column, in schema order.
    pub const ALL: [Column; Column::COUNT] = [
        Column::TotalCases,
        Column::TotalDeaths,
        Column::NewCases,
        Column::NewCasesSmoothed,
        Column::HospPatients,
        Column::IcuPatients,
        Column::HospitalBedsPerThousand,
        Column::StringencyIndex,
        Column::PeopleFullyVaccinatedPerHundred,
        Column::TestsPerCase,
    ];

    /// Header name as it appears in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Column::TotalCases => "total_cases",
            Column::TotalDeaths => "total_deaths",
            Column::NewCases => "new_cases",
            Column::NewCasesSmoothed => "new_cases_smoothed",
            Column::HospPatients => "hosp_patients",
            Column::IcuPatients => "icu_patients",
            Column::HospitalBedsPerThousand => "hospital_beds_per_thousand",
            Column::StringencyIndex => "stringency_index",
            Column::PeopleFullyVaccinatedPerHundred => "people_fully_vaccinated_per_hundred",
            Column::TestsPerCase => "tests_per_case",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One (location, date) row. `year` is derived from `date` on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub location: String,
    pub date: NaiveDate,
    pub year: i32,
    values: [Option<f64>; Column::COUNT],
}

impl Record {
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Record {
            location: location.into(),
            date,
            year: date.year(),
            values: [None; Column::COUNT],
        }
    }

    /// Builder-style setter. Non-finite values are stored as null.
    pub fn with(mut self, column: Column, value: f64) -> Self {
        self.set(column, Some(value));
        self
    }

    pub fn set(&mut self, column: Column, value: Option<f64>) {
        self.values[column.index()] = value.filter(|v| v.is_finite());
    }

    pub fn get(&self, column: Column) -> Option<f64> {
        self.values[column.index()]
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full loaded dataset. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    /// Columns that were present in the source schema.
    schema: BTreeSet<Column>,
    /// Sorted unique locations.
    countries: Vec<String>,
    year_bounds: Option<(i32, i32)>,
}

impl Dataset {
    /// Build the dataset and its indices. `schema` lists the columns present
    /// in the source, whether or not any row carries a value for them.
    pub fn from_records(records: Vec<Record>, schema: BTreeSet<Column>) -> Self {
        let countries: BTreeSet<&str> = records.iter().map(|r| r.location.as_str()).collect();
        let countries = countries.into_iter().map(str::to_string).collect();

        let year_bounds = records.iter().fold(None, |acc, r| match acc {
            None => Some((r.year, r.year)),
            Some((lo, hi)) => Some((r.year.min(lo), r.year.max(hi))),
        });

        Dataset {
            records,
            schema,
            countries,
            year_bounds,
        }
    }

    /// Convenience for tests and generators: every column is in the schema.
    pub fn with_full_schema(records: Vec<Record>) -> Self {
        Self::from_records(records, Column::ALL.into_iter().collect())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.schema.contains(&column)
    }

    pub fn schema(&self) -> &BTreeSet<Column> {
        &self.schema
    }

    /// Sorted unique locations.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Inclusive `(min, max)` year span, `None` for an empty dataset.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
