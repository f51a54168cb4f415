use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{
    Array, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Column, Dataset, Record};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one row per (location, date), Our World in Data layout
/// * `.parquet` – same columns, typed
///
/// `location` and `date` are required; every known numeric column found in
/// the header joins the schema, everything else is ignored.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows for {} countries from {} (columns: {:?})",
        dataset.len(),
        dataset.countries().len(),
        path.display(),
        dataset.schema().iter().map(|c| c.name()).collect::<Vec<_>>()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Load-once handle
// ---------------------------------------------------------------------------

/// Loads a dataset file at most once and hands out shared handles to it.
///
/// Concurrent first callers serialize on the lock, so only one of them
/// reads the file. A failed load is not cached.
#[derive(Debug)]
pub struct CachedLoader {
    path: PathBuf,
    cached: Mutex<Option<Arc<Dataset>>>,
}

impl CachedLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CachedLoader {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Arc<Dataset>> {
        let mut slot = self
            .cached
            .lock()
            .map_err(|_| anyhow!("dataset cache lock poisoned"))?;
        if let Some(ds) = slot.as_ref() {
            return Ok(Arc::clone(ds));
        }
        let ds = Arc::new(load_file(&self.path)?);
        *slot = Some(Arc::clone(&ds));
        Ok(ds)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, `date` as `YYYY-MM-DD`.
/// Empty cells are nulls.
fn load_csv(path: &Path) -> Result<Dataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let location_idx = headers
        .iter()
        .position(|h| h == "location")
        .context("CSV missing 'location' column")?;
    let date_idx = headers
        .iter()
        .position(|h| h == "date")
        .context("CSV missing 'date' column")?;

    let numeric_cols: Vec<(usize, Column)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| Column::from_name(h).map(|c| (i, c)))
        .collect();
    let schema: BTreeSet<Column> = numeric_cols.iter().map(|(_, c)| *c).collect();

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result.context("reading CSV record")?;
        // 1-based line in the file, header included.
        let line = row.position().map_or(0, |p| p.line());

        let location = row.get(location_idx).unwrap_or("").trim();
        if location.is_empty() {
            bail!("CSV line {line}: empty 'location'");
        }
        let date = parse_date(row.get(date_idx).unwrap_or(""))
            .with_context(|| format!("CSV line {line}: bad 'date'"))?;

        let mut record = Record::new(location, date);
        for &(col_idx, column) in &numeric_cols {
            let cell = row.get(col_idx).unwrap_or("");
            let value = parse_nullable_f64(cell)
                .with_context(|| format!("CSV line {line}, column '{column}'"))?;
            record.set(column, value);
        }
        records.push(record);
    }

    Ok(Dataset::from_records(records, schema))
}

/// `YYYY-MM-DD`, optionally followed by a time part (`2021-03-01 00:00:00`
/// or `2021-03-01T00:00:00`).
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").with_context(|| format!("'{s}' is not a date"))
}

fn parse_nullable_f64(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v: f64 = s.parse().with_context(|| format!("'{s}' is not a number"))?;
    Ok(v.is_finite().then_some(v))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file.
///
/// Expected schema:
/// - `location`: Utf8 or LargeUtf8
/// - `date`: Date32 or Utf8 (`YYYY-MM-DD`)
/// - numeric columns: Float64, Float32, Int64 or Int32, nullable
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let arrow_schema = builder.schema().clone();
    let schema: BTreeSet<Column> = arrow_schema
        .fields()
        .iter()
        .filter_map(|f| Column::from_name(f.name()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let batch_schema = batch.schema();

        let location_col = batch.column(
            batch_schema
                .index_of("location")
                .map_err(|_| anyhow!("Parquet file missing 'location' column"))?,
        );
        let date_col = batch.column(
            batch_schema
                .index_of("date")
                .map_err(|_| anyhow!("Parquet file missing 'date' column"))?,
        );

        let numeric_cols: Vec<(Column, &Arc<dyn Array>)> = batch_schema
            .fields()
            .iter()
            .enumerate()
            .filter_map(|(i, f)| Column::from_name(f.name()).map(|c| (c, batch.column(i))))
            .collect();

        for row in 0..batch.num_rows() {
            let location = extract_string(location_col, row)
                .with_context(|| format!("Row {row}: failed to read 'location'"))?;
            let date = extract_date(date_col, row)
                .with_context(|| format!("Row {row}: failed to read 'date'"))?;

            let mut record = Record::new(location, date);
            for (column, array) in &numeric_cols {
                let value = extract_f64(array, row)
                    .with_context(|| format!("Row {row}: failed to read '{column}'"))?;
                record.set(*column, value);
            }
            records.push(record);
        }
    }

    Ok(Dataset::from_records(records, schema))
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

fn extract_date(col: &Arc<dyn Array>, row: usize) -> Result<NaiveDate> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Date32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Date32Array>()
                .context("expected Date32Array")?;
            arr.value_as_date(row)
                .with_context(|| format!("date offset {} out of range", arr.value(row)))
        }
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            parse_date(arr.value(row))
        }
        DataType::LargeUtf8 => parse_date(col.as_string::<i64>().value(row)),
        other => bail!("Expected Date32 or Utf8 column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let v = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => f64::from(
            col.as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?
                .value(row),
        ),
        DataType::Int64 => {
            col.as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?
                .value(row) as f64
        }
        DataType::Int32 => f64::from(
            col.as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?
                .value(row),
        ),
        other => bail!("Expected numeric column, got {other:?}"),
    };
    Ok(v.is_finite().then_some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Dataset> {
        read_csv(csv::Reader::from_reader(text.as_bytes()))
    }

    #[test]
    fn csv_schema_tracks_present_columns_only() {
        let ds = read(
            "iso_code,location,date,total_cases,new_cases,hosp_patients\n\
             TST,Testland,2021-03-01,100,10,\n\
             TST,Testland,2021-03-02,110,,7\n",
        )
        .unwrap();

        assert_eq!(ds.len(), 2);
        assert!(ds.has_column(Column::HospPatients));
        assert!(!ds.has_column(Column::NewCasesSmoothed));

        let rows = ds.records();
        assert_eq!(rows[0].year, 2021);
        assert_eq!(rows[0].get(Column::TotalCases), Some(100.0));
        assert_eq!(rows[0].get(Column::HospPatients), None);
        assert_eq!(rows[1].get(Column::NewCases), None);
        assert_eq!(rows[1].get(Column::HospPatients), Some(7.0));
    }

    #[test]
    fn csv_requires_location_and_date() {
        assert!(read("date,total_cases\n2021-01-01,1\n").is_err());
        assert!(read("location,total_cases\nTestland,1\n").is_err());
    }

    #[test]
    fn csv_rejects_garbage_numbers_and_dates() {
        let err = read("location,date,total_cases\nTestland,2021-01-01,lots\n").unwrap_err();
        assert!(format!("{err:#}").contains("total_cases"));

        assert!(read("location,date\nTestland,01/02/2021\n").is_err());
    }

    #[test]
    fn csv_errors_name_the_file_line() {
        let err = read(
            "location,date,total_cases\n\
             Testland,2021-01-01,1\n\
             Testland,2021-01-02,lots\n",
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("CSV line 3"), "{msg}");
    }

    #[test]
    fn date32_values_on_both_sides_of_the_epoch() {
        let col: Arc<dyn Array> = Arc::new(Date32Array::from(vec![Some(18_687), Some(-1), None]));
        assert_eq!(
            extract_date(&col, 0).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
        );
        assert_eq!(
            extract_date(&col, 1).unwrap(),
            NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()
        );
        assert!(extract_date(&col, 2).is_err());
    }

    #[test]
    fn date_tolerates_time_suffix() {
        let expected = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(parse_date("2020-02-29").unwrap(), expected);
        assert_eq!(parse_date("2020-02-29 00:00:00").unwrap(), expected);
        assert_eq!(parse_date("2020-02-29T00:00:00").unwrap(), expected);
    }

    #[test]
    fn non_finite_cells_are_null() {
        assert_eq!(parse_nullable_f64("NaN").unwrap(), None);
        assert_eq!(parse_nullable_f64("inf").unwrap(), None);
        assert_eq!(parse_nullable_f64(" 2.5 ").unwrap(), Some(2.5));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("covid-data.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }
}
