use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use rusty_pillars::data::loader::{CachedLoader, load_file};
use rusty_pillars::{Column, Pillar, Query, evaluate};

const CSV: &str = "\
iso_code,continent,location,date,total_cases,new_cases,new_cases_smoothed,total_deaths,hosp_patients,hospital_beds_per_thousand,stringency_index
TST,Europe,Testland,2021-03-01,100,10,8.5,5,,3.0,60.2
TST,Europe,Testland,2021-03-02,120,20,12.0,6,40,3.0,61.0
OTH,Europe,Otherland,2021-03-01,7,7,,0,,,
";

#[test]
fn csv_file_feeds_the_pipeline() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();

    let ds = load_file(file.path()).unwrap();
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.countries(), ["Otherland".to_string(), "Testland".to_string()]);
    assert_eq!(ds.year_bounds(), Some((2021, 2021)));
    assert!(ds.has_column(Column::NewCasesSmoothed));
    assert!(!ds.has_column(Column::IcuPatients));

    let eval = evaluate(&ds, &Query::new("Testland", 2021, 2021, Pillar::Strain)).unwrap();
    assert_eq!(eval.metrics.value("peak_hospital_patients"), Some(40.0));
    assert_eq!(eval.metrics.value("beds_per_1000"), Some(3.0));
    assert!(!eval.series.get("icu_patients").unwrap().included);
}

#[test]
fn parquet_file_with_date32_and_integer_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covid.parquet");

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let day = NaiveDate::from_ymd_opt(2022, 7, 4).unwrap();
    let days = (day - epoch).num_days() as i32;

    let schema = Arc::new(Schema::new(vec![
        Field::new("location", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("total_cases", DataType::Int64, true),
        Field::new("stringency_index", DataType::Float64, true),
        Field::new("population", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["Testland", "Testland"])),
        Arc::new(Date32Array::from(vec![days, days + 1])),
        Arc::new(Int64Array::from(vec![Some(10), None])),
        Arc::new(Float64Array::from(vec![Some(30.0), Some(50.0)])),
        Arc::new(Float64Array::from(vec![Some(1e6), Some(1e6)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(&path).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.records()[0].date, day);
    assert_eq!(ds.records()[0].year, 2022);
    assert_eq!(ds.records()[0].get(Column::TotalCases), Some(10.0));
    assert_eq!(ds.records()[1].get(Column::TotalCases), None);
    assert!(!ds.has_column(Column::NewCases));

    let eval = evaluate(&ds, &Query::new("Testland", 2022, 2022, Pillar::Response)).unwrap();
    assert_eq!(eval.metrics.value("avg_stringency"), Some(40.0));
}

#[test]
fn cached_loader_reads_once_and_retries_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covid-data.csv");
    let loader = CachedLoader::new(&path);

    assert!(loader.load().is_err());

    std::fs::write(&path, CSV).unwrap();
    let first = loader.load().unwrap();

    // Later edits are not picked up: the first successful load is kept.
    std::fs::write(&path, "location,date\n").unwrap();
    let second = loader.load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 3);
}

#[test]
fn cached_loader_shared_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("covid-data.csv");
    std::fs::write(&path, CSV).unwrap();
    let loader = Arc::new(CachedLoader::new(&path));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let loader = Arc::clone(&loader);
            std::thread::spawn(move || {
                let ds = loader.load().unwrap();
                evaluate(&ds, &Query::new("Testland", 2021, 2021, Pillar::Burden))
                    .unwrap()
                    .metrics
                    .value("total_cases")
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), Some(120.0));
    }
}
