use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;

use rusty_pillars::{Column, Record};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn logistic(x: f64, midpoint: f64, steepness: f64, ceiling: f64) -> f64 {
    ceiling / (1.0 + (-(x - midpoint) / steepness).exp())
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Shape of one synthetic country.
struct CountryProfile {
    name: &'static str,
    /// Peak daily cases per wave: (day, width in days, height).
    waves: &'static [(f64, f64, f64)],
    case_fatality: f64,
    beds_per_thousand: Option<f64>,
    reports_hospital: bool,
    reports_icu: bool,
    reports_response: bool,
}

const PROFILES: &[CountryProfile] = &[
    CountryProfile {
        name: "United States",
        waves: &[(60.0, 20.0, 30_000.0), (300.0, 35.0, 250_000.0), (680.0, 25.0, 800_000.0)],
        case_fatality: 0.012,
        beds_per_thousand: Some(2.77),
        reports_hospital: true,
        reports_icu: true,
        reports_response: true,
    },
    CountryProfile {
        name: "Germany",
        waves: &[(40.0, 15.0, 6_000.0), (290.0, 40.0, 25_000.0), (720.0, 30.0, 200_000.0)],
        case_fatality: 0.009,
        beds_per_thousand: Some(8.0),
        reports_hospital: true,
        reports_icu: true,
        reports_response: true,
    },
    CountryProfile {
        name: "Brazil",
        waves: &[(150.0, 60.0, 45_000.0), (420.0, 50.0, 75_000.0), (690.0, 20.0, 180_000.0)],
        case_fatality: 0.022,
        beds_per_thousand: Some(2.2),
        reports_hospital: false,
        reports_icu: false,
        reports_response: true,
    },
    CountryProfile {
        name: "New Zealand",
        waves: &[(30.0, 10.0, 80.0), (750.0, 30.0, 20_000.0)],
        case_fatality: 0.001,
        beds_per_thousand: Some(2.61),
        reports_hospital: true,
        reports_icu: false,
        reports_response: true,
    },
    CountryProfile {
        name: "Kenya",
        waves: &[(130.0, 30.0, 1_000.0), (400.0, 30.0, 1_500.0), (660.0, 20.0, 2_500.0)],
        case_fatality: 0.017,
        beds_per_thousand: None,
        reports_hospital: false,
        reports_icu: false,
        reports_response: false,
    },
];

fn simulate(profile: &CountryProfile, start: NaiveDate, days: u64, rng: &mut SimpleRng) -> Vec<Record> {
    let mut records = Vec::with_capacity(days as usize);
    let mut window: Vec<f64> = Vec::new();
    let mut total_cases = 0.0;
    let mut total_deaths = 0.0;

    for day in 0..days {
        let Some(date) = start.checked_add_days(Days::new(day)) else {
            break;
        };
        let t = day as f64;

        let expected: f64 = profile
            .waves
            .iter()
            .map(|&(mu, sigma, amp)| gaussian(t, mu, sigma, amp))
            .sum();
        let new_cases = (expected + rng.gauss(0.0, expected * 0.15 + 1.0)).max(0.0).round();
        total_cases += new_cases;
        total_deaths += (new_cases * profile.case_fatality).round();

        window.push(new_cases);
        if window.len() > 7 {
            window.remove(0);
        }
        let smoothed = window.iter().sum::<f64>() / window.len() as f64;

        let mut record = Record::new(profile.name, date)
            .with(Column::NewCases, new_cases)
            .with(Column::NewCasesSmoothed, smoothed);
        if total_cases > 0.0 {
            record.set(Column::TotalCases, Some(total_cases));
            record.set(Column::TotalDeaths, Some(total_deaths));
        }
        record.set(Column::HospitalBedsPerThousand, profile.beds_per_thousand);

        // Hospital reporting starts a few weeks into the pandemic.
        if profile.reports_hospital && day >= 30 {
            let hosp = (smoothed * 0.08).round();
            record.set(Column::HospPatients, Some(hosp));
            if profile.reports_icu {
                record.set(Column::IcuPatients, Some((hosp * 0.2).round()));
            }
        }

        if profile.reports_response {
            let stringency = 20.0 + 60.0 * (-(t - 90.0).powi(2) / (2.0 * 200.0f64.powi(2))).exp();
            record.set(Column::StringencyIndex, Some((stringency * 100.0).round() / 100.0));
            if day >= 290 {
                let vaccinated = logistic(t, 450.0, 40.0, 75.0);
                record.set(
                    Column::PeopleFullyVaccinatedPerHundred,
                    Some((vaccinated * 100.0).round() / 100.0),
                );
            }
            if new_cases > 0.0 && day % 7 == 0 {
                let tests = 2_000.0 + smoothed * (5.0 + rng.next_f64() * 10.0);
                record.set(Column::TestsPerCase, Some((tests / new_cases * 10.0).round() / 10.0));
            }
        }

        records.push(record);
    }
    records
}

fn write_csv(path: &str, records: &[Record]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["location".to_string(), "date".to_string()];
    header.extend(Column::ALL.iter().map(|c| c.name().to_string()));
    writer.write_record(&header)?;

    for r in records {
        let mut row = vec![r.location.clone(), r.date.format("%Y-%m-%d").to_string()];
        row.extend(
            Column::ALL
                .iter()
                .map(|&c| r.get(c).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, records: &[Record]) -> anyhow::Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| anyhow::anyhow!("epoch"))?;

    let location = StringArray::from(records.iter().map(|r| r.location.as_str()).collect::<Vec<_>>());
    let date = Date32Array::from(
        records
            .iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );

    let mut fields = vec![
        Field::new("location", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(location), Arc::new(date)];
    for column in Column::ALL {
        fields.push(Field::new(column.name(), DataType::Float64, true));
        let values: Float64Array = records.iter().map(|r| r.get(column)).collect();
        columns.push(Arc::new(values));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2020, 3, 1).ok_or_else(|| anyhow::anyhow!("start date"))?;
    let days = 1036; // through 2022-12-31

    let mut records = Vec::new();
    for profile in PROFILES {
        records.extend(simulate(profile, start, days, &mut rng));
    }

    write_csv("covid-data.csv", &records)?;
    write_parquet("covid-data.parquet", &records)?;

    println!(
        "Wrote {} rows for {} countries to covid-data.csv and covid-data.parquet",
        records.len(),
        PROFILES.len()
    );
    Ok(())
}
