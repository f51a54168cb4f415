//! Headless pillar evaluation.
//!
//! ```text
//! pillar-report <data.csv|data.parquet> <country> <min_year> <max_year> <pillar>
//! ```
//!
//! Prints the evaluation as pretty JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use rusty_pillars::data::loader::CachedLoader;
use rusty_pillars::{Pillar, Query, evaluate};

const USAGE: &str = "usage: pillar-report <data> <country> <min_year> <max_year> <burden|strain|response>";

fn parse_args(args: &[String]) -> Result<(PathBuf, Query)> {
    let [path, country, min_year, max_year, pillar] = args else {
        bail!("{USAGE}");
    };
    let min_year: i32 = min_year
        .parse()
        .with_context(|| format!("min_year '{min_year}' is not a year"))?;
    let max_year: i32 = max_year
        .parse()
        .with_context(|| format!("max_year '{max_year}' is not a year"))?;
    let pillar: Pillar = pillar.parse()?;

    Ok((
        PathBuf::from(path),
        Query::new(country.as_str(), min_year, max_year, pillar),
    ))
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, query) = parse_args(&args)?;

    let dataset = CachedLoader::new(path).load()?;
    let evaluation = evaluate(&dataset, &query)?;

    let json = serde_json::to_string_pretty(&evaluation).context("serializing evaluation")?;
    println!("{json}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
