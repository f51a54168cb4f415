//! Three-pillar analysis of per-country COVID-19 time series.
//!
//! [`data`] loads and filters the dataset, [`pillar`] turns a filtered view
//! into metrics and chart series. The egui dashboard and the report binary
//! sit on top of these.

pub mod config;
pub mod data;
pub mod pillar;

pub use data::model::{Column, Dataset, Record};
pub use pillar::{Evaluation, InvalidQuery, Pillar, Query, evaluate};
