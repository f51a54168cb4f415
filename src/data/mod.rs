/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (year derived once)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Record>, schema, country index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country + year range → FilteredView
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
