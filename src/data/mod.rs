/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → AirQualityDataset (Schema + Vec<Reading>)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  station / category / date / hour predicates → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  summary, monthly trend, pairs, pivot, wind breakdown
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  views   │  run(dataset, config) → DashboardViews
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod views;
