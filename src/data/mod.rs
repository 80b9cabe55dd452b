/// Data layer: core types, loading, classification and filtering.
///
/// Architecture:
/// ```text
///  <data dir>/*.csv | *.json | *.parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read + normalise → OlympicData (read-only, Arc-shared)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  per page: copy each table
///   └──────────┘
///        │
///        ├──► classify  annotate copy with `continent`
///        │
///        ├──► filter    resolve aliases (schema) → keep matching rows
///        │
///        ▼
///   ┌──────────┐
///   │ insights  │  rankings, breakdowns, profiles over the filtered view
///   └──────────┘
/// ```

pub mod classify;
pub mod filter;
pub mod insights;
pub mod loader;
pub mod model;
pub mod options;
pub mod reference;
pub mod schema;
pub mod view;
