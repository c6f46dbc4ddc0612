/// Data layer: core types, loading, availability and selection.
///
/// Architecture:
/// ```text
///  wells.csv / .json        logs.csv / .parquet
///        │                         │
///        ▼                         ▼
///   ┌──────────┐  Vec<WellRecord>  MeasurementTable
///   │  loader   │─────────┬─────────┘
///   └──────────┘          ▼
///                 ┌──────────────┐
///                 │ availability  │  any valid sample per (well, curve)
///                 └──────────────┘
///                         │
///                         ▼
///                    WellTable (immutable)
///                         │
///                         ▼
///   ┌──────────┐
///   │  filter   │  required curves ∧ partition ∧ map selection → Selection
///   └──────────┘
/// ```

pub mod availability;
pub mod filter;
pub mod loader;
pub mod model;

use thiserror::Error;

/// Domain errors raised while turning input files into a [`model::WellTable`].
/// File and row context is attached by the loader with `anyhow::Context`.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("unknown partition tag '{0}' (expected Training or Test)")]
    UnknownPartition(String),

    #[error("duplicate well identifier '{0}'")]
    DuplicateWell(String),

    #[error("'{value}' in column '{column}' is not a number")]
    NotANumber { column: String, value: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}
