use std::path::PathBuf;

use crate::data::model::TableKind;

/// Errors surfaced by the data layer.
///
/// Classification and filtering never fail; only loading and malformed
/// caller input end up here.
#[derive(Debug, thiserror::Error)]
pub enum PodiumError {
    #[error("malformed filter criteria: {0}")]
    Criteria(#[source] serde_json::Error),

    #[error("no {table} file ({stem}.csv, .json or .parquet) in {}", .dir.display())]
    MissingTable {
        table: TableKind,
        stem: &'static str,
        dir: PathBuf,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

pub type Result<T, E = PodiumError> = std::result::Result<T, E>;
