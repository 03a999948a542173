//! Error types of the dataset loader
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("could not fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("invalid arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("column `{0}` is missing")]
    MissingColumn(&'static str),
    #[error("column `{column}` has type {found}, expected {expected}")]
    ColumnType {
        column: &'static str,
        found: String,
        expected: &'static str,
    },
    #[error("null value in column `{column}` at row {row}")]
    NullValue { column: &'static str, row: usize },
    #[error("invalid label {0}, labels must be non-negative")]
    InvalidLabel(i64),
}
