//! Dataset loading.
//!
//! The two source tables are character-delimited files with exact-match
//! column contracts. Loading keeps malformed *fields* (the aggregation
//! rules decide what to drop), while malformed *files* are fatal:
//! unreadable, empty, or missing a required column.

mod csv;
mod loader;

pub use csv::{read_table, CsvTable};
pub use loader::{load_death_records, load_poverty_records};

use thiserror::Error;

/// Fatal dataset problems: unreadable files or broken column contracts.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset {path} has no header row")]
    EmptyFile { path: String },

    #[error("dataset {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: String },
}
