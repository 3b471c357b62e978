use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by the trait-report pipeline.
///
/// Missing catalog files and malformed genotype lines are not errors; they
/// are logged and skipped. Only the conditions below reach the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The genotype file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The genotype file was opened but reading it failed part-way.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rendered report could not be written.
    #[error("failed to write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A trait table lacks a required column.
    #[error("invalid trait table {}: {message}", path.display())]
    Table { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
