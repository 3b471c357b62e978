//! # Genotype Traits
//!
//! Maps a curated set of genetic variants to lifestyle-oriented trait
//! explanations and renders them as text, HTML and JSON reports, optionally
//! with a narrative summary from a language model.
//!
//! ## Pipeline
//!
//! - Load the trait catalog (JSON model, falling back to the CSV table)
//! - Parse a raw genotype export (23andMe-style, optionally gzipped)
//! - Match variants against the catalog by `(rsid, genotype)`
//! - Aggregate into a [`Report`] and render it
//!
//! Batch mode runs the same pipeline over many files on a rayon pool with a
//! single shared catalog. Educational use only; nothing here is a diagnosis.

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod llm;
pub mod matcher;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod types;

// Re-export key types
pub use catalog::{load_catalog, CatalogSource, TraitCatalog};
pub use config::Config;
pub use discovery::FileDiscovery;
pub use error::{Error, Result};
pub use llm::{ChatModel, LlmError};
pub use matcher::match_traits;
pub use output::{render_html, render_text, ReportFormat, ReportGenerator};
pub use parsers::parse_genotype_file;
pub use pipeline::{analyze_batch, analyze_file, BatchOutcome};
pub use report::{build_report, Report, ReportSummary};
pub use session::ReportSession;
pub use types::*;
