use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::report::Report;

pub mod html;
pub mod text;

pub use html::{effect_level_percent, render_html, HtmlRenderer};
pub use text::render_text;

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Text,
    Json,
    All,
}

/// Writes rendered reports into an output directory
pub struct ReportGenerator {
    output_dir: PathBuf,
    html: HtmlRenderer,
}

impl ReportGenerator {
    pub fn new(output_dir: &Path, escape_html: bool) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            html: HtmlRenderer::with_escaping(escape_html)?,
        })
    }

    /// Write `report` in the requested format(s) and return the written
    /// paths. File names are `{stem}_{timestamp}.{ext}`.
    pub fn generate(
        &self,
        report: &Report,
        summary: Option<&str>,
        format: ReportFormat,
        stem: &str,
    ) -> Result<Vec<PathBuf>> {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let base = format!("{}_{}", stem, timestamp);

        let mut written = Vec::new();
        match format {
            ReportFormat::Html => written.push(self.write_html(report, summary, &base)?),
            ReportFormat::Text => written.push(self.write_text(report, &base)?),
            ReportFormat::Json => written.push(self.write_json(report, &base)?),
            ReportFormat::All => {
                written.push(self.write_html(report, summary, &base)?);
                written.push(self.write_text(report, &base)?);
                written.push(self.write_json(report, &base)?);
            }
        }

        Ok(written)
    }

    fn write_html(&self, report: &Report, summary: Option<&str>, base: &str) -> Result<PathBuf> {
        let contents = self.html.render(report, summary)?;
        self.write(&format!("{}.html", base), &contents)
    }

    fn write_text(&self, report: &Report, base: &str) -> Result<PathBuf> {
        self.write(&format!("{}.txt", base), &render_text(report))
    }

    fn write_json(&self, report: &Report, base: &str) -> Result<PathBuf> {
        self.write(&format!("{}.json", base), &report.to_json()?)
    }

    fn write(&self, filename: &str, contents: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(filename);
        fs::write(&path, contents).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;

        info!("Wrote {}", path.display());
        Ok(path)
    }
}
