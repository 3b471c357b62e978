//! Browsing and exporting the raw trait table.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::catalog::{CatalogRow, TraitModelEntry};
use crate::error::{Error, Result};

const MODEL_NOTE: &str = "For education only; not a diagnosis.";

/// Columns every trait table must carry
const REQUIRED_COLUMNS: [&str; 9] = [
    "rsid",
    "genotype",
    "gene",
    "category",
    "trait_name",
    "effect_label",
    "effect_level",
    "explanation",
    "evidence_strength",
];

/// Read the rows of the CSV trait table.
///
/// A missing required column rejects the whole table. Individual rows that
/// are short or otherwise fail to deserialize are logged and skipped.
pub fn load_catalog_rows(path: &Path) -> Result<Vec<CatalogRow>> {
    let file = fs::File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(Error::Table {
            path: path.to_path_buf(),
            message: format!("missing column `{}`", missing),
        });
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let parsed = record.and_then(|record| record.deserialize::<CatalogRow>(Some(&headers)));
        match parsed {
            Ok(row) => rows.push(row),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                warn!("Skipping row of {}: {}", path.display(), e);
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed rows in {}", skipped, path.display());
    }
    Ok(rows)
}

/// Free-text search plus category and evidence filters.
///
/// Empty filters match everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub text: Option<String>,
    pub categories: Vec<String>,
    pub evidence: Vec<String>,
}

impl CatalogQuery {
    pub fn matches(&self, row: &CatalogRow) -> bool {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            let haystack = format!("{} {} {}", row.rsid, row.gene, row.trait_name).to_lowercase();
            if !haystack.contains(&text.to_lowercase()) {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&row.category) {
            return false;
        }
        if !self.evidence.is_empty() && !self.evidence.contains(&row.evidence_strength) {
            return false;
        }
        true
    }
}

pub fn filter_rows<'a>(rows: &'a [CatalogRow], query: &CatalogQuery) -> Vec<&'a CatalogRow> {
    rows.iter().filter(|row| query.matches(row)).collect()
}

/// Distinct filter values available in a table, sorted
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CatalogFacets {
    pub categories: Vec<String>,
    pub evidence: Vec<String>,
}

impl CatalogFacets {
    pub fn from_rows(rows: &[CatalogRow]) -> Self {
        let categories: BTreeSet<&str> = rows
            .iter()
            .map(|r| r.category.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        let evidence: BTreeSet<&str> = rows
            .iter()
            .map(|r| r.evidence_strength.as_str())
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            categories: categories.into_iter().map(String::from).collect(),
            evidence: evidence.into_iter().map(String::from).collect(),
        }
    }
}

impl From<&CatalogRow> for TraitModelEntry {
    fn from(row: &CatalogRow) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        TraitModelEntry {
            trait_id: non_empty(&row.trait_id),
            rsid: Some(row.rsid.clone()),
            gene: Some(row.gene.clone()),
            trait_category: Some(row.category.clone()),
            trait_name: Some(row.trait_name.clone()),
            genotype: Some(row.genotype.clone()),
            variant_effect: Some(row.effect_label.clone()),
            effect_level: non_empty(&row.effect_level),
            evidence_level: Some(row.evidence_strength.clone()),
            explanation: Some(row.explanation.clone()),
            mechanism: Some(row.mechanism.clone()),
            lifestyle_links: Vec::new(),
            notes: Some(MODEL_NOTE.to_string()),
        }
    }
}

/// Write rows as a JSON trait model that [`crate::catalog::load_catalog`]
/// accepts as its primary source. Returns the number of entries written.
pub fn export_model(rows: &[&CatalogRow], path: &Path) -> Result<usize> {
    let model: Vec<TraitModelEntry> = rows.iter().map(|row| TraitModelEntry::from(*row)).collect();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&model)?)?;

    info!("Exported {} traits to {}", model.len(), path.display());
    Ok(model.len())
}
