//! Trait catalog loading.
//!
//! The catalog is read from a JSON model when one is available and from the
//! legacy CSV table otherwise. The two sources are never merged. A missing or
//! unreadable catalog degrades to an empty one rather than failing the run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{CatalogKey, TraitDefinition};

pub mod explorer;

pub use explorer::{export_model, filter_rows, load_catalog_rows, CatalogFacets, CatalogQuery};

/// Where a loaded catalog's entries came from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    Json,
    Csv,
    #[default]
    Empty,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Json => write!(f, "JSON model"),
            CatalogSource::Csv => write!(f, "CSV table"),
            CatalogSource::Empty => write!(f, "empty"),
        }
    }
}

/// In-memory lookup table keyed by `(rsid, genotype)`.
///
/// Read-only once built; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct TraitCatalog {
    entries: HashMap<CatalogKey, TraitDefinition>,
    source: CatalogSource,
}

impl TraitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from definitions in load order. Later definitions
    /// replace earlier ones with the same key.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TraitDefinition>,
        source: CatalogSource,
    ) -> Self {
        let mut catalog = Self {
            entries: HashMap::new(),
            source,
        };
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    /// Insert a definition, returning the one it replaced.
    pub fn insert(&mut self, definition: TraitDefinition) -> Option<TraitDefinition> {
        self.entries.insert(definition.key(), definition)
    }

    pub fn get(&self, key: &CatalogKey) -> Option<&TraitDefinition> {
        self.entries.get(key)
    }

    pub fn lookup(&self, rsid: &str, genotype: &str) -> Option<&TraitDefinition> {
        self.get(&CatalogKey::new(rsid, genotype))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }
}

/// One entry of the JSON trait model.
///
/// Every field is optional on input; entries without an rsID or genotype
/// are skipped when the catalog is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraitModelEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_id: Option<String>,
    #[serde(default)]
    pub rsid: Option<String>,
    #[serde(default)]
    pub gene: Option<String>,
    #[serde(default)]
    pub trait_category: Option<String>,
    #[serde(default)]
    pub trait_name: Option<String>,
    #[serde(default)]
    pub genotype: Option<String>,
    #[serde(default)]
    pub variant_effect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_level: Option<String>,
    #[serde(default)]
    pub evidence_level: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub mechanism: Option<String>,
    #[serde(default)]
    pub lifestyle_links: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TraitModelEntry {
    /// Convert to a catalog definition. `index` is the entry's position in
    /// the model and seeds the generated trait id.
    pub fn to_definition(&self, index: usize) -> Option<TraitDefinition> {
        let rsid = self.rsid.as_deref().unwrap_or_default().trim();
        let genotype = self
            .genotype
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        if rsid.is_empty() || genotype.is_empty() {
            return None;
        }

        let trait_id = match self.trait_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("{}_{}_{}", rsid, genotype, index),
        };
        let effect_label = self.variant_effect.clone().unwrap_or_default();
        let effect_level = match self.effect_level.as_deref() {
            Some(level) if !level.is_empty() => level.to_string(),
            _ => effect_label.clone(),
        };

        Some(TraitDefinition {
            rsid: rsid.to_string(),
            genotype,
            trait_id,
            trait_name: self.trait_name.clone().unwrap_or_default(),
            category: self.trait_category.clone().unwrap_or_default(),
            gene: self.gene.clone().unwrap_or_default(),
            effect_label,
            effect_level,
            explanation: self.explanation.clone().unwrap_or_default(),
            evidence_strength: self.evidence_level.clone().unwrap_or_default(),
        })
    }
}

/// One row of the legacy CSV trait table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogRow {
    #[serde(default)]
    pub trait_id: String,
    pub rsid: String,
    pub genotype: String,
    pub gene: String,
    pub category: String,
    pub trait_name: String,
    pub effect_label: String,
    pub effect_level: String,
    pub explanation: String,
    pub evidence_strength: String,
    #[serde(default)]
    pub mechanism: String,
}

impl CatalogRow {
    /// Convert to a catalog definition; rows without an rsID or genotype
    /// cannot be keyed and yield `None`.
    pub fn to_definition(&self, index: usize) -> Option<TraitDefinition> {
        let key = CatalogKey::new(&self.rsid, &self.genotype);
        if key.rsid.is_empty() || key.genotype.is_empty() {
            return None;
        }

        let trait_id = if self.trait_id.is_empty() {
            format!("{}_{}_{}", key.rsid, key.genotype, index)
        } else {
            self.trait_id.clone()
        };

        Some(TraitDefinition {
            rsid: key.rsid,
            genotype: key.genotype,
            trait_id,
            trait_name: self.trait_name.clone(),
            category: self.category.clone(),
            gene: self.gene.clone(),
            effect_label: self.effect_label.clone(),
            effect_level: self.effect_level.clone(),
            explanation: self.explanation.clone(),
            evidence_strength: self.evidence_strength.clone(),
        })
    }
}

/// Load the trait catalog, preferring the JSON model at `primary` and
/// falling back to the CSV table at `fallback`.
///
/// Never fails: unreadable sources are logged and an empty catalog is a
/// valid result.
pub fn load_catalog(primary: &Path, fallback: &Path) -> TraitCatalog {
    match load_json_definitions(primary) {
        Ok(definitions) if !definitions.is_empty() => {
            let catalog = TraitCatalog::from_definitions(definitions, CatalogSource::Json);
            info!(
                "Loaded {} trait definitions from {}",
                catalog.len(),
                primary.display()
            );
            return catalog;
        }
        Ok(_) => info!(
            "No usable entries in {}, falling back to CSV",
            primary.display()
        ),
        Err(Error::Open { source, .. }) if source.kind() == ErrorKind::NotFound => {
            debug!("No JSON trait model at {}", primary.display())
        }
        Err(e) => warn!(
            "Failed to load JSON trait database, falling back to CSV: {}",
            e
        ),
    }

    match load_csv_definitions(fallback) {
        Ok(definitions) if !definitions.is_empty() => {
            let catalog = TraitCatalog::from_definitions(definitions, CatalogSource::Csv);
            info!(
                "Loaded {} trait definitions from {}",
                catalog.len(),
                fallback.display()
            );
            catalog
        }
        Ok(_) => {
            warn!("Trait database {} has no usable rows", fallback.display());
            TraitCatalog::new()
        }
        Err(e) => {
            warn!("Failed to load CSV trait database: {}", e);
            TraitCatalog::new()
        }
    }
}

/// Read the JSON trait model, keeping only entries that can be keyed.
pub fn load_json_definitions(path: &Path) -> Result<Vec<TraitDefinition>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<TraitModelEntry> = serde_json::from_reader(BufReader::new(file))?;

    Ok(entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| entry.to_definition(index))
        .collect())
}

/// Read the CSV trait table, keeping only rows that can be keyed.
pub fn load_csv_definitions(path: &Path) -> Result<Vec<TraitDefinition>> {
    let rows = explorer::load_catalog_rows(path)?;

    Ok(rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| row.to_definition(index))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const CSV_HEADER: &str = "trait_id,rsid,genotype,gene,category,trait_name,effect_label,effect_level,explanation,evidence_strength";

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_json_model_is_preferred() {
        let temp_dir = TempDir::new().unwrap();
        let json = write(
            &temp_dir,
            "model.json",
            r#"[{"rsid": "rs762551", "genotype": "aa", "gene": "CYP1A2",
                "trait_category": "Nutrition", "trait_name": "Caffeine Metabolism",
                "variant_effect": "Fast metabolizer", "effect_level": "HIGH",
                "explanation": "...", "evidence_level": "Strong"}]"#,
        );
        let csv = write(
            &temp_dir,
            "traits.csv",
            &format!("{CSV_HEADER}\nt9,rs1,GG,G,Sleep,Other,l,LOW,e,Weak\n"),
        );

        let catalog = load_catalog(&json, &csv);
        assert_eq!(catalog.source(), CatalogSource::Json);
        assert_eq!(catalog.len(), 1);

        let definition = catalog.lookup("rs762551", "AA").unwrap();
        assert_eq!(definition.category, "Nutrition");
        assert_eq!(definition.effect_label, "Fast metabolizer");
        assert_eq!(definition.effect_level, "HIGH");
        assert_eq!(definition.evidence_strength, "Strong");
        assert_eq!(definition.trait_id, "rs762551_AA_0");
        assert!(catalog.lookup("rs1", "GG").is_none());
    }

    #[test]
    fn test_json_entries_without_key_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let json = write(
            &temp_dir,
            "model.json",
            r#"[{"rsid": "", "genotype": "AA"},
                {"rsid": "rs2", "genotype": null},
                {"rsid": "rs3", "genotype": "ct", "variant_effect": "Slower"}]"#,
        );

        let definitions = load_json_definitions(&json).unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].genotype, "CT");
        assert_eq!(definitions[0].trait_id, "rs3_CT_2");
        // effect_level falls back to the effect label
        assert_eq!(definitions[0].effect_level, "Slower");
    }

    #[test]
    fn test_csv_fallback_when_json_missing() {
        let temp_dir = TempDir::new().unwrap();
        let csv = write(
            &temp_dir,
            "traits.csv",
            &format!(
                "{CSV_HEADER}\n\
                 caf1, rs762551 , aa ,CYP1A2,Nutrition,Caffeine Metabolism,Fast metabolizer,HIGH,...,Strong\n"
            ),
        );

        let catalog = load_catalog(&temp_dir.path().join("absent.json"), &csv);
        assert_eq!(catalog.source(), CatalogSource::Csv);
        let definition = catalog.lookup("rs762551", "AA").unwrap();
        assert_eq!(definition.trait_id, "caf1");
        assert_eq!(definition.gene, "CYP1A2");
    }

    #[test]
    fn test_empty_json_model_falls_back_to_csv() {
        let temp_dir = TempDir::new().unwrap();
        let json = write(&temp_dir, "model.json", r#"[{"rsid": "rs1"}]"#);
        let csv = write(
            &temp_dir,
            "traits.csv",
            &format!("{CSV_HEADER}\nt1,rs1,GG,G,Sleep,Name,l,LOW,e,Weak\n"),
        );

        let catalog = load_catalog(&json, &csv);
        assert_eq!(catalog.source(), CatalogSource::Csv);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_malformed_json_falls_back_to_csv() {
        let temp_dir = TempDir::new().unwrap();
        let json = write(&temp_dir, "model.json", "{ not json");
        let csv = write(
            &temp_dir,
            "traits.csv",
            &format!("{CSV_HEADER}\nt1,rs1,GG,G,Sleep,Name,l,LOW,e,Weak\n"),
        );

        let catalog = load_catalog(&json, &csv);
        assert_eq!(catalog.source(), CatalogSource::Csv);
    }

    #[test]
    fn test_both_sources_missing_yields_empty_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = load_catalog(
            &temp_dir.path().join("a.json"),
            &temp_dir.path().join("b.csv"),
        );
        assert!(catalog.is_empty());
        assert_eq!(catalog.source(), CatalogSource::Empty);
    }

    #[test]
    fn test_duplicate_keys_keep_last_definition() {
        let temp_dir = TempDir::new().unwrap();
        let csv = write(
            &temp_dir,
            "traits.csv",
            &format!(
                "{CSV_HEADER}\n\
                 first,rs1,ag,G,Sleep,First,l,LOW,e,Weak\n\
                 second,rs1,AG,G,Sleep,Second,l,LOW,e,Weak\n"
            ),
        );

        let catalog = load_catalog(&temp_dir.path().join("absent.json"), &csv);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("rs1", "AG").unwrap().trait_id, "second");
    }

    #[test]
    fn test_csv_missing_required_column_yields_empty_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let csv = write(&temp_dir, "traits.csv", "rsid,genotype\nrs1,AA\n");

        let catalog = load_catalog(&temp_dir.path().join("absent.json"), &csv);
        assert!(catalog.is_empty());
    }
}
