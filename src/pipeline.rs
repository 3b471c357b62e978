//! Parse, match and aggregate in one call, for a single file or a batch.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::catalog::TraitCatalog;
use crate::error::Result;
use crate::matcher::match_traits;
use crate::parsers::parse_genotype_file;
use crate::report::{build_report, Report};

/// Build the trait report for one genotype file.
pub fn analyze_file(catalog: &TraitCatalog, path: &Path) -> Result<Report> {
    let variants = parse_genotype_file(path)?;
    let matched = match_traits(catalog, &variants);
    info!(
        "{}: {} variants, {} traits matched",
        path.display(),
        variants.len(),
        matched.len()
    );
    Ok(build_report(matched))
}

/// Result of analysing one file of a batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub report: Result<Report>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.report.is_ok()
    }
}

/// Analyse every file on the rayon pool against one shared catalog.
///
/// Outcomes are returned in input order. A file that fails to open is
/// reported in its own outcome and does not affect the others.
pub fn analyze_batch(catalog: &TraitCatalog, paths: &[PathBuf]) -> Vec<BatchOutcome> {
    paths
        .par_iter()
        .map(|path| {
            let report = analyze_file(catalog, path);
            if let Err(e) = &report {
                warn!("Failed to analyze {}: {}", path.display(), e);
            }
            BatchOutcome {
                path: path.clone(),
                report,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSource;
    use crate::error::Error;
    use crate::types::TraitDefinition;
    use std::fs;
    use tempfile::TempDir;

    fn catalog() -> TraitCatalog {
        TraitCatalog::from_definitions(
            vec![TraitDefinition {
                rsid: "rs762551".to_string(),
                genotype: "AA".to_string(),
                trait_id: "caffeine_fast".to_string(),
                trait_name: "Caffeine Metabolism".to_string(),
                category: "Nutrition".to_string(),
                gene: "CYP1A2".to_string(),
                effect_label: "Fast metabolizer".to_string(),
                effect_level: "HIGH".to_string(),
                explanation: "Clears caffeine quickly.".to_string(),
                evidence_strength: "Moderate".to_string(),
            }],
            CatalogSource::Json,
        )
    }

    #[test]
    fn test_analyze_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("genome.txt");
        fs::write(
            &path,
            "# rsid\tchromosome\tposition\tgenotype\nrs762551\t15\t74749576\taa\nrs1\t1\t1\tGG\n",
        )?;

        let report = analyze_file(&catalog(), &path)?;
        assert_eq!(report.summary().num_traits_found, 1);
        assert_eq!(report.traits()[0].user_genotype, "AA");
        Ok(())
    }

    #[test]
    fn test_analyze_missing_file() {
        let result = analyze_file(&catalog(), Path::new("/nonexistent/genome.txt"));
        assert!(matches!(result, Err(Error::Open { .. })));
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let hit = temp_dir.path().join("hit.txt");
        let miss = temp_dir.path().join("miss.txt");
        let absent = temp_dir.path().join("absent.txt");
        fs::write(&hit, "rs762551 15 74749576 AA\n")?;
        fs::write(&miss, "rs762551 15 74749576 CC\n")?;

        let paths = vec![hit.clone(), absent.clone(), miss.clone()];
        let outcomes = analyze_batch(&catalog(), &paths);

        let order: Vec<&PathBuf> = outcomes.iter().map(|o| &o.path).collect();
        assert_eq!(order, vec![&hit, &absent, &miss]);

        assert_eq!(outcomes[0].report.as_ref().unwrap().traits().len(), 1);
        assert!(!outcomes[1].is_ok());
        assert!(outcomes[2].report.as_ref().unwrap().is_empty());
        Ok(())
    }
}
