use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Number of leading lines inspected when sniffing a file without a known
/// extension
const SNIFF_LINES: usize = 5;

/// Expands command-line paths into genotype files for batch mode
pub struct FileDiscovery {
    recursive: bool,
}

impl FileDiscovery {
    pub fn new(recursive: bool) -> Self {
        Self { recursive }
    }

    /// Files given explicitly are kept as-is (a missing one surfaces later as
    /// an open failure for that file). Directories contribute the genotype
    /// files they contain, in file-name order. Duplicates are removed,
    /// keeping the first occurrence.
    pub fn discover(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_dir() {
                files.extend(self.discover_in_directory(path)?);
            } else {
                files.push(path.clone());
            }
        }

        let mut seen = HashSet::new();
        files.retain(|path| seen.insert(path.clone()));

        debug!("Discovered {} genotype files", files.len());
        Ok(files)
    }

    fn discover_in_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if self.recursive {
            for entry in WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_potential_genotype_file(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            let entries = fs::read_dir(dir).map_err(|source| Error::Open {
                path: dir.to_path_buf(),
                source,
            })?;

            for entry in entries {
                let path = entry
                    .map_err(|source| Error::Read {
                        path: dir.to_path_buf(),
                        source,
                    })?
                    .path();

                if path.is_file() && is_potential_genotype_file(&path) {
                    files.push(path);
                }
            }
            files.sort();
        }

        Ok(files)
    }
}

fn is_potential_genotype_file(path: &Path) -> bool {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("txt") | Some("tsv") | Some("gz") => true,
        // Catalogs, reports and configs that often sit next to raw data
        Some("json") | Some("csv") | Some("html") | Some("toml") => false,
        _ => has_genotype_header(path),
    }
}

fn has_genotype_header(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };

    BufReader::new(file)
        .lines()
        .take(SNIFF_LINES)
        .map_while(|line| line.ok())
        .any(|line| {
            let lower = line.to_lowercase();
            lower.contains("generated by 23andme")
                || lower
                    .trim_start_matches('#')
                    .split_whitespace()
                    .next()
                    .is_some_and(|token| token == "rsid")
        })
}
