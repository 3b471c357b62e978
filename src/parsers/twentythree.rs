use std::io::BufRead;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parsers::open_file;
use crate::types::VariantRecord;

/// Parser for 23andMe-style raw data: `rsid chromosome position genotype`
pub struct TwentyThreeAndMeParser;

impl TwentyThreeAndMeParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, path: &Path) -> Result<Vec<VariantRecord>> {
        let mut reader = open_file(path)?;
        let mut variants = Vec::new();
        let mut skipped = 0usize;

        let mut line = String::new();
        loop {
            let read = reader.read_line(&mut line).map_err(|source| Error::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if read == 0 {
                break;
            }

            match self.parse_data_line(&line) {
                LineOutcome::Variant(variant) => variants.push(variant),
                LineOutcome::Malformed => skipped += 1,
                LineOutcome::Ignored => {}
            }
            line.clear();
        }

        debug!(
            "Parsed {} variants from {} ({} malformed rows skipped)",
            variants.len(),
            path.display(),
            skipped
        );
        Ok(variants)
    }

    fn parse_data_line(&self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return LineOutcome::Ignored;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts[0].eq_ignore_ascii_case("rsid") {
            // Header row
            return LineOutcome::Ignored;
        }
        if parts.len() < 4 {
            return LineOutcome::Malformed;
        }

        LineOutcome::Variant(VariantRecord {
            rsid: parts[0].to_string(),
            chromosome: parts[1].to_string(),
            position: parts[2].to_string(),
            genotype: parts[3].to_uppercase(),
        })
    }
}

impl Default for TwentyThreeAndMeParser {
    fn default() -> Self {
        Self::new()
    }
}

enum LineOutcome {
    Variant(VariantRecord),
    Ignored,
    Malformed,
}
