//! Genotype file readers.
//!
//! Raw consumer exports are whitespace-delimited text, optionally gzipped.
//! [`parse_genotype_file`] is the entry point used by the pipeline.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::VariantRecord;

pub mod twentythree;

pub use twentythree::TwentyThreeAndMeParser;

/// Parse a 23andMe-style genotype file into variant records, in file order.
///
/// Fails only when the file cannot be opened or read; malformed rows are
/// skipped.
pub fn parse_genotype_file(path: &Path) -> Result<Vec<VariantRecord>> {
    TwentyThreeAndMeParser::new().parse(path)
}

/// Open a file for line-oriented reading, decompressing `.gz` files.
pub fn open_file(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_is_open_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.txt");

        match open_file(&missing) {
            Err(Error::Open { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an open error"),
        }
    }

    #[test]
    fn test_gzipped_genotype_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("genome.txt.gz");

        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        writeln!(encoder, "# rsid chromosome position genotype")?;
        writeln!(encoder, "rs762551\t15\t75041917\taa")?;
        encoder.finish()?;

        let variants = parse_genotype_file(&path)?;
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].genotype, "AA");
        Ok(())
    }
}
