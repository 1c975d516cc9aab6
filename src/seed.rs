use std::io;
use std::path::Path;

use include_dir::{include_dir, Dir};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::PracticeItem;

static SEED_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/seed");

pub const DEFAULT_SEED: &str = "corners.csv";

#[derive(Debug, Deserialize)]
struct SeedRow {
    pair: String,
    alg: String,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read seed data: {0}")]
    Io(#[from] io::Error),
    #[error("malformed seed data: {0}")]
    Csv(#[from] csv::Error),
    #[error("seed data needs `pair` and `alg` columns")]
    MissingColumns,
    #[error("no embedded seed list named {0:?}")]
    UnknownEmbedded(String),
}

/// Items read from a seed list, plus rows that could not be read at all
#[derive(Debug, Default)]
pub struct SeedData {
    pub items: Vec<PracticeItem>,
    pub rejected_rows: Vec<String>,
}

/// Read `pair,alg` CSV. Unreadable rows are skipped and reported; bad
/// algorithms are passed through for the catalog to flag.
pub fn parse_seed<R: io::Read>(reader: R) -> Result<SeedData, SeedError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers()?;
    if !(headers.iter().any(|h| h == "pair") && headers.iter().any(|h| h == "alg")) {
        return Err(SeedError::MissingColumns);
    }

    let mut data = SeedData::default();
    for row in rdr.deserialize::<SeedRow>() {
        match row {
            Ok(row) => data.items.push(PracticeItem::new(row.pair, row.alg)),
            Err(err) => data.rejected_rows.push(err.to_string()),
        }
    }

    if !data.rejected_rows.is_empty() {
        log::warn!(
            "skipped {} unreadable seed row(s): {}",
            data.rejected_rows.len(),
            data.rejected_rows.join("; ")
        );
    }
    Ok(data)
}

pub fn load_seed_file<P: AsRef<Path>>(path: P) -> Result<SeedData, SeedError> {
    let file = std::fs::File::open(path.as_ref())?;
    log::info!("loading seed data from {}", path.as_ref().display());
    parse_seed(file)
}

pub fn embedded_seed(name: &str) -> Result<SeedData, SeedError> {
    let file = SEED_DIR
        .get_file(name)
        .ok_or_else(|| SeedError::UnknownEmbedded(name.to_string()))?;
    parse_seed(file.contents())
}

pub fn default_seed() -> Result<SeedData, SeedError> {
    embedded_seed(DEFAULT_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use assert_matches::assert_matches;

    #[test]
    fn default_seed_is_all_valid() {
        let data = default_seed().unwrap();
        assert!(!data.items.is_empty());
        assert!(data.rejected_rows.is_empty());
        let (_, violations) = Catalog::from_items(data.items);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn parses_quoted_algorithms() {
        let csv = "pair,alg\nAB,\"[R, U]\"\nCD,\"[D: [R U R', D]]\"\n";
        let data = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(data.items.len(), 2);
        assert_eq!(data.items[0], PracticeItem::new("AB", "[R, U]"));
        assert_eq!(data.items[1].algorithm, "[D: [R U R', D]]");
    }

    #[test]
    fn keeps_whitespace_verbatim() {
        let csv = "pair,alg\nAB,\" [R, U]\"\n";
        let data = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(data.items[0].algorithm, " [R, U]");
    }

    #[test]
    fn extra_columns_are_ignored() {
        let csv = "pair,alg,notes\nAB,\"[R, U]\",easy\n";
        let data = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(data.items.len(), 1);
    }

    #[test]
    fn short_rows_are_rejected_not_fatal() {
        let csv = "pair,alg\nAB\nCD,\"[F, B]\"\n";
        let data = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.rejected_rows.len(), 1);
    }

    #[test]
    fn malformed_algorithms_pass_through() {
        let csv = "pair,alg\nAB,nonsense\n";
        let data = parse_seed(csv.as_bytes()).unwrap();
        assert_eq!(data.items[0].algorithm, "nonsense");
    }

    #[test]
    fn missing_columns_are_an_error() {
        let csv = "first,second\nAB,\"[R, U]\"\n";
        assert_matches!(parse_seed(csv.as_bytes()), Err(SeedError::MissingColumns));
    }

    #[test]
    fn unknown_embedded_list() {
        assert_matches!(
            embedded_seed("edges.csv"),
            Err(SeedError::UnknownEmbedded(_))
        );
    }
}
