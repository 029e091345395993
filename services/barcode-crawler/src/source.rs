//!
//! src/source.rs  Andrew Belles  Oct 16th, 2026
//!
//! Reads the barcode column out of the spreadsheet export
//!

use std::{fs::File, io::Read};

use tracing::{debug, warn};

use crate::config::InputConfig;
use crate::errors::CrawlerError;

pub fn read_barcodes(cfg: &InputConfig) -> Result<Vec<String>, CrawlerError> {
    let file = File::open(&cfg.path).map_err(|e| CrawlerError::Config(
        format!("open {}: {e}", cfg.path.display())
    ))?;
    let barcodes = barcodes_from_reader(file, &cfg.column, cfg.skip_rows)?;
    debug!(path = %cfg.path.display(), count = barcodes.len(), "source.read");
    Ok(barcodes)
}

pub fn barcodes_from_reader<R: Read>(reader: R, column: &str, skip_rows: usize) ->
    Result<Vec<String>, CrawlerError> {

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = rdr.records().skip(skip_rows);

    let header = records.next()
        .ok_or_else(|| CrawlerError::Config(
            format!("no header row after skipping {skip_rows} rows")
        ))??;
    let index = header.iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| CrawlerError::Config(
            format!("column {column:?} not found in header")
        ))?;

    let mut barcodes = Vec::new();
    for (row, record) in records.enumerate() {
        let record = record?;
        let Some(raw) = record.get(index) else { continue };
        if raw.trim().is_empty() {
            continue;
        }
        match normalize_barcode(raw) {
            Some(code) => barcodes.push(code),
            None => warn!(row = row + 1, value = raw, "source.skip.not_numeric"),
        }
    }
    Ok(barcodes)
}

///
/// Spreadsheet exports turn long codes into floats ("6.02567876428E+11",
/// "602567876428.0"). Digit strings pass through untouched so leading
/// zeros survive; integral floats are printed back as integers.
///
pub fn normalize_barcode(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return Some(s.to_string());
    }
    let value = s.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < 1e18 {
        Some(format!("{}", value as u64))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Barcode scanner export,,,
Generated,2024-03-01,,
Timestamp,Date,Code,Notes
2024-03-01 10:00,2024-03-01,602567876428,first
2024-03-01 10:01,2024-03-01,,blank
2024-03-01 10:02,2024-03-01,7.24384960650E+11,sci
2024-03-01 10:03,2024-03-01,00602567876428.0,float
2024-03-01 10:04,2024-03-01,not a code,junk
2024-03-01 10:05,2024-03-01, 0724384960650 ,padded
short,row
";

    #[test]
    fn reads_code_column_after_preamble() {
        let codes = barcodes_from_reader(EXPORT.as_bytes(), "Code", 2).unwrap();
        assert_eq!(codes, vec![
            "602567876428",
            "724384960650",
            "602567876428",
            "0724384960650",
        ]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = barcodes_from_reader(EXPORT.as_bytes(), "UPC", 2).unwrap_err();
        assert!(matches!(err, CrawlerError::Config(msg) if msg.contains("UPC")));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = barcodes_from_reader("".as_bytes(), "Code", 0).unwrap_err();
        assert!(matches!(err, CrawlerError::Config(_)));
    }

    #[test]
    fn header_on_first_row() {
        let codes = barcodes_from_reader("Code\n123\n\n456\n".as_bytes(), "Code", 0).unwrap();
        assert_eq!(codes, vec!["123", "456"]);
    }

    #[test]
    fn normalize_rejects_fractions_and_negatives() {
        assert_eq!(normalize_barcode("12.5"), None);
        assert_eq!(normalize_barcode("-1"), None);
        assert_eq!(normalize_barcode("NaN"), None);
        assert_eq!(normalize_barcode("  "), None);
        assert_eq!(normalize_barcode("1e3").as_deref(), Some("1000"));
    }

    #[test]
    fn read_barcodes_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cd_barcodes.csv");
        std::fs::write(&path, EXPORT).unwrap();

        let cfg = InputConfig { path, column: "Code".into(), skip_rows: 2 };
        assert_eq!(read_barcodes(&cfg).unwrap().len(), 4);

        let missing = InputConfig { path: dir.path().join("nope.csv"), ..cfg };
        assert!(matches!(read_barcodes(&missing), Err(CrawlerError::Config(_))));
    }
}
