//! CSV import for placement exports. Produces the same loosely-typed values
//! the portal API returns, so both sources share one normalizer.

mod normalizer;
mod parser;

use serde_json::Value;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PlacementImportError {
    #[error("failed to read placement export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid placement CSV data: {0}")]
    Csv(#[from] csv::Error),
}

pub struct PlacementCsvImporter;

impl PlacementCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Value>, PlacementImportError> {
        let file = std::fs::File::open(path.as_ref())?;
        let rows = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            rows = rows.len(),
            "imported placement export"
        );
        Ok(rows)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Value>, PlacementImportError> {
        Ok(parser::parse_rows(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn from_path_propagates_io_errors() {
        let error = PlacementCsvImporter::from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            PlacementImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn from_reader_yields_engine_input() {
        let rows = PlacementCsvImporter::from_reader(Cursor::new(
            "appId,City,State Name,Placed At\n7,Columbus,Ohio,2026-03-04\n",
        ))
        .expect("import succeeds");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["app_id"], "7");
        assert_eq!(rows[0]["state"], "Ohio");
    }
}
