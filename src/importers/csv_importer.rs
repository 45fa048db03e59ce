use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::staging::{CellValue, RawTable};

#[derive(Error, Debug)]
pub enum CsvImportError {
    #[error("Failed to read CSV file: {0}")]
    Csv(#[from] csv::Error),
}

/// Parser for the CSV edition of the Online Retail dataset.
///
/// Every cell is read as text; typing happens during normalization.
pub struct CsvImporter {
    path: PathBuf,
}

impl CsvImporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(&self) -> Result<RawTable, CsvImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        info!(
            "Loaded {} rows with columns {:?} from {}",
            rows.len(),
            columns,
            self.path.display()
        );

        Ok(RawTable { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_file_not_found() {
        let importer = CsvImporter::new("/nonexistent/path/to/file.csv");
        let result = importer.parse();
        assert!(matches!(result, Err(CsvImportError::Csv(_))));
    }
}
