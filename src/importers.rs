//! Dataset download and raw-file importers for the staging pipeline

pub mod csv_importer;
pub mod downloader;
pub mod excel_importer;
pub mod locate;

// Re-export commonly used items
pub use csv_importer::CsvImporter;
pub use downloader::KaggleDownloader;
pub use excel_importer::ExcelImporter;
pub use locate::{find_input_file, list_data_files};

use std::path::Path;
use thiserror::Error;

use crate::staging::RawTable;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Excel import failed: {0}")]
    Excel(#[from] excel_importer::ExcelImportError),

    #[error("CSV import failed: {0}")]
    Csv(#[from] csv_importer::CsvImportError),

    #[error("Unsupported input file extension: {0}")]
    UnsupportedExtension(String),
}

/// Parse a data file into a raw table, choosing the parser by extension
pub fn parse_data_file(path: &Path) -> Result<RawTable, ImportError> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("xlsx") => Ok(ExcelImporter::new(path).parse()?),
        Some("csv") => Ok(CsvImporter::new(path).parse()?),
        _ => Err(ImportError::UnsupportedExtension(
            path.display().to_string(),
        )),
    }
}
