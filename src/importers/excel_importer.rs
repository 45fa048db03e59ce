use calamine::{open_workbook, Data, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::staging::{CellValue, RawTable};

#[derive(Error, Debug)]
pub enum ExcelImportError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Workbook has no worksheets: {0}")]
    NoWorksheet(String),

    #[error("Failed to read worksheet: {0}")]
    SheetRead(String),

    #[error("Worksheet is empty: {0}")]
    EmptySheet(String),
}

/// Parser for the Excel edition of the Online Retail dataset
///
/// The workbook carries the data on its first worksheet, with the column
/// headers in the first row. Parsing is synchronous, callers on the async
/// side should use spawn_blocking.
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the first worksheet into a raw table
    pub fn parse(&self) -> Result<RawTable, ExcelImportError> {
        let mut workbook: Xlsx<BufReader<File>> = open_workbook(&self.path)
            .map_err(|e: calamine::XlsxError| ExcelImportError::WorkbookOpen(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ExcelImportError::NoWorksheet(self.path.display().to_string()))?
            .map_err(|e| ExcelImportError::SheetRead(e.to_string()))?;

        let mut rows_iter = range.rows();
        let header_row = rows_iter
            .next()
            .ok_or_else(|| ExcelImportError::EmptySheet(self.path.display().to_string()))?;

        let columns: Vec<String> = header_row.iter().map(header_to_string).collect();

        let rows: Vec<Vec<CellValue>> = rows_iter
            .map(|row| row.iter().map(data_to_cell).collect::<Vec<_>>())
            .filter(|cells: &Vec<CellValue>| {
                cells.iter().any(|c| !matches!(c, CellValue::Empty))
            })
            .collect();

        info!(
            "Loaded {} rows with columns {:?} from {}",
            rows.len(),
            columns,
            self.path.display()
        );

        Ok(RawTable { columns, rows })
    }
}

fn header_to_string(data: &Data) -> String {
    match data {
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_not_found() {
        let importer = ExcelImporter::new("/nonexistent/path/to/file.xlsx");
        let result = importer.parse();

        assert!(result.is_err());
        match result.unwrap_err() {
            ExcelImportError::WorkbookOpen(_) => {}
            other => panic!("Expected WorkbookOpen error, got: {other:?}"),
        }
    }

    #[test]
    fn test_data_to_cell_mapping() {
        assert_eq!(data_to_cell(&Data::Empty), CellValue::Empty);
        assert_eq!(
            data_to_cell(&Data::String("abc".to_string())),
            CellValue::Text("abc".to_string())
        );
        assert_eq!(data_to_cell(&Data::Int(6)), CellValue::Int(6));
        assert_eq!(data_to_cell(&Data::Float(3.39)), CellValue::Float(3.39));
        assert_eq!(
            data_to_cell(&Data::Bool(true)),
            CellValue::Text("true".to_string())
        );
    }

    #[test]
    fn test_header_trimming() {
        assert_eq!(header_to_string(&Data::String("  Invoice ".to_string())), "Invoice");
    }
}
