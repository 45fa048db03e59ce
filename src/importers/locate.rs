use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("No .xlsx or .csv files found in {0}")]
    NoInputFile(String),

    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// List the data files under `dir`: all `.xlsx` files first, then all
/// `.csv` files, each group sorted by file name.
///
/// Sorting keeps selection deterministic across platforms; the xlsx-first
/// precedence matches the download's published format preference.
pub fn list_data_files(dir: &Path) -> Result<Vec<PathBuf>, LocateError> {
    let read_dir = fs::read_dir(dir).map_err(|source| LocateError::ReadDir {
        path: dir.display().to_string(),
        source,
    })?;

    let mut xlsx_files = Vec::new();
    let mut csv_files = Vec::new();

    for entry in read_dir {
        let entry = entry.map_err(|source| LocateError::ReadDir {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("xlsx") => xlsx_files.push(path),
            Some("csv") => csv_files.push(path),
            _ => {}
        }
    }

    xlsx_files.sort();
    csv_files.sort();
    xlsx_files.extend(csv_files);

    debug!("Found {} data files in {}", xlsx_files.len(), dir.display());
    Ok(xlsx_files)
}

/// Pick the input file for the loader: the first data file under `dir`
pub fn find_input_file(dir: &Path) -> Result<PathBuf, LocateError> {
    list_data_files(dir)?
        .into_iter()
        .next()
        .ok_or_else(|| LocateError::NoInputFile(dir.display().to_string()))
}
