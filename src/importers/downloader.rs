use reqwest::{Client, StatusCode};
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::config::KaggleCredentials;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Dataset not found (404): {0}")]
    NotFound(String),

    #[error("Server error (5xx): {0}")]
    ServerError(String),

    #[error("Failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to write extracted file: {0}")]
    Io(#[from] std::io::Error),
}

/// Kaggle API client for downloading dataset archives
pub struct KaggleDownloader {
    client: Client,
    base_url: String,
    credentials: KaggleCredentials,
}

impl KaggleDownloader {
    /// Create a new downloader against the public Kaggle API
    pub fn new(credentials: KaggleCredentials) -> Self {
        Self::with_base_url(credentials, "https://www.kaggle.com/api/v1/".to_string())
    }

    /// Create a downloader with a custom base URL (for mocking)
    pub fn with_base_url(credentials: KaggleCredentials, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            credentials,
        }
    }

    /// Download a dataset archive by its `owner/name` slug.
    /// Returns the raw zip bytes.
    pub async fn download_dataset(&self, slug: &str) -> Result<Vec<u8>, DownloadError> {
        let url = format!("{}datasets/download/{slug}", self.base_url);

        info!("Downloading dataset '{}' from {}", slug, url);
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.key))
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            debug!("Downloaded '{slug}' ({} bytes)", bytes.len());
            Ok(bytes.to_vec())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(DownloadError::AuthFailed(format!(
                "{status} while downloading '{slug}', check your Kaggle credentials"
            )))
        } else if status.as_u16() == 404 {
            Err(DownloadError::NotFound(format!(
                "dataset '{slug}' not found on server"
            )))
        } else if status.is_server_error() {
            Err(DownloadError::ServerError(format!(
                "Server error {status} while downloading '{slug}'"
            )))
        } else {
            Err(DownloadError::HttpError(
                response.error_for_status().unwrap_err(),
            ))
        }
    }

    /// Download a dataset archive and extract its contents into `dest_dir`.
    /// Returns the paths of the extracted files.
    pub async fn download_and_unzip(
        &self,
        slug: &str,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, DownloadError> {
        let bytes = self.download_dataset(slug).await?;
        let extracted = unzip_archive(&bytes, dest_dir)?;
        info!(
            "Unzipped {} files into {}",
            extracted.len(),
            dest_dir.display()
        );
        Ok(extracted)
    }
}

/// Extract every entry of a zip archive into `dest_dir`.
///
/// Directories are created as needed and existing files are overwritten.
/// Entries whose names escape the destination are skipped.
pub fn unzip_archive(bytes: &[u8], dest_dir: &Path) -> Result<Vec<PathBuf>, DownloadError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative_path = match entry.enclosed_name() {
            Some(path) => path,
            None => {
                warn!("Skipping archive entry with unsafe path: {}", entry.name());
                continue;
            }
        };
        let dest_path = dest_dir.join(relative_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path)?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents)?;
        fs::write(&dest_path, &contents)?;
        debug!("Extracted {} ({} bytes)", dest_path.display(), contents.len());
        extracted.push(dest_path);
    }

    Ok(extracted)
}
