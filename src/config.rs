use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Kaggle dataset slug for the Online Retail II dataset
pub const DEFAULT_DATASET: &str = "mashlyn/online-retail-ii-uci";

/// Directory the fetcher downloads into and the loader reads from
pub const DEFAULT_RAW_DIR: &str = "data/raw";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Kaggle credentials not found: set KAGGLE_USERNAME and KAGGLE_KEY, or create {0}"
    )]
    MissingCredentials(String),

    #[error("Failed to read credential file {path}: {source}")]
    CredentialFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credential file {path}: {source}")]
    CredentialFileParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// API credentials for kaggle.com
///
/// Resolved the same way the official client does: environment variables
/// first, then the kaggle.json file it writes on `kaggle configure`.
#[derive(Debug, Clone, Deserialize)]
pub struct KaggleCredentials {
    pub username: String,
    pub key: String,
}

impl KaggleCredentials {
    /// Resolve credentials from KAGGLE_USERNAME/KAGGLE_KEY, falling back to
    /// `~/.kaggle/kaggle.json` (or `$KAGGLE_CONFIG_DIR/kaggle.json`)
    pub fn resolve() -> Result<Self, ConfigError> {
        if let (Ok(username), Ok(key)) = (env::var("KAGGLE_USERNAME"), env::var("KAGGLE_KEY")) {
            return Ok(Self { username, key });
        }

        let path = credential_file_path();
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Err(ConfigError::MissingCredentials(path.display().to_string()))
        }
    }

    /// Load credentials from a kaggle.json file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialFileRead {
                path: path.display().to_string(),
                source,
            })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::CredentialFileParse {
            path: path.display().to_string(),
            source,
        })
    }
}

fn credential_file_path() -> PathBuf {
    let config_dir = env::var("KAGGLE_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(env::var("HOME").unwrap_or_else(|_| ".".to_string())).join(".kaggle")
        });
    config_dir.join("kaggle.json")
}
