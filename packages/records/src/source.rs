//! Where the dashboard tables are read from.
//!
//! Tables live either in a local directory or behind a base URL that serves
//! them as static files. Both are read whole and handed to [`crate::parse`].

use std::path::PathBuf;

use crate::{DataFile, RecordsError, Table, parse};

/// Default directory holding the CSV tables.
pub const DEFAULT_DATA_DIR: &str = "data";

/// A location the three tables can be read from.
#[derive(Debug, Clone)]
pub enum TableSource {
    /// A local directory containing the CSV files.
    Directory(PathBuf),
    /// A base URL; each table is fetched with `GET {base_url}/{file_name}`.
    Http {
        /// URL prefix without a trailing slash.
        base_url: String,
        /// Shared client.
        client: reqwest::Client,
    },
}

impl TableSource {
    /// Creates a directory-backed source.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory(path.into())
    }

    /// Creates a URL-backed source.
    #[must_use]
    pub fn http(base_url: &str) -> Self {
        Self::Http {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Builds a source from the environment.
    ///
    /// `NOISE_DATA_URL` wins when set; otherwise `NOISE_DATA_DIR`, falling
    /// back to [`DEFAULT_DATA_DIR`].
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(url) = std::env::var("NOISE_DATA_URL")
            && !url.is_empty()
        {
            return Self::http(&url);
        }
        let dir = std::env::var("NOISE_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::directory(dir)
    }

    /// Human-readable description for log messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Directory(dir) => dir.display().to_string(),
            Self::Http { base_url, .. } => base_url.clone(),
        }
    }

    /// Reads the raw text of a table.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::NotFound`] if the file does not exist (or the
    /// server answers 404), [`RecordsError::Io`] for other read failures, and
    /// [`RecordsError::Http`] for failed or non-success fetches.
    pub async fn load_text(&self, file: DataFile) -> Result<String, RecordsError> {
        match self {
            Self::Directory(dir) => {
                let path = dir.join(file.file_name());
                log::debug!("Reading {}", path.display());
                tokio::fs::read_to_string(&path).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        RecordsError::NotFound {
                            file: path.display().to_string(),
                        }
                    } else {
                        RecordsError::Io(e)
                    }
                })
            }
            Self::Http { base_url, client } => {
                let url = format!("{base_url}/{}", file.file_name());
                log::debug!("Fetching {url}");
                let response = client.get(&url).send().await?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(RecordsError::NotFound { file: url });
                }
                Ok(response.error_for_status()?.text().await?)
            }
        }
    }

    /// Reads and parses a table.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if the table cannot be read. Parsing itself
    /// never fails.
    pub async fn load(&self, file: DataFile) -> Result<Table, RecordsError> {
        let text = self.load_text(file).await?;
        let table = parse(&text);
        log::info!(
            "Loaded {} ({} rows) from {}",
            file.file_name(),
            table.records.len(),
            self.describe()
        );
        Ok(table)
    }
}
