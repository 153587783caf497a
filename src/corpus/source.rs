use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::debug;

use crate::{
    corpus::{csv::parse_table, CorpusLoader, CorpusRow},
    error::LoadError,
};

/// CSV export URL of a Google Sheet
pub fn sheet_csv_url(sheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/export?format=csv", sheet_id)
}

/// Fetches the trigger table over HTTP
pub struct HttpCsvLoader {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpCsvLoader {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Loader for the CSV export of a Google Sheet
    pub fn for_sheet(sheet_id: &str, timeout: Duration) -> Result<Self, LoadError> {
        if sheet_id.trim().is_empty() {
            return Err(LoadError::MissingSource);
        }
        Self::new(sheet_csv_url(sheet_id.trim()), timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CorpusLoader for HttpCsvLoader {
    fn load(&self) -> Result<Vec<CorpusRow>, LoadError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        debug!(url = %self.url, bytes = body.len(), "fetched corpus table");
        parse_table(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the trigger table from a local CSV file
pub struct FileCsvLoader {
    path: PathBuf,
}

impl FileCsvLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CorpusLoader for FileCsvLoader {
    fn load(&self) -> Result<Vec<CorpusRow>, LoadError> {
        let text = fs::read_to_string(&self.path)?;
        parse_table(&text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves a fixed set of rows
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    rows: Vec<CorpusRow>,
}

impl StaticLoader {
    pub fn new(rows: Vec<CorpusRow>) -> Self {
        Self { rows }
    }

    /// Build from `(keywords, answer)` pairs
    pub fn from_pairs<K, A>(pairs: &[(K, A)]) -> Self
    where
        K: AsRef<str>,
        A: AsRef<str>,
    {
        Self {
            rows: pairs
                .iter()
                .map(|(k, a)| CorpusRow::new(k.as_ref(), a.as_ref()))
                .collect(),
        }
    }
}

impl CorpusLoader for StaticLoader {
    fn load(&self) -> Result<Vec<CorpusRow>, LoadError> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} rows)", self.rows.len())
    }
}
