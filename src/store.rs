//! JSON file persistence for the URL list and check history
//!
//! Both documents are rewritten in full on every save. Load and save never
//! fail towards the caller: errors are logged and the in-memory state stays
//! authoritative.

use crate::errors::Result;
use crate::health::CheckResult;
use crate::history::{History, HistoryLog};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

/// Reads and writes the two persisted documents
#[derive(Debug, Clone)]
pub struct JsonStore {
    urls_path: PathBuf,
    history_path: PathBuf,
    default_urls: Vec<String>,
}

impl JsonStore {
    pub fn new(
        urls_path: impl Into<PathBuf>,
        history_path: impl Into<PathBuf>,
        default_urls: Vec<String>,
    ) -> Self {
        Self {
            urls_path: urls_path.into(),
            history_path: history_path.into(),
            default_urls,
        }
    }

    pub fn urls_path(&self) -> &Path {
        &self.urls_path
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Load the monitored URLs, falling back to the seed list when the
    /// document is absent, empty or unreadable
    pub async fn load_urls(&self) -> Vec<String> {
        match read_document::<Vec<String>>(&self.urls_path).await {
            Ok(Some(urls)) => {
                let urls = dedupe(urls);
                info!("Loaded {} monitored URLs from {}", urls.len(), self.urls_path.display());
                urls
            }
            Ok(None) => {
                info!(
                    "No URL list at {}, seeding {} default URLs",
                    self.urls_path.display(),
                    self.default_urls.len()
                );
                self.default_urls.clone()
            }
            Err(e) => {
                error!(
                    "Failed to load URL list from {}, using defaults: {}",
                    self.urls_path.display(),
                    e
                );
                self.default_urls.clone()
            }
        }
    }

    /// Overwrite the URL document with the full set
    pub async fn save_urls(&self, urls: &[String]) {
        match write_document(&self.urls_path, urls).await {
            Ok(()) => debug!("Saved {} URLs to {}", urls.len(), self.urls_path.display()),
            Err(e) => error!("Error saving URLs to {}: {}", self.urls_path.display(), e),
        }
    }

    /// Load the per-URL history, empty when absent or unreadable.
    ///
    /// Entries are parsed one at a time so a single bad entry only costs
    /// that entry. Entries without a `url` take it from their key.
    pub async fn load_history(&self) -> History {
        let raw = match read_document::<BTreeMap<String, Vec<Value>>>(&self.history_path).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return History::new(),
            Err(e) => {
                error!(
                    "Failed to load history from {}, starting empty: {}",
                    self.history_path.display(),
                    e
                );
                return History::new();
            }
        };

        let mut history = History::new();
        let mut skipped = 0usize;
        for (url, values) in raw {
            let mut entries = Vec::with_capacity(values.len());
            for value in values {
                match serde_json::from_value::<CheckResult>(value) {
                    Ok(mut result) => {
                        if result.url.is_empty() {
                            result.url = url.clone();
                        }
                        entries.push(result);
                    }
                    Err(e) => {
                        skipped += 1;
                        warn!("Dropping unreadable history entry for {}: {}", url, e);
                    }
                }
            }
            history.insert(url, HistoryLog::from_entries(entries));
        }

        info!(
            "Loaded history for {} URLs from {} ({} entries dropped)",
            history.len(),
            self.history_path.display(),
            skipped
        );
        history
    }

    /// Overwrite the history document with the full mapping
    pub async fn save_history(&self, history: &History) {
        match write_document(&self.history_path, history).await {
            Ok(()) => debug!("Saved history for {} URLs to {}", history.len(), self.history_path.display()),
            Err(e) => error!("Error saving history to {}: {}", self.history_path.display(), e),
        }
    }
}

/// Read and parse a JSON document. `Ok(None)` means missing or blank.
async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&contents)?))
}

/// Write a document to a sibling temp file, then rename it over the target
/// so readers never observe a half-written file
async fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');

    let tmp_path = temp_path_for(path);
    let mut file = File::create(&tmp_path).await?;
    file.write_all(&bytes).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn dedupe(urls: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(urls.len());
    for url in urls {
        let url = url.trim().to_string();
        if url.is_empty() {
            warn!("Skipping blank URL in URL list");
            continue;
        }
        if unique.contains(&url) {
            warn!("Skipping duplicate URL {} in URL list", url);
            continue;
        }
        unique.push(url);
    }
    unique
}
