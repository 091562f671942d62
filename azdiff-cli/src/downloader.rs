//! Metadata snapshot downloader.
//!
//! Snapshots for a version live under `<endpoint>/<prefix><version>/`, next to
//! an index file listing one `az_<module>_meta.json` per line. Files are saved
//! to `<root>/<prefix><version>/` and reused when `use_cache` is set.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BlobConfig;

/// Concurrent module downloads per version.
pub const DOWNLOAD_THREADS: usize = 16;

static MODULE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"az_([a-zA-Z0-9\-_]+)_meta\.json").unwrap());

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Module name of a snapshot file: `az_acr_meta.json` is `acr`.
pub fn module_name_from_file(file_name: &str) -> Option<&str> {
    MODULE_NAME_PATTERN
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Snapshot file for one module of one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFile {
    pub url: String,
    pub path: PathBuf,
    pub file_name: String,
}

pub struct Downloader {
    client: reqwest::Client,
    blob: BlobConfig,
    root: PathBuf,
    use_cache: bool,
}

impl Downloader {
    pub fn new(blob: BlobConfig, root: impl Into<PathBuf>, use_cache: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            blob,
            root: root.into(),
            use_cache,
        }
    }

    /// Local directory holding one version's snapshots.
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.root
            .join(format!("{}{}", self.blob.metadata_path_prefix, version))
    }

    fn meta_file(&self, version: &str, file_name: &str) -> MetaFile {
        MetaFile {
            url: self.blob.file_url(version, file_name),
            path: self.version_dir(version).join(file_name),
            file_name: file_name.to_string(),
        }
    }

    /// Download every module listed in the version index.
    ///
    /// Failures are logged; files that could not be fetched are still listed
    /// but do not exist on disk.
    pub async fn fetch_version(&self, version: &str) -> Vec<MetaFile> {
        let file_names = match self.fetch_index(version).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Failed to fetch module index for {}: {}", version, e);
                return Vec::new();
            }
        };
        if let Err(e) = std::fs::create_dir_all(self.version_dir(version)) {
            warn!("Cannot create {}: {}", self.version_dir(version).display(), e);
            return Vec::new();
        }

        let files: Vec<MetaFile> = file_names
            .iter()
            .map(|name| self.meta_file(version, name))
            .collect();

        let spinner = progress_spinner();
        spinner.set_message(format!("Downloading {} ({} modules)...", version, files.len()));

        stream::iter(files.iter())
            .map(|file| async move { (file, self.download(file).await) })
            .buffer_unordered(DOWNLOAD_THREADS)
            .for_each(|(file, result)| {
                if let Err(e) = result {
                    warn!("Failed to download {}: {}", file.url, e);
                }
                spinner.inc(1);
                async {}
            })
            .await;

        spinner.finish_and_clear();
        files
    }

    /// Download a single module's snapshot.
    pub async fn fetch_module(&self, version: &str, module: &str) -> MetaFile {
        let file = self.meta_file(version, &format!("az_{}_meta.json", module));
        let result = match std::fs::create_dir_all(self.version_dir(version)) {
            Ok(()) => self.download(&file).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!("Failed to download {}: {}", file.url, e);
        }
        file
    }

    async fn fetch_index(&self, version: &str) -> Result<Vec<String>, DownloadError> {
        let url = self
            .blob
            .file_url(version, &self.blob.metadata_module_index_file);
        debug!("Fetching index {}", url);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_index(&body))
    }

    async fn download(&self, file: &MetaFile) -> Result<(), DownloadError> {
        if self.use_cache && file.path.exists() {
            info!("Using cached {} for {}", file.path.display(), file.file_name);
            return Ok(());
        }
        info!("Downloading {} for {}", file.url, file.file_name);
        let meta: serde_json::Value = self
            .client
            .get(&file.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        write_pretty(&file.path, &meta)
    }
}

fn parse_index(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn write_pretty(path: &Path, meta: &serde_json::Value) -> Result<(), DownloadError> {
    std::fs::write(path, serde_json::to_string_pretty(meta)?)?;
    Ok(())
}

fn progress_spinner() -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg} [{pos}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
