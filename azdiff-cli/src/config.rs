//! Blob storage configuration loaded from an INI file.
//!
//! ```ini
//! [BLOB]
//! primary_endpoint = https://example.blob.core.windows.net/cmd-metadata
//! metadata_path_prefix = azure-cli-
//! metadata_module_index_file = index.txt
//! ```
//!
//! The path comes from `--config`, then `AZDIFF_CONFIG`, then `./azdiff.ini`.

use std::path::Path;

use anyhow::{bail, Context};
use config::{Config, File, FileFormat};
use serde::Deserialize;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "azdiff.ini";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "BLOB", alias = "blob")]
    blob: BlobConfig,
}

/// Where versioned metadata snapshots are published.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BlobConfig {
    /// Base URL of the storage container.
    pub primary_endpoint: String,
    /// Prefix of each per-version directory, e.g. `azure-cli-` for `azure-cli-2.50.0/`.
    pub metadata_path_prefix: String,
    /// Name of the per-version index listing one module file per line.
    pub metadata_module_index_file: String,
}

impl BlobConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            bail!("Config file {} not found", path.display());
        }
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let file: ConfigFile = settings
            .try_deserialize()
            .with_context(|| format!("Invalid [BLOB] section in {}", path.display()))?;
        tracing::debug!("Loaded blob config from {}", path.display());
        Ok(file.blob)
    }

    /// URL of a file inside a version directory.
    pub fn file_url(&self, version: &str, file_name: &str) -> String {
        format!(
            "{}/{}{}/{}",
            self.primary_endpoint.trim_end_matches('/'),
            self.metadata_path_prefix,
            version,
            file_name
        )
    }
}
