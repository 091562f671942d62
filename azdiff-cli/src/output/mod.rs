//! Output formatting for azdiff results.
//!
//! `meta-diff` emits text lines, dict entries or a module tree; `version-diff`
//! emits dict entries as JSON or CSV. Files are written with parent
//! directories created on demand.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use azdiff_core::OutputShape;
use clap::ValueEnum;

mod csv;
mod json;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;

/// Output type of `meta-diff`.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum MetaOutputType {
    /// One line per change
    #[default]
    Text,
    /// Flat list of change records
    Dict,
    /// Changes nested by subgroup path
    Tree,
}

impl From<MetaOutputType> for OutputShape {
    fn from(value: MetaOutputType) -> Self {
        match value {
            MetaOutputType::Text => OutputShape::Text,
            MetaOutputType::Dict => OutputShape::Dict,
            MetaOutputType::Tree => OutputShape::Tree,
        }
    }
}

/// Output type of `version-diff`.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum VersionOutputType {
    /// JSON list of change records
    #[default]
    Dict,
    /// One CSV row per change record
    Csv,
}

impl FromStr for VersionOutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dict" => Ok(VersionOutputType::Dict),
            "csv" => Ok(VersionOutputType::Csv),
            _ => Err(format!("Unknown output type: {}. Valid: dict, csv", s)),
        }
    }
}

/// Write `content` to `path`, creating missing parent directories.
pub fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Output written to {}", path.display());
    Ok(())
}
