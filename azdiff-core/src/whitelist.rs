//! Whitelist of accepted breaking changes.
//!
//! Each line holds a tab-joined filter key, e.g. `1014\tacr\txyz`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::differ::changes::MetaChange;
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct Whitelist {
    keys: HashSet<String>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a file. A missing file yields an empty whitelist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Whitelist {} not found, skipped", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let whitelist = Self::parse(&content);
        debug!(
            "Loaded {} whitelist entries from {}",
            whitelist.len(),
            path.display()
        );
        Ok(whitelist)
    }

    /// Parse whitelist text; blank lines are ignored, trailing whitespace
    /// (including `\r`) is trimmed.
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether `change` is a whitelisted breaking change.
    pub fn suppresses(&self, change: &MetaChange) -> bool {
        change.is_break
            && change
                .filter_key_joined()
                .is_some_and(|key| self.keys.contains(&key))
    }

    /// Drop every whitelisted breaking change.
    pub fn apply(&self, changes: Vec<MetaChange>) -> Vec<MetaChange> {
        if self.is_empty() {
            return changes;
        }
        let before = changes.len();
        let kept: Vec<MetaChange> = changes
            .into_iter()
            .filter(|change| !self.suppresses(change))
            .collect();
        debug!("Whitelist removed {} changes", before - kept.len());
        kept
    }
}

impl FromIterator<String> for Whitelist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
