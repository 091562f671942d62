//! Exporters for detected changes.
//!
//! - **text**: one line per change (see [`MetaChange`]'s `Display`)
//! - **dict**: a flat list of [`ChangeEntry`] records
//! - **tree**: changes nested by subgroup path, see [`tree`]
//!
//! Ignored changes are never exported; `only_break` additionally drops every
//! non-breaking change.

pub mod tree;

use std::fmt;

use serde::{Serialize, Serializer};

use crate::differ::changes::MetaChange;
use crate::rules::DiffLevel;

pub use tree::{ModuleTree, TreeNode};

/// Dict form of a change.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChangeEntry {
    pub rule_id: String,
    pub rule_link_url: String,
    pub is_break: bool,
    pub diff_level: DiffLevel,
    pub rule_message: String,
    pub suggest_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subgroup_name: Option<String>,
    pub rule_name: String,
    /// Set by version-wide diffs that span several modules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl From<&MetaChange> for ChangeEntry {
    fn from(change: &MetaChange) -> Self {
        Self {
            rule_id: change.rule_id().to_string(),
            rule_link_url: change.rule_link_url.clone(),
            is_break: change.is_break,
            diff_level: change.diff_level,
            rule_message: change.rule_message.clone(),
            suggest_message: change.suggest_message.clone(),
            cmd_name: change.cmd_name().map(String::from),
            subgroup_name: change.subgroup_name().map(String::from),
            rule_name: change.rule_name().to_string(),
            module: None,
        }
    }
}

impl ChangeEntry {
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }
}

/// Changes that survive the export gates.
pub fn exported(changes: &[MetaChange], only_break: bool) -> impl Iterator<Item = &MetaChange> {
    changes
        .iter()
        .filter(move |c| !c.is_ignore && (!only_break || c.is_break))
}

/// Text form of a change; serializes as the bare line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLine {
    pub is_break: bool,
    pub line: String,
}

impl From<&MetaChange> for TextLine {
    fn from(change: &MetaChange) -> Self {
        Self {
            is_break: change.is_break,
            line: change.to_string(),
        }
    }
}

impl fmt::Display for TextLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

impl Serialize for TextLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.line)
    }
}

pub fn export_text(changes: &[MetaChange], only_break: bool) -> Vec<TextLine> {
    exported(changes, only_break).map(TextLine::from).collect()
}

pub fn export_dict(changes: &[MetaChange], only_break: bool) -> Vec<ChangeEntry> {
    exported(changes, only_break).map(ChangeEntry::from).collect()
}
