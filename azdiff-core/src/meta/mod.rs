//! Command metadata snapshots.
//!
//! A snapshot is a JSON tree for one module: `module_name`, an optional
//! `compat_version`, and nested `sub_groups` / `commands` mappings. The tree
//! itself is kept as a [`serde_json::Value`]; [`Metadata`] only exposes the
//! top-level fields the driver needs.

pub mod deprecate;
pub mod navigator;

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{DiffError, Result};

/// One module's metadata snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    tree: Value,
}

impl Metadata {
    /// Wrap a parsed tree. The root must be an object with a string
    /// `module_name`.
    pub fn from_value(tree: Value) -> Result<Self> {
        if !tree.is_object() {
            return Err(DiffError::invalid_input("metadata root must be an object"));
        }
        if tree.get("module_name").and_then(Value::as_str).is_none() {
            return Err(DiffError::invalid_input("metadata is missing `module_name`"));
        }
        Ok(Self { tree })
    }

    /// Read a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DiffError::invalid_input(format!(
                "meta file {} not found",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_value(serde_json::from_str(&content)?)
    }

    pub fn module_name(&self) -> &str {
        self.tree
            .get("module_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Minimum tool version the snapshot declares; empty strings count as absent.
    pub fn compat_version(&self) -> Option<&str> {
        self.tree
            .get("compat_version")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Fail with [`DiffError::ToolOutdated`] if the snapshot needs a newer tool.
    pub fn check_compat(&self, tool_version: &str) -> Result<()> {
        match self.compat_version() {
            Some(required) if is_outdated(required, tool_version) => Err(DiffError::ToolOutdated {
                required: required.to_string(),
                current: tool_version.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Component-wise check: any numeric component of `required` greater than the
/// tool's component at the same position means the tool is outdated.
/// Non-numeric or missing components are skipped.
pub fn is_outdated(required: &str, tool_version: &str) -> bool {
    let tool: Vec<&str> = tool_version.split('.').collect();
    required.split('.').enumerate().any(|(i, component)| {
        match (component.parse::<u64>(), tool.get(i).map(|t| t.parse::<u64>())) {
            (Ok(req), Some(Ok(have))) => req > have,
            _ => false,
        }
    })
}
