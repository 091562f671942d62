//! End-to-end metadata diff: gate, expand, walk, detect, filter, export.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::differ::changes::MetaChange;
use crate::differ::detector::MetaChangeDetector;
use crate::differ::walker::deep_diff;
use crate::error::{DiffError, Result};
use crate::exporter::{self, tree, ChangeEntry, ModuleTree, TextLine};
use crate::meta::{deprecate, Metadata};
use crate::rules::RuleCatalog;
use crate::whitelist::Whitelist;
use crate::TOOL_VERSION;

/// Shape of the exported result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputShape {
    #[default]
    Text,
    Dict,
    Tree,
}

impl OutputShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputShape::Text => "text",
            OutputShape::Dict => "dict",
            OutputShape::Tree => "tree",
        }
    }
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputShape {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputShape::Text),
            "dict" => Ok(OutputShape::Dict),
            "tree" => Ok(OutputShape::Tree),
            other => Err(DiffError::invalid_input(format!(
                "unsupported output type `{}`",
                other
            ))),
        }
    }
}

/// Options for a metadata diff run.
#[derive(Clone, Debug)]
pub struct DiffOptions {
    /// Export breaking changes only.
    pub only_break: bool,
    pub output: OutputShape,
    pub whitelist: Whitelist,
    pub rules: RuleCatalog,
    /// Version compared against each snapshot's `compat_version`.
    pub tool_version: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            only_break: false,
            output: OutputShape::default(),
            whitelist: Whitelist::default(),
            rules: RuleCatalog::default(),
            tool_version: TOOL_VERSION.to_string(),
        }
    }
}

impl DiffOptions {
    pub fn with_output(mut self, output: OutputShape) -> Self {
        self.output = output;
        self
    }

    pub fn with_only_break(mut self, only_break: bool) -> Self {
        self.only_break = only_break;
        self
    }

    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = whitelist;
        self
    }
}

/// Exported diff in the requested shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiffOutput {
    Text(Vec<TextLine>),
    Dict(Vec<ChangeEntry>),
    Tree(ModuleTree),
}

impl DiffOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            DiffOutput::Text(lines) => lines.is_empty(),
            DiffOutput::Dict(entries) => entries.is_empty(),
            DiffOutput::Tree(tree) => tree.root.is_empty(),
        }
    }
}

/// Detect whitelist-filtered changes between two snapshots.
///
/// Ignored changes are still present; the exporters drop them.
pub fn detect_changes(
    base: &Metadata,
    diff: &Metadata,
    options: &DiffOptions,
) -> Result<Vec<MetaChange>> {
    if base.module_name() != diff.module_name() {
        return Err(DiffError::ModuleMismatch {
            base: base.module_name().to_string(),
            diff: diff.module_name().to_string(),
        });
    }
    base.check_compat(&options.tool_version)?;
    diff.check_compat(&options.tool_version)?;

    let start = Instant::now();
    let base_tree = deprecate::expand(base.tree());
    let diff_tree = deprecate::expand(diff.tree());

    let deep = deep_diff(&base_tree, &diff_tree);
    if deep.is_empty() {
        info!("No meta diffs for module {}", base.module_name());
        return Ok(Vec::new());
    }
    debug!("{} structural diffs for {}", deep.len(), base.module_name());

    let changes =
        MetaChangeDetector::new(&base_tree, &diff_tree, &options.rules).detect(&deep)?;
    let changes = options.whitelist.apply(changes);

    info!(
        "Detected {} changes for {} in {:.2}ms",
        changes.len(),
        base.module_name(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(changes)
}

/// Diff two snapshots and export in `options.output` shape.
pub fn meta_diff(base: &Metadata, diff: &Metadata, options: &DiffOptions) -> Result<DiffOutput> {
    let changes = detect_changes(base, diff, options)?;
    Ok(match options.output {
        OutputShape::Text => DiffOutput::Text(exporter::export_text(&changes, options.only_break)),
        OutputShape::Dict => DiffOutput::Dict(exporter::export_dict(&changes, options.only_break)),
        OutputShape::Tree => DiffOutput::Tree(tree::export_tree(
            base.module_name(),
            &changes,
            options.only_break,
        )),
    })
}

/// [`meta_diff`] on two snapshot files.
pub fn meta_diff_files(
    base: impl AsRef<Path>,
    diff: impl AsRef<Path>,
    options: &DiffOptions,
) -> Result<DiffOutput> {
    let base = Metadata::load(base)?;
    let diff = Metadata::load(diff)?;
    meta_diff(&base, &diff, options)
}
