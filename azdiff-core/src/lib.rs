//! azdiff core - breaking change detection for CLI command metadata.
//!
//! Compares two metadata snapshots of one module (a tree of subgroups,
//! commands and parameters) and classifies every difference under a numbered
//! rule with a severity: informational, warning or breaking.
//!
//! # Pipeline
//!
//! 1. Gate on `module_name` and `compat_version`
//! 2. Flatten nested `deprecate_info` objects ([`meta::deprecate`])
//! 3. Structural diff ([`differ::walker`])
//! 4. Classify changes, re-matching parameters ([`differ::detector`])
//! 5. Drop whitelisted breaking changes ([`whitelist`])
//! 6. Export as text, dict or tree ([`exporter`])
//!
//! # Example
//!
//! ```no_run
//! use azdiff_core::{meta_diff_files, DiffOptions, DiffOutput, OutputShape};
//!
//! let options = DiffOptions::default().with_output(OutputShape::Dict);
//! let output = meta_diff_files("az_acr_meta_before.json", "az_acr_meta_after.json", &options)?;
//! if let DiffOutput::Dict(entries) = output {
//!     for entry in entries.iter().filter(|e| e.is_break) {
//!         println!("{}: {}", entry.rule_id, entry.rule_message);
//!     }
//! }
//! # Ok::<(), azdiff_core::DiffError>(())
//! ```

pub mod differ;
pub mod driver;
pub mod error;
pub mod exporter;
pub mod meta;
pub mod rules;
pub mod version_bump;
pub mod whitelist;

/// Tool version, compared against snapshot `compat_version`.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use differ::{ChangeKind, MetaChange};
pub use driver::{detect_changes, meta_diff, meta_diff_files, DiffOptions, DiffOutput, OutputShape};
pub use error::{DiffError, Result};
pub use exporter::{ChangeEntry, ModuleTree, TextLine, TreeNode};
pub use meta::Metadata;
pub use rules::{DiffLevel, RuleCatalog};
pub use version_bump::{BumpOptions, NextVersion, PreTag, SegmentTag, VersionBump};
pub use whitelist::Whitelist;
