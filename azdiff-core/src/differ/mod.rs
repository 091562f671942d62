//! Change detection between two metadata snapshots.
//!
//! - [`walker`]: structural diff producing path-keyed buckets
//! - [`path`]: extracts subgroup, command and property names from diff paths
//! - [`detector`]: classifies buckets into [`MetaChange`] records
//! - [`matcher`]: pairs parameters across reorders and renames

pub mod changes;
pub mod detector;
pub mod matcher;
pub mod path;
pub mod walker;

pub use changes::{ChangeKind, MetaChange};
pub use detector::MetaChangeDetector;
pub use walker::{deep_diff, DeepDiff, ValueChange};
