//! Subcommand implementations.

pub mod meta_diff;
pub mod next_version;
pub mod version_diff;

use std::path::Path;

use anyhow::Context;
use azdiff_core::Whitelist;

pub use meta_diff::run as run_meta_diff;
pub use next_version::run as run_next_version;
pub use version_diff::run as run_version_diff;

/// Load `--whitelist` if given, otherwise an empty whitelist.
pub(crate) fn load_whitelist(path: Option<&Path>) -> anyhow::Result<Whitelist> {
    match path {
        Some(path) => Whitelist::load(path)
            .with_context(|| format!("Failed to load whitelist {}", path.display())),
        None => Ok(Whitelist::new()),
    }
}
