//! Error types for azdiff-core.

use thiserror::Error;

/// Result type alias for azdiff-core operations.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Errors that can occur while comparing metadata snapshots.
#[derive(Error, Debug)]
pub enum DiffError {
    /// Caller supplied unusable input (missing file, empty record name, ...).
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what was wrong with the input.
        message: String,
    },

    /// A snapshot declares a `compat_version` newer than this tool.
    #[error(
        "Metadata requires azdiff {required} but this is {current}, please upgrade azdiff"
    )]
    ToolOutdated {
        /// Version declared by the snapshot.
        required: String,
        /// Version of the running tool.
        current: String,
    },

    /// A command could not be resolved in a metadata tree.
    #[error("Command `{name}` not found: missing `{segment}`")]
    NotFound {
        /// Full command name being resolved.
        name: String,
        /// The subgroup or command key that was missing.
        segment: String,
    },

    /// The two snapshots describe different modules.
    #[error("Module mismatch: base is `{base}`, diff is `{diff}`")]
    ModuleMismatch {
        /// Module name of the base snapshot.
        base: String,
        /// Module name of the diff snapshot.
        diff: String,
    },

    /// A version string could not be parsed.
    #[error("Invalid version: {version}")]
    InvalidVersion {
        /// The offending version string.
        version: String,
    },

    /// IO error reading metadata or whitelist files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error for metadata files.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiffError {
    /// Shorthand for [`DiffError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        DiffError::InvalidInput {
            message: message.into(),
        }
    }
}
