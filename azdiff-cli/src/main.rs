//! azdiff - breaking change detection for Azure CLI command metadata.
//!
//! Compares two command-tree snapshots of a module (or every module of two
//! published versions) and reports what changed, how severe it is, and which
//! version bump it calls for.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod downloader;
mod output;

use commands::meta_diff::MetaDiffArgs;
use commands::next_version::{NextVersionArgs, PreTagArg, SegmentArg};
use commands::version_diff::VersionDiffArgs;
use output::{MetaOutputType, VersionOutputType};

/// Detect breaking changes between command metadata snapshots.
#[derive(Parser)]
#[command(name = "azdiff")]
#[command(author, version)]
#[command(about = "Detect breaking changes between Azure CLI command metadata snapshots")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  azdiff meta-diff base/az_acr_meta.json diff/az_acr_meta.json --output-type dict
  azdiff version-diff 2.49.0 2.50.0 --target-module acr --only-break
  azdiff next-version 1.2.0 base/az_acr_meta.json diff/az_acr_meta.json")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff two metadata snapshot files of the same module
    MetaDiff {
        /// Base (older) metadata file
        base: PathBuf,

        /// Diff (newer) metadata file
        diff: PathBuf,

        /// Report breaking changes only
        #[arg(long)]
        only_break: bool,

        /// Output type
        #[arg(long, value_enum, default_value = "text")]
        output_type: MetaOutputType,

        /// Write pretty JSON to this file instead of stdout
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Tab-separated whitelist of suppressed changes
        #[arg(long)]
        whitelist: Option<PathBuf>,
    },

    /// Diff every module between two published CLI versions
    VersionDiff {
        /// Base (older) CLI version
        base_version: String,

        /// Diff (newer) CLI version
        diff_version: String,

        /// Report breaking changes only
        #[arg(long)]
        only_break: bool,

        /// Output type
        #[arg(long, value_enum, default_value = "dict")]
        output_type: VersionOutputType,

        /// Only diff this module
        #[arg(long)]
        target_module: Option<String>,

        /// Reuse snapshots already on disk
        #[arg(long)]
        use_cache: bool,

        /// Write output to this file instead of stdout
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Tab-separated whitelist of suppressed changes
        #[arg(long)]
        whitelist: Option<PathBuf>,

        /// Blob storage config file
        #[arg(long, env = "AZDIFF_CONFIG", default_value = config::DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Suggest the next module version from a snapshot diff
    NextVersion {
        /// Current module version
        current: String,

        /// Base (older) metadata file
        base: PathBuf,

        /// Diff (newer) metadata file
        diff: PathBuf,

        /// The module is in preview
        #[arg(long)]
        preview: bool,

        /// The module is experimental
        #[arg(long)]
        experimental: bool,

        /// Force the next version to be stable or preview
        #[arg(long, value_enum)]
        pre_tag: Option<PreTagArg>,

        /// Bump this segment regardless of detected changes
        #[arg(long, value_enum)]
        segment: Option<SegmentArg>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::MetaDiff {
            base,
            diff,
            only_break,
            output_type,
            output_file,
            whitelist,
        } => commands::run_meta_diff(MetaDiffArgs {
            base,
            diff,
            only_break,
            output_type,
            output_file,
            whitelist,
        }),
        Commands::VersionDiff {
            base_version,
            diff_version,
            only_break,
            output_type,
            target_module,
            use_cache,
            output_file,
            whitelist,
            config,
        } => {
            commands::run_version_diff(VersionDiffArgs {
                base_version,
                diff_version,
                only_break,
                output_type,
                target_module,
                use_cache,
                output_file,
                whitelist,
                config,
            })
            .await
        }
        Commands::NextVersion {
            current,
            base,
            diff,
            preview,
            experimental,
            pre_tag,
            segment,
        } => commands::run_next_version(NextVersionArgs {
            current,
            base,
            diff,
            preview,
            experimental,
            pre_tag,
            segment,
        }),
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
