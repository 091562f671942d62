//! `azdiff version-diff`: compare every module between two published versions.

use std::path::PathBuf;

use anyhow::Context;
use azdiff_core::{detect_changes, exporter, ChangeEntry, DiffOptions, Metadata};
use rayon::prelude::*;
use tracing::info;

use crate::config::BlobConfig;
use crate::downloader::{module_name_from_file, Downloader, MetaFile};
use crate::output::{write_output, CsvOutput, JsonOutput, VersionOutputType};

pub struct VersionDiffArgs {
    pub base_version: String,
    pub diff_version: String,
    pub only_break: bool,
    pub output_type: VersionOutputType,
    pub target_module: Option<String>,
    pub use_cache: bool,
    pub output_file: Option<PathBuf>,
    pub whitelist: Option<PathBuf>,
    pub config: PathBuf,
}

pub async fn run(args: VersionDiffArgs) -> anyhow::Result<()> {
    let blob = BlobConfig::load(&args.config)?;
    let root = std::env::current_dir().context("Failed to resolve working directory")?;
    let downloader = Downloader::new(blob, root, args.use_cache);

    let (base_files, diff_files) = match &args.target_module {
        Some(module) => (
            vec![downloader.fetch_module(&args.base_version, module).await],
            vec![downloader.fetch_module(&args.diff_version, module).await],
        ),
        None => (
            downloader.fetch_version(&args.base_version).await,
            downloader.fetch_version(&args.diff_version).await,
        ),
    };

    let pairs = pair_files(base_files, &diff_files);
    info!(
        "Diffing {} modules between {} and {}",
        pairs.len(),
        args.base_version,
        args.diff_version
    );

    let options = DiffOptions::default()
        .with_only_break(args.only_break)
        .with_whitelist(super::load_whitelist(args.whitelist.as_deref())?);

    let entries = tokio::task::spawn_blocking(move || diff_modules(&pairs, &options))
        .await
        .context("Module diff task failed")??;

    let content = match args.output_type {
        VersionOutputType::Dict => JsonOutput::format(&entries),
        VersionOutputType::Csv => CsvOutput::format_entries(&entries),
    };
    match &args.output_file {
        Some(path) => write_output(path, &content),
        None => {
            println!("{}", content.trim_end());
            Ok(())
        }
    }
}

/// Base/diff file pairs for modules present in both versions, in base order.
fn pair_files(base_files: Vec<MetaFile>, diff_files: &[MetaFile]) -> Vec<(MetaFile, MetaFile)> {
    base_files
        .into_iter()
        .filter_map(|base| {
            if !base.path.exists() {
                info!("{} not downloaded, skipped", base.file_name);
                return None;
            }
            let diff = diff_files
                .iter()
                .find(|d| d.file_name == base.file_name && d.path.exists());
            match diff {
                Some(diff) => Some((base, diff.clone())),
                None => {
                    info!("{} missing in diff version, skipped", base.file_name);
                    None
                }
            }
        })
        .collect()
}

fn diff_modules(
    pairs: &[(MetaFile, MetaFile)],
    options: &DiffOptions,
) -> anyhow::Result<Vec<ChangeEntry>> {
    let per_module: Vec<Vec<ChangeEntry>> = pairs
        .par_iter()
        .map(|(base, diff)| diff_module(base, diff, options))
        .collect::<anyhow::Result<_>>()?;
    Ok(per_module.into_iter().flatten().collect())
}

fn diff_module(
    base: &MetaFile,
    diff: &MetaFile,
    options: &DiffOptions,
) -> anyhow::Result<Vec<ChangeEntry>> {
    let base_meta = Metadata::load(&base.path)
        .with_context(|| format!("Failed to load {}", base.path.display()))?;
    let diff_meta = Metadata::load(&diff.path)
        .with_context(|| format!("Failed to load {}", diff.path.display()))?;
    let changes = detect_changes(&base_meta, &diff_meta, options)
        .with_context(|| format!("Failed to diff {}", base.file_name))?;

    let module = module_name_from_file(&base.file_name).unwrap_or(base_meta.module_name());
    Ok(exporter::export_dict(&changes, options.only_break)
        .into_iter()
        .map(|entry| entry.with_module(module))
        .collect())
}
