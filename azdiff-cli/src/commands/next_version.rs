//! `azdiff next-version`: suggest a module version from a snapshot diff.

use std::path::PathBuf;

use anyhow::{bail, Context};
use azdiff_core::{
    detect_changes, exporter, BumpOptions, DiffOptions, Metadata, PreTag, SegmentTag, VersionBump,
};
use clap::ValueEnum;
use colored::Colorize;

use crate::output::JsonOutput;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PreTagArg {
    Stable,
    Preview,
}

impl From<PreTagArg> for PreTag {
    fn from(value: PreTagArg) -> Self {
        match value {
            PreTagArg::Stable => PreTag::Stable,
            PreTagArg::Preview => PreTag::Preview,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SegmentArg {
    Major,
    Minor,
    Patch,
    Pre,
}

impl From<SegmentArg> for SegmentTag {
    fn from(value: SegmentArg) -> Self {
        match value {
            SegmentArg::Major => SegmentTag::Major,
            SegmentArg::Minor => SegmentTag::Minor,
            SegmentArg::Patch => SegmentTag::Patch,
            SegmentArg::Pre => SegmentTag::Pre,
        }
    }
}

pub struct NextVersionArgs {
    pub current: String,
    pub base: PathBuf,
    pub diff: PathBuf,
    pub preview: bool,
    pub experimental: bool,
    pub pre_tag: Option<PreTagArg>,
    pub segment: Option<SegmentArg>,
}

pub fn run(args: NextVersionArgs) -> anyhow::Result<()> {
    for path in [&args.base, &args.diff] {
        if !path.exists() {
            bail!("Metadata file {} not found", path.display());
        }
    }
    let base = Metadata::load(&args.base)?;
    let diff = Metadata::load(&args.diff)?;
    let changes = detect_changes(&base, &diff, &DiffOptions::default())
        .with_context(|| format!("Failed to diff module {}", base.module_name()))?;
    let entries = exporter::export_dict(&changes, false);

    let options = BumpOptions {
        is_preview: args.preview,
        is_experimental: args.experimental,
        pre_tag: args.pre_tag.map(PreTag::from),
        segment_tag: args.segment.map(SegmentTag::from),
    };
    let next = VersionBump::next_version(&args.current, &entries, &options)?;

    let breaking = entries.iter().filter(|e| e.is_break).count();
    tracing::info!(
        "{} changes ({} breaking) in {}",
        entries.len(),
        breaking,
        base.module_name()
    );
    if breaking > 0 {
        eprintln!(
            "{} {} breaking change(s) detected",
            "warning:".yellow().bold(),
            breaking
        );
    }

    println!("{}", JsonOutput::format(&next));
    Ok(())
}
