//! `azdiff meta-diff`: compare two metadata snapshot files.

use std::path::PathBuf;

use anyhow::{bail, Context};
use azdiff_core::{meta_diff_files, DiffOptions, DiffOutput, TextLine};
use colored::{ColoredString, Colorize};

use crate::output::{write_output, JsonOutput, MetaOutputType};

pub struct MetaDiffArgs {
    pub base: PathBuf,
    pub diff: PathBuf,
    pub only_break: bool,
    pub output_type: MetaOutputType,
    pub output_file: Option<PathBuf>,
    pub whitelist: Option<PathBuf>,
}

pub fn run(args: MetaDiffArgs) -> anyhow::Result<()> {
    for path in [&args.base, &args.diff] {
        if !path.exists() {
            bail!("Metadata file {} not found", path.display());
        }
    }

    let options = DiffOptions::default()
        .with_output(args.output_type.into())
        .with_only_break(args.only_break)
        .with_whitelist(super::load_whitelist(args.whitelist.as_deref())?);

    let result = meta_diff_files(&args.base, &args.diff, &options).with_context(|| {
        format!(
            "Failed to diff {} against {}",
            args.base.display(),
            args.diff.display()
        )
    })?;

    match &args.output_file {
        Some(path) => write_output(path, &JsonOutput::format(&result)),
        None => {
            print_result(&result);
            Ok(())
        }
    }
}

fn print_result(result: &DiffOutput) {
    match result {
        DiffOutput::Text(lines) => {
            for line in lines {
                println!("{}", render_line(line));
            }
        }
        other => println!("{}", JsonOutput::format(other)),
    }
}

fn render_line(text: &TextLine) -> ColoredString {
    if text.is_break {
        text.line.red()
    } else {
        text.line.normal()
    }
}
