//! Next-version heuristic driven by detected changes.
//!
//! Versions follow `MAJOR.MINOR.PATCH` with an optional pre-release segment
//! (`a1`, `b2`, `rc1`). Breaking changes bump major, other changes bump minor,
//! no change bumps patch. Preview modules bump their pre-release number
//! instead of minor or patch.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{DiffError, Result};
use crate::exporter::ChangeEntry;
use crate::rules::DiffLevel;

static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?(\d+)\.(\d+)(?:\.(\d+))?(?:(a|b|rc)(\d+))?$").unwrap()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreLabel {
    Alpha,
    Beta,
    Rc,
}

impl PreLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreLabel::Alpha => "a",
            PreLabel::Beta => "b",
            PreLabel::Rc => "rc",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreRelease {
    pub label: PreLabel,
    pub number: u64,
}

impl PreRelease {
    fn beta(number: u64) -> Self {
        Self {
            label: PreLabel::Beta,
            number,
        }
    }
}

/// A parsed module version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<PreRelease>,
}

impl ModuleVersion {
    fn stable_one() -> Self {
        Self {
            major: 1,
            minor: 0,
            patch: 0,
            pre: None,
        }
    }

    fn preview_one() -> Self {
        Self {
            pre: Some(PreRelease::beta(1)),
            ..Self::stable_one()
        }
    }

    fn pre_number(&self) -> u64 {
        self.pre.map(|p| p.number).unwrap_or(0)
    }

    pub fn is_stable(&self) -> bool {
        self.pre.is_none()
    }
}

impl FromStr for ModuleVersion {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DiffError::InvalidVersion {
            version: s.to_string(),
        };
        let caps = VERSION_PATTERN.captures(s.trim()).ok_or_else(invalid)?;
        let num = |i: usize| -> Result<u64> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
                .unwrap_or(Ok(0))
        };

        let pre = match caps.get(4).map(|m| m.as_str()) {
            Some(label) => {
                let label = match label {
                    "a" => PreLabel::Alpha,
                    "b" => PreLabel::Beta,
                    _ => PreLabel::Rc,
                };
                Some(PreRelease {
                    label,
                    number: num(5)?,
                })
            }
            None => None,
        };

        Ok(Self {
            major: num(1)?,
            minor: num(2)?,
            patch: num(3)?,
            pre,
        })
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = self.pre {
            write!(f, "{}{}", pre.label.as_str(), pre.number)?;
        }
        Ok(())
    }
}

/// Stability of the next version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreTag {
    Stable,
    Preview,
}

impl FromStr for PreTag {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "stable" => Ok(PreTag::Stable),
            "preview" => Ok(PreTag::Preview),
            other => Err(DiffError::invalid_input(format!("unsupported pre tag `{}`", other))),
        }
    }
}

/// Version segment to bump regardless of detected changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentTag {
    Major,
    Minor,
    Patch,
    Pre,
}

impl FromStr for SegmentTag {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "major" => Ok(SegmentTag::Major),
            "minor" => Ok(SegmentTag::Minor),
            "patch" => Ok(SegmentTag::Patch),
            "pre" => Ok(SegmentTag::Pre),
            other => Err(DiffError::invalid_input(format!(
                "unsupported segment tag `{}`",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BumpOptions {
    pub is_preview: bool,
    pub is_experimental: bool,
    pub pre_tag: Option<PreTag>,
    pub segment_tag: Option<SegmentTag>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NextVersion {
    pub version: String,
    pub is_stable: bool,
    pub has_preview_tag: bool,
    pub has_exp_tag: bool,
}

pub struct VersionBump;

impl VersionBump {
    /// Compute the next version from `current` and the exported changes.
    pub fn next_version(
        current: &str,
        diffs: &[ChangeEntry],
        options: &BumpOptions,
    ) -> Result<NextVersion> {
        let mut version: ModuleVersion = current.parse()?;
        let was_preview = options.is_preview
            || options.is_experimental
            || version
                .pre
                .is_some_and(|p| matches!(p.label, PreLabel::Alpha | PreLabel::Beta));
        if was_preview && version.pre.is_none() {
            version.pre = Some(PreRelease::beta(1));
        }

        let pre_tag = options.pre_tag.unwrap_or(if was_preview {
            PreTag::Preview
        } else {
            PreTag::Stable
        });

        let mut next = version;
        next.pre = match pre_tag {
            PreTag::Stable => None,
            PreTag::Preview => Some(PreRelease::beta(version.pre_number().max(1))),
        };

        if version.major < 1 {
            next = match pre_tag {
                PreTag::Stable => ModuleVersion::stable_one(),
                PreTag::Preview => ModuleVersion::preview_one(),
            };
        } else if let Some(segment) = options.segment_tag {
            bump_segment(&mut next, &version, segment);
        } else {
            bump_from_diffs(&mut next, &version, diffs, was_preview);
        }

        Ok(NextVersion {
            version: next.to_string(),
            is_stable: next.is_stable(),
            has_preview_tag: next.pre.is_some()
                && (options.is_preview || options.is_experimental),
            has_exp_tag: false,
        })
    }
}

fn bump_segment(next: &mut ModuleVersion, current: &ModuleVersion, segment: SegmentTag) {
    match segment {
        SegmentTag::Major => {
            next.major = current.major + 1;
            next.minor = 0;
            next.patch = 0;
        }
        SegmentTag::Minor => {
            next.minor = current.minor + 1;
            next.patch = 0;
        }
        SegmentTag::Patch => next.patch = current.patch + 1,
        SegmentTag::Pre => {
            let label = next.pre.map(|p| p.label).unwrap_or(PreLabel::Beta);
            next.pre = Some(PreRelease {
                label,
                number: current.pre_number() + 1,
            });
        }
    }
}

fn bump_from_diffs(
    next: &mut ModuleVersion,
    current: &ModuleVersion,
    diffs: &[ChangeEntry],
    was_preview: bool,
) {
    let bump_pre = |next: &mut ModuleVersion| {
        if let Some(pre) = next.pre.as_mut() {
            pre.number = current.pre_number() + 1;
        }
    };

    if diffs.iter().any(|d| d.diff_level == DiffLevel::Break) {
        next.major = current.major + 1;
        next.minor = 0;
        next.patch = 0;
    } else if !diffs.is_empty() {
        if was_preview {
            bump_pre(next);
        } else {
            next.minor = current.minor + 1;
            next.patch = 0;
        }
    } else if was_preview {
        bump_pre(next);
    } else {
        next.patch = current.patch + 1;
    }
}
