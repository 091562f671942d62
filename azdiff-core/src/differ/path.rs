//! Diff-path parsing.
//!
//! A diff path addresses a node of the metadata tree in bracketed form:
//!
//! ```text
//! root['sub_groups']['acr']['commands']['acr helm show']['parameters'][3]['options'][1]
//! ```
//!
//! Subgroup and command names may contain alphanumerics, hyphens, spaces and
//! underscores. Property names may contain alphanumerics, hyphens and
//! underscores.

use once_cell::sync::Lazy;
use regex::Regex;

static SUBGROUP_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\['sub_groups'\]\['([a-zA-Z0-9\-\s_]+)'\]").unwrap());
static CMD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\['commands'\]\['([a-zA-Z0-9\-\s_]+)'\]").unwrap());
static PROPERTY_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\['([a-zA-Z0-9\-_]+)'\]").unwrap());
static BRACKET_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]").unwrap());

/// Last `['sub_groups']['<name>']` capture in the path.
pub fn subgroup_of(path: &str) -> Option<&str> {
    SUBGROUP_NAME
        .captures_iter(path)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Last `['commands']['<name>']` capture in the path.
pub fn command_of(path: &str) -> Option<&str> {
    CMD_NAME
        .captures_iter(path)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// First `['<prop>']` right after the `['<subgroup_name>']` segment.
///
/// Returns `None` when the path ends at the subgroup itself.
pub fn subgroup_property_of<'a>(path: &'a str, subgroup_name: &str) -> Option<&'a str> {
    property_after(path, subgroup_name)
}

/// First `['<prop>']` right after the `['<command_name>']` segment.
///
/// Returns `None` when the path ends at the command itself.
pub fn command_property_of<'a>(path: &'a str, command_name: &str) -> Option<&'a str> {
    property_after(path, command_name)
}

fn property_after<'a>(path: &'a str, name: &str) -> Option<&'a str> {
    let segment = format!("['{}']", name);
    path.match_indices(&segment).find_map(|(start, _)| {
        PROPERTY_SEGMENT
            .captures(&path[start + segment.len()..])
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    })
}

/// Bracketed segments following `['parameters']`: index first, then property.
///
/// `...['parameters'][0]['options'][1]` yields `["0", "options", "1"]`.
pub fn parameter_segments(path: &str) -> Option<Vec<&str>> {
    let start = path.find("['parameters']")? + "['parameters']".len();
    let segments: Vec<&str> = BRACKET_SEGMENT
        .captures_iter(&path[start..])
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_matches('\''))
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
