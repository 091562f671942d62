//! Parameter matching across base and diff command versions.
//!
//! Parameter identity is not positional: a diff parameter is the same as a
//! base parameter when the names agree, or when it still accepts every option
//! alias the base parameter accepted. Adding aliases keeps identity; losing
//! one breaks it.

use std::collections::HashSet;

use serde_json::Value;

/// Result of pairing two parameter lists.
#[derive(Debug)]
pub struct ParameterMatch<'a> {
    /// Every base parameter in order, with its diff counterpart if any.
    pub pairs: Vec<(&'a Value, Option<&'a Value>)>,
    /// Diff parameters no base parameter claimed, in diff order.
    pub unmatched: Vec<&'a Value>,
}

pub fn parameter_name(param: &Value) -> Option<&str> {
    param.get("name").and_then(Value::as_str)
}

/// Option aliases of a parameter; a missing `options` key is an empty set.
pub fn option_set(param: &Value) -> HashSet<&str> {
    param
        .get("options")
        .and_then(Value::as_array)
        .map(|opts| opts.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn is_same_parameter(base: &Value, diff: &Value) -> bool {
    let names_match = match (parameter_name(base), parameter_name(diff)) {
        (Some(b), Some(d)) => b == d,
        _ => false,
    };
    names_match || option_set(base).is_subset(&option_set(diff))
}

/// Pair each base parameter with the first unclaimed diff parameter that
/// matches it.
pub fn match_parameters<'a>(base: &'a [Value], diff: &'a [Value]) -> ParameterMatch<'a> {
    let mut claimed = vec![false; diff.len()];
    let mut pairs = Vec::with_capacity(base.len());

    for b in base {
        let found = diff
            .iter()
            .enumerate()
            .find(|(i, d)| !claimed[*i] && is_same_parameter(b, d))
            .map(|(i, d)| {
                claimed[i] = true;
                d
            });
        pairs.push((b, found));
    }

    let unmatched = diff
        .iter()
        .zip(claimed)
        .filter(|(_, c)| !c)
        .map(|(d, _)| d)
        .collect();

    ParameterMatch { pairs, unmatched }
}
