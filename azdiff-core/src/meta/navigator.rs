//! Resolve a full command name to its node in a metadata tree.

use serde_json::Value;

use crate::error::{DiffError, Result};

/// Walk `sub_groups` by accumulated prefix, then index `commands` with the
/// full name.
///
/// `"acr helm show"` visits `sub_groups["acr"]`, `sub_groups["acr helm"]`,
/// then `commands["acr helm show"]`.
pub fn resolve<'a>(full_name: &str, tree: &'a Value) -> Result<&'a Value> {
    let words: Vec<&str> = full_name.split_whitespace().collect();
    let not_found = |segment: &str| DiffError::NotFound {
        name: full_name.to_string(),
        segment: segment.to_string(),
    };
    if words.is_empty() {
        return Err(not_found(full_name));
    }

    let mut node = tree;
    for depth in 1..words.len() {
        let group = words[..depth].join(" ");
        node = node
            .get("sub_groups")
            .and_then(|groups| groups.get(&group))
            .ok_or_else(|| not_found(&group))?;
    }

    let cmd = words.join(" ");
    node.get("commands")
        .and_then(|cmds| cmds.get(&cmd))
        .ok_or_else(|| not_found(&cmd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> Value {
        json!({
            "module_name": "acr",
            "commands": {
                "version": {"name": "version"}
            },
            "sub_groups": {
                "acr": {
                    "name": "acr",
                    "commands": {"acr show": {"name": "acr show"}},
                    "sub_groups": {
                        "acr helm": {
                            "name": "acr helm",
                            "commands": {"acr helm show": {"name": "acr helm show"}},
                            "sub_groups": {}
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_resolve_nested_command() {
        let tree = tree();
        let cmd = resolve("acr helm show", &tree).unwrap();
        assert_eq!(cmd["name"], "acr helm show");

        let cmd = resolve("acr show", &tree).unwrap();
        assert_eq!(cmd["name"], "acr show");
    }

    #[test]
    fn test_resolve_top_level_command() {
        let tree = tree();
        assert_eq!(resolve("version", &tree).unwrap()["name"], "version");
    }

    #[test]
    fn test_missing_segment() {
        let tree = tree();
        let err = resolve("acr repo list", &tree).unwrap_err();
        match err {
            DiffError::NotFound { name, segment } => {
                assert_eq!(name, "acr repo list");
                assert_eq!(segment, "acr repo");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(resolve("acr helm list", &tree).is_err());
        assert!(resolve("", &tree).is_err());
    }
}
