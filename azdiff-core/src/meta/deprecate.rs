//! Flatten nested `deprecate_info` objects into sibling keys.
//!
//! `{"name": "x", "deprecate_info": {"target": "x", "hide": true}}` becomes
//! `{"name": "x", "deprecate_info_target": "x", "deprecate_info_hide": true}`
//! so every deprecation detail has its own diff path.

use serde_json::{Map, Value};

const DEPRECATE_KEY: &str = "deprecate_info";

/// Return an expanded copy of `meta`; the input is left untouched.
pub fn expand(meta: &Value) -> Value {
    let mut out = meta.clone();
    expand_in_place(&mut out);
    out
}

fn expand_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                match &mut *child {
                    Value::Object(obj) => flatten_object(obj),
                    Value::Array(items) => {
                        for item in items.iter_mut() {
                            if let Value::Object(obj) = item {
                                flatten_object(obj);
                            }
                        }
                    }
                    _ => {}
                }
                expand_in_place(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(expand_in_place),
        _ => {}
    }
}

fn flatten_object(obj: &mut Map<String, Value>) {
    let is_expandable = matches!(obj.get(DEPRECATE_KEY), Some(Value::Object(inner)) if !inner.is_empty());
    if !is_expandable {
        return;
    }
    if let Some(Value::Object(inner)) = obj.remove(DEPRECATE_KEY) {
        for (key, val) in inner {
            obj.insert(format!("{}_{}", DEPRECATE_KEY, key), val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expand_command_and_parameter() {
        let meta = json!({
            "module_name": "acr",
            "commands": {
                "acr helm show": {
                    "name": "acr helm show",
                    "deprecate_info": {"target": "acr helm show", "redirect": "helm show"},
                    "parameters": [
                        {"name": "x", "deprecate_info": {"hide": true}},
                        {"name": "y"}
                    ]
                }
            }
        });

        let expanded = expand(&meta);
        let cmd = &expanded["commands"]["acr helm show"];
        assert_eq!(cmd["deprecate_info_target"], "acr helm show");
        assert_eq!(cmd["deprecate_info_redirect"], "helm show");
        assert!(cmd.get("deprecate_info").is_none());
        assert_eq!(cmd["parameters"][0]["deprecate_info_hide"], true);
        assert_eq!(cmd["parameters"][1], json!({"name": "y"}));

        // the caller's tree is not modified
        assert!(meta["commands"]["acr helm show"].get("deprecate_info").is_some());
    }

    #[test]
    fn test_nested_subgroups() {
        let meta = json!({
            "sub_groups": {
                "acr": {
                    "sub_groups": {
                        "acr helm": {"deprecate_info": {"expiration": "3.0.0"}}
                    }
                }
            }
        });

        let expanded = expand(&meta);
        assert_eq!(
            expanded["sub_groups"]["acr"]["sub_groups"]["acr helm"]["deprecate_info_expiration"],
            "3.0.0"
        );
    }

    #[test]
    fn test_empty_or_scalar_deprecate_info_is_kept() {
        let meta = json!({
            "commands": {
                "a": {"deprecate_info": {}},
                "b": {"deprecate_info": "soon"}
            }
        });
        assert_eq!(expand(&meta), meta);
    }
}
