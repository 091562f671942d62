//! Change records produced by the detector.
//!
//! A [`MetaChange`] is the shared record (rule id, severity, messages, ignore
//! flag, whitelist key); the [`ChangeKind`] it wraps names one of the fifteen
//! rules and carries the scope names and values specific to it.

use std::fmt;

use serde_json::Value;

use crate::error::{DiffError, Result};
use crate::rules::{self, ChangeOp, DiffLevel, RuleCatalog};

/// The fifteen detectable change kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeKind {
    SubgroupAdd {
        subgroup_name: String,
    },
    SubgroupRemove {
        subgroup_name: String,
    },
    SubgroupPropAdd {
        subgroup_name: String,
        property: String,
    },
    SubgroupPropRemove {
        subgroup_name: String,
        property: String,
    },
    SubgroupPropUpdate {
        subgroup_name: String,
        property: String,
        old_value: Value,
        new_value: Value,
    },
    CmdAdd {
        cmd_name: String,
    },
    CmdRemove {
        cmd_name: String,
    },
    CmdPropAdd {
        cmd_name: String,
        property: String,
    },
    CmdPropRemove {
        cmd_name: String,
        property: String,
    },
    CmdPropUpdate {
        cmd_name: String,
        property: String,
        old_value: Value,
        new_value: Value,
    },
    ParaAdd {
        cmd_name: String,
        para_name: String,
    },
    ParaRemove {
        cmd_name: String,
        para_name: String,
    },
    ParaPropAdd {
        cmd_name: String,
        para_name: String,
        property: String,
        value: Value,
    },
    ParaPropRemove {
        cmd_name: String,
        para_name: String,
        property: String,
        value: Value,
    },
    ParaPropUpdate {
        cmd_name: String,
        para_name: String,
        property: String,
        old_value: Value,
        new_value: Value,
    },
}

impl ChangeKind {
    pub fn rule_id(&self) -> &'static str {
        match self {
            ChangeKind::CmdAdd { .. } => "1001",
            ChangeKind::CmdRemove { .. } => "1002",
            ChangeKind::CmdPropAdd { .. } => "1003",
            ChangeKind::CmdPropRemove { .. } => "1004",
            ChangeKind::CmdPropUpdate { .. } => "1005",
            ChangeKind::ParaAdd { .. } => "1006",
            ChangeKind::ParaRemove { .. } => "1007",
            ChangeKind::ParaPropAdd { .. } => "1008",
            ChangeKind::ParaPropRemove { .. } => "1009",
            ChangeKind::ParaPropUpdate { .. } => "1010",
            ChangeKind::SubgroupAdd { .. } => "1011",
            ChangeKind::SubgroupRemove { .. } => "1012",
            ChangeKind::SubgroupPropAdd { .. } => "1013",
            ChangeKind::SubgroupPropRemove { .. } => "1014",
            ChangeKind::SubgroupPropUpdate { .. } => "1015",
        }
    }

    /// Rule name as exported in the `rule_name` field.
    pub fn rule_name(&self) -> &'static str {
        match self {
            ChangeKind::SubgroupAdd { .. } => "SubgroupAdd",
            ChangeKind::SubgroupRemove { .. } => "SubgroupRemove",
            ChangeKind::SubgroupPropAdd { .. } => "SubgroupPropAdd",
            ChangeKind::SubgroupPropRemove { .. } => "SubgroupPropRemove",
            ChangeKind::SubgroupPropUpdate { .. } => "SubgroupPropUpdate",
            ChangeKind::CmdAdd { .. } => "CmdAdd",
            ChangeKind::CmdRemove { .. } => "CmdRemove",
            ChangeKind::CmdPropAdd { .. } => "CmdPropAdd",
            ChangeKind::CmdPropRemove { .. } => "CmdPropRemove",
            ChangeKind::CmdPropUpdate { .. } => "CmdPropUpdate",
            ChangeKind::ParaAdd { .. } => "ParaAdd",
            ChangeKind::ParaRemove { .. } => "ParaRemove",
            ChangeKind::ParaPropAdd { .. } => "ParaPropAdd",
            ChangeKind::ParaPropRemove { .. } => "ParaPropRemove",
            ChangeKind::ParaPropUpdate { .. } => "ParaPropUpdate",
        }
    }

    pub fn op(&self) -> ChangeOp {
        match self {
            ChangeKind::SubgroupAdd { .. }
            | ChangeKind::SubgroupPropAdd { .. }
            | ChangeKind::CmdAdd { .. }
            | ChangeKind::CmdPropAdd { .. }
            | ChangeKind::ParaAdd { .. }
            | ChangeKind::ParaPropAdd { .. } => ChangeOp::Add,
            ChangeKind::SubgroupRemove { .. }
            | ChangeKind::SubgroupPropRemove { .. }
            | ChangeKind::CmdRemove { .. }
            | ChangeKind::CmdPropRemove { .. }
            | ChangeKind::ParaRemove { .. }
            | ChangeKind::ParaPropRemove { .. } => ChangeOp::Remove,
            ChangeKind::SubgroupPropUpdate { .. }
            | ChangeKind::CmdPropUpdate { .. }
            | ChangeKind::ParaPropUpdate { .. } => ChangeOp::Update,
        }
    }

    /// Command the change belongs to, for command and parameter scopes.
    pub fn cmd_name(&self) -> Option<&str> {
        match self {
            ChangeKind::CmdAdd { cmd_name }
            | ChangeKind::CmdRemove { cmd_name }
            | ChangeKind::CmdPropAdd { cmd_name, .. }
            | ChangeKind::CmdPropRemove { cmd_name, .. }
            | ChangeKind::CmdPropUpdate { cmd_name, .. }
            | ChangeKind::ParaAdd { cmd_name, .. }
            | ChangeKind::ParaRemove { cmd_name, .. }
            | ChangeKind::ParaPropAdd { cmd_name, .. }
            | ChangeKind::ParaPropRemove { cmd_name, .. }
            | ChangeKind::ParaPropUpdate { cmd_name, .. } => Some(cmd_name),
            _ => None,
        }
    }

    /// Subgroup the change belongs to, for subgroup scope.
    pub fn subgroup_name(&self) -> Option<&str> {
        match self {
            ChangeKind::SubgroupAdd { subgroup_name }
            | ChangeKind::SubgroupRemove { subgroup_name }
            | ChangeKind::SubgroupPropAdd { subgroup_name, .. }
            | ChangeKind::SubgroupPropRemove { subgroup_name, .. }
            | ChangeKind::SubgroupPropUpdate { subgroup_name, .. } => Some(subgroup_name),
            _ => None,
        }
    }

    pub fn para_name(&self) -> Option<&str> {
        match self {
            ChangeKind::ParaAdd { para_name, .. }
            | ChangeKind::ParaRemove { para_name, .. }
            | ChangeKind::ParaPropAdd { para_name, .. }
            | ChangeKind::ParaPropRemove { para_name, .. }
            | ChangeKind::ParaPropUpdate { para_name, .. } => Some(para_name),
            _ => None,
        }
    }

    pub fn property(&self) -> Option<&str> {
        match self {
            ChangeKind::SubgroupPropAdd { property, .. }
            | ChangeKind::SubgroupPropRemove { property, .. }
            | ChangeKind::SubgroupPropUpdate { property, .. }
            | ChangeKind::CmdPropAdd { property, .. }
            | ChangeKind::CmdPropRemove { property, .. }
            | ChangeKind::CmdPropUpdate { property, .. }
            | ChangeKind::ParaPropAdd { property, .. }
            | ChangeKind::ParaPropRemove { property, .. }
            | ChangeKind::ParaPropUpdate { property, .. } => Some(property),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        let scope = self
            .cmd_name()
            .or_else(|| self.subgroup_name())
            .unwrap_or_default();
        if scope.is_empty() {
            let what = if self.subgroup_name().is_some() {
                "sub group name"
            } else {
                "cmd name"
            };
            return Err(DiffError::invalid_input(format!(
                "{} needed for {}",
                what,
                self.rule_name()
            )));
        }
        if self.para_name().is_some_and(str::is_empty) {
            return Err(DiffError::invalid_input(format!(
                "parameter name needed for {}",
                self.rule_name()
            )));
        }
        if self.property().is_some_and(str::is_empty) {
            return Err(DiffError::invalid_input(format!(
                "property name needed for {}",
                self.rule_name()
            )));
        }
        Ok(())
    }

    fn template_args(&self) -> Vec<(&'static str, String)> {
        let mut args = Vec::new();
        if let Some(name) = self.cmd_name() {
            args.push(("cmd_name", name.to_string()));
        }
        if let Some(name) = self.subgroup_name() {
            args.push(("subgroup_name", name.to_string()));
        }
        if let Some(name) = self.para_name() {
            args.push(("para_name", name.to_string()));
        }
        if let Some(prop) = self.property() {
            args.push(("property", prop.to_string()));
        }
        match self {
            ChangeKind::ParaPropAdd { value, .. } | ChangeKind::ParaPropRemove { value, .. } => {
                args.push(("value", display_value(value)));
            }
            ChangeKind::SubgroupPropUpdate {
                old_value,
                new_value,
                ..
            }
            | ChangeKind::CmdPropUpdate {
                old_value,
                new_value,
                ..
            }
            | ChangeKind::ParaPropUpdate {
                old_value,
                new_value,
                ..
            } => {
                args.push(("old_value", display_value(old_value)));
                args.push(("new_value", display_value(new_value)));
            }
            _ => {}
        }
        args
    }

    fn is_ignored(&self, catalog: &RuleCatalog) -> bool {
        let listed = |list: &[String], item: &str| list.iter().any(|p| p == item);
        match self {
            ChangeKind::SubgroupPropAdd { property, .. }
            | ChangeKind::SubgroupPropRemove { property, .. }
            | ChangeKind::SubgroupPropUpdate { property, .. } => {
                listed(&catalog.subgroup_property_ignored, property)
            }
            ChangeKind::CmdPropAdd { property, .. }
            | ChangeKind::CmdPropRemove { property, .. }
            | ChangeKind::CmdPropUpdate { property, .. } => {
                listed(&catalog.cmd_property_ignored, property)
            }
            ChangeKind::ParaPropAdd {
                para_name,
                property,
                ..
            }
            | ChangeKind::ParaPropRemove {
                para_name,
                property,
                ..
            } => {
                listed(&catalog.para_property_ignored, property)
                    || listed(&catalog.para_name_ignored, para_name)
            }
            ChangeKind::ParaPropUpdate {
                para_name,
                property,
                old_value,
                new_value,
                ..
            } => {
                let value_ignored = |v: &Value| {
                    v.as_str()
                        .is_some_and(|s| listed(&catalog.para_value_ignored, s))
                };
                listed(&catalog.para_property_ignored, property)
                    || listed(&catalog.para_name_ignored, para_name)
                    || value_ignored(old_value)
                    || value_ignored(new_value)
            }
            _ => false,
        }
    }

    fn filter_key(&self) -> Option<Vec<String>> {
        let property = self.property()?;
        let mut key = vec![self.rule_id().to_string()];
        if let Some(name) = self.subgroup_name() {
            key.push(name.to_string());
        }
        if let Some(name) = self.cmd_name() {
            key.push(name.to_string());
        }
        if let Some(name) = self.para_name() {
            key.push(name.to_string());
        }
        key.push(property.to_string());
        Some(key)
    }
}

/// Render a metadata value for a message: strings bare, everything else as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A single detected change.
#[derive(Clone, Debug, PartialEq)]
pub struct MetaChange {
    pub kind: ChangeKind,
    pub diff_level: DiffLevel,
    pub is_break: bool,
    pub rule_message: String,
    /// Empty unless `is_break`.
    pub suggest_message: String,
    pub rule_link_url: String,
    /// Recorded but never exported.
    pub is_ignore: bool,
    /// Whitelist lookup key: rule id, scope names, property.
    pub filter_key: Option<Vec<String>>,
}

impl MetaChange {
    /// Build a record, formatting messages from the rule catalog.
    ///
    /// Fails with [`DiffError::InvalidInput`] when a required name is empty.
    pub fn new(kind: ChangeKind, diff_level: DiffLevel, catalog: &RuleCatalog) -> Result<Self> {
        kind.validate()?;

        let rule_id = kind.rule_id();
        let owned = kind.template_args();
        let args: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let is_break = diff_level.is_break();
        let rule_message = rules::render(rules::rule_template(rule_id), &args);
        let suggest_message = if is_break {
            rules::render(rules::suggest_template(rule_id), &args)
        } else {
            String::new()
        };

        Ok(Self {
            is_ignore: kind.is_ignored(catalog),
            filter_key: kind.filter_key(),
            rule_link_url: rules::rule_link_url(rule_id),
            kind,
            diff_level,
            is_break,
            rule_message,
            suggest_message,
        })
    }

    pub fn rule_id(&self) -> &'static str {
        self.kind.rule_id()
    }

    pub fn rule_name(&self) -> &'static str {
        self.kind.rule_name()
    }

    pub fn cmd_name(&self) -> Option<&str> {
        self.kind.cmd_name()
    }

    pub fn subgroup_name(&self) -> Option<&str> {
        self.kind.subgroup_name()
    }

    /// Tab-joined filter key, as stored in whitelist files.
    pub fn filter_key_joined(&self) -> Option<String> {
        self.filter_key.as_ref().map(|key| key.join("\t"))
    }
}

impl fmt::Display for MetaChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | diff_level: {}",
            self.rule_message,
            self.diff_level.as_u8()
        )?;
        if self.is_break {
            write!(f, " | is_break: True | {}", self.suggest_message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> RuleCatalog {
        RuleCatalog::default()
    }

    #[test]
    fn test_cmd_remove_breaking_has_suggestion() {
        let change = MetaChange::new(
            ChangeKind::CmdRemove {
                cmd_name: "monitor private-link-scope scoped-resource show".to_string(),
            },
            DiffLevel::Break,
            &catalog(),
        )
        .unwrap();

        assert_eq!(change.rule_id(), "1002");
        assert_eq!(change.kind.op(), ChangeOp::Remove);
        assert!(change.is_break);
        assert_eq!(
            change.suggest_message,
            "please confirm cmd `monitor private-link-scope scoped-resource show` removed"
        );
        assert!(change.filter_key.is_none());
        assert!(change.rule_link_url.contains("1002"));
    }

    #[test]
    fn test_non_breaking_has_empty_suggestion() {
        let change = MetaChange::new(
            ChangeKind::CmdAdd {
                cmd_name: "acr helm show".to_string(),
            },
            DiffLevel::Info,
            &catalog(),
        )
        .unwrap();

        assert!(!change.is_break);
        assert!(change.suggest_message.is_empty());
        assert_eq!(change.rule_message, "cmd `acr helm show` added");
    }

    #[test]
    fn test_empty_names_are_rejected() {
        let err = MetaChange::new(
            ChangeKind::SubgroupAdd {
                subgroup_name: String::new(),
            },
            DiffLevel::Info,
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, DiffError::InvalidInput { .. }));

        let err = MetaChange::new(
            ChangeKind::ParaRemove {
                cmd_name: "foo bar".to_string(),
                para_name: String::new(),
            },
            DiffLevel::Break,
            &catalog(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("parameter name"));

        let err = MetaChange::new(
            ChangeKind::CmdPropAdd {
                cmd_name: "foo bar".to_string(),
                property: String::new(),
            },
            DiffLevel::Info,
            &catalog(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("property name"));
    }

    #[test]
    fn test_filter_keys() {
        let change = MetaChange::new(
            ChangeKind::SubgroupPropRemove {
                subgroup_name: "acr".to_string(),
                property: "xyz".to_string(),
            },
            DiffLevel::Break,
            &catalog(),
        )
        .unwrap();
        assert_eq!(change.filter_key_joined().unwrap(), "1014\tacr\txyz");

        let change = MetaChange::new(
            ChangeKind::ParaPropUpdate {
                cmd_name: "foo bar".to_string(),
                para_name: "x".to_string(),
                property: "options".to_string(),
                old_value: json!(["--x", "--ex"]),
                new_value: json!(["--x"]),
            },
            DiffLevel::Break,
            &catalog(),
        )
        .unwrap();
        assert_eq!(
            change.filter_key.unwrap(),
            vec!["1010", "foo bar", "x", "options"]
        );
    }

    #[test]
    fn test_ignored_properties() {
        let change = MetaChange::new(
            ChangeKind::CmdPropUpdate {
                cmd_name: "monitor log show".to_string(),
                property: "is_aaz".to_string(),
                old_value: json!(false),
                new_value: json!(true),
            },
            DiffLevel::Info,
            &catalog(),
        )
        .unwrap();
        assert!(change.is_ignore);
        assert_eq!(
            change.rule_message,
            "cmd `monitor log show` updated property `is_aaz` from `false` to `true`"
        );

        let change = MetaChange::new(
            ChangeKind::ParaPropUpdate {
                cmd_name: "foo bar".to_string(),
                para_name: "x".to_string(),
                property: "default".to_string(),
                old_value: json!("==SUPPRESS=="),
                new_value: json!("abc"),
            },
            DiffLevel::Break,
            &catalog(),
        )
        .unwrap();
        assert!(change.is_ignore);
    }

    #[test]
    fn test_display_text_form() {
        let change = MetaChange::new(
            ChangeKind::SubgroupRemove {
                subgroup_name: "monitor account".to_string(),
            },
            DiffLevel::Break,
            &catalog(),
        )
        .unwrap();
        assert_eq!(
            change.to_string(),
            "sub group `monitor account` removed | diff_level: 3 | is_break: True | \
             please confirm sub group `monitor account` removed"
        );

        let change = MetaChange::new(
            ChangeKind::SubgroupAdd {
                subgroup_name: "monitor account".to_string(),
            },
            DiffLevel::Info,
            &catalog(),
        )
        .unwrap();
        assert_eq!(
            change.to_string(),
            "sub group `monitor account` added | diff_level: 1"
        );
    }

    #[test]
    fn test_para_prop_messages_include_value() {
        let change = MetaChange::new(
            ChangeKind::ParaPropAdd {
                cmd_name: "foo bar".to_string(),
                para_name: "x".to_string(),
                property: "required".to_string(),
                value: json!(true),
            },
            DiffLevel::Break,
            &catalog(),
        )
        .unwrap();
        assert!(change.rule_message.contains("`required=true`"));
        assert!(change.suggest_message.contains("parameter `x`"));
    }
}
