//! Rule catalog: message templates and severity tables.
//!
//! Every detected change carries a 4-digit rule id. The id selects a rule
//! message template and a suggestion template; both use named placeholders
//! (`{cmd_name}`, `{property}`, ...) filled in when a record is built.
//!
//! Severity is looked up per scope (subgroup, command, parameter) in a
//! [`SeverityTable`]. Properties absent from every list are informational.

use serde::{Serialize, Serializer};

/// Rule link prefix, overridable at build time.
pub const RULE_LINK_URL_PREFIX: &str = match option_env!("AZDIFF_RULE_LINK_PREFIX") {
    Some(prefix) => prefix,
    None => "https://github.com/Azure/azure-cli/blob/dev/doc/breaking_change_rules/",
};

/// Rule link suffix, overridable at build time.
pub const RULE_LINK_URL_SUFFIX: &str = match option_env!("AZDIFF_RULE_LINK_SUFFIX") {
    Some(suffix) => suffix,
    None => ".md",
};

/// Fallback rule id.
pub const DEFAULT_RULE_ID: &str = "1000";

/// Severity tier of a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiffLevel {
    Info = 1,
    Warn = 2,
    Break = 3,
}

impl DiffLevel {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffLevel::Info => "info",
            DiffLevel::Warn => "warn",
            DiffLevel::Break => "break",
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, DiffLevel::Break)
    }
}

impl Serialize for DiffLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Kind of structural operation a change represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOp {
    Add,
    Remove,
    Update,
}

impl ChangeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOp::Add => "add",
            ChangeOp::Remove => "remove",
            ChangeOp::Update => "update",
        }
    }
}

/// Build the documentation link for a rule id.
pub fn rule_link_url(rule_id: &str) -> String {
    format!("{}{}{}", RULE_LINK_URL_PREFIX, rule_id, RULE_LINK_URL_SUFFIX)
}

/// Rule message template for a rule id.
pub fn rule_template(rule_id: &str) -> &'static str {
    match rule_id {
        "1001" => "cmd `{cmd_name}` added",
        "1002" => "cmd `{cmd_name}` removed",
        "1003" => "cmd `{cmd_name}` added property `{property}`",
        "1004" => "cmd `{cmd_name}` removed property `{property}`",
        "1005" => {
            "cmd `{cmd_name}` updated property `{property}` from `{old_value}` to `{new_value}`"
        }
        "1006" => "cmd `{cmd_name}` added parameter `{para_name}`",
        "1007" => "cmd `{cmd_name}` removed parameter `{para_name}`",
        "1008" => "cmd `{cmd_name}` update parameter `{para_name}`: added property `{property}={value}`",
        "1009" => {
            "cmd `{cmd_name}` update parameter `{para_name}`: removed property `{property}={value}`"
        }
        "1010" => {
            "cmd `{cmd_name}` update parameter `{para_name}`: updated property `{property}` from `{old_value}` to `{new_value}`"
        }
        "1011" => "sub group `{subgroup_name}` added",
        "1012" => "sub group `{subgroup_name}` removed",
        "1013" => "sub group `{subgroup_name}` added property `{property}`",
        "1014" => "sub group `{subgroup_name}` removed property `{property}`",
        "1015" => {
            "sub group `{subgroup_name}` updated property `{property}` from `{old_value}` to `{new_value}`"
        }
        _ => "Non applicable",
    }
}

/// Suggestion template for a rule id.
pub fn suggest_template(rule_id: &str) -> &'static str {
    match rule_id {
        "1001" => "please confirm cmd `{cmd_name}` added",
        "1002" => "please confirm cmd `{cmd_name}` removed",
        "1003" => "please remove property `{property}` for cmd `{cmd_name}`",
        "1004" => "please add back property `{property}` for cmd `{cmd_name}`",
        "1005" => {
            "please change property `{property}` from `{new_value}` to `{old_value}` for cmd `{cmd_name}`"
        }
        "1006" => "please remove parameter `{para_name}` for cmd `{cmd_name}`",
        "1007" => "please add back parameter `{para_name}` for cmd `{cmd_name}`",
        "1008" => {
            "please remove property `{property}={value}` for parameter `{para_name}` for cmd `{cmd_name}`"
        }
        "1009" => {
            "please add back property `{property}={value}` for parameter `{para_name}` for cmd `{cmd_name}`"
        }
        "1010" => {
            "please change property `{property}` from `{new_value}` to `{old_value}` for parameter `{para_name}` of cmd `{cmd_name}`"
        }
        "1011" => "please confirm sub group `{subgroup_name}` added",
        "1012" => "please confirm sub group `{subgroup_name}` removed",
        "1013" => "please remove property `{property}` for sub group `{subgroup_name}`",
        "1014" => "please add back property `{property}` for sub group `{subgroup_name}`",
        "1015" => {
            "please change property `{property}` from `{new_value}` to `{old_value}` for sub group `{subgroup_name}`"
        }
        _ => "Non applicable",
    }
}

/// Fill `{name}` placeholders in a template.
///
/// Placeholders without a matching argument are left untouched.
pub fn render(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in args {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Add/remove/update warn and break lists for one scope.
#[derive(Clone, Debug, Default)]
pub struct SeverityTable {
    pub add_warn: Vec<String>,
    pub add_break: Vec<String>,
    pub remove_warn: Vec<String>,
    pub remove_break: Vec<String>,
    pub update_warn: Vec<String>,
    pub update_break: Vec<String>,
}

impl SeverityTable {
    /// Severity of `op` on `property`; warn lists win over break lists.
    pub fn level(&self, op: ChangeOp, property: &str) -> DiffLevel {
        let (warn, brk) = match op {
            ChangeOp::Add => (&self.add_warn, &self.add_break),
            ChangeOp::Remove => (&self.remove_warn, &self.remove_break),
            ChangeOp::Update => (&self.update_warn, &self.update_break),
        };
        if warn.iter().any(|p| p == property) {
            DiffLevel::Warn
        } else if brk.iter().any(|p| p == property) {
            DiffLevel::Break
        } else {
            DiffLevel::Info
        }
    }

    /// Severity of a non-widening list update: warn if warn-listed, else break.
    pub fn narrowing_level(&self, property: &str) -> DiffLevel {
        if self.update_warn.iter().any(|p| p == property) {
            DiffLevel::Warn
        } else {
            DiffLevel::Break
        }
    }
}

/// All severity tables and ignore lists used by the detector.
#[derive(Clone, Debug)]
pub struct RuleCatalog {
    pub subgroup: SeverityTable,
    pub command: SeverityTable,
    pub parameter: SeverityTable,

    /// Subgroup properties whose changes are recorded but never exported.
    pub subgroup_property_ignored: Vec<String>,
    /// Command properties whose changes are recorded but never exported.
    pub cmd_property_ignored: Vec<String>,
    /// Parameter properties whose changes are recorded but never exported.
    pub para_property_ignored: Vec<String>,
    /// Parameter names whose property changes are never exported.
    pub para_name_ignored: Vec<String>,
    /// Parameter values (rendered) that mark an update as ignored.
    pub para_value_ignored: Vec<String>,
    /// Last command-name tokens that downgrade a removal to a warning.
    pub cmd_remove_suffix_warn: Vec<String>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        let deprecate_props = [
            "deprecate_info_target",
            "deprecate_info_redirect",
            "deprecate_info_hide",
            "deprecate_info_expiration",
        ];

        Self {
            subgroup: SeverityTable {
                add_warn: list(&deprecate_props),
                update_warn: list(&deprecate_props),
                ..Default::default()
            },
            command: SeverityTable {
                add_warn: list(&deprecate_props),
                add_break: list(&["confirmation"]),
                update_warn: list(&deprecate_props),
                ..Default::default()
            },
            parameter: SeverityTable {
                add_warn: list(&deprecate_props),
                add_break: list(&["required"]),
                remove_break: list(&["options", "choices", "aaz_choices"]),
                update_warn: list(&deprecate_props),
                update_break: list(&[
                    "required",
                    "default",
                    "aaz_default",
                    "type",
                    "aaz_type",
                    "nargs",
                    "id_part",
                ]),
                ..Default::default()
            },
            subgroup_property_ignored: list(&["is_aaz"]),
            cmd_property_ignored: list(&["is_aaz", "supports_no_wait"]),
            para_property_ignored: list(&["desc"]),
            para_name_ignored: list(&["force_string"]),
            para_value_ignored: list(&["==SUPPRESS=="]),
            cmd_remove_suffix_warn: list(&["wait", "preview", "deprecated"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_level_ordering() {
        assert!(DiffLevel::Info < DiffLevel::Warn);
        assert!(DiffLevel::Warn < DiffLevel::Break);
        assert!(DiffLevel::Break.is_break());
        assert!(!DiffLevel::Warn.is_break());
    }

    #[test]
    fn test_diff_level_serializes_as_number() {
        let json = serde_json::to_string(&DiffLevel::Break).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn test_every_rule_has_templates() {
        for id in 1001..=1015 {
            let id = id.to_string();
            assert_ne!(rule_template(&id), "Non applicable", "rule {}", id);
            assert_ne!(suggest_template(&id), "Non applicable", "rule {}", id);
        }
        assert_eq!(rule_template(DEFAULT_RULE_ID), "Non applicable");
    }

    #[test]
    fn test_render_named_placeholders() {
        let msg = render(rule_template("1002"), &[("cmd_name", "acr helm show")]);
        assert_eq!(msg, "cmd `acr helm show` removed");

        let msg = render("{a} and {b} and {c}", &[("a", "1"), ("b", "2")]);
        assert_eq!(msg, "1 and 2 and {c}");
    }

    #[test]
    fn test_rule_link_url() {
        let url = rule_link_url("1007");
        assert!(url.starts_with(RULE_LINK_URL_PREFIX));
        assert!(url.contains("1007"));
        assert!(url.ends_with(RULE_LINK_URL_SUFFIX));
    }

    #[test]
    fn test_severity_table_lookup() {
        let catalog = RuleCatalog::default();
        assert_eq!(
            catalog.parameter.level(ChangeOp::Add, "required"),
            DiffLevel::Break
        );
        assert_eq!(
            catalog.parameter.level(ChangeOp::Add, "deprecate_info_target"),
            DiffLevel::Warn
        );
        assert_eq!(
            catalog.command.level(ChangeOp::Update, "unknown_prop"),
            DiffLevel::Info
        );
    }

    #[test]
    fn test_narrowing_level_defaults_to_break() {
        let mut table = SeverityTable::default();
        assert_eq!(table.narrowing_level("options"), DiffLevel::Break);
        table.update_warn.push("options".to_string());
        assert_eq!(table.narrowing_level("options"), DiffLevel::Warn);
    }
}
