//! CSV export of version-wide diffs.
//!
//! One row per change record. The `cmd_name` column falls back to the
//! subgroup name for subgroup-level changes, and to `-` otherwise.

use azdiff_core::ChangeEntry;

const HEADERS: [&str; 10] = [
    "rule_id",
    "rule_link_url",
    "is_break",
    "diff_level",
    "rule_message",
    "suggest_message",
    "cmd_name",
    "subgroup_name",
    "rule_name",
    "module",
];

pub struct CsvOutput;

impl CsvOutput {
    pub fn format_entries(entries: &[ChangeEntry]) -> String {
        let mut output = HEADERS.join(",");
        for entry in entries {
            output.push('\n');
            output.push_str(&Self::row(entry).join(","));
        }
        output.push('\n');
        output
    }

    fn row(entry: &ChangeEntry) -> Vec<String> {
        let cmd_name = entry
            .cmd_name
            .as_deref()
            .or(entry.subgroup_name.as_deref())
            .unwrap_or("-");
        let diff_level = entry.diff_level.as_u8().to_string();
        [
            entry.rule_id.as_str(),
            entry.rule_link_url.as_str(),
            if entry.is_break { "true" } else { "false" },
            diff_level.as_str(),
            entry.rule_message.as_str(),
            entry.suggest_message.as_str(),
            cmd_name,
            entry.subgroup_name.as_deref().unwrap_or(""),
            entry.rule_name.as_str(),
            entry.module.as_deref().unwrap_or(""),
        ]
        .iter()
        .map(|v| Self::escape_value(v))
        .collect()
    }

    /// Quote values containing separators, quotes or line breaks.
    pub fn escape_value(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
        {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azdiff_core::DiffLevel;

    fn entry(cmd_name: Option<&str>, subgroup_name: Option<&str>) -> ChangeEntry {
        ChangeEntry {
            rule_id: "1002".to_string(),
            rule_link_url: "https://example.com/1002".to_string(),
            is_break: true,
            diff_level: DiffLevel::Break,
            rule_message: "cmd `acr show` removed".to_string(),
            suggest_message: "please confirm cmd `acr show` removed".to_string(),
            cmd_name: cmd_name.map(String::from),
            subgroup_name: subgroup_name.map(String::from),
            rule_name: "CmdRemove".to_string(),
            module: Some("acr".to_string()),
        }
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(CsvOutput::escape_value("plain"), "plain");
        assert_eq!(CsvOutput::escape_value("a,b"), "\"a,b\"");
        assert_eq!(CsvOutput::escape_value("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(CsvOutput::escape_value("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_format_entries() {
        let out = CsvOutput::format_entries(&[entry(Some("acr show"), None)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rule_id,rule_link_url,is_break,diff_level"));
        assert!(lines[0].ends_with("rule_name,module"));
        assert_eq!(
            lines[1],
            "1002,https://example.com/1002,true,3,cmd `acr show` removed,\
             please confirm cmd `acr show` removed,acr show,,CmdRemove,acr"
        );
    }

    #[test]
    fn test_cmd_name_falls_back_to_subgroup() {
        let out = CsvOutput::format_entries(&[entry(None, Some("acr helm")), entry(None, None)]);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].contains(",acr helm,acr helm,"));
        assert!(lines[2].contains(",-,,"));
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(CsvOutput::format_entries(&[]).lines().count(), 1);
    }
}
