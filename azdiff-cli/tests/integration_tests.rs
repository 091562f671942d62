//! Integration tests for the azdiff CLI
//!
//! Runs the built binary against snapshot fixtures in temporary directories.
//! No test touches the network: version diffs run from a pre-populated cache.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

fn azdiff_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_azdiff"))
}

/// Run azdiff with the given args in the specified directory
fn run_azdiff(dir: &Path, args: &[&str]) -> Output {
    azdiff_binary()
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("AZDIFF_CONFIG")
        .args(args)
        .output()
        .expect("Failed to execute azdiff command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

const BASE_META: &str = r#"{
  "module_name": "acr",
  "commands": {},
  "sub_groups": {
    "acr": {
      "name": "acr",
      "commands": {
        "acr show": {
          "name": "acr show",
          "parameters": [
            {"name": "registry_name", "options": ["--name", "-n"], "required": true}
          ]
        },
        "acr list": {"name": "acr list", "parameters": []}
      },
      "sub_groups": {
        "acr helm": {
          "name": "acr helm",
          "commands": {
            "acr helm show": {"name": "acr helm show", "parameters": []}
          },
          "sub_groups": {}
        }
      }
    }
  }
}"#;

/// `acr helm show` removed, `acr show` gains `confirmation`.
const DIFF_META: &str = r#"{
  "module_name": "acr",
  "commands": {},
  "sub_groups": {
    "acr": {
      "name": "acr",
      "commands": {
        "acr show": {
          "name": "acr show",
          "confirmation": true,
          "parameters": [
            {"name": "registry_name", "options": ["--name", "-n"], "required": true}
          ]
        },
        "acr list": {"name": "acr list", "parameters": []}
      },
      "sub_groups": {
        "acr helm": {
          "name": "acr helm",
          "commands": {},
          "sub_groups": {}
        }
      }
    }
  }
}"#;

fn setup_snapshots(dir: &Path) -> (PathBuf, PathBuf) {
    (
        write_file(dir, "base/az_acr_meta.json", BASE_META),
        write_file(dir, "diff/az_acr_meta.json", DIFF_META),
    )
}

fn parse_json(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("Output is not valid JSON")
}

// ============================================================================
// meta-diff
// ============================================================================

#[test]
fn test_meta_diff_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let (base, _) = setup_snapshots(dir.path());

    let output = run_azdiff(
        dir.path(),
        &["meta-diff", base.to_str().unwrap(), "does-not-exist.json"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not found"));
}

#[test]
fn test_meta_diff_text_output() {
    let dir = TempDir::new().unwrap();
    setup_snapshots(dir.path());

    let output = run_azdiff(
        dir.path(),
        &["meta-diff", "base/az_acr_meta.json", "diff/az_acr_meta.json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("acr helm show"));
    assert!(text.contains("| diff_level: 3 | is_break: True | please confirm"));
}

#[test]
fn test_meta_diff_dict_output() {
    let dir = TempDir::new().unwrap();
    setup_snapshots(dir.path());

    let output = run_azdiff(
        dir.path(),
        &[
            "meta-diff",
            "base/az_acr_meta.json",
            "diff/az_acr_meta.json",
            "--output-type",
            "dict",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let entries = parse_json(&stdout(&output));
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let removed = entries
        .iter()
        .find(|e| e["rule_id"] == "1002")
        .expect("missing CmdRemove entry");
    assert_eq!(removed["cmd_name"], "acr helm show");
    assert_eq!(removed["is_break"], true);
    assert_eq!(removed["diff_level"], 3);
    assert!(removed.get("subgroup_name").is_none());

    assert!(entries.iter().any(|e| e["rule_name"] == "CmdPropAdd"));
}

#[test]
fn test_meta_diff_only_break() {
    let dir = TempDir::new().unwrap();
    let base = write_file(dir.path(), "a.json", BASE_META);
    let diff_content = BASE_META.replace(
        r#""acr list": {"name": "acr list", "parameters": []}"#,
        r#""acr list": {"name": "acr list", "parameters": []},
        "acr create": {"name": "acr create", "parameters": []}"#,
    );
    let diff = write_file(dir.path(), "b.json", &diff_content);

    let args = [
        "meta-diff",
        base.to_str().unwrap(),
        diff.to_str().unwrap(),
        "--output-type",
        "dict",
    ];
    let all = parse_json(&stdout(&run_azdiff(dir.path(), &args)));
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(all[0]["rule_name"], "CmdAdd");

    let mut only_break = args.to_vec();
    only_break.push("--only-break");
    let breaking = parse_json(&stdout(&run_azdiff(dir.path(), &only_break)));
    assert!(breaking.as_array().unwrap().is_empty());
}

#[test]
fn test_meta_diff_output_file_creates_directories() {
    let dir = TempDir::new().unwrap();
    setup_snapshots(dir.path());

    let output = run_azdiff(
        dir.path(),
        &[
            "meta-diff",
            "base/az_acr_meta.json",
            "diff/az_acr_meta.json",
            "--output-type",
            "dict",
            "--output-file",
            "out/reports/acr.json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).trim().is_empty());

    let written = fs::read_to_string(dir.path().join("out/reports/acr.json")).unwrap();
    assert!(written.contains('\n'), "expected pretty JSON");
    assert_eq!(parse_json(&written).as_array().unwrap().len(), 2);
}

#[test]
fn test_meta_diff_tree_output() {
    let dir = TempDir::new().unwrap();
    setup_snapshots(dir.path());

    let output = run_azdiff(
        dir.path(),
        &[
            "meta-diff",
            "base/az_acr_meta.json",
            "diff/az_acr_meta.json",
            "--output-type",
            "tree",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let tree = parse_json(&stdout(&output));
    assert_eq!(tree["module_name"], "acr");
    assert_eq!(tree["name"], "az");
    let helm = &tree["sub_groups"]["acr"]["sub_groups"]["acr helm"];
    assert_eq!(helm["commands"]["acr helm show"][0]["rule_id"], "1002");
    assert_eq!(
        tree["sub_groups"]["acr"]["commands"]["acr show"][0]["rule_id"],
        "1003"
    );
}

#[test]
fn test_meta_diff_outdated_tool_fails() {
    let dir = TempDir::new().unwrap();
    let (base, _) = setup_snapshots(dir.path());
    let newer = DIFF_META.replacen(
        r#""module_name": "acr","#,
        r#""module_name": "acr", "compat_version": "99.0.0","#,
        1,
    );
    let diff = write_file(dir.path(), "newer.json", &newer);

    let output = run_azdiff(
        dir.path(),
        &["meta-diff", base.to_str().unwrap(), diff.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("upgrade"));
}

#[test]
fn test_meta_diff_whitelist() {
    let dir = TempDir::new().unwrap();
    setup_snapshots(dir.path());
    write_file(
        dir.path(),
        "whitelist.tsv",
        "1003\tacr show\tconfirmation\n1002\tacr helm show\tparameters\n",
    );

    let output = run_azdiff(
        dir.path(),
        &[
            "meta-diff",
            "base/az_acr_meta.json",
            "diff/az_acr_meta.json",
            "--output-type",
            "dict",
            "--whitelist",
            "whitelist.tsv",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let entries = parse_json(&stdout(&output));
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["rule_id"], "1002");
}

// ============================================================================
// version-diff
// ============================================================================

const BLOB_CONFIG: &str = "[BLOB]\n\
    primary_endpoint = http://127.0.0.1:9/cmd-metadata\n\
    metadata_path_prefix = azure-cli-\n\
    metadata_module_index_file = index.txt\n";

#[test]
fn test_version_diff_from_cache() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "azdiff.ini", BLOB_CONFIG);
    write_file(dir.path(), "azure-cli-2.49.0/az_acr_meta.json", BASE_META);
    write_file(dir.path(), "azure-cli-2.50.0/az_acr_meta.json", DIFF_META);

    let output = run_azdiff(
        dir.path(),
        &[
            "version-diff",
            "2.49.0",
            "2.50.0",
            "--target-module",
            "acr",
            "--use-cache",
            "--only-break",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let entries = parse_json(&stdout(&output));
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["module"] == "acr"));
    assert!(entries.iter().all(|e| e["is_break"] == true));
}

#[test]
fn test_version_diff_csv_output_file() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "blob.ini", BLOB_CONFIG);
    write_file(dir.path(), "azure-cli-2.49.0/az_acr_meta.json", BASE_META);
    write_file(dir.path(), "azure-cli-2.50.0/az_acr_meta.json", DIFF_META);

    let output = run_azdiff(
        dir.path(),
        &[
            "version-diff",
            "2.49.0",
            "2.50.0",
            "--target-module",
            "acr",
            "--use-cache",
            "--output-type",
            "csv",
            "--config",
            "blob.ini",
            "--output-file",
            "reports/acr.csv",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let csv = fs::read_to_string(dir.path().join("reports/acr.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("rule_id,"));
    assert!(lines.iter().skip(1).all(|l| l.ends_with(",acr")));
}

#[test]
fn test_version_diff_missing_config_fails() {
    let dir = TempDir::new().unwrap();

    let output = run_azdiff(dir.path(), &["version-diff", "2.49.0", "2.50.0"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("azdiff.ini"));
}

// ============================================================================
// next-version
// ============================================================================

#[test]
fn test_next_version_breaking_bumps_major() {
    let dir = TempDir::new().unwrap();
    setup_snapshots(dir.path());

    let output = run_azdiff(
        dir.path(),
        &[
            "next-version",
            "3.11.0",
            "base/az_acr_meta.json",
            "diff/az_acr_meta.json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let next = parse_json(&stdout(&output));
    assert_eq!(next["version"], "4.0.0");
    assert_eq!(next["is_stable"], true);
}

#[test]
fn test_next_version_no_changes_bumps_patch() {
    let dir = TempDir::new().unwrap();
    let base = write_file(dir.path(), "a.json", BASE_META);
    let diff = write_file(dir.path(), "b.json", BASE_META);

    let output = run_azdiff(
        dir.path(),
        &[
            "next-version",
            "3.11.0",
            base.to_str().unwrap(),
            diff.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(parse_json(&stdout(&output))["version"], "3.11.1");
}

// ============================================================================
// CLI surface
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    let output = run_azdiff(dir.path(), &["--help"]);
    assert!(output.status.success());
    let help = stdout(&output);
    assert!(help.contains("meta-diff"));
    assert!(help.contains("version-diff"));
    assert!(help.contains("next-version"));
}
