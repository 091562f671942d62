//! Hierarchical export keyed by subgroup path.
//!
//! `acr helm show` lands in `sub_groups["acr"].sub_groups["acr helm"]
//! .commands["acr helm show"]`; a subgroup change lands in that subgroup's
//! `rules`. Intermediate subgroups are created on demand.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::{exported, ChangeEntry};
use crate::differ::changes::MetaChange;

/// Root name of every exported tree.
pub const ROOT_NAME: &str = "az";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub commands: BTreeMap<String, Vec<ChangeEntry>>,
    pub sub_groups: BTreeMap<String, TreeNode>,
    /// Changes to the subgroup itself.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ChangeEntry>,
}

impl TreeNode {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Walk (and create) the subgroup chain for every prefix of `words`.
    fn descend(&mut self, words: &[&str]) -> &mut TreeNode {
        let mut node = self;
        for depth in 1..=words.len() {
            let name = words[..depth].join(" ");
            node = node
                .sub_groups
                .entry(name.clone())
                .or_insert_with(|| TreeNode::named(&name));
        }
        node
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.sub_groups.is_empty() && self.rules.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModuleTree {
    pub module_name: String,
    #[serde(flatten)]
    pub root: TreeNode,
}

impl ModuleTree {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            root: TreeNode::named(ROOT_NAME),
        }
    }

    /// Place one change under its subgroup or command path.
    pub fn insert(&mut self, change: &MetaChange) {
        let entry = ChangeEntry::from(change);
        if let Some(cmd_name) = change.cmd_name() {
            let words: Vec<&str> = cmd_name.split_whitespace().collect();
            let parents = &words[..words.len().saturating_sub(1)];
            self.root
                .descend(parents)
                .commands
                .entry(words.join(" "))
                .or_default()
                .push(entry);
        } else if let Some(subgroup_name) = change.subgroup_name() {
            let words: Vec<&str> = subgroup_name.split_whitespace().collect();
            self.root.descend(&words).rules.push(entry);
        } else {
            debug!("Change {} has no tree position, skipped", change.rule_id());
        }
    }
}

pub fn export_tree(module_name: &str, changes: &[MetaChange], only_break: bool) -> ModuleTree {
    let mut tree = ModuleTree::new(module_name);
    for change in exported(changes, only_break) {
        tree.insert(change);
    }
    tree
}
