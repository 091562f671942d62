//! Turn a structural diff into classified change records.
//!
//! Buckets are consumed in a fixed order: dictionary removals, dictionary
//! additions, list removals, list additions, value changes. Subgroup and
//! command changes are emitted as they are found. Anything under a command's
//! `parameters` list only marks the command; those commands are re-compared
//! parameter by parameter once all buckets are consumed.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::differ::changes::{ChangeKind, MetaChange};
use crate::differ::matcher::{match_parameters, parameter_name};
use crate::differ::path;
use crate::differ::walker::{DeepDiff, ValueChange};
use crate::error::Result;
use crate::meta::navigator;
use crate::rules::{ChangeOp, DiffLevel, RuleCatalog};

/// Parameter properties compared for every matched parameter pair.
pub const CHECKED_PARA_PROPERTY: &[&str] = &[
    "name",
    "options",
    "required",
    "choices",
    "id_part",
    "nargs",
    "default",
    "desc",
    "aaz_type",
    "type",
    "aaz_default",
    "aaz_choices",
    "deprecate_info_target",
    "deprecate_info_redirect",
    "deprecate_info_hide",
    "deprecate_info_expiration",
    "options_deprecate_info",
];

const PARAMETERS_KEY: &str = "parameters";

/// Collects change records for one base/diff pair.
pub struct MetaChangeDetector<'a> {
    base: &'a Value,
    diff: &'a Value,
    catalog: &'a RuleCatalog,
    changes: Vec<MetaChange>,
    cmds_with_param_change: BTreeSet<String>,
}

impl<'a> MetaChangeDetector<'a> {
    pub fn new(base: &'a Value, diff: &'a Value, catalog: &'a RuleCatalog) -> Self {
        Self {
            base,
            diff,
            catalog,
            changes: Vec::new(),
            cmds_with_param_change: BTreeSet::new(),
        }
    }

    /// Consume every bucket of `deep`, then run the parameter pass.
    ///
    /// Fails on the first record that cannot be built, e.g. a parameter
    /// without a name.
    pub fn detect(mut self, deep: &DeepDiff) -> Result<Vec<MetaChange>> {
        self.dict_items(&deep.dictionary_item_removed, ChangeOp::Remove)?;
        self.dict_items(&deep.dictionary_item_added, ChangeOp::Add)?;
        self.list_items(&deep.iterable_item_removed);
        self.list_items(&deep.iterable_item_added);
        self.value_changes(&deep.values_changed)?;
        self.parameter_pass()?;
        Ok(self.changes)
    }

    fn push(&mut self, kind: ChangeKind, level: DiffLevel) -> Result<()> {
        let change = MetaChange::new(kind, level, self.catalog)?;
        self.changes.push(change);
        Ok(())
    }

    fn dict_items(&mut self, paths: &[String], op: ChangeOp) -> Result<()> {
        for p in paths {
            if let Some(cmd_name) = path::command_of(p) {
                self.cmd_item(p, cmd_name, op)?;
            } else if let Some(subgroup_name) = path::subgroup_of(p) {
                self.subgroup_item(p, subgroup_name, op)?;
            } else {
                debug!("No subgroup or command in path {}", p);
            }
        }
        Ok(())
    }

    fn subgroup_item(&mut self, p: &str, subgroup_name: &str, op: ChangeOp) -> Result<()> {
        let subgroup_name = subgroup_name.to_string();
        let Some(property) = path::subgroup_property_of(p, &subgroup_name) else {
            let kind = match op {
                ChangeOp::Remove => ChangeKind::SubgroupRemove { subgroup_name },
                _ => ChangeKind::SubgroupAdd { subgroup_name },
            };
            let level = if op == ChangeOp::Remove {
                DiffLevel::Break
            } else {
                DiffLevel::Info
            };
            return self.push(kind, level);
        };

        let level = self.catalog.subgroup.level(op, property);
        let property = property.to_string();
        let kind = match op {
            ChangeOp::Remove => ChangeKind::SubgroupPropRemove {
                subgroup_name,
                property,
            },
            _ => ChangeKind::SubgroupPropAdd {
                subgroup_name,
                property,
            },
        };
        self.push(kind, level)
    }

    fn cmd_item(&mut self, p: &str, cmd_name: &str, op: ChangeOp) -> Result<()> {
        let Some(property) = path::command_property_of(p, cmd_name) else {
            let cmd_name = cmd_name.to_string();
            return match op {
                ChangeOp::Remove => {
                    let level = if self.has_warn_suffix(&cmd_name) {
                        DiffLevel::Warn
                    } else {
                        DiffLevel::Break
                    };
                    self.push(ChangeKind::CmdRemove { cmd_name }, level)
                }
                _ => self.push(ChangeKind::CmdAdd { cmd_name }, DiffLevel::Info),
            };
        };

        if property == PARAMETERS_KEY {
            self.cmds_with_param_change.insert(cmd_name.to_string());
            return Ok(());
        }

        let level = self.catalog.command.level(op, property);
        let cmd_name = cmd_name.to_string();
        let property = property.to_string();
        let kind = match op {
            ChangeOp::Remove => ChangeKind::CmdPropRemove { cmd_name, property },
            _ => ChangeKind::CmdPropAdd { cmd_name, property },
        };
        self.push(kind, level)
    }

    fn has_warn_suffix(&self, cmd_name: &str) -> bool {
        cmd_name
            .split_whitespace()
            .last()
            .is_some_and(|last| self.catalog.cmd_remove_suffix_warn.iter().any(|s| s == last))
    }

    /// List mutations only mark commands for the parameter pass.
    fn list_items(&mut self, items: &BTreeMap<String, Value>) {
        for p in items.keys() {
            let Some(cmd_name) = path::command_of(p) else {
                debug!("No command in list path {}", p);
                continue;
            };
            if path::command_property_of(p, cmd_name) == Some(PARAMETERS_KEY) {
                debug!(
                    "Parameter list of `{}` changed at {:?}",
                    cmd_name,
                    path::parameter_segments(p)
                );
                self.cmds_with_param_change.insert(cmd_name.to_string());
            }
        }
    }

    fn value_changes(&mut self, changes: &BTreeMap<String, ValueChange>) -> Result<()> {
        for (p, change) in changes {
            if let Some(cmd_name) = path::command_of(p) {
                self.cmd_value_change(p, cmd_name, change)?;
            } else if let Some(subgroup_name) = path::subgroup_of(p) {
                self.subgroup_value_change(p, subgroup_name, change)?;
            } else {
                debug!("No subgroup or command in path {}", p);
            }
        }
        Ok(())
    }

    fn subgroup_value_change(
        &mut self,
        p: &str,
        subgroup_name: &str,
        change: &ValueChange,
    ) -> Result<()> {
        let Some(property) = path::subgroup_property_of(p, subgroup_name) else {
            return Ok(());
        };
        let level = self.catalog.subgroup.level(ChangeOp::Update, property);
        self.push(
            ChangeKind::SubgroupPropUpdate {
                subgroup_name: subgroup_name.to_string(),
                property: property.to_string(),
                old_value: change.old_value.clone(),
                new_value: change.new_value.clone(),
            },
            level,
        )
    }

    fn cmd_value_change(&mut self, p: &str, cmd_name: &str, change: &ValueChange) -> Result<()> {
        let Some(property) = path::command_property_of(p, cmd_name) else {
            return Ok(());
        };
        if property == PARAMETERS_KEY {
            self.cmds_with_param_change.insert(cmd_name.to_string());
            return Ok(());
        }
        let level = self.catalog.command.level(ChangeOp::Update, property);
        self.push(
            ChangeKind::CmdPropUpdate {
                cmd_name: cmd_name.to_string(),
                property: property.to_string(),
                old_value: change.old_value.clone(),
                new_value: change.new_value.clone(),
            },
            level,
        )
    }

    fn parameter_pass(&mut self) -> Result<()> {
        let cmds = std::mem::take(&mut self.cmds_with_param_change);
        for cmd_name in &cmds {
            let resolved = navigator::resolve(cmd_name, self.base)
                .and_then(|b| navigator::resolve(cmd_name, self.diff).map(|d| (b, d)));
            match resolved {
                Ok((base_cmd, diff_cmd)) => {
                    self.diff_parameters(cmd_name, parameters(base_cmd), parameters(diff_cmd))?
                }
                Err(e) => warn!("Skipping parameter check: {}", e),
            }
        }
        Ok(())
    }

    fn diff_parameters(&mut self, cmd_name: &str, base: &[Value], diff: &[Value]) -> Result<()> {
        let matched = match_parameters(base, diff);

        for (base_para, diff_para) in matched.pairs {
            let para_name = parameter_name(base_para).unwrap_or_default().to_string();
            let Some(diff_para) = diff_para else {
                self.push(
                    ChangeKind::ParaRemove {
                        cmd_name: cmd_name.to_string(),
                        para_name,
                    },
                    DiffLevel::Break,
                )?;
                continue;
            };

            for prop in CHECKED_PARA_PROPERTY {
                match (base_para.get(*prop), diff_para.get(*prop)) {
                    (None, None) => {}
                    (Some(value), None) => {
                        let level = self.catalog.parameter.level(ChangeOp::Remove, prop);
                        self.push(
                            ChangeKind::ParaPropRemove {
                                cmd_name: cmd_name.to_string(),
                                para_name: para_name.clone(),
                                property: prop.to_string(),
                                value: value.clone(),
                            },
                            level,
                        )?;
                    }
                    (None, Some(value)) => {
                        let level = self.catalog.parameter.level(ChangeOp::Add, prop);
                        self.push(
                            ChangeKind::ParaPropAdd {
                                cmd_name: cmd_name.to_string(),
                                para_name: para_name.clone(),
                                property: prop.to_string(),
                                value: value.clone(),
                            },
                            level,
                        )?;
                    }
                    (Some(old), Some(new)) => {
                        self.parameter_update(cmd_name, &para_name, prop, old, new)?
                    }
                }
            }
        }

        for diff_para in matched.unmatched {
            let required = diff_para
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let level = if required {
                DiffLevel::Break
            } else {
                DiffLevel::Info
            };
            self.push(
                ChangeKind::ParaAdd {
                    cmd_name: cmd_name.to_string(),
                    para_name: parameter_name(diff_para).unwrap_or_default().to_string(),
                },
                level,
            )?;
        }
        Ok(())
    }

    fn parameter_update(
        &mut self,
        cmd_name: &str,
        para_name: &str,
        prop: &str,
        old: &Value,
        new: &Value,
    ) -> Result<()> {
        if old == new {
            return Ok(());
        }
        let table = &self.catalog.parameter;
        let level = match (old, new) {
            _ if prop == "options_deprecate_info" => DiffLevel::Info,
            (Value::Array(old_items), Value::Array(new_items)) => {
                if old_items.iter().all(|item| new_items.contains(item)) {
                    DiffLevel::Info
                } else {
                    table.narrowing_level(prop)
                }
            }
            _ => table.level(ChangeOp::Update, prop),
        };
        self.push(
            ChangeKind::ParaPropUpdate {
                cmd_name: cmd_name.to_string(),
                para_name: para_name.to_string(),
                property: prop.to_string(),
                old_value: old.clone(),
                new_value: new.clone(),
            },
            level,
        )
    }
}

fn parameters(cmd: &Value) -> &[Value] {
    cmd.get(PARAMETERS_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
