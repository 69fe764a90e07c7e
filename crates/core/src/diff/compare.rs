use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{
    buckets::ObjectBuckets,
    equivalence::{exprs_equivalent, optional_exprs_equivalent},
    privilege::compare_privileges,
    qualify::qualify_ops,
    remaining::compare_remaining_objects,
};
use crate::{
    CheckConstraint, Column, ColumnChange, DiffConfig, DiffOp, ExclusionConstraint, ForeignKey,
    ForeignKeyAction, Ident, IdentKey, IndexDef, PlanError, PrimaryKey, QualifiedName, Result,
    SchemaObject, Table, UniqueConstraint, display_qualified_name,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DiffEngine;

impl DiffEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compare `desired` against `current` and produce an *unordered* op
    /// batch; [`crate::build_ddl_plan`] owns dependency ordering.
    pub fn diff(
        &self,
        desired: &[SchemaObject],
        current: &[SchemaObject],
        config: &DiffConfig,
    ) -> Result<Vec<DiffOp>> {
        let desired_objects = ObjectBuckets::from_schema(desired, &config.default_schema)?;
        let current_objects = ObjectBuckets::from_schema(current, &config.default_schema)?;

        let mut ops = Vec::new();
        self.compare_tables(&desired_objects, &current_objects, config, &mut ops);
        self.compare_indexes(&desired_objects, &current_objects, config, &mut ops);
        compare_remaining_objects(&desired_objects, &current_objects, config, &mut ops)?;
        compare_privileges(&desired_objects, &current_objects, config, &mut ops);

        // Pairing resolved missing schemas in its keys; the emitted ops
        // must spell the same resolution out so rendered DDL is always
        // fully qualified.
        qualify_ops(&mut ops, &config.default_schema);
        Ok(ops)
    }

    fn compare_tables(
        &self,
        desired: &ObjectBuckets<'_>,
        current: &ObjectBuckets<'_>,
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        for (table_key, desired_table) in &desired.tables {
            match current.tables.get(table_key) {
                Some(current_table) => {
                    self.compare_table(desired_table, current_table, config, ops);
                }
                None => ops.push(DiffOp::CreateTable((*desired_table).clone())),
            }
        }

        for (table_key, current_table) in &current.tables {
            if desired.tables.contains_key(table_key) {
                continue;
            }
            if config.enable_drop {
                ops.push(DiffOp::DropTable(current_table.name.clone()));
            } else {
                debug!(
                    table = %display_qualified_name(&current_table.name),
                    "skipping table drop (enable_drop=false)"
                );
            }
        }
    }

    fn compare_table(
        &self,
        desired: &Table,
        current: &Table,
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        let table = &desired.name;
        self.compare_columns(table, &desired.columns, &current.columns, config, ops);
        self.compare_primary_key(
            table,
            desired.primary_key.as_ref(),
            current.primary_key.as_ref(),
            ops,
        );
        self.compare_foreign_keys(table, &desired.foreign_keys, &current.foreign_keys, config, ops);
        self.compare_checks(table, &desired.checks, &current.checks, config, ops);
        self.compare_uniques(table, &desired.uniques, &current.uniques, config, ops);
        self.compare_exclusions(table, &desired.exclusions, &current.exclusions, config, ops);
    }

    fn compare_columns(
        &self,
        table: &QualifiedName,
        desired_columns: &[Column],
        current_columns: &[Column],
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        let current_by_name = map_columns_by_name(current_columns);

        for desired_column in desired_columns {
            match current_by_name.get(&desired_column.name.key()) {
                Some(current_column) => {
                    let changes = column_changes(desired_column, current_column);
                    if !changes.is_empty() {
                        ops.push(DiffOp::AlterColumn {
                            table: table.clone(),
                            column: desired_column.name.clone(),
                            changes,
                        });
                    }
                }
                None => ops.push(DiffOp::AddColumn {
                    table: table.clone(),
                    column: Box::new(desired_column.clone()),
                }),
            }
        }

        let desired_by_name = map_columns_by_name(desired_columns);
        for current_column in current_columns {
            if desired_by_name.contains_key(&current_column.name.key()) {
                continue;
            }
            if config.enable_drop {
                ops.push(DiffOp::DropColumn {
                    table: table.clone(),
                    column: current_column.name.clone(),
                });
            } else {
                debug!(
                    table = %display_qualified_name(table),
                    column = %current_column.name.value,
                    "skipping column drop (enable_drop=false)"
                );
            }
        }
    }

    fn compare_primary_key(
        &self,
        table: &QualifiedName,
        desired: Option<&PrimaryKey>,
        current: Option<&PrimaryKey>,
        ops: &mut Vec<DiffOp>,
    ) {
        match (desired, current) {
            (Some(desired_pk), Some(current_pk)) => {
                let columns_match =
                    ident_keys(&desired_pk.columns) == ident_keys(&current_pk.columns);
                let name_matches = match &desired_pk.name {
                    // An unnamed desired PK accepts whatever name the
                    // database assigned.
                    None => true,
                    Some(name) => name.key() == effective_pk_name(table, current_pk).key(),
                };

                if !columns_match || !name_matches {
                    ops.push(DiffOp::DropPrimaryKey {
                        table: table.clone(),
                        name: effective_pk_name(table, current_pk),
                    });
                    ops.push(DiffOp::SetPrimaryKey {
                        table: table.clone(),
                        pk: desired_pk.clone(),
                    });
                }
            }
            (Some(desired_pk), None) => ops.push(DiffOp::SetPrimaryKey {
                table: table.clone(),
                pk: desired_pk.clone(),
            }),
            (None, Some(current_pk)) => ops.push(DiffOp::DropPrimaryKey {
                table: table.clone(),
                name: effective_pk_name(table, current_pk),
            }),
            (None, None) => {}
        }
    }

    fn compare_foreign_keys(
        &self,
        table: &QualifiedName,
        desired_fks: &[ForeignKey],
        current_fks: &[ForeignKey],
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        let mut matched_current = BTreeSet::new();

        for desired_fk in desired_fks {
            let paired = match &desired_fk.name {
                Some(name) => current_fks
                    .iter()
                    .enumerate()
                    .find(|(_, fk)| fk.name.as_ref().map(Ident::key) == Some(name.key())),
                None => current_fks.iter().enumerate().find(|(index, fk)| {
                    !matched_current.contains(index)
                        && foreign_keys_equivalent(desired_fk, fk, config)
                }),
            };

            match paired {
                Some((index, current_fk)) => {
                    matched_current.insert(index);
                    if !foreign_keys_equivalent(desired_fk, current_fk, config) {
                        if let Some(name) = &current_fk.name {
                            ops.push(DiffOp::DropForeignKey {
                                table: table.clone(),
                                name: name.clone(),
                            });
                        }
                        ops.push(DiffOp::AddForeignKey {
                            table: table.clone(),
                            fk: desired_fk.clone(),
                        });
                    }
                }
                None => ops.push(DiffOp::AddForeignKey {
                    table: table.clone(),
                    fk: desired_fk.clone(),
                }),
            }
        }

        for (index, current_fk) in current_fks.iter().enumerate() {
            if matched_current.contains(&index) {
                continue;
            }

            match (&current_fk.name, config.enable_drop) {
                (Some(name), true) => ops.push(DiffOp::DropForeignKey {
                    table: table.clone(),
                    name: name.clone(),
                }),
                _ => debug!(
                    table = %display_qualified_name(table),
                    "skipping foreign key drop"
                ),
            }
        }
    }

    fn compare_checks(
        &self,
        table: &QualifiedName,
        desired_checks: &[CheckConstraint],
        current_checks: &[CheckConstraint],
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        let mut matched_current = BTreeSet::new();

        for desired_check in desired_checks {
            let paired = match &desired_check.name {
                Some(name) => current_checks
                    .iter()
                    .enumerate()
                    .find(|(_, check)| check.name.as_ref().map(Ident::key) == Some(name.key())),
                None => current_checks.iter().enumerate().find(|(index, check)| {
                    !matched_current.contains(index)
                        && exprs_equivalent(&desired_check.expr, &check.expr)
                }),
            };

            match paired {
                Some((index, current_check)) => {
                    matched_current.insert(index);
                    if !checks_equivalent(desired_check, current_check) {
                        if let Some(name) = &current_check.name {
                            ops.push(DiffOp::DropCheck {
                                table: table.clone(),
                                name: name.clone(),
                            });
                        }
                        ops.push(DiffOp::AddCheck {
                            table: table.clone(),
                            check: desired_check.clone(),
                        });
                    }
                }
                None => ops.push(DiffOp::AddCheck {
                    table: table.clone(),
                    check: desired_check.clone(),
                }),
            }
        }

        for (index, current_check) in current_checks.iter().enumerate() {
            if matched_current.contains(&index) {
                continue;
            }

            match (&current_check.name, config.enable_drop) {
                (Some(name), true) => ops.push(DiffOp::DropCheck {
                    table: table.clone(),
                    name: name.clone(),
                }),
                _ => debug!(table = %display_qualified_name(table), "skipping check drop"),
            }
        }
    }

    fn compare_uniques(
        &self,
        table: &QualifiedName,
        desired_uniques: &[UniqueConstraint],
        current_uniques: &[UniqueConstraint],
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        let mut matched_current = BTreeSet::new();

        for desired_unique in desired_uniques {
            let paired = match &desired_unique.name {
                Some(name) => current_uniques
                    .iter()
                    .enumerate()
                    .find(|(_, unique)| unique.name.as_ref().map(Ident::key) == Some(name.key())),
                None => current_uniques.iter().enumerate().find(|(index, unique)| {
                    !matched_current.contains(index)
                        && ident_keys(&desired_unique.columns) == ident_keys(&unique.columns)
                }),
            };

            match paired {
                Some((index, current_unique)) => {
                    matched_current.insert(index);
                    if !uniques_equivalent(desired_unique, current_unique) {
                        if let Some(name) = &current_unique.name {
                            ops.push(DiffOp::DropUnique {
                                table: table.clone(),
                                name: name.clone(),
                            });
                        }
                        ops.push(DiffOp::AddUnique {
                            table: table.clone(),
                            unique: desired_unique.clone(),
                        });
                    }
                }
                None => ops.push(DiffOp::AddUnique {
                    table: table.clone(),
                    unique: desired_unique.clone(),
                }),
            }
        }

        for (index, current_unique) in current_uniques.iter().enumerate() {
            if matched_current.contains(&index) {
                continue;
            }

            match (&current_unique.name, config.enable_drop) {
                (Some(name), true) => ops.push(DiffOp::DropUnique {
                    table: table.clone(),
                    name: name.clone(),
                }),
                _ => debug!(
                    table = %display_qualified_name(table),
                    "skipping unique constraint drop"
                ),
            }
        }
    }

    fn compare_exclusions(
        &self,
        table: &QualifiedName,
        desired_exclusions: &[ExclusionConstraint],
        current_exclusions: &[ExclusionConstraint],
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        let mut matched_current = BTreeSet::new();

        for desired_exclusion in desired_exclusions {
            let paired = current_exclusions.iter().enumerate().find(|(_, exclusion)| {
                match (&desired_exclusion.name, &exclusion.name) {
                    (Some(desired_name), Some(current_name)) => {
                        desired_name.key() == current_name.key()
                    }
                    _ => exclusions_equivalent(desired_exclusion, exclusion),
                }
            });

            match paired {
                Some((index, current_exclusion)) => {
                    matched_current.insert(index);
                    if !exclusions_equivalent(desired_exclusion, current_exclusion) {
                        if let Some(name) = &current_exclusion.name {
                            ops.push(DiffOp::DropExclusion {
                                table: table.clone(),
                                name: name.clone(),
                            });
                        }
                        ops.push(DiffOp::AddExclusion {
                            table: table.clone(),
                            exclusion: desired_exclusion.clone(),
                        });
                    }
                }
                None => ops.push(DiffOp::AddExclusion {
                    table: table.clone(),
                    exclusion: desired_exclusion.clone(),
                }),
            }
        }

        for (index, current_exclusion) in current_exclusions.iter().enumerate() {
            if matched_current.contains(&index) {
                continue;
            }

            match (&current_exclusion.name, config.enable_drop) {
                (Some(name), true) => ops.push(DiffOp::DropExclusion {
                    table: table.clone(),
                    name: name.clone(),
                }),
                _ => debug!(
                    table = %display_qualified_name(table),
                    "skipping exclusion constraint drop"
                ),
            }
        }
    }

    fn compare_indexes(
        &self,
        desired: &ObjectBuckets<'_>,
        current: &ObjectBuckets<'_>,
        config: &DiffConfig,
        ops: &mut Vec<DiffOp>,
    ) {
        for (index_key, desired_index) in &desired.indexes {
            match current.indexes.get(index_key) {
                Some(current_index) => {
                    if !indexes_equivalent(desired_index, current_index) {
                        ops.push(DiffOp::DropIndex {
                            table: current_index.table.clone(),
                            name: index_name_or_default(current_index),
                        });
                        ops.push(DiffOp::AddIndex((*desired_index).clone()));
                    }
                }
                None => ops.push(DiffOp::AddIndex((*desired_index).clone())),
            }
        }

        for (index_key, current_index) in &current.indexes {
            if desired.indexes.contains_key(index_key) {
                continue;
            }
            // DROP TABLE (or view) cascades its indexes; never emit a drop
            // for an index whose owner is going away.
            if !desired.owner_exists(&current_index.table, &config.default_schema) {
                continue;
            }

            if config.enable_drop {
                ops.push(DiffOp::DropIndex {
                    table: current_index.table.clone(),
                    name: index_name_or_default(current_index),
                });
            } else {
                debug!(
                    table = %display_qualified_name(&current_index.table),
                    "skipping index drop (enable_drop=false)"
                );
            }
        }
    }
}

fn map_columns_by_name(columns: &[Column]) -> BTreeMap<IdentKey, &Column> {
    columns
        .iter()
        .map(|column| (column.name.key(), column))
        .collect()
}

fn ident_keys(idents: &[Ident]) -> Vec<IdentKey> {
    idents.iter().map(Ident::key).collect()
}

fn column_changes(desired: &Column, current: &Column) -> Vec<ColumnChange> {
    let mut changes = Vec::new();

    if desired.data_type != current.data_type {
        changes.push(ColumnChange::SetType(desired.data_type.clone()));
    }

    if desired.not_null != current.not_null {
        changes.push(ColumnChange::SetNotNull(desired.not_null));
    }

    // Identity columns own their default through the backing sequence.
    let compare_defaults = desired.identity.is_none() && current.identity.is_none();
    if compare_defaults
        && !optional_exprs_equivalent(desired.default.as_ref(), current.default.as_ref())
    {
        changes.push(ColumnChange::SetDefault(desired.default.clone()));
    }

    changes
}

fn effective_pk_name(table: &QualifiedName, pk: &PrimaryKey) -> Ident {
    pk.name
        .clone()
        .unwrap_or_else(|| Ident::unquoted(format!("{}_pkey", table.name.value)))
}

fn foreign_keys_equivalent(desired: &ForeignKey, current: &ForeignKey, config: &DiffConfig) -> bool {
    ident_keys(&desired.columns) == ident_keys(&current.columns)
        && desired.referenced_table.key_in(&config.default_schema)
            == current.referenced_table.key_in(&config.default_schema)
        && ident_keys(&desired.referenced_columns) == ident_keys(&current.referenced_columns)
        && effective_fk_action(desired.on_delete) == effective_fk_action(current.on_delete)
        && effective_fk_action(desired.on_update) == effective_fk_action(current.on_update)
        && desired.deferrable.unwrap_or(crate::Deferrable::NotDeferrable)
            == current.deferrable.unwrap_or(crate::Deferrable::NotDeferrable)
}

fn effective_fk_action(action: Option<ForeignKeyAction>) -> ForeignKeyAction {
    action.unwrap_or(ForeignKeyAction::NoAction)
}

fn checks_equivalent(desired: &CheckConstraint, current: &CheckConstraint) -> bool {
    desired.no_inherit == current.no_inherit && exprs_equivalent(&desired.expr, &current.expr)
}

fn uniques_equivalent(desired: &UniqueConstraint, current: &UniqueConstraint) -> bool {
    ident_keys(&desired.columns) == ident_keys(&current.columns)
        && desired.deferrable.unwrap_or(crate::Deferrable::NotDeferrable)
            == current.deferrable.unwrap_or(crate::Deferrable::NotDeferrable)
}

fn exclusions_equivalent(desired: &ExclusionConstraint, current: &ExclusionConstraint) -> bool {
    desired.index_method == current.index_method
        && desired.elements.len() == current.elements.len()
        && desired
            .elements
            .iter()
            .zip(&current.elements)
            .all(|(left, right)| {
                left.operator == right.operator && exprs_equivalent(&left.expr, &right.expr)
            })
        && optional_exprs_equivalent(desired.where_clause.as_ref(), current.where_clause.as_ref())
}

fn indexes_equivalent(desired: &IndexDef, current: &IndexDef) -> bool {
    let desired_method = effective_index_method(desired);
    let current_method = effective_index_method(current);

    desired.unique == current.unique
        && desired_method == current_method
        && desired.columns.len() == current.columns.len()
        && desired
            .columns
            .iter()
            .zip(&current.columns)
            .all(|(left, right)| {
                exprs_equivalent(&left.expr, &right.expr)
                    && left.order.unwrap_or(crate::SortOrder::Asc)
                        == right.order.unwrap_or(crate::SortOrder::Asc)
            })
        && optional_exprs_equivalent(desired.where_clause.as_ref(), current.where_clause.as_ref())
        && ident_keys(&desired.include) == ident_keys(&current.include)
}

fn effective_index_method(index: &IndexDef) -> String {
    index
        .method
        .as_deref()
        .unwrap_or("btree")
        .to_ascii_lowercase()
}

fn index_name_or_default(index: &IndexDef) -> Ident {
    index
        .name
        .clone()
        .unwrap_or_else(|| Ident::unquoted(format!("{}_idx", index.table.name.value)))
}

pub(super) fn require_index_name(index: &IndexDef) -> Result<Ident> {
    index.name.clone().ok_or_else(|| {
        PlanError::Incompatible {
            target: display_qualified_name(&index.table),
            operation: "index name is required for diff comparison".to_string(),
        }
        .into()
    })
}
