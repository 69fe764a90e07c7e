//! Privilege reconciliation: the symmetric difference of
//! (grantee → privilege set) per object. Revoking a grantee that holds the
//! complete set collapses to `REVOKE ALL PRIVILEGES` before the desired
//! grants are re-issued.

use std::collections::{BTreeMap, BTreeSet};

use super::buckets::ObjectBuckets;
use crate::{
    DiffConfig, DiffOp, Ident, IdentKey, Privilege, PrivilegeObject, PrivilegeOp, QualifiedNameKey,
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ObjectKey {
    Table(QualifiedNameKey),
    Schema(IdentKey),
}

struct GranteeState {
    object: PrivilegeObject,
    grantee: Ident,
    operations: BTreeSet<PrivilegeOp>,
    with_grant_option: bool,
}

pub(super) fn compare_privileges(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) {
    let desired_grants = group_privileges(&desired.privileges, config);
    let current_grants = group_privileges(&current.privileges, config);

    for (group_key, desired_state) in &desired_grants {
        match current_grants.get(group_key) {
            Some(current_state) => {
                reconcile_grantee(desired_state, current_state, ops);
            }
            None => {
                if !desired_state.operations.is_empty() {
                    ops.push(DiffOp::Grant(privilege_from_set(
                        desired_state,
                        &desired_state.operations,
                        desired_state.with_grant_option,
                    )));
                }
            }
        }
    }

    for (group_key, current_state) in &current_grants {
        if desired_grants.contains_key(group_key) {
            continue;
        }
        if !object_survives(&current_state.object, desired, config) {
            continue;
        }
        if !current_state.operations.is_empty() {
            ops.push(DiffOp::Revoke(privilege_from_set(
                current_state,
                &current_state.operations,
                false,
            )));
        }
    }
}

fn reconcile_grantee(desired: &GranteeState, current: &GranteeState, ops: &mut Vec<DiffOp>) {
    let grants: BTreeSet<_> = desired
        .operations
        .difference(&current.operations)
        .copied()
        .collect();
    let revokes: BTreeSet<_> = current
        .operations
        .difference(&desired.operations)
        .copied()
        .collect();
    let option_changed = desired.with_grant_option != current.with_grant_option
        && !desired.operations.is_empty();

    if grants.is_empty() && revokes.is_empty() && !option_changed {
        return;
    }

    let full = full_set(&current.object);
    if (!revokes.is_empty() || option_changed) && current.operations == full {
        // The grantee held everything: one REVOKE ALL, then the desired
        // grants from scratch.
        ops.push(DiffOp::Revoke(privilege_from_set(
            current,
            &BTreeSet::from([PrivilegeOp::All]),
            false,
        )));
        if !desired.operations.is_empty() {
            ops.push(DiffOp::Grant(privilege_from_set(
                desired,
                &desired.operations,
                desired.with_grant_option,
            )));
        }
        return;
    }

    if option_changed {
        if !current.operations.is_empty() {
            ops.push(DiffOp::Revoke(privilege_from_set(
                current,
                &current.operations,
                false,
            )));
        }
        ops.push(DiffOp::Grant(privilege_from_set(
            desired,
            &desired.operations,
            desired.with_grant_option,
        )));
        return;
    }

    if !grants.is_empty() {
        ops.push(DiffOp::Grant(privilege_from_set(
            desired,
            &grants,
            desired.with_grant_option,
        )));
    }
    if !revokes.is_empty() {
        ops.push(DiffOp::Revoke(privilege_from_set(current, &revokes, false)));
    }
}

fn group_privileges<'a>(
    privileges: &[&'a Privilege],
    config: &DiffConfig,
) -> BTreeMap<(ObjectKey, IdentKey), GranteeState> {
    let mut grouped: BTreeMap<(ObjectKey, IdentKey), GranteeState> = BTreeMap::new();

    for privilege in privileges {
        let object_key = object_key(&privilege.on, config);
        let entry = grouped
            .entry((object_key, privilege.grantee.key()))
            .or_insert_with(|| GranteeState {
                object: privilege.on.clone(),
                grantee: privilege.grantee.clone(),
                operations: BTreeSet::new(),
                with_grant_option: false,
            });

        for operation in &privilege.operations {
            if *operation == PrivilegeOp::All {
                entry.operations.extend(full_set(&privilege.on));
            } else {
                entry.operations.insert(*operation);
            }
        }
        entry.with_grant_option |= privilege.with_grant_option;
    }

    grouped
}

fn object_key(object: &PrivilegeObject, config: &DiffConfig) -> ObjectKey {
    match object {
        PrivilegeObject::Table(name) => ObjectKey::Table(name.key_in(&config.default_schema)),
        PrivilegeObject::Schema(name) => ObjectKey::Schema(name.key()),
    }
}

fn full_set(object: &PrivilegeObject) -> BTreeSet<PrivilegeOp> {
    match object {
        PrivilegeObject::Table(_) => PrivilegeOp::TABLE_ALL.into_iter().collect(),
        PrivilegeObject::Schema(_) => BTreeSet::from([PrivilegeOp::Usage, PrivilegeOp::Create]),
    }
}

fn privilege_from_set(
    state: &GranteeState,
    operations: &BTreeSet<PrivilegeOp>,
    with_grant_option: bool,
) -> Privilege {
    let rendered_ops = if *operations == full_set(&state.object) {
        vec![PrivilegeOp::All]
    } else {
        operations.iter().copied().collect()
    };

    Privilege {
        operations: rendered_ops,
        on: state.object.clone(),
        grantee: state.grantee.clone(),
        with_grant_option,
    }
}

fn object_survives(
    object: &PrivilegeObject,
    desired: &ObjectBuckets<'_>,
    config: &DiffConfig,
) -> bool {
    match object {
        PrivilegeObject::Table(name) => desired.owner_exists(name, &config.default_schema),
        PrivilegeObject::Schema(name) => desired.schemas.contains_key(&name.key()),
    }
}
