//! Diffing for the non-table object kinds: views, materialized views, enum
//! types, extensions, schemas, comments, and row-level policies.

use tracing::debug;

use super::buckets::ObjectBuckets;
use super::equivalence::optional_exprs_equivalent;
use crate::{
    CommentTarget, DiffConfig, DiffOp, EnumValuePosition, PlanError, Policy, Result, TypeChange,
    TypeDef, display_ident, display_qualified_name,
};

pub(super) fn compare_remaining_objects(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) -> Result<()> {
    compare_schemas(desired, current, ops);
    compare_extensions(desired, current, config, ops);
    compare_types(desired, current, config, ops)?;
    compare_views(desired, current, config, ops);
    compare_materialized_views(desired, current, config, ops);
    compare_policies(desired, current, config, ops);
    compare_comments(desired, current, config, ops);
    Ok(())
}

fn compare_schemas(desired: &ObjectBuckets<'_>, current: &ObjectBuckets<'_>, ops: &mut Vec<DiffOp>) {
    for (schema_key, schema) in &desired.schemas {
        if !current.schemas.contains_key(schema_key) {
            ops.push(DiffOp::CreateSchema((*schema).clone()));
        }
    }

    // Schema drops are never implicit, even with enable_drop; dropping a
    // namespace takes everything under it.
    for (schema_key, schema) in &current.schemas {
        if !desired.schemas.contains_key(schema_key) {
            debug!(schema = %display_ident(&schema.name), "skipping schema drop");
        }
    }
}

fn compare_extensions(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) {
    for (extension_key, extension) in &desired.extensions {
        if !current.extensions.contains_key(extension_key) {
            ops.push(DiffOp::CreateExtension((*extension).clone()));
        }
    }

    for (extension_key, extension) in &current.extensions {
        if desired.extensions.contains_key(extension_key) {
            continue;
        }
        if config.enable_drop {
            ops.push(DiffOp::DropExtension(extension.name.clone()));
        } else {
            debug!(
                extension = %display_ident(&extension.name),
                "skipping extension drop (enable_drop=false)"
            );
        }
    }
}

fn compare_types(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) -> Result<()> {
    for (type_key, desired_type) in &desired.types {
        match current.types.get(type_key) {
            Some(current_type) => {
                for change in enum_label_changes(desired_type, current_type)? {
                    ops.push(DiffOp::AlterType {
                        name: desired_type.name.clone(),
                        change,
                    });
                }
            }
            None => ops.push(DiffOp::CreateType((*desired_type).clone())),
        }
    }

    for (type_key, current_type) in &current.types {
        if desired.types.contains_key(type_key) {
            continue;
        }
        if config.enable_drop {
            ops.push(DiffOp::DropType(current_type.name.clone()));
        } else {
            debug!(
                type_name = %display_qualified_name(&current_type.name),
                "skipping type drop (enable_drop=false)"
            );
        }
    }

    Ok(())
}

/// Enum labels only grow: each desired label missing from the current set
/// becomes an `ADD VALUE`, positioned relative to its desired neighbors.
/// Removals and reorders have no ALTER TYPE spelling and fail the plan.
fn enum_label_changes(desired: &TypeDef, current: &TypeDef) -> Result<Vec<TypeChange>> {
    let current_positions: Vec<&str> = current.labels.iter().map(String::as_str).collect();

    let mut cursor = 0usize;
    for label in &desired.labels {
        if current_positions.get(cursor) == Some(&label.as_str()) {
            cursor += 1;
        }
    }
    if cursor != current_positions.len() {
        return Err(PlanError::Incompatible {
            target: display_qualified_name(&desired.name),
            operation: "enum labels can only be appended or inserted, not removed or reordered"
                .to_string(),
        }
        .into());
    }

    let mut changes = Vec::new();
    for (index, label) in desired.labels.iter().enumerate() {
        if current.labels.iter().any(|existing| existing == label) {
            continue;
        }

        // Additions are emitted in desired order, so an appended label
        // needs no position; only an insertion before a surviving label
        // must say where it lands.
        let position = desired.labels[index + 1..]
            .iter()
            .find(|next| current.labels.contains(next))
            .map(|next| EnumValuePosition::Before(next.clone()));

        changes.push(TypeChange::AddValue {
            value: label.clone(),
            position,
        });
    }

    Ok(changes)
}

fn compare_views(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) {
    for (view_key, desired_view) in &desired.views {
        match current.views.get(view_key) {
            Some(current_view) => {
                if desired_view.query != current_view.query
                    || desired_view.columns != current_view.columns
                {
                    ops.push(DiffOp::DropView(current_view.name.clone()));
                    ops.push(DiffOp::CreateView((*desired_view).clone()));
                }
            }
            None => ops.push(DiffOp::CreateView((*desired_view).clone())),
        }
    }

    for (view_key, current_view) in &current.views {
        if desired.views.contains_key(view_key) {
            continue;
        }
        if config.enable_drop {
            ops.push(DiffOp::DropView(current_view.name.clone()));
        } else {
            debug!(
                view = %display_qualified_name(&current_view.name),
                "skipping view drop (enable_drop=false)"
            );
        }
    }
}

fn compare_materialized_views(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) {
    for (view_key, desired_view) in &desired.materialized_views {
        match current.materialized_views.get(view_key) {
            Some(current_view) => {
                if desired_view.query != current_view.query {
                    ops.push(DiffOp::DropMaterializedView(current_view.name.clone()));
                    ops.push(DiffOp::CreateMaterializedView((*desired_view).clone()));
                }
            }
            None => ops.push(DiffOp::CreateMaterializedView((*desired_view).clone())),
        }
    }

    for (view_key, current_view) in &current.materialized_views {
        if desired.materialized_views.contains_key(view_key) {
            continue;
        }
        if config.enable_drop {
            ops.push(DiffOp::DropMaterializedView(current_view.name.clone()));
        } else {
            debug!(
                materialized_view = %display_qualified_name(&current_view.name),
                "skipping materialized view drop (enable_drop=false)"
            );
        }
    }
}

fn compare_policies(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) {
    for (policy_key, desired_policy) in &desired.policies {
        match current.policies.get(policy_key) {
            Some(current_policy) => {
                if !policies_equivalent(desired_policy, current_policy) {
                    ops.push(DiffOp::DropPolicy {
                        name: current_policy.name.clone(),
                        table: current_policy.table.clone(),
                    });
                    ops.push(DiffOp::CreatePolicy((*desired_policy).clone()));
                }
            }
            None => ops.push(DiffOp::CreatePolicy((*desired_policy).clone())),
        }
    }

    for (policy_key, current_policy) in &current.policies {
        if desired.policies.contains_key(policy_key) {
            continue;
        }
        // Dropping the table drops its policies.
        if !desired.owner_exists(&current_policy.table, &config.default_schema) {
            continue;
        }

        if config.enable_drop {
            ops.push(DiffOp::DropPolicy {
                name: current_policy.name.clone(),
                table: current_policy.table.clone(),
            });
        } else {
            debug!(
                policy = %display_ident(&current_policy.name),
                table = %display_qualified_name(&current_policy.table),
                "skipping policy drop (enable_drop=false)"
            );
        }
    }
}

fn policies_equivalent(desired: &Policy, current: &Policy) -> bool {
    desired.permissive == current.permissive
        && desired.command.unwrap_or(crate::PolicyCommand::All)
            == current.command.unwrap_or(crate::PolicyCommand::All)
        && roles_equivalent(desired, current)
        && optional_exprs_equivalent(desired.using_expr.as_ref(), current.using_expr.as_ref())
        && optional_exprs_equivalent(desired.check_expr.as_ref(), current.check_expr.as_ref())
}

fn roles_equivalent(desired: &Policy, current: &Policy) -> bool {
    let mut desired_roles: Vec<_> = desired.roles.iter().map(crate::Ident::key).collect();
    let mut current_roles: Vec<_> = current.roles.iter().map(crate::Ident::key).collect();
    desired_roles.sort();
    current_roles.sort();
    desired_roles == current_roles
}

fn compare_comments(
    desired: &ObjectBuckets<'_>,
    current: &ObjectBuckets<'_>,
    config: &DiffConfig,
    ops: &mut Vec<DiffOp>,
) {
    for (comment_key, desired_comment) in &desired.comments {
        match current.comments.get(comment_key) {
            Some(current_comment) => {
                if desired_comment.text != current_comment.text {
                    ops.push(DiffOp::SetComment((*desired_comment).clone()));
                }
            }
            None => ops.push(DiffOp::SetComment((*desired_comment).clone())),
        }
    }

    for (comment_key, current_comment) in &current.comments {
        if desired.comments.contains_key(comment_key) {
            continue;
        }
        if !comment_parent_survives(&current_comment.target, desired, config) {
            continue;
        }

        if config.enable_drop {
            ops.push(DiffOp::DropComment {
                target: current_comment.target.clone(),
            });
        } else {
            debug!("skipping comment drop (enable_drop=false)");
        }
    }
}

fn comment_parent_survives(
    target: &CommentTarget,
    desired: &ObjectBuckets<'_>,
    config: &DiffConfig,
) -> bool {
    let default_schema = config.default_schema.as_str();
    match target {
        CommentTarget::Table(name) | CommentTarget::Column { table: name, .. } => desired
            .tables
            .contains_key(&name.key_in(default_schema)),
        CommentTarget::Index(name) => desired
            .indexes
            .keys()
            .any(|(_, index_name)| *index_name == name.name.key()),
        CommentTarget::View(name) => desired.views.contains_key(&name.key_in(default_schema)),
        CommentTarget::MaterializedView(name) => desired
            .materialized_views
            .contains_key(&name.key_in(default_schema)),
        CommentTarget::Type(name) => desired.types.contains_key(&name.key_in(default_schema)),
        CommentTarget::Extension(name) => desired.extensions.contains_key(&name.key()),
        CommentTarget::Schema(name) => desired.schemas.contains_key(&name.key()),
    }
}
