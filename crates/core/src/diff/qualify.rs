//! Schema resolution for emitted ops. Pairing keys already resolve a
//! missing schema against the session default; the op batch must carry
//! the same resolution so rendered DDL always spells the full
//! `"schema"."name"` even when the desired DDL wrote the bare name.

use crate::{CommentTarget, DiffOp, Ident, PrivilegeObject, QualifiedName, Table};

pub(super) fn qualify_ops(ops: &mut [DiffOp], default_schema: &str) {
    for op in ops {
        qualify_op(op, default_schema);
    }
}

fn qualify_op(op: &mut DiffOp, default_schema: &str) {
    match op {
        DiffOp::CreateTable(table) => qualify_table(table, default_schema),
        DiffOp::DropTable(name) => qualify(name, default_schema),
        DiffOp::AddColumn { table, .. }
        | DiffOp::DropColumn { table, .. }
        | DiffOp::AlterColumn { table, .. }
        | DiffOp::SetPrimaryKey { table, .. }
        | DiffOp::DropPrimaryKey { table, .. }
        | DiffOp::DropIndex { table, .. }
        | DiffOp::DropForeignKey { table, .. }
        | DiffOp::AddCheck { table, .. }
        | DiffOp::DropCheck { table, .. }
        | DiffOp::AddUnique { table, .. }
        | DiffOp::DropUnique { table, .. }
        | DiffOp::AddExclusion { table, .. }
        | DiffOp::DropExclusion { table, .. }
        | DiffOp::DropPolicy { table, .. } => qualify(table, default_schema),
        DiffOp::AddIndex(index) => qualify(&mut index.table, default_schema),
        DiffOp::AddForeignKey { table, fk } => {
            qualify(table, default_schema);
            qualify(&mut fk.referenced_table, default_schema);
        }
        DiffOp::CreateView(view) => qualify(&mut view.name, default_schema),
        DiffOp::DropView(name) | DiffOp::DropMaterializedView(name) => {
            qualify(name, default_schema);
        }
        DiffOp::CreateMaterializedView(view) => qualify(&mut view.name, default_schema),
        DiffOp::CreateType(ty) => qualify(&mut ty.name, default_schema),
        DiffOp::DropType(name) | DiffOp::AlterType { name, .. } => {
            qualify(name, default_schema);
        }
        DiffOp::CreateExtension(_)
        | DiffOp::DropExtension(_)
        | DiffOp::CreateSchema(_)
        | DiffOp::DropSchema(_) => {}
        DiffOp::SetComment(comment) => qualify_comment_target(&mut comment.target, default_schema),
        DiffOp::DropComment { target } => qualify_comment_target(target, default_schema),
        DiffOp::Grant(privilege) | DiffOp::Revoke(privilege) => {
            if let PrivilegeObject::Table(name) = &mut privilege.on {
                qualify(name, default_schema);
            }
        }
        DiffOp::CreatePolicy(policy) => qualify(&mut policy.table, default_schema),
    }
}

fn qualify_table(table: &mut Table, default_schema: &str) {
    qualify(&mut table.name, default_schema);
    for fk in &mut table.foreign_keys {
        qualify(&mut fk.referenced_table, default_schema);
    }
}

fn qualify_comment_target(target: &mut CommentTarget, default_schema: &str) {
    match target {
        CommentTarget::Table(name)
        | CommentTarget::Column { table: name, .. }
        | CommentTarget::Index(name)
        | CommentTarget::View(name)
        | CommentTarget::MaterializedView(name)
        | CommentTarget::Type(name) => qualify(name, default_schema),
        CommentTarget::Extension(_) | CommentTarget::Schema(_) => {}
    }
}

fn qualify(name: &mut QualifiedName, default_schema: &str) {
    if name.schema.is_none() {
        name.schema = Some(Ident::unquoted(default_schema));
    }
}
