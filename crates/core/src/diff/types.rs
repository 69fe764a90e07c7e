use crate::{
    CheckConstraint, Column, Comment, CommentTarget, DataType, ExclusionConstraint, Expr,
    Extension, ForeignKey, Ident, IndexDef, MaterializedView, Policy, PrimaryKey, Privilege,
    QualifiedName, SchemaDef, Table, TypeDef, UniqueConstraint, View,
};

/// Differ tuning supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    /// Gates every DROP. When false, extra current-side objects are kept
    /// and reported at debug level only.
    pub enable_drop: bool,
    /// Schema an unqualified name resolves against during pairing.
    pub default_schema: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            enable_drop: false,
            default_schema: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiffOp {
    // --- Table ---
    CreateTable(Table),
    DropTable(QualifiedName),

    // --- Column (scoped to a table) ---
    AddColumn {
        table: QualifiedName,
        column: Box<Column>,
    },
    DropColumn {
        table: QualifiedName,
        column: Ident,
    },
    AlterColumn {
        table: QualifiedName,
        column: Ident,
        changes: Vec<ColumnChange>,
    },

    // --- Primary key ---
    SetPrimaryKey {
        table: QualifiedName,
        pk: PrimaryKey,
    },
    DropPrimaryKey {
        table: QualifiedName,
        name: Ident,
    },

    // --- Index (top-level, owned by a table or materialized view) ---
    AddIndex(IndexDef),
    DropIndex {
        table: QualifiedName,
        name: Ident,
    },

    // --- Constraints (scoped to a table) ---
    AddForeignKey {
        table: QualifiedName,
        fk: ForeignKey,
    },
    DropForeignKey {
        table: QualifiedName,
        name: Ident,
    },
    AddCheck {
        table: QualifiedName,
        check: CheckConstraint,
    },
    DropCheck {
        table: QualifiedName,
        name: Ident,
    },
    AddUnique {
        table: QualifiedName,
        unique: UniqueConstraint,
    },
    DropUnique {
        table: QualifiedName,
        name: Ident,
    },
    AddExclusion {
        table: QualifiedName,
        exclusion: ExclusionConstraint,
    },
    DropExclusion {
        table: QualifiedName,
        name: Ident,
    },

    // --- View ---
    CreateView(View),
    DropView(QualifiedName),
    CreateMaterializedView(MaterializedView),
    DropMaterializedView(QualifiedName),

    // --- Enum type ---
    CreateType(TypeDef),
    DropType(QualifiedName),
    AlterType {
        name: QualifiedName,
        change: TypeChange,
    },

    // --- Extension / schema ---
    CreateExtension(Extension),
    DropExtension(Ident),
    CreateSchema(SchemaDef),
    DropSchema(Ident),

    // --- Comment ---
    SetComment(Comment),
    DropComment {
        target: CommentTarget,
    },

    // --- Privilege ---
    Grant(Privilege),
    Revoke(Privilege),

    // --- Policy (row-level security) ---
    CreatePolicy(Policy),
    DropPolicy {
        name: Ident,
        table: QualifiedName,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChange {
    SetType(DataType),
    SetNotNull(bool),
    SetDefault(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeChange {
    AddValue {
        value: String,
        position: Option<EnumValuePosition>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValuePosition {
    Before(String),
    After(String),
}

pub fn diff_op_tag(op: &DiffOp) -> &'static str {
    match op {
        DiffOp::CreateTable(_) => "CreateTable",
        DiffOp::DropTable(_) => "DropTable",
        DiffOp::AddColumn { .. } => "AddColumn",
        DiffOp::DropColumn { .. } => "DropColumn",
        DiffOp::AlterColumn { .. } => "AlterColumn",
        DiffOp::SetPrimaryKey { .. } => "SetPrimaryKey",
        DiffOp::DropPrimaryKey { .. } => "DropPrimaryKey",
        DiffOp::AddIndex(_) => "AddIndex",
        DiffOp::DropIndex { .. } => "DropIndex",
        DiffOp::AddForeignKey { .. } => "AddForeignKey",
        DiffOp::DropForeignKey { .. } => "DropForeignKey",
        DiffOp::AddCheck { .. } => "AddCheck",
        DiffOp::DropCheck { .. } => "DropCheck",
        DiffOp::AddUnique { .. } => "AddUnique",
        DiffOp::DropUnique { .. } => "DropUnique",
        DiffOp::AddExclusion { .. } => "AddExclusion",
        DiffOp::DropExclusion { .. } => "DropExclusion",
        DiffOp::CreateView(_) => "CreateView",
        DiffOp::DropView(_) => "DropView",
        DiffOp::CreateMaterializedView(_) => "CreateMaterializedView",
        DiffOp::DropMaterializedView(_) => "DropMaterializedView",
        DiffOp::CreateType(_) => "CreateType",
        DiffOp::DropType(_) => "DropType",
        DiffOp::AlterType { .. } => "AlterType",
        DiffOp::CreateExtension(_) => "CreateExtension",
        DiffOp::DropExtension(_) => "DropExtension",
        DiffOp::CreateSchema(_) => "CreateSchema",
        DiffOp::DropSchema(_) => "DropSchema",
        DiffOp::SetComment(_) => "SetComment",
        DiffOp::DropComment { .. } => "DropComment",
        DiffOp::Grant(_) => "Grant",
        DiffOp::Revoke(_) => "Revoke",
        DiffOp::CreatePolicy(_) => "CreatePolicy",
        DiffOp::DropPolicy { .. } => "DropPolicy",
    }
}
