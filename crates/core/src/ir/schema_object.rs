use std::collections::BTreeMap;

use super::{DataType, Expr, Ident, QualifiedName};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaObject {
    Table(Table),
    View(View),
    MaterializedView(MaterializedView),
    Index(IndexDef),
    Type(TypeDef),
    Extension(Extension),
    Schema(SchemaDef),
    Comment(Comment),
    Privilege(Privilege),
    Policy(Policy),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: QualifiedName,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
    pub checks: Vec<CheckConstraint>,
    pub uniques: Vec<UniqueConstraint>,
    pub exclusions: Vec<ExclusionConstraint>,
    pub options: BTreeMap<String, String>,
}

impl Table {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: QualifiedName::unqualified(name),
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            uniques: Vec::new(),
            exclusions: Vec::new(),
            options: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: Ident,
    pub data_type: DataType,
    pub not_null: bool,
    pub default: Option<Expr>,
    pub identity: Option<Identity>,
    pub generated: Option<GeneratedColumn>,
    pub comment: Option<String>,
    pub collation: Option<String>,
}

impl Column {
    pub fn new(name: Ident, data_type: DataType) -> Self {
        Self {
            name,
            data_type,
            not_null: false,
            default: None,
            identity: None,
            generated: None,
            comment: None,
            collation: None,
        }
    }
}

/// `GENERATED { ALWAYS | BY DEFAULT } AS IDENTITY`. An identity column is
/// always NOT NULL; parsers set both flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub always: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedColumn {
    pub expr: Expr,
    pub stored: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryKey {
    pub name: Option<Ident>,
    pub columns: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub name: Option<Ident>,
    pub columns: Vec<Ident>,
    pub referenced_table: QualifiedName,
    pub referenced_columns: Vec<Ident>,
    pub on_delete: Option<ForeignKeyAction>,
    pub on_update: Option<ForeignKeyAction>,
    pub deferrable: Option<Deferrable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueConstraint {
    pub name: Option<Ident>,
    pub columns: Vec<Ident>,
    pub deferrable: Option<Deferrable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckConstraint {
    pub name: Option<Ident>,
    pub expr: Expr,
    pub no_inherit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionConstraint {
    pub name: Option<Ident>,
    pub index_method: String,
    pub elements: Vec<ExclusionElement>,
    pub where_clause: Option<Expr>,
    pub deferrable: Option<Deferrable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExclusionElement {
    pub expr: Expr,
    pub operator: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferrable {
    Deferrable { initially_deferred: bool },
    NotDeferrable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub name: QualifiedName,
    pub columns: Vec<Ident>,
    pub query: String,
}

impl View {
    pub fn new(name: QualifiedName, query: impl Into<String>) -> Self {
        Self {
            name,
            columns: Vec::new(),
            query: query.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedView {
    pub name: QualifiedName,
    pub query: String,
    pub with_data: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    pub name: Option<Ident>,
    pub table: QualifiedName,
    pub columns: Vec<IndexColumn>,
    pub unique: bool,
    pub method: Option<String>,
    pub where_clause: Option<Expr>,
    pub include: Vec<Ident>,
    pub concurrent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub expr: Expr,
    pub order: Option<SortOrder>,
    pub nulls: Option<NullsOrder>,
}

impl IndexColumn {
    pub fn plain(expr: Expr) -> Self {
        Self {
            expr,
            order: None,
            nulls: None,
        }
    }
}

/// Enum types only; other `CREATE TYPE` flavors are out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: QualifiedName,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: Ident,
    pub schema: Option<Ident>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDef {
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub target: CommentTarget,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    Table(QualifiedName),
    Column { table: QualifiedName, column: Ident },
    Index(QualifiedName),
    View(QualifiedName),
    MaterializedView(QualifiedName),
    Type(QualifiedName),
    Extension(Ident),
    Schema(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Privilege {
    pub operations: Vec<PrivilegeOp>,
    pub on: PrivilegeObject,
    pub grantee: Ident,
    pub with_grant_option: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivilegeOp {
    Select,
    Insert,
    Update,
    Delete,
    Truncate,
    References,
    Trigger,
    Usage,
    Create,
    All,
}

impl PrivilegeOp {
    /// The full per-table privilege set; a grantee holding exactly this set
    /// is rendered as `ALL PRIVILEGES`.
    pub const TABLE_ALL: [PrivilegeOp; 7] = [
        PrivilegeOp::Select,
        PrivilegeOp::Insert,
        PrivilegeOp::Update,
        PrivilegeOp::Delete,
        PrivilegeOp::Truncate,
        PrivilegeOp::References,
        PrivilegeOp::Trigger,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegeObject {
    Table(QualifiedName),
    Schema(Ident),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub name: Ident,
    pub table: QualifiedName,
    pub permissive: bool,
    pub command: Option<PolicyCommand>,
    pub roles: Vec<Ident>,
    pub using_expr: Option<Expr>,
    pub check_expr: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCommand {
    All,
    Select,
    Insert,
    Update,
    Delete,
}
