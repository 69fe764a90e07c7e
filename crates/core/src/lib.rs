mod adapter;
mod config;
mod dialect;
mod diff;
mod error;
mod executor;
mod ir;
mod orchestrator;
mod ordering;
mod plan;
mod renderer;
mod statement;

pub use adapter::{DatabaseAdapter, TransactionKeywords};
pub use config::{ConnectionConfig, ExportConfig};
pub use dialect::Dialect;
pub use diff::{
    ColumnChange, DiffConfig, DiffEngine, DiffOp, EnumValuePosition, TypeChange, diff_op_tag,
    exprs_equivalent, optional_exprs_equivalent,
};
pub use error::{ApplyError, CatalogError, Error, ParseError, PlanError, Result, SyntaxError};
pub use executor::Executor;
pub use ir::{
    BinaryOperator, CheckConstraint, Column, Comment, CommentTarget, ComparisonOp, DataType,
    Deferrable, ExclusionConstraint, ExclusionElement, Expr, Extension, ForeignKey,
    ForeignKeyAction, GeneratedColumn, Ident, IdentKey, Identity, IndexColumn, IndexDef, IsTest,
    Literal, MaterializedView, NullsOrder, Policy, PolicyCommand, PrimaryKey, Privilege,
    PrivilegeObject, PrivilegeOp, QualifiedName, QualifiedNameKey, SchemaDef, SchemaObject,
    SetQuantifier, SortOrder, SubQuery, Table, TypeDef, UnaryOperator, UniqueConstraint, View,
    display_ident, display_qualified_name,
};
pub use orchestrator::{Mode, Orchestrator, OrchestratorOptions, OrchestratorOutput};
pub use ordering::sort_diff_ops;
pub use plan::{DdlPlan, build_ddl_plan};
pub use renderer::render_plan;
pub use statement::Statement;
