use std::collections::BTreeMap;

use super::compare::require_index_name;
use crate::{
    Comment, CommentTarget, Extension, IdentKey, IndexDef, MaterializedView, Policy, Privilege,
    QualifiedName, QualifiedNameKey, Result, SchemaDef, SchemaObject, Table, TypeDef, View,
};

/// Top-level objects grouped by kind, keyed for pairing. Unqualified names
/// are resolved against the session default schema before keying so that
/// `t` and `public.t` meet.
#[derive(Debug)]
pub(super) struct ObjectBuckets<'a> {
    pub tables: BTreeMap<QualifiedNameKey, &'a Table>,
    pub views: BTreeMap<QualifiedNameKey, &'a View>,
    pub materialized_views: BTreeMap<QualifiedNameKey, &'a MaterializedView>,
    pub indexes: BTreeMap<(QualifiedNameKey, IdentKey), &'a IndexDef>,
    pub types: BTreeMap<QualifiedNameKey, &'a TypeDef>,
    pub extensions: BTreeMap<IdentKey, &'a Extension>,
    pub schemas: BTreeMap<IdentKey, &'a SchemaDef>,
    pub comments: BTreeMap<CommentKey, &'a Comment>,
    pub privileges: Vec<&'a Privilege>,
    pub policies: BTreeMap<(QualifiedNameKey, IdentKey), &'a Policy>,
}

impl<'a> ObjectBuckets<'a> {
    pub fn from_schema(objects: &'a [SchemaObject], default_schema: &str) -> Result<Self> {
        let mut tables = BTreeMap::new();
        let mut views = BTreeMap::new();
        let mut materialized_views = BTreeMap::new();
        let mut indexes = BTreeMap::new();
        let mut types = BTreeMap::new();
        let mut extensions = BTreeMap::new();
        let mut schemas = BTreeMap::new();
        let mut comments = BTreeMap::new();
        let mut privileges = Vec::new();
        let mut policies = BTreeMap::new();

        for object in objects {
            match object {
                SchemaObject::Table(table) => {
                    tables.insert(table.name.key_in(default_schema), table);
                }
                SchemaObject::View(view) => {
                    views.insert(view.name.key_in(default_schema), view);
                }
                SchemaObject::MaterializedView(view) => {
                    materialized_views.insert(view.name.key_in(default_schema), view);
                }
                SchemaObject::Index(index) => {
                    let name = require_index_name(index)?;
                    indexes.insert((index.table.key_in(default_schema), name.key()), index);
                }
                SchemaObject::Type(type_def) => {
                    types.insert(type_def.name.key_in(default_schema), type_def);
                }
                SchemaObject::Extension(extension) => {
                    extensions.insert(extension.name.key(), extension);
                }
                SchemaObject::Schema(schema) => {
                    schemas.insert(schema.name.key(), schema);
                }
                SchemaObject::Comment(comment) => {
                    comments.insert(CommentKey::new(&comment.target, default_schema), comment);
                }
                SchemaObject::Privilege(privilege) => privileges.push(privilege),
                SchemaObject::Policy(policy) => {
                    policies.insert(
                        (policy.table.key_in(default_schema), policy.name.key()),
                        policy,
                    );
                }
            }
        }

        Ok(Self {
            tables,
            views,
            materialized_views,
            indexes,
            types,
            extensions,
            schemas,
            comments,
            privileges,
            policies,
        })
    }

    /// Whether a relation (table, view, or materialized view) with this
    /// name survives on the desired side.
    pub fn owner_exists(&self, name: &QualifiedName, default_schema: &str) -> bool {
        let key = name.key_in(default_schema);
        self.tables.contains_key(&key)
            || self.views.contains_key(&key)
            || self.materialized_views.contains_key(&key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum CommentKey {
    Table(QualifiedNameKey),
    Column(QualifiedNameKey, IdentKey),
    Index(QualifiedNameKey),
    View(QualifiedNameKey),
    MaterializedView(QualifiedNameKey),
    Type(QualifiedNameKey),
    Extension(IdentKey),
    Schema(IdentKey),
}

impl CommentKey {
    pub fn new(target: &CommentTarget, default_schema: &str) -> Self {
        match target {
            CommentTarget::Table(name) => Self::Table(name.key_in(default_schema)),
            CommentTarget::Column { table, column } => {
                Self::Column(table.key_in(default_schema), column.key())
            }
            CommentTarget::Index(name) => Self::Index(name.key_in(default_schema)),
            CommentTarget::View(name) => Self::View(name.key_in(default_schema)),
            CommentTarget::MaterializedView(name) => {
                Self::MaterializedView(name.key_in(default_schema))
            }
            CommentTarget::Type(name) => Self::Type(name.key_in(default_schema)),
            CommentTarget::Extension(name) => Self::Extension(name.key()),
            CommentTarget::Schema(name) => Self::Schema(name.key()),
        }
    }
}
