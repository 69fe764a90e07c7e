//! Catalog queries backing the reflector. Every query filters out
//! `pg_catalog`/`information_schema`, extension-owned objects
//! (`pg_depend.deptype = 'e'`), and partition children where relevant,
//! and orders its rows so reflection output is deterministic.

pub(crate) const SHOW_SERVER_VERSION_QUERY: &str = "SHOW server_version";
pub(crate) const SHOW_SEARCH_PATH_QUERY: &str = "SHOW search_path";

pub(crate) const TABLE_NAMES_QUERY: &str = r#"
SELECT
  n.nspname AS table_schema,
  c.relname AS table_name
FROM pg_catalog.pg_class c
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog')
  AND c.relkind = 'r'
  AND c.relpersistence = 'p'
  AND c.relispartition = false
  AND NOT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_depend d
    WHERE c.oid = d.objid
      AND d.classid = 'pg_catalog.pg_class'::regclass
      AND d.deptype = 'e'
  )
ORDER BY n.nspname ASC, c.relname ASC;
"#;

pub(crate) const TABLE_COLUMNS_QUERY: &str = r#"
SELECT
  a.attname AS column_name,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
  a.attnotnull AS not_null,
  pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) AS default_expr,
  CASE a.attidentity
    WHEN 'a' THEN 'ALWAYS'
    WHEN 'd' THEN 'BY DEFAULT'
    ELSE NULL
  END AS identity_generation,
  CASE WHEN a.attgenerated = 's'
    THEN pg_catalog.pg_get_expr(ad.adbin, ad.adrelid)
    ELSE NULL
  END AS generated_expr,
  co.collname AS collation_name
FROM pg_catalog.pg_attribute a
INNER JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = a.attrelid AND ad.adnum = a.attnum
LEFT JOIN pg_catalog.pg_collation co
  ON co.oid = a.attcollation AND co.collname <> 'default'
WHERE n.nspname = $1
  AND c.relname = $2
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY a.attnum ASC;
"#;

pub(crate) const PRIMARY_KEY_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  a.attname AS column_name
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class c ON con.conrelid = c.oid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
CROSS JOIN LATERAL UNNEST(con.conkey) WITH ORDINALITY AS cols(attnum, ord)
INNER JOIN pg_catalog.pg_attribute a
  ON a.attrelid = c.oid AND a.attnum = cols.attnum
WHERE n.nspname = $1
  AND c.relname = $2
  AND con.contype = 'p'
ORDER BY cols.ord ASC;
"#;

/// Secondary indexes only: anything backing a primary-key, unique, or
/// exclusion constraint is reflected with its constraint instead.
pub(crate) const TABLE_INDEXES_QUERY: &str = r#"
SELECT
  ci.relname AS index_name,
  pg_catalog.pg_get_indexdef(i.indexrelid) AS index_def
FROM pg_catalog.pg_index i
INNER JOIN pg_catalog.pg_class ci ON ci.oid = i.indexrelid
INNER JOIN pg_catalog.pg_class ct ON ct.oid = i.indrelid
INNER JOIN pg_catalog.pg_namespace n ON ct.relnamespace = n.oid
WHERE n.nspname = $1
  AND ct.relname = $2
  AND NOT i.indisprimary
  AND NOT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_constraint con
    WHERE con.conindid = i.indexrelid
  )
ORDER BY ci.relname ASC;
"#;

/// One row per column pair, ordinality preserved so composite keys keep
/// their column order.
pub(crate) const FOREIGN_KEYS_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  fn.nspname AS referenced_schema,
  fc.relname AS referenced_table,
  a.attname AS column_name,
  fa.attname AS referenced_column,
  con.confupdtype AS on_update,
  con.confdeltype AS on_delete,
  con.condeferrable AS deferrable,
  con.condeferred AS initially_deferred
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class c ON con.conrelid = c.oid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
INNER JOIN pg_catalog.pg_class fc ON con.confrelid = fc.oid
INNER JOIN pg_catalog.pg_namespace fn ON fc.relnamespace = fn.oid
CROSS JOIN LATERAL UNNEST(con.conkey, con.confkey)
  WITH ORDINALITY AS cols(attnum, fattnum, ord)
INNER JOIN pg_catalog.pg_attribute a
  ON a.attrelid = c.oid AND a.attnum = cols.attnum
INNER JOIN pg_catalog.pg_attribute fa
  ON fa.attrelid = fc.oid AND fa.attnum = cols.fattnum
WHERE n.nspname = $1
  AND c.relname = $2
  AND con.contype = 'f'
ORDER BY con.conname ASC, cols.ord ASC;
"#;

pub(crate) const TABLE_POLICIES_QUERY: &str = r#"
SELECT
  p.policyname AS policy_name,
  p.permissive AS permissive,
  p.roles::text[] AS roles,
  p.cmd AS command,
  p.qual AS using_expr,
  p.with_check AS check_expr
FROM pg_catalog.pg_policies p
WHERE p.schemaname = $1
  AND p.tablename = $2
ORDER BY p.policyname ASC;
"#;

pub(crate) const CHECK_CONSTRAINTS_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  pg_catalog.pg_get_constraintdef(con.oid) AS definition
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class c ON con.conrelid = c.oid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
WHERE n.nspname = $1
  AND c.relname = $2
  AND con.contype = 'c'
ORDER BY con.conname ASC;
"#;

pub(crate) const UNIQUE_CONSTRAINTS_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  a.attname AS column_name,
  con.condeferrable AS deferrable,
  con.condeferred AS initially_deferred
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class c ON con.conrelid = c.oid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
CROSS JOIN LATERAL UNNEST(con.conkey) WITH ORDINALITY AS cols(attnum, ord)
INNER JOIN pg_catalog.pg_attribute a
  ON a.attrelid = c.oid AND a.attnum = cols.attnum
WHERE n.nspname = $1
  AND c.relname = $2
  AND con.contype = 'u'
ORDER BY con.conname ASC, cols.ord ASC;
"#;

pub(crate) const EXCLUSION_CONSTRAINTS_QUERY: &str = r#"
SELECT
  con.conname AS constraint_name,
  pg_catalog.pg_get_constraintdef(con.oid) AS definition
FROM pg_catalog.pg_constraint con
INNER JOIN pg_catalog.pg_class c ON con.conrelid = c.oid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
WHERE n.nspname = $1
  AND c.relname = $2
  AND con.contype = 'x'
ORDER BY con.conname ASC;
"#;

pub(crate) const TABLE_COMMENT_QUERY: &str = r#"
SELECT pg_catalog.obj_description(c.oid, 'pg_class') AS comment
FROM pg_catalog.pg_class c
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
WHERE n.nspname = $1
  AND c.relname = $2;
"#;

pub(crate) const COLUMN_COMMENTS_QUERY: &str = r#"
SELECT
  a.attname AS column_name,
  pg_catalog.col_description(c.oid, a.attnum) AS comment
FROM pg_catalog.pg_attribute a
INNER JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
WHERE n.nspname = $1
  AND c.relname = $2
  AND a.attnum > 0
  AND NOT a.attisdropped
  AND pg_catalog.col_description(c.oid, a.attnum) IS NOT NULL
ORDER BY a.attnum ASC;
"#;

/// Grants for managed roles only; the owner's implicit privileges are
/// never reported.
pub(crate) const TABLE_PRIVILEGES_QUERY: &str = r#"
SELECT
  grantee.rolname::text AS grantee,
  acl.privilege_type AS privilege_type,
  acl.is_grantable AS is_grantable
FROM pg_catalog.pg_class c
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
CROSS JOIN LATERAL pg_catalog.aclexplode(
  COALESCE(c.relacl, pg_catalog.acldefault('r', c.relowner))
) AS acl
INNER JOIN pg_catalog.pg_roles grantee ON grantee.oid = acl.grantee
WHERE n.nspname = $1
  AND c.relname = $2
  AND acl.grantee <> c.relowner
  AND grantee.rolname::text = ANY($3)
ORDER BY grantee.rolname ASC, acl.privilege_type ASC;
"#;

pub(crate) const ENUM_TYPES_QUERY: &str = r#"
SELECT
  n.nspname AS type_schema,
  t.typname AS type_name,
  e.enumlabel AS label
FROM pg_catalog.pg_type t
INNER JOIN pg_catalog.pg_enum e ON t.oid = e.enumtypid
INNER JOIN pg_catalog.pg_namespace n ON t.typnamespace = n.oid
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog')
  AND NOT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_depend d
    WHERE t.oid = d.objid
      AND d.classid = 'pg_catalog.pg_type'::regclass
      AND d.deptype = 'e'
  )
ORDER BY n.nspname ASC, t.typname ASC, e.enumsortorder ASC;
"#;

pub(crate) const VIEWS_QUERY: &str = r#"
SELECT
  n.nspname AS view_schema,
  c.relname AS view_name,
  pg_catalog.pg_get_viewdef(c.oid) AS definition,
  c.relkind = 'm' AS materialized,
  c.relkind <> 'm' OR c.relispopulated AS with_data
FROM pg_catalog.pg_class c
INNER JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog')
  AND c.relkind IN ('v', 'm')
  AND NOT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_depend d
    WHERE c.oid = d.objid
      AND d.classid = 'pg_catalog.pg_class'::regclass
      AND d.deptype = 'e'
  )
ORDER BY n.nspname ASC, c.relname ASC;
"#;

pub(crate) const EXTENSIONS_QUERY: &str = r#"
SELECT
  e.extname AS extension_name,
  n.nspname AS extension_schema
FROM pg_catalog.pg_extension e
INNER JOIN pg_catalog.pg_namespace n ON e.extnamespace = n.oid
WHERE e.extname <> 'plpgsql'
ORDER BY e.extname ASC;
"#;

pub(crate) const SCHEMAS_QUERY: &str = r#"
SELECT n.nspname AS schema_name
FROM pg_catalog.pg_namespace n
WHERE n.nspname NOT IN ('information_schema', 'pg_catalog', 'public')
  AND n.nspname NOT LIKE 'pg\_%'
ORDER BY n.nspname ASC;
"#;
