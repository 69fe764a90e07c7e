//! The live-schema reflector and execution transport. Reflection reads
//! catalog tables and rebuilds an equivalent DDL stream; the stream goes
//! through the same parser as user input, so both sides of the diff meet
//! in one IR.

use std::{
    collections::{BTreeMap, VecDeque},
    error::Error as StdError,
    fmt::Write as _,
    sync::Mutex,
    thread,
};

use postgres::{Client, NoTls, Row, types::FromSqlOwned};
use tracing::debug;

use declsql_core::{
    CatalogError, ConnectionConfig, DatabaseAdapter, ExportConfig, Result,
};

use crate::{export_queries, normalize};

const DEFAULT_POSTGRES_HOST: &str = "127.0.0.1";
const DEFAULT_POSTGRES_SCHEMA: &str = "public";

pub(crate) struct PostgresAdapter {
    client: Mutex<Client>,
    connection: ConnectionConfig,
    export: ExportConfig,
    default_schema: String,
}

#[derive(Debug, Clone)]
struct TableRef {
    schema: String,
    name: String,
}

struct ColumnRow {
    name: String,
    data_type: String,
    not_null: bool,
    default_expr: Option<String>,
    identity_generation: Option<String>,
    generated_expr: Option<String>,
    collation: Option<String>,
}

struct ForeignKeyRow {
    constraint_name: String,
    referenced_schema: String,
    referenced_table: String,
    column_name: String,
    referenced_column: String,
    on_update: i8,
    on_delete: i8,
    deferrable: bool,
    initially_deferred: bool,
}

struct PolicyRow {
    name: String,
    permissive: String,
    roles: Vec<String>,
    command: Option<String>,
    using_expr: Option<String>,
    check_expr: Option<String>,
}

struct UniqueRow {
    constraint_name: String,
    column_name: String,
    deferrable: bool,
    initially_deferred: bool,
}

pub(crate) fn connect(
    connection: &ConnectionConfig,
    export: &ExportConfig,
) -> Result<Box<dyn DatabaseAdapter>> {
    let mut client = connect_client(connection)?;

    let server_version = query_scalar(&mut client, export_queries::SHOW_SERVER_VERSION_QUERY)?;
    debug!(%server_version, "connected to postgres");

    let search_path = query_scalar(&mut client, export_queries::SHOW_SEARCH_PATH_QUERY)?;
    let default_schema = parse_search_path(&search_path)
        .into_iter()
        .next()
        .unwrap_or_else(|| DEFAULT_POSTGRES_SCHEMA.to_string());

    Ok(Box::new(PostgresAdapter {
        client: Mutex::new(client),
        connection: connection.clone(),
        export: export.clone(),
        default_schema,
    }))
}

impl DatabaseAdapter for PostgresAdapter {
    fn export_ddls(&mut self) -> Result<String> {
        let mut statements = Vec::new();

        {
            let client = self.client.get_mut().map_err(poisoned_connection)?;
            statements.extend(reflect_schemas(client, &self.export)?);
            statements.extend(reflect_extensions(client)?);
            statements.extend(reflect_enum_types(client, &self.export)?);
        }

        let tables = {
            let client = self.client.get_mut().map_err(poisoned_connection)?;
            fetch_tables(client, &self.export)?
        };
        statements.extend(self.reflect_tables_concurrently(&tables)?);

        {
            let client = self.client.get_mut().map_err(poisoned_connection)?;
            statements.extend(reflect_views(client, &self.export)?);
        }

        Ok(statements.join("\n\n"))
    }

    fn apply(&mut self, sql: &str) -> Result<()> {
        let client = self.client.get_mut().map_err(poisoned_connection)?;
        client
            .batch_execute(sql)
            .map_err(|source| CatalogError::new("statement", sql, source).into())
    }

    fn default_schema(&self) -> String {
        self.default_schema.clone()
    }
}

impl PostgresAdapter {
    /// Steps 1-9 for independent tables run on a bounded worker pool,
    /// each worker on its own connection. Results land in input-order
    /// slots; the first failure cancels the remaining work and wins.
    fn reflect_tables_concurrently(&self, tables: &[TableRef]) -> Result<Vec<String>> {
        if tables.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.export.workers().min(tables.len());
        if workers <= 1 {
            let mut client = self.client.lock().map_err(poisoned_connection)?;
            let mut statements = Vec::with_capacity(tables.len());
            for table in tables {
                statements.push(reflect_table(&mut client, table, &self.export)?);
            }
            return Ok(statements);
        }

        let queue: Mutex<VecDeque<(usize, &TableRef)>> =
            Mutex::new(tables.iter().enumerate().collect());
        let slots: Mutex<Vec<Option<String>>> = Mutex::new(vec![None; tables.len()]);
        let failure: Mutex<Option<declsql_core::Error>> = Mutex::new(None);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    let mut client = match connect_client(&self.connection) {
                        Ok(client) => client,
                        Err(error) => {
                            record_failure(&failure, error);
                            return;
                        }
                    };

                    loop {
                        if failure.lock().map(|guard| guard.is_some()).unwrap_or(true) {
                            return;
                        }
                        let job = queue.lock().ok().and_then(|mut guard| guard.pop_front());
                        let Some((slot, table)) = job else {
                            return;
                        };

                        match reflect_table(&mut client, table, &self.export) {
                            Ok(ddl) => {
                                if let Ok(mut slots) = slots.lock() {
                                    slots[slot] = Some(ddl);
                                }
                            }
                            Err(error) => {
                                record_failure(&failure, error);
                                return;
                            }
                        }
                    }
                });
            }
        });

        if let Ok(mut guard) = failure.lock()
            && let Some(error) = guard.take()
        {
            return Err(error);
        }

        let slots = slots.into_inner().map_err(poisoned_connection)?;
        Ok(slots.into_iter().flatten().collect())
    }
}

fn record_failure(failure: &Mutex<Option<declsql_core::Error>>, error: declsql_core::Error) {
    if let Ok(mut guard) = failure.lock()
        && guard.is_none()
    {
        *guard = Some(error);
    }
}

// --- connection plumbing ---

fn connect_client(config: &ConnectionConfig) -> Result<Client> {
    let mut postgres_config = postgres::Config::new();

    if let Some(socket_path) = &config.socket {
        postgres_config.host_path(socket_path);
    } else if let Some(host) = &config.host {
        postgres_config.host(host);
    } else {
        postgres_config.host(DEFAULT_POSTGRES_HOST);
    }

    if let Some(port) = config.port {
        postgres_config.port(port);
    }
    if let Some(user) = &config.user {
        postgres_config.user(user);
    }
    if let Some(password) = &config.password {
        postgres_config.password(password);
    }
    postgres_config.dbname(&config.database);

    postgres_config
        .connect(NoTls)
        .map_err(|source| CatalogError::new("connection", &config.database, source).into())
}

fn query_scalar(client: &mut Client, sql: &str) -> Result<String> {
    let row = client
        .query_one(sql, &[])
        .map_err(|source| CatalogError::new("setting", sql, source))?;
    row.try_get::<_, String>(0)
        .map_err(|source| CatalogError::new("setting", sql, source).into())
}

pub(crate) fn parse_search_path(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .map(|entry| entry.trim_matches('"').to_string())
        .filter(|entry| {
            !entry.is_empty()
                && !entry.eq_ignore_ascii_case("$user")
                && !entry.to_ascii_lowercase().starts_with("pg_")
        })
        .collect()
}

// --- top-level object reflection ---

fn fetch_tables(client: &mut Client, export: &ExportConfig) -> Result<Vec<TableRef>> {
    let rows = client
        .query(export_queries::TABLE_NAMES_QUERY, &[])
        .map_err(|source| CatalogError::new("table", "list", source))?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        let table = TableRef {
            schema: row_value(row, "table_schema", "table")?,
            name: row_value(row, "table_name", "table")?,
        };
        if schema_in_scope(&table.schema, export) {
            tables.push(table);
        } else {
            debug!(
                schema = %table.schema,
                table = %table.name,
                "skipping table outside target schemas"
            );
        }
    }
    Ok(tables)
}

fn schema_in_scope(schema: &str, export: &ExportConfig) -> bool {
    export.target_schemas.is_empty()
        || export
            .target_schemas
            .iter()
            .any(|target| target.eq_ignore_ascii_case(schema))
}

fn reflect_schemas(client: &mut Client, export: &ExportConfig) -> Result<Vec<String>> {
    let rows = client
        .query(export_queries::SCHEMAS_QUERY, &[])
        .map_err(|source| CatalogError::new("schema", "list", source))?;

    let mut statements = Vec::new();
    for row in &rows {
        let name: String = row_value(row, "schema_name", "schema")?;
        if schema_in_scope(&name, export) {
            statements.push(format!("CREATE SCHEMA {};", quote_identifier(&name)));
        }
    }
    Ok(statements)
}

fn reflect_extensions(client: &mut Client) -> Result<Vec<String>> {
    let rows = client
        .query(export_queries::EXTENSIONS_QUERY, &[])
        .map_err(|source| CatalogError::new("extension", "list", source))?;

    let mut statements = Vec::new();
    for row in &rows {
        let name: String = row_value(row, "extension_name", "extension")?;
        let schema: String = row_value(row, "extension_schema", "extension")?;
        let mut sql = format!("CREATE EXTENSION {}", quote_identifier(&name));
        if schema != DEFAULT_POSTGRES_SCHEMA {
            write!(sql, " WITH SCHEMA {}", quote_identifier(&schema))
                .expect("writing to String should not fail");
        }
        sql.push(';');
        statements.push(sql);
    }
    Ok(statements)
}

fn reflect_enum_types(client: &mut Client, export: &ExportConfig) -> Result<Vec<String>> {
    let rows = client
        .query(export_queries::ENUM_TYPES_QUERY, &[])
        .map_err(|source| CatalogError::new("type", "list", source))?;

    let mut labels_by_type: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    let mut order: Vec<(String, String)> = Vec::new();
    for row in &rows {
        let schema: String = row_value(row, "type_schema", "type")?;
        let name: String = row_value(row, "type_name", "type")?;
        let label: String = row_value(row, "label", "type")?;
        if !schema_in_scope(&schema, export) {
            continue;
        }

        let key = (schema, name);
        if !labels_by_type.contains_key(&key) {
            order.push(key.clone());
        }
        labels_by_type.entry(key).or_default().push(label);
    }

    let mut statements = Vec::new();
    for key in order {
        let labels = &labels_by_type[&key];
        let rendered_labels = labels
            .iter()
            .map(|label| quote_literal(label))
            .collect::<Vec<_>>()
            .join(", ");
        statements.push(format!(
            "CREATE TYPE {} AS ENUM ({rendered_labels});",
            render_qualified(&key.0, &key.1)
        ));
    }
    Ok(statements)
}

fn reflect_views(client: &mut Client, export: &ExportConfig) -> Result<Vec<String>> {
    let rows = client
        .query(export_queries::VIEWS_QUERY, &[])
        .map_err(|source| CatalogError::new("view", "list", source))?;

    let mut statements = Vec::new();
    for row in &rows {
        let schema: String = row_value(row, "view_schema", "view")?;
        let name: String = row_value(row, "view_name", "view")?;
        let definition: String = row_value(row, "definition", "view")?;
        let materialized: bool = row_value(row, "materialized", "view")?;
        let with_data: bool = row_value(row, "with_data", "view")?;
        if !schema_in_scope(&schema, export) {
            continue;
        }

        let definition = definition.trim().trim_end_matches(';');
        let mut sql = format!(
            "CREATE {}VIEW {} AS {definition}",
            if materialized { "MATERIALIZED " } else { "" },
            render_qualified(&schema, &name)
        );
        if materialized && !with_data {
            sql.push_str(" WITH NO DATA");
        }
        sql.push(';');
        statements.push(sql);
    }
    Ok(statements)
}

// --- per-table reconstruction (steps 1-9) ---

fn reflect_table(client: &mut Client, table: &TableRef, export: &ExportConfig) -> Result<String> {
    let qualified = render_qualified(&table.schema, &table.name);
    let mut statements = Vec::new();

    // 1. Columns in attribute order.
    let columns = fetch_columns(client, table)?;

    // 2. Primary key with its constraint name, so the name round-trips.
    let primary_key = fetch_primary_key(client, table)?;

    // 6. Check constraints, textually pre-normalized.
    let checks = fetch_checks(client, table)?;

    // 7. Unique and exclusion constraints.
    let uniques = fetch_uniques(client, table)?;
    let exclusions = fetch_exclusions(client, table)?;

    let mut elements: Vec<String> = columns.iter().map(render_column).collect();
    if let Some((constraint_name, pk_columns)) = &primary_key {
        elements.push(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            quote_identifier(constraint_name),
            pk_columns
                .iter()
                .map(|column| quote_identifier(column))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    for unique in &uniques {
        elements.push(unique.clone());
    }
    for (constraint_name, definition) in &checks {
        elements.push(format!(
            "CONSTRAINT {} {definition}",
            quote_identifier(constraint_name)
        ));
    }
    for (constraint_name, definition) in &exclusions {
        elements.push(format!(
            "CONSTRAINT {} {definition}",
            quote_identifier(constraint_name)
        ));
    }

    let body = elements
        .iter()
        .map(|element| format!("    {element}"))
        .collect::<Vec<_>>()
        .join(",\n");
    statements.push(format!("CREATE TABLE {qualified} (\n{body}\n);"));

    // 4. Foreign keys, grouped from one row per column pair.
    for fk in fetch_foreign_keys(client, table)? {
        statements.push(format!("ALTER TABLE {qualified} ADD {fk};"));
    }

    // 3. Secondary indexes (constraint-backed ones come with their
    // constraints instead).
    for index_def in fetch_indexes(client, table)? {
        statements.push(format!("{index_def};"));
    }

    // 5. Row-level policies.
    statements.extend(fetch_policies(client, table)?);

    // 8. Table and column comments.
    statements.extend(fetch_comments(client, table)?);

    // 9. Privileges for managed roles only.
    if !export.managed_roles.is_empty() {
        statements.extend(fetch_privileges(client, table, export)?);
    }

    Ok(statements.join("\n"))
}

fn fetch_columns(client: &mut Client, table: &TableRef) -> Result<Vec<ColumnRow>> {
    let rows = client
        .query(
            export_queries::TABLE_COLUMNS_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("column", table, source))?;

    rows.iter()
        .map(|row| {
            Ok(ColumnRow {
                name: row_value(row, "column_name", "column")?,
                data_type: row_value(row, "data_type", "column")?,
                not_null: row_value(row, "not_null", "column")?,
                default_expr: row_value(row, "default_expr", "column")?,
                identity_generation: row_value(row, "identity_generation", "column")?,
                generated_expr: row_value(row, "generated_expr", "column")?,
                collation: row_value(row, "collation_name", "column")?,
            })
        })
        .collect()
}

fn render_column(column: &ColumnRow) -> String {
    let mut sql = format!(
        "{} {}",
        quote_identifier(&column.name),
        column.data_type
    );

    if let Some(collation) = column
        .collation
        .as_deref()
        .filter(|value| !value.is_empty())
    {
        write!(sql, " COLLATE {}", quote_identifier(collation))
            .expect("writing to String should not fail");
    }

    if let Some(generated) = column
        .generated_expr
        .as_deref()
        .filter(|value| !value.is_empty())
    {
        write!(sql, " GENERATED ALWAYS AS ({generated}) STORED")
            .expect("writing to String should not fail");
    } else if let Some(identity) = column
        .identity_generation
        .as_deref()
        .filter(|value| !value.is_empty())
    {
        write!(sql, " GENERATED {identity} AS IDENTITY")
            .expect("writing to String should not fail");
    } else if let Some(default_expr) = column
        .default_expr
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        write!(sql, " DEFAULT {default_expr}").expect("writing to String should not fail");
    }

    if column.not_null {
        sql.push_str(" NOT NULL");
    }

    sql
}

fn fetch_primary_key(
    client: &mut Client,
    table: &TableRef,
) -> Result<Option<(String, Vec<String>)>> {
    let rows = client
        .query(
            export_queries::PRIMARY_KEY_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("primary key", table, source))?;

    let mut name = None;
    let mut columns = Vec::new();
    for row in &rows {
        name = Some(row_value::<String>(row, "constraint_name", "primary key")?);
        columns.push(row_value::<String>(row, "column_name", "primary key")?);
    }

    Ok(name.map(|name| (name, columns)))
}

fn fetch_indexes(client: &mut Client, table: &TableRef) -> Result<Vec<String>> {
    let rows = client
        .query(
            export_queries::TABLE_INDEXES_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("index", table, source))?;

    rows.iter()
        .map(|row| row_value::<String>(row, "index_def", "index"))
        .collect()
}

fn fetch_foreign_keys(client: &mut Client, table: &TableRef) -> Result<Vec<String>> {
    let rows = client
        .query(
            export_queries::FOREIGN_KEYS_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("foreign key", table, source))?;

    let decoded = rows
        .iter()
        .map(|row| {
            Ok(ForeignKeyRow {
                constraint_name: row_value(row, "constraint_name", "foreign key")?,
                referenced_schema: row_value(row, "referenced_schema", "foreign key")?,
                referenced_table: row_value(row, "referenced_table", "foreign key")?,
                column_name: row_value(row, "column_name", "foreign key")?,
                referenced_column: row_value(row, "referenced_column", "foreign key")?,
                on_update: row_value(row, "on_update", "foreign key")?,
                on_delete: row_value(row, "on_delete", "foreign key")?,
                deferrable: row_value(row, "deferrable", "foreign key")?,
                initially_deferred: row_value(row, "initially_deferred", "foreign key")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Group rows by constraint, ordinality preserved by the query.
    let mut order: Vec<String> = Vec::new();
    let mut grouped: BTreeMap<String, Vec<&ForeignKeyRow>> = BTreeMap::new();
    for row in &decoded {
        if !grouped.contains_key(&row.constraint_name) {
            order.push(row.constraint_name.clone());
        }
        grouped.entry(row.constraint_name.clone()).or_default().push(row);
    }

    let mut clauses = Vec::new();
    for constraint_name in order {
        let rows = &grouped[&constraint_name];
        let first = rows[0];

        let columns = rows
            .iter()
            .map(|row| quote_identifier(&row.column_name))
            .collect::<Vec<_>>()
            .join(", ");
        let referenced_columns = rows
            .iter()
            .map(|row| quote_identifier(&row.referenced_column))
            .collect::<Vec<_>>()
            .join(", ");

        let mut clause = format!(
            "CONSTRAINT {} FOREIGN KEY ({columns}) REFERENCES {} ({referenced_columns})",
            quote_identifier(&constraint_name),
            render_qualified(&first.referenced_schema, &first.referenced_table)
        );
        if let Some(action) = fk_action_keyword(first.on_update) {
            write!(clause, " ON UPDATE {action}").expect("writing to String should not fail");
        }
        if let Some(action) = fk_action_keyword(first.on_delete) {
            write!(clause, " ON DELETE {action}").expect("writing to String should not fail");
        }
        if first.deferrable {
            clause.push_str(if first.initially_deferred {
                " DEFERRABLE INITIALLY DEFERRED"
            } else {
                " DEFERRABLE INITIALLY IMMEDIATE"
            });
        }

        clauses.push(clause);
    }

    Ok(clauses)
}

/// Catalog action codes: c/n/d/r map to the explicit actions, a is the
/// default NO ACTION and stays implicit.
fn fk_action_keyword(code: i8) -> Option<&'static str> {
    match code as u8 as char {
        'c' => Some("CASCADE"),
        'n' => Some("SET NULL"),
        'd' => Some("SET DEFAULT"),
        'r' => Some("RESTRICT"),
        _ => None,
    }
}

fn fetch_policies(client: &mut Client, table: &TableRef) -> Result<Vec<String>> {
    let rows = client
        .query(
            export_queries::TABLE_POLICIES_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("policy", table, source))?;

    let mut statements = Vec::new();
    for row in &rows {
        let policy = PolicyRow {
            name: row_value(row, "policy_name", "policy")?,
            permissive: row_value(row, "permissive", "policy")?,
            roles: row_value(row, "roles", "policy")?,
            command: row_value(row, "command", "policy")?,
            using_expr: row_value(row, "using_expr", "policy")?,
            check_expr: row_value(row, "check_expr", "policy")?,
        };

        let mut sql = format!(
            "CREATE POLICY {} ON {} AS {}",
            quote_identifier(&policy.name),
            render_qualified(&table.schema, &table.name),
            policy.permissive.to_ascii_uppercase()
        );
        if let Some(command) = policy.command.as_deref().filter(|value| !value.is_empty()) {
            write!(sql, " FOR {command}").expect("writing to String should not fail");
        }
        if !policy.roles.is_empty() {
            let roles = policy
                .roles
                .iter()
                .map(|role| {
                    if role == "public" {
                        "PUBLIC".to_string()
                    } else {
                        quote_identifier(role)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            write!(sql, " TO {roles}").expect("writing to String should not fail");
        }
        if let Some(using_expr) = &policy.using_expr {
            write!(sql, " USING ({using_expr})").expect("writing to String should not fail");
        }
        if let Some(check_expr) = &policy.check_expr {
            write!(sql, " WITH CHECK ({check_expr})").expect("writing to String should not fail");
        }
        sql.push(';');
        statements.push(sql);
    }

    Ok(statements)
}

fn fetch_checks(client: &mut Client, table: &TableRef) -> Result<Vec<(String, String)>> {
    let rows = client
        .query(
            export_queries::CHECK_CONSTRAINTS_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("check constraint", table, source))?;

    rows.iter()
        .map(|row| {
            let name: String = row_value(row, "constraint_name", "check constraint")?;
            let definition: String = row_value(row, "definition", "check constraint")?;
            Ok((name, normalize::pre_normalize_check_text(&definition)))
        })
        .collect()
}

fn fetch_uniques(client: &mut Client, table: &TableRef) -> Result<Vec<String>> {
    let rows = client
        .query(
            export_queries::UNIQUE_CONSTRAINTS_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("unique constraint", table, source))?;

    let decoded = rows
        .iter()
        .map(|row| {
            Ok(UniqueRow {
                constraint_name: row_value(row, "constraint_name", "unique constraint")?,
                column_name: row_value(row, "column_name", "unique constraint")?,
                deferrable: row_value(row, "deferrable", "unique constraint")?,
                initially_deferred: row_value(row, "initially_deferred", "unique constraint")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: BTreeMap<String, (Vec<String>, bool, bool)> = BTreeMap::new();
    for row in decoded {
        if !grouped.contains_key(&row.constraint_name) {
            order.push(row.constraint_name.clone());
        }
        let entry = grouped
            .entry(row.constraint_name.clone())
            .or_insert_with(|| (Vec::new(), row.deferrable, row.initially_deferred));
        entry.0.push(row.column_name);
    }

    let mut clauses = Vec::new();
    for constraint_name in order {
        let (columns, deferrable, initially_deferred) = &grouped[&constraint_name];
        let column_list = columns
            .iter()
            .map(|column| quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut clause = format!(
            "CONSTRAINT {} UNIQUE ({column_list})",
            quote_identifier(&constraint_name)
        );
        if *deferrable {
            clause.push_str(if *initially_deferred {
                " DEFERRABLE INITIALLY DEFERRED"
            } else {
                " DEFERRABLE INITIALLY IMMEDIATE"
            });
        }
        clauses.push(clause);
    }

    Ok(clauses)
}

fn fetch_exclusions(client: &mut Client, table: &TableRef) -> Result<Vec<(String, String)>> {
    let rows = client
        .query(
            export_queries::EXCLUSION_CONSTRAINTS_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("exclusion constraint", table, source))?;

    rows.iter()
        .map(|row| {
            let name: String = row_value(row, "constraint_name", "exclusion constraint")?;
            let definition: String = row_value(row, "definition", "exclusion constraint")?;
            Ok((name, definition))
        })
        .collect()
}

fn fetch_comments(client: &mut Client, table: &TableRef) -> Result<Vec<String>> {
    let qualified = render_qualified(&table.schema, &table.name);
    let mut statements = Vec::new();

    let row = client
        .query_one(
            export_queries::TABLE_COMMENT_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("comment", table, source))?;
    if let Some(comment) = row
        .try_get::<_, Option<String>>("comment")
        .map_err(|source| table_error("comment", table, source))?
    {
        statements.push(format!(
            "COMMENT ON TABLE {qualified} IS {};",
            quote_literal(&comment)
        ));
    }

    let rows = client
        .query(
            export_queries::COLUMN_COMMENTS_QUERY,
            &[&table.schema, &table.name],
        )
        .map_err(|source| table_error("column comment", table, source))?;
    for row in &rows {
        let column: String = row_value(row, "column_name", "column comment")?;
        let comment: Option<String> = row_value(row, "comment", "column comment")?;
        if let Some(comment) = comment {
            statements.push(format!(
                "COMMENT ON COLUMN {qualified}.{} IS {};",
                quote_identifier(&column),
                quote_literal(&comment)
            ));
        }
    }

    Ok(statements)
}

fn fetch_privileges(
    client: &mut Client,
    table: &TableRef,
    export: &ExportConfig,
) -> Result<Vec<String>> {
    let qualified = render_qualified(&table.schema, &table.name);
    let rows = client
        .query(
            export_queries::TABLE_PRIVILEGES_QUERY,
            &[&table.schema, &table.name, &export.managed_roles],
        )
        .map_err(|source| table_error("privilege", table, source))?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in &rows {
        let grantee: String = row_value(row, "grantee", "privilege")?;
        let privilege: String = row_value(row, "privilege_type", "privilege")?;
        if !grouped.contains_key(&grantee) {
            order.push(grantee.clone());
        }
        grouped.entry(grantee).or_default().push(privilege);
    }

    const TABLE_ALL: [&str; 7] = [
        "SELECT",
        "INSERT",
        "UPDATE",
        "DELETE",
        "TRUNCATE",
        "REFERENCES",
        "TRIGGER",
    ];

    let mut statements = Vec::new();
    for grantee in order {
        let privileges = &grouped[&grantee];
        let holds_all = TABLE_ALL
            .iter()
            .all(|privilege| privileges.iter().any(|held| held == privilege));

        let rendered = if holds_all {
            "ALL PRIVILEGES".to_string()
        } else {
            privileges.join(", ")
        };
        statements.push(format!(
            "GRANT {rendered} ON TABLE {qualified} TO {};",
            quote_identifier(&grantee)
        ));
    }

    Ok(statements)
}

// --- helpers ---

fn render_qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(name))
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn table_error<E>(entity_kind: &'static str, table: &TableRef, source: E) -> declsql_core::Error
where
    E: StdError + Send + Sync + 'static,
{
    CatalogError::new(
        entity_kind,
        format!("{}.{}", table.schema, table.name),
        source,
    )
    .into()
}

fn row_value<T>(row: &Row, column: &str, entity_kind: &'static str) -> Result<T>
where
    T: FromSqlOwned,
{
    row.try_get(column)
        .map_err(|source| CatalogError::new(entity_kind, column, source).into())
}

fn poisoned_connection<T>(_: T) -> CatalogError {
    CatalogError::new(
        "connection",
        "client",
        std::io::Error::other("postgres connection state was poisoned"),
    )
}
