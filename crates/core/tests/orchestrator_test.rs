use std::sync::{Arc, Mutex};

use declsql_core::{
    ConnectionConfig, DatabaseAdapter, Dialect, DiffOp, ExportConfig, Ident, Mode, Orchestrator,
    OrchestratorOptions, OrchestratorOutput, Result, SchemaObject, Statement, Table, View,
    diff_op_tag,
};

/// A toy dialect over a line-based format: `table NAME` and
/// `view NAME query...`. Enough surface to drive the orchestrator without
/// a database.
struct LineDialect {
    exported: String,
    applied: Arc<Mutex<Vec<String>>>,
}

struct LineAdapter {
    exported: String,
    applied: Arc<Mutex<Vec<String>>>,
}

impl DatabaseAdapter for LineAdapter {
    fn export_ddls(&mut self) -> Result<String> {
        Ok(self.exported.clone())
    }

    fn apply(&mut self, sql: &str) -> Result<()> {
        self.applied
            .lock()
            .expect("lock should not be poisoned")
            .push(sql.to_string());
        Ok(())
    }

    fn default_schema(&self) -> String {
        "public".to_string()
    }
}

impl Dialect for LineDialect {
    fn name(&self) -> &str {
        "line"
    }

    fn parse(&self, sql: &str) -> Result<Vec<SchemaObject>> {
        let mut objects = Vec::new();
        for line in sql.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix("table ") {
                objects.push(SchemaObject::Table(Table::named(name.trim())));
            } else if let Some(rest) = line.strip_prefix("view ") {
                let (name, query) = rest.split_once(' ').unwrap_or((rest, "select 1"));
                objects.push(SchemaObject::View(View::new(
                    declsql_core::QualifiedName {
                        schema: None,
                        name: Ident::unquoted(name),
                    },
                    query,
                )));
            }
        }
        Ok(objects)
    }

    fn generate_ddl(&self, ops: &[DiffOp]) -> Result<Vec<Statement>> {
        Ok(ops
            .iter()
            .map(|op| Statement::transactional(diff_op_tag(op)))
            .collect())
    }

    fn to_sql(&self, obj: &SchemaObject) -> Result<String> {
        Ok(match obj {
            SchemaObject::Table(table) => format!("table {}", table.name.name.value),
            SchemaObject::View(view) => format!("view {}", view.name.name.value),
            other => format!("{other:?}"),
        })
    }

    fn quote_ident(&self, ident: &Ident) -> String {
        ident.value.clone()
    }

    fn connect(
        &self,
        _config: &ConnectionConfig,
        _export: &ExportConfig,
    ) -> Result<Box<dyn DatabaseAdapter>> {
        Ok(Box::new(LineAdapter {
            exported: self.exported.clone(),
            applied: self.applied.clone(),
        }))
    }
}

fn options(mode: Mode) -> OrchestratorOptions {
    OrchestratorOptions {
        mode,
        enable_drop: false,
        skip_views: false,
        skip_extensions: false,
    }
}

fn run(dialect: &LineDialect, desired: &str, mode: Mode) -> OrchestratorOutput {
    Orchestrator::new(dialect)
        .run(
            &ConnectionConfig::default(),
            &ExportConfig::default(),
            desired,
            options(mode),
        )
        .expect("orchestrator run should succeed")
}

#[test]
fn identical_schemas_apply_nothing() {
    let dialect = LineDialect {
        exported: "table users\n".to_string(),
        applied: Arc::new(Mutex::new(Vec::new())),
    };

    let output = run(&dialect, "table users\n", Mode::Apply);
    assert_eq!(output, OrchestratorOutput::Applied(0));
    assert!(dialect.applied.lock().expect("lock").is_empty());
}

#[test]
fn dry_run_renders_without_applying() {
    let dialect = LineDialect {
        exported: String::new(),
        applied: Arc::new(Mutex::new(Vec::new())),
    };

    let output = run(&dialect, "table users\n", Mode::DryRun);
    assert_eq!(
        output,
        OrchestratorOutput::DryRunSql("CreateTable;\n".to_string())
    );
    assert!(dialect.applied.lock().expect("lock").is_empty());
}

#[test]
fn apply_executes_the_plan_inside_a_transaction() {
    let dialect = LineDialect {
        exported: String::new(),
        applied: Arc::new(Mutex::new(Vec::new())),
    };

    let output = run(&dialect, "table users\n", Mode::Apply);
    assert_eq!(output, OrchestratorOutput::Applied(1));
    assert_eq!(
        *dialect.applied.lock().expect("lock"),
        vec![
            "BEGIN".to_string(),
            "CreateTable".to_string(),
            "COMMIT".to_string(),
        ]
    );
}

#[test]
fn export_mode_round_trips_through_parse_and_to_sql() {
    let dialect = LineDialect {
        exported: "table users\nview v select 1\n".to_string(),
        applied: Arc::new(Mutex::new(Vec::new())),
    };

    let output = run(&dialect, "", Mode::Export);
    assert_eq!(
        output,
        OrchestratorOutput::ExportSql("table users\nview v\n".to_string())
    );
}

#[test]
fn skip_views_filters_both_sides() {
    let dialect = LineDialect {
        exported: "table users\nview stale select 1\n".to_string(),
        applied: Arc::new(Mutex::new(Vec::new())),
    };

    let output = Orchestrator::new(&dialect)
        .run(
            &ConnectionConfig::default(),
            &ExportConfig::default(),
            "table users\nview fresh select 2\n",
            OrchestratorOptions {
                mode: Mode::DryRun,
                enable_drop: true,
                skip_views: true,
                skip_extensions: false,
            },
        )
        .expect("orchestrator run should succeed");

    assert_eq!(output, OrchestratorOutput::DryRunSql(String::new()));
}
