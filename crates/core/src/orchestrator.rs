use tracing::debug;

use crate::{
    ConnectionConfig, DiffConfig, DiffEngine, Dialect, ExportConfig, Executor, Result,
    SchemaObject, build_ddl_plan, renderer::render_plan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Apply,
    DryRun,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub mode: Mode,
    pub enable_drop: bool,
    pub skip_views: bool,
    pub skip_extensions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorOutput {
    /// The plan was applied; carries the number of statements executed.
    Applied(usize),
    DryRunSql(String),
    ExportSql(String),
}

/// Drives one reconciliation run: connect, reflect, parse both sides,
/// diff, order, render, and apply (or print).
pub struct Orchestrator<'a> {
    dialect: &'a dyn Dialect,
    diff_engine: DiffEngine,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            diff_engine: DiffEngine::new(),
        }
    }

    pub fn run(
        &self,
        connection: &ConnectionConfig,
        export: &ExportConfig,
        desired_sql: &str,
        options: OrchestratorOptions,
    ) -> Result<OrchestratorOutput> {
        let mut adapter = self.dialect.connect(connection, export)?;
        let current_sql = adapter.export_ddls()?;

        if options.mode == Mode::Export {
            let objects = self.dialect.parse(&current_sql)?;
            return Ok(OrchestratorOutput::ExportSql(self.render_export(&objects)?));
        }

        let current = self.filter_objects(self.dialect.parse(&current_sql)?, options);
        let desired = self.filter_objects(self.dialect.parse(desired_sql)?, options);

        let diff_config = DiffConfig {
            enable_drop: options.enable_drop,
            default_schema: adapter.default_schema(),
        };
        let ops = self.diff_engine.diff(&desired, &current, &diff_config)?;
        let plan = build_ddl_plan(ops);
        let statements = self.dialect.generate_ddl(plan.ops())?;

        match options.mode {
            Mode::Apply => {
                let mut executor = Executor::new(adapter.as_mut());
                executor.execute_plan(&statements)?;
                Ok(OrchestratorOutput::Applied(statements.len()))
            }
            Mode::DryRun => Ok(OrchestratorOutput::DryRunSql(render_plan(&statements))),
            Mode::Export => unreachable!("export handled above"),
        }
    }

    fn filter_objects(
        &self,
        objects: Vec<SchemaObject>,
        options: OrchestratorOptions,
    ) -> Vec<SchemaObject> {
        objects
            .into_iter()
            .filter(|object| match object {
                SchemaObject::View(view) if options.skip_views => {
                    debug!(view = %view.name.name.value, "skipping view (--skip-view)");
                    false
                }
                SchemaObject::MaterializedView(view) if options.skip_views => {
                    debug!(
                        materialized_view = %view.name.name.value,
                        "skipping materialized view (--skip-view)"
                    );
                    false
                }
                SchemaObject::Extension(extension) if options.skip_extensions => {
                    debug!(
                        extension = %extension.name.value,
                        "skipping extension (--skip-extension)"
                    );
                    false
                }
                _ => true,
            })
            .collect()
    }

    fn render_export(&self, objects: &[SchemaObject]) -> Result<String> {
        let mut rendered = String::new();
        for object in objects {
            rendered.push_str(&self.dialect.to_sql(object)?);
            rendered.push('\n');
        }
        Ok(rendered)
    }
}
