use std::{io, path::PathBuf};

use anyhow::Context;
use miette::Report;

const ORCHESTRATOR_CONTEXT: &str = "while reconciling schema";
const FILE_READ_CONTEXT: &str = "while reading desired schema file";
const STDIN_READ_CONTEXT: &str = "while reading desired schema from stdin";

pub(crate) const EXIT_SUCCESS: i32 = 0;
pub(crate) const EXIT_PARSE_ERROR: i32 = 1;
pub(crate) const EXIT_CONNECTION_ERROR: i32 = 2;
pub(crate) const EXIT_CATALOG_ERROR: i32 = 3;
pub(crate) const EXIT_APPLY_ERROR: i32 = 4;

pub(crate) type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub(crate) enum CliError {
    MissingDesiredSchemaInput,
    ReadFile { path: PathBuf, source: io::Error },
    ReadStdin(io::Error),
    Core(declsql_core::Error),
}

impl From<declsql_core::Error> for CliError {
    fn from(value: declsql_core::Error) -> Self {
        Self::Core(value)
    }
}

pub(crate) fn render_runtime_error(error: &CliError) -> String {
    match error {
        CliError::MissingDesiredSchemaInput => {
            format!("[usage] {}", missing_desired_schema_message())
        }
        CliError::ReadFile { path, source } => {
            let context = format!("{FILE_READ_CONTEXT} `{}`", path.display());
            let report = report_with_context(source.to_string(), context);
            format!("[io] {report}")
        }
        CliError::ReadStdin(source) => {
            let report = report_with_context(source.to_string(), STDIN_READ_CONTEXT);
            format!("[io] {report}")
        }
        CliError::Core(source) => {
            let category = core_category(source);
            let report = report_with_context(source.to_string(), ORCHESTRATOR_CONTEXT);
            format!("[{category}] {report}")
        }
    }
}

pub(crate) fn exit_code(error: &CliError) -> i32 {
    match error {
        CliError::MissingDesiredSchemaInput | CliError::ReadFile { .. } | CliError::ReadStdin(_) => {
            EXIT_PARSE_ERROR
        }
        CliError::Core(core_error) => match core_error {
            declsql_core::Error::Parse(_) => EXIT_PARSE_ERROR,
            declsql_core::Error::Catalog(catalog) if catalog.entity_kind == "connection" => {
                EXIT_CONNECTION_ERROR
            }
            declsql_core::Error::Catalog(_) => EXIT_CATALOG_ERROR,
            declsql_core::Error::Plan(_) => EXIT_CATALOG_ERROR,
            declsql_core::Error::Apply(_) => EXIT_APPLY_ERROR,
        },
    }
}

fn report_with_context<C>(message: String, context: C) -> Report
where
    C: Into<String>,
{
    let context = context.into();
    let anyhow_error = std::result::Result::<(), _>::Err(anyhow::anyhow!(message))
        .context(context)
        .expect_err("context wrapping must produce an error");
    miette::miette!("{anyhow_error:#}")
}

fn core_category(error: &declsql_core::Error) -> &'static str {
    match error {
        declsql_core::Error::Parse(_) => "parse",
        declsql_core::Error::Catalog(_) => "catalog",
        declsql_core::Error::Plan(_) => "plan",
        declsql_core::Error::Apply(_) => "apply",
    }
}

fn missing_desired_schema_message() -> &'static str {
    "missing desired schema SQL: pass --file <PATH> or pipe SQL via stdin"
}
