mod error_presentation;

use std::{
    collections::BTreeMap,
    io::{IsTerminal, Read},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use declsql_core::{
    ConnectionConfig, ExportConfig, Mode, Orchestrator, OrchestratorOptions, OrchestratorOutput,
};
use declsql_dialect_postgres::PostgresDialect;

use error_presentation::{CliError, CliResult, EXIT_SUCCESS, exit_code, render_runtime_error};

/// Environment variables consulted for connection defaults.
const SSL_ENV_VARS: [(&str, &str); 4] = [
    ("PGSSLMODE", "sslmode"),
    ("PGSSLROOTCERT", "sslrootcert"),
    ("PGSSLCERT", "sslcert"),
    ("PGSSLKEY", "sslkey"),
];

#[derive(Debug, Parser)]
#[command(
    name = "declsql",
    version,
    about = "Idempotent schema migration for PostgreSQL: diff desired DDL against a live database",
    disable_help_flag = true
)]
struct Cli {
    /// Database name to reconcile.
    database: String,

    #[arg(long, action = clap::ArgAction::HelpLong)]
    help: Option<bool>,

    #[arg(short = 'U', long)]
    user: Option<String>,

    #[arg(short = 'W', long)]
    password: Option<String>,

    /// Server host; `-h` mirrors the usual client tools.
    #[arg(short = 'h', long)]
    host: Option<String>,

    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Unix domain socket directory.
    #[arg(long)]
    socket: Option<String>,

    #[arg(long = "ssl-mode")]
    ssl_mode: Option<String>,

    /// Desired schema DDL; stdin is read when omitted.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Print the plan without applying it.
    #[arg(long)]
    dry_run: bool,

    /// Print the current schema as DDL and exit.
    #[arg(long)]
    export: bool,

    /// Allow DROP statements in the plan.
    #[arg(long)]
    enable_drop_table: bool,

    #[arg(long)]
    skip_view: bool,

    #[arg(long)]
    skip_extension: bool,

    /// Restrict reflection to these schemas.
    #[arg(long = "target-schema", value_delimiter = ',')]
    target_schema: Vec<String>,

    /// Worker fan-out for catalog dumps.
    #[arg(long = "dump-concurrency", default_value_t = 1)]
    dump_concurrency: usize,

    /// Roles whose privileges are reconciled; others are ignored.
    #[arg(long = "managed-role", value_delimiter = ',')]
    managed_role: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS as u8),
        Err(error) => {
            eprintln!("{}", render_runtime_error(&error));
            ExitCode::from(exit_code(&error) as u8)
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mode = if cli.export {
        Mode::Export
    } else if cli.dry_run {
        Mode::DryRun
    } else {
        Mode::Apply
    };

    let desired_sql = if mode == Mode::Export {
        String::new()
    } else {
        read_desired_schema(&cli)?
    };

    let connection = connection_config(&cli);
    let export = ExportConfig {
        dump_concurrency: cli.dump_concurrency,
        managed_roles: cli.managed_role.clone(),
        target_schemas: cli.target_schema.clone(),
    };
    let options = OrchestratorOptions {
        mode,
        enable_drop: cli.enable_drop_table,
        skip_views: cli.skip_view,
        skip_extensions: cli.skip_extension,
    };

    let dialect = PostgresDialect;
    let orchestrator = Orchestrator::new(&dialect);
    let output = orchestrator.run(&connection, &export, &desired_sql, options)?;

    match output {
        OrchestratorOutput::Applied(statements) => {
            if statements == 0 {
                println!("-- Nothing to do.");
            } else {
                println!("-- Applied {statements} statements.");
            }
        }
        OrchestratorOutput::DryRunSql(sql) | OrchestratorOutput::ExportSql(sql) => {
            if sql.is_empty() {
                println!("-- Nothing to do.");
            } else {
                print!("{sql}");
            }
        }
    }

    Ok(())
}

fn read_desired_schema(cli: &Cli) -> CliResult<String> {
    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.clone(),
            source,
        });
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(CliError::MissingDesiredSchemaInput);
    }

    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(CliError::ReadStdin)?;
    Ok(buffer)
}

/// CLI flags win; SSL settings fall back to the standard PG* environment
/// variables.
fn connection_config(cli: &Cli) -> ConnectionConfig {
    let mut extra = BTreeMap::new();
    for (env_var, key) in SSL_ENV_VARS {
        if let Ok(value) = std::env::var(env_var)
            && !value.is_empty()
        {
            extra.insert(key.to_string(), value);
        }
    }
    if let Some(ssl_mode) = &cli.ssl_mode {
        extra.insert("sslmode".to_string(), ssl_mode.clone());
    }

    ConnectionConfig {
        host: cli.host.clone(),
        port: cli.port,
        user: cli.user.clone(),
        password: cli.password.clone(),
        database: cli.database.clone(),
        socket: cli.socket.clone(),
        extra,
    }
}
