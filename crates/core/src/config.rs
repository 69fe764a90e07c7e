use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub socket: Option<String>,
    /// Dialect-specific settings (ssl mode, certificate paths, overrides).
    pub extra: BTreeMap<String, String>,
}

/// Reflection-time tuning supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportConfig {
    /// Bounded fan-out for per-table catalog queries. Zero means 1.
    pub dump_concurrency: usize,
    /// Privileges are reconciled only for these roles; an empty list skips
    /// privilege reflection entirely.
    pub managed_roles: Vec<String>,
    /// Restrict reflection to these schemas when non-empty.
    pub target_schemas: Vec<String>,
}

impl ExportConfig {
    #[must_use]
    pub fn workers(&self) -> usize {
        self.dump_concurrency.max(1)
    }
}
