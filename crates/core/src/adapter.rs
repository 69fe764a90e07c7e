use crate::Result;

/// Transaction vocabulary the executor wraps statement batches with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionKeywords {
    pub begin: &'static str,
    pub commit: &'static str,
    pub rollback: &'static str,
}

impl Default for TransactionKeywords {
    fn default() -> Self {
        Self {
            begin: "BEGIN",
            commit: "COMMIT",
            rollback: "ROLLBACK",
        }
    }
}

/// The execution transport: the only thing outside the core the core
/// depends on. Reflection is read-only; `apply` runs one statement.
pub trait DatabaseAdapter {
    /// Returns the current-state schema as DDL text.
    fn export_ddls(&mut self) -> Result<String>;

    fn apply(&mut self, sql: &str) -> Result<()>;

    fn transaction_keywords(&self) -> TransactionKeywords {
        TransactionKeywords::default()
    }

    fn default_schema(&self) -> String;
}
