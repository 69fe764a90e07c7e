/// One DDL statement of an emitted plan. Non-transactional statements
/// (e.g. `CREATE INDEX CONCURRENTLY`) must run outside the wrapping
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub transactional: bool,
}

impl Statement {
    pub fn transactional(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            transactional: true,
        }
    }

    pub fn non_transactional(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            transactional: false,
        }
    }
}
