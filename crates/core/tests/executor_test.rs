use std::sync::{Arc, Mutex};

use declsql_core::{
    ApplyError, DatabaseAdapter, Error, Executor, Result, Statement, TransactionKeywords,
};

#[derive(Default)]
struct FakeAdapter {
    applied: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
}

impl FakeAdapter {
    fn new(applied: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            applied,
            fail_on: None,
        }
    }

    fn failing_on(applied: Arc<Mutex<Vec<String>>>, sql: &str) -> Self {
        Self {
            applied,
            fail_on: Some(sql.to_string()),
        }
    }
}

impl DatabaseAdapter for FakeAdapter {
    fn export_ddls(&mut self) -> Result<String> {
        Ok(String::new())
    }

    fn apply(&mut self, sql: &str) -> Result<()> {
        if self.fail_on.as_deref() == Some(sql) {
            return Err(Error::Apply(ApplyError::new(
                0,
                sql,
                0,
                std::io::Error::other("boom"),
            )));
        }
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

#[test]
fn transactional_statements_run_inside_one_transaction() {
    let applied = Arc::new(Mutex::new(Vec::new()));
    let mut adapter = FakeAdapter::new(applied.clone());
    let mut executor = Executor::new(&mut adapter);

    executor
        .execute_plan(&[
            Statement::transactional("CREATE TABLE a ()"),
            Statement::transactional("CREATE TABLE b ()"),
        ])
        .expect("plan should apply");

    assert_eq!(
        *applied.lock().expect("lock should not be poisoned"),
        vec![
            "BEGIN".to_string(),
            "CREATE TABLE a ()".to_string(),
            "CREATE TABLE b ()".to_string(),
            "COMMIT".to_string(),
        ]
    );
}

#[test]
fn non_transactional_statement_runs_outside_the_transaction() {
    let applied = Arc::new(Mutex::new(Vec::new()));
    let mut adapter = FakeAdapter::new(applied.clone());
    let mut executor = Executor::new(&mut adapter);

    executor
        .execute_plan(&[
            Statement::transactional("CREATE TABLE a ()"),
            Statement::non_transactional("CREATE INDEX CONCURRENTLY i ON a (x)"),
            Statement::transactional("CREATE TABLE b ()"),
        ])
        .expect("plan should apply");

    assert_eq!(
        *applied.lock().expect("lock should not be poisoned"),
        vec![
            "BEGIN".to_string(),
            "CREATE TABLE a ()".to_string(),
            "COMMIT".to_string(),
            "CREATE INDEX CONCURRENTLY i ON a (x)".to_string(),
            "BEGIN".to_string(),
            "CREATE TABLE b ()".to_string(),
            "COMMIT".to_string(),
        ]
    );
}

#[test]
fn failure_rolls_back_and_reports_the_statement() {
    let applied = Arc::new(Mutex::new(Vec::new()));
    let mut adapter = FakeAdapter::failing_on(applied.clone(), "CREATE TABLE b ()");
    let mut executor = Executor::new(&mut adapter);

    let error = executor
        .execute_plan(&[
            Statement::transactional("CREATE TABLE a ()"),
            Statement::transactional("CREATE TABLE b ()"),
        ])
        .expect_err("failing statement should surface");

    let Error::Apply(apply_error) = error else {
        panic!("expected an apply error");
    };
    assert_eq!(apply_error.statement_index, 1);
    assert_eq!(apply_error.sql, "CREATE TABLE b ()");
    assert_eq!(apply_error.executed_statements, 1);

    let applied = applied.lock().expect("lock should not be poisoned");
    assert_eq!(applied.last().map(String::as_str), Some("ROLLBACK"));
}

#[test]
fn custom_transaction_keywords_are_used() {
    struct CustomAdapter {
        applied: Arc<Mutex<Vec<String>>>,
    }

    impl DatabaseAdapter for CustomAdapter {
        fn export_ddls(&mut self) -> Result<String> {
            Ok(String::new())
        }

        fn apply(&mut self, sql: &str) -> Result<()> {
            self.applied
                .lock()
                .expect("lock should not be poisoned")
                .push(sql.to_string());
            Ok(())
        }

        fn transaction_keywords(&self) -> TransactionKeywords {
            TransactionKeywords {
                begin: "BEGIN TRANSACTION",
                commit: "COMMIT TRANSACTION",
                rollback: "ROLLBACK TRANSACTION",
            }
        }

        fn default_schema(&self) -> String {
            "dbo".to_string()
        }
    }

    let applied = Arc::new(Mutex::new(Vec::new()));
    let mut adapter = CustomAdapter {
        applied: applied.clone(),
    };
    let mut executor = Executor::new(&mut adapter);
    executor
        .execute_plan(&[Statement::transactional("CREATE TABLE a ()")])
        .expect("plan should apply");

    assert_eq!(
        applied
            .lock()
            .expect("lock should not be poisoned")
            .first()
            .map(String::as_str),
        Some("BEGIN TRANSACTION")
    );
}
