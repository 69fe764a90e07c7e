use tracing::debug;

use crate::{ApplyError, DatabaseAdapter, Error, Result, Statement};

/// Applies an ordered statement plan through a [`DatabaseAdapter`].
///
/// Consecutive transactional statements run inside one transaction using
/// the adapter's vocabulary; a failure rolls the open transaction back and
/// surfaces the offending statement. Non-transactional statements run on
/// their own between batches.
pub struct Executor<'a> {
    adapter: &'a mut dyn DatabaseAdapter,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub fn new(adapter: &'a mut dyn DatabaseAdapter) -> Self {
        Self { adapter }
    }

    pub fn execute_plan(&mut self, statements: &[Statement]) -> Result<()> {
        let keywords = self.adapter.transaction_keywords();
        let mut index = 0usize;
        let mut executed_statements = 0usize;

        while index < statements.len() {
            if statements[index].transactional {
                self.apply_tracked(keywords.begin, index, &mut executed_statements, false)?;

                while index < statements.len() && statements[index].transactional {
                    let statement = &statements[index];
                    if let Err(error) =
                        self.apply_tracked(&statement.sql, index, &mut executed_statements, true)
                    {
                        if let Err(rollback_error) = self.adapter.apply(keywords.rollback) {
                            debug!(error = %rollback_error, "rollback after failed statement also failed");
                        }
                        return Err(error);
                    }
                    index += 1;
                }

                self.apply_tracked(keywords.commit, index - 1, &mut executed_statements, false)?;
            } else {
                self.apply_tracked(
                    &statements[index].sql,
                    index,
                    &mut executed_statements,
                    true,
                )?;
                index += 1;
            }
        }

        Ok(())
    }

    fn apply_tracked(
        &mut self,
        sql: &str,
        statement_index: usize,
        executed_statements: &mut usize,
        counts: bool,
    ) -> Result<()> {
        self.adapter.apply(sql).map_err(|source| {
            Error::from(ApplyError::new(statement_index, sql, *executed_statements, source))
        })?;
        if counts {
            *executed_statements += 1;
        }
        Ok(())
    }
}
