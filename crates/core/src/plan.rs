use crate::DiffOp;
use crate::ordering::sort_diff_ops;

/// An ordered DDL batch, ready for a dialect to render.
#[derive(Debug, Clone, PartialEq)]
pub struct DdlPlan {
    ordered_ops: Vec<DiffOp>,
}

impl DdlPlan {
    #[must_use]
    pub fn new(ordered_ops: Vec<DiffOp>) -> Self {
        Self { ordered_ops }
    }

    #[must_use]
    pub fn ops(&self) -> &[DiffOp] {
        &self.ordered_ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered_ops.is_empty()
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<DiffOp> {
        self.ordered_ops
    }
}

#[must_use]
pub fn build_ddl_plan(ops: Vec<DiffOp>) -> DdlPlan {
    DdlPlan::new(sort_diff_ops(ops))
}
