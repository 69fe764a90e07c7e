mod buckets;
mod compare;
mod equivalence;
mod privilege;
mod qualify;
mod remaining;
mod types;

pub use compare::DiffEngine;
pub use equivalence::{exprs_equivalent, optional_exprs_equivalent};
pub use types::{ColumnChange, DiffConfig, DiffOp, EnumValuePosition, TypeChange, diff_op_tag};
