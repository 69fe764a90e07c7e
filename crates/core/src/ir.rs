mod expr;
mod ident;
mod schema_object;
mod types;

pub use expr::*;
pub use ident::*;
pub use schema_object::*;
pub use types::*;
