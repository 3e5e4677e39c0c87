//! Test utilities for the executor.

mod builders;
mod database;
mod interpreter;
mod precompiles;

pub use builders::*;
pub use database::*;
pub use interpreter::*;
pub use precompiles::*;
