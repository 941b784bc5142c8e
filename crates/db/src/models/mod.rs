//! Row types read with `FromRow` and converted into core entities.

pub mod project;
pub mod sprint;
pub mod user;
