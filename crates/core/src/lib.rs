//! Domain core for the writing-sprint tracker.
//!
//! Pure sprint and project rules plus the async workflows (chaining,
//! milestone accounting, guest invites) that run against the
//! [`repository::Repository`] port. No HTTP or SQL lives here.

pub mod chain;
pub mod error;
pub mod guest;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod milestone;
pub mod project;
pub mod repository;
pub mod scope;
pub mod sprint;
pub mod types;
pub mod user;
