//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return raw `sqlx` results.

pub mod guest_repo;
pub mod project_repo;
pub mod sprint_repo;
pub mod user_repo;

pub use guest_repo::GuestRepo;
pub use project_repo::ProjectRepo;
pub use sprint_repo::SprintRepo;
pub use user_repo::UserRepo;
