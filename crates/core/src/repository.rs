//! Persistence port consumed by the core.
//!
//! Implementations own durability, pooling and transactions. Every method
//! reports failures as [`CoreError::Storage`], except unique-key collisions
//! which surface as [`CoreError::Conflict`]. Lookups that find nothing
//! return `Ok(None)` rather than an error.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::milestone::{MilestoneWindow, SprintMetric};
use crate::project::{Project, ProjectDetails};
use crate::sprint::{NewSprint, Sprint};
use crate::types::{DbId, Timestamp};
use crate::user::{NewUser, User};

pub type RepoResult<T> = Result<T, CoreError>;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Cheap round-trip used by the health endpoint.
    async fn health_check(&self) -> RepoResult<()>;

    // --- users ---

    async fn user_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    async fn insert_user(&self, user: &NewUser) -> RepoResult<User>;

    // --- projects ---

    /// Projects of one owner, ordered by name.
    async fn projects_by_owner(&self, user_id: DbId) -> RepoResult<Vec<Project>>;

    async fn project_by_id(&self, id: DbId) -> RepoResult<Option<Project>>;

    async fn project_by_slug(&self, user_id: DbId, slug: &str) -> RepoResult<Option<Project>>;

    async fn insert_project(&self, user_id: DbId, details: &ProjectDetails)
        -> RepoResult<Project>;

    /// Returns `None` when no project has this id.
    async fn update_project(
        &self,
        id: DbId,
        details: &ProjectDetails,
    ) -> RepoResult<Option<Project>>;

    /// Deletes the project and all of its sprints.
    async fn delete_project(&self, id: DbId) -> RepoResult<bool>;

    // --- sprints ---

    /// Sprints of a project ordered by start time, oldest first.
    async fn sprints_by_project(&self, project_id: DbId) -> RepoResult<Vec<Sprint>>;

    async fn sprint_by_id(&self, id: DbId) -> RepoResult<Option<Sprint>>;

    async fn sprint_by_slug(&self, slug: &str) -> RepoResult<Option<Sprint>>;

    /// Host sprint owning the given invite.
    async fn sprint_by_invite_slug(&self, invite_slug: &str) -> RepoResult<Option<Sprint>>;

    async fn insert_sprint(&self, sprint: &NewSprint) -> RepoResult<Sprint>;

    /// Persists word count, milestone flag and comment. Last writer wins.
    async fn update_sprint(&self, sprint: &Sprint) -> RepoResult<bool>;

    async fn delete_sprint(&self, id: DbId) -> RepoResult<bool>;

    /// Earliest sprint of the project starting strictly after `after`.
    async fn first_sprint_after(
        &self,
        project_id: DbId,
        after: Timestamp,
    ) -> RepoResult<Option<Sprint>>;

    /// Start of the earliest sprint of the project.
    async fn first_sprint_start(&self, project_id: DbId) -> RepoResult<Option<Timestamp>>;

    // --- milestones ---

    /// Latest milestone sprint starting strictly before `before`.
    async fn latest_milestone_before(
        &self,
        project_id: DbId,
        before: Timestamp,
    ) -> RepoResult<Option<Sprint>>;

    /// Milestone sprints starting at or before `up_to`.
    async fn count_milestones(&self, project_id: DbId, up_to: Timestamp) -> RepoResult<i64>;

    /// Sum of `metric` over the sprints inside `window`; zero when empty.
    async fn sum_in_window(
        &self,
        project_id: DbId,
        window: &MilestoneWindow,
        metric: SprintMetric,
    ) -> RepoResult<i64>;

    // --- guests ---

    /// Records one invite for a host sprint. A host may hold several.
    async fn insert_invite(
        &self,
        host_sprint_id: DbId,
        invite_slug: &str,
        comment: &str,
    ) -> RepoResult<()>;

    /// Inserts the guest sprint and its link to the host in one unit.
    async fn insert_guest_sprint(
        &self,
        host_sprint_id: DbId,
        sprint: &NewSprint,
    ) -> RepoResult<Sprint>;

    /// Sprints linked to the host, in no particular order.
    async fn guest_sprints(&self, host_sprint_id: DbId) -> RepoResult<Vec<Sprint>>;
}
