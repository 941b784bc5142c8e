//! [`Repository`] backed by PostgreSQL.

use async_trait::async_trait;
use autochrone_core::milestone::{MilestoneWindow, SprintMetric};
use autochrone_core::project::{Project, ProjectDetails};
use autochrone_core::repository::{RepoResult, Repository};
use autochrone_core::sprint::{NewSprint, Sprint};
use autochrone_core::types::{DbId, Timestamp};
use autochrone_core::user::{NewUser, User};

use crate::map_sqlx_error;
use crate::repositories::{GuestRepo, ProjectRepo, SprintRepo, UserRepo};
use crate::DbPool;

/// Pool-owning adapter from the table repositories to the core port.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: DbPool,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn health_check(&self) -> RepoResult<()> {
        crate::health_check(&self.pool).await.map_err(map_sqlx_error)
    }

    async fn user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let row = UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn insert_user(&self, user: &NewUser) -> RepoResult<User> {
        UserRepo::create(&self.pool, &user.username, &user.password_hash, &user.scopes)
            .await
            .map(Into::into)
            .map_err(map_sqlx_error)
    }

    async fn projects_by_owner(&self, user_id: DbId) -> RepoResult<Vec<Project>> {
        let rows = ProjectRepo::list_by_owner(&self.pool, user_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn project_by_id(&self, id: DbId) -> RepoResult<Option<Project>> {
        let row = ProjectRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn project_by_slug(&self, user_id: DbId, slug: &str) -> RepoResult<Option<Project>> {
        let row = ProjectRepo::find_by_slug(&self.pool, user_id, slug)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn insert_project(
        &self,
        user_id: DbId,
        details: &ProjectDetails,
    ) -> RepoResult<Project> {
        ProjectRepo::create(&self.pool, user_id, details)
            .await
            .map(Into::into)
            .map_err(map_sqlx_error)
    }

    async fn update_project(
        &self,
        id: DbId,
        details: &ProjectDetails,
    ) -> RepoResult<Option<Project>> {
        let row = ProjectRepo::update(&self.pool, id, details)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_project(&self, id: DbId) -> RepoResult<bool> {
        ProjectRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn sprints_by_project(&self, project_id: DbId) -> RepoResult<Vec<Sprint>> {
        let rows = SprintRepo::list_by_project(&self.pool, project_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn sprint_by_id(&self, id: DbId) -> RepoResult<Option<Sprint>> {
        let row = SprintRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn sprint_by_slug(&self, slug: &str) -> RepoResult<Option<Sprint>> {
        let row = SprintRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn sprint_by_invite_slug(&self, invite_slug: &str) -> RepoResult<Option<Sprint>> {
        let row = SprintRepo::find_by_invite_slug(&self.pool, invite_slug)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn insert_sprint(&self, sprint: &NewSprint) -> RepoResult<Sprint> {
        SprintRepo::create(&self.pool, sprint)
            .await
            .map(Into::into)
            .map_err(map_sqlx_error)
    }

    async fn update_sprint(&self, sprint: &Sprint) -> RepoResult<bool> {
        SprintRepo::update(&self.pool, sprint)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_sprint(&self, id: DbId) -> RepoResult<bool> {
        SprintRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn first_sprint_after(
        &self,
        project_id: DbId,
        after: Timestamp,
    ) -> RepoResult<Option<Sprint>> {
        let row = SprintRepo::first_after(&self.pool, project_id, after)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn first_sprint_start(&self, project_id: DbId) -> RepoResult<Option<Timestamp>> {
        SprintRepo::first_start(&self.pool, project_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn latest_milestone_before(
        &self,
        project_id: DbId,
        before: Timestamp,
    ) -> RepoResult<Option<Sprint>> {
        let row = SprintRepo::latest_milestone_before(&self.pool, project_id, before)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Into::into))
    }

    async fn count_milestones(&self, project_id: DbId, up_to: Timestamp) -> RepoResult<i64> {
        SprintRepo::count_milestones(&self.pool, project_id, up_to)
            .await
            .map_err(map_sqlx_error)
    }

    async fn sum_in_window(
        &self,
        project_id: DbId,
        window: &MilestoneWindow,
        metric: SprintMetric,
    ) -> RepoResult<i64> {
        SprintRepo::sum_in_window(&self.pool, project_id, window, metric)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_invite(
        &self,
        host_sprint_id: DbId,
        invite_slug: &str,
        comment: &str,
    ) -> RepoResult<()> {
        GuestRepo::create_invite(&self.pool, host_sprint_id, invite_slug, comment)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_guest_sprint(
        &self,
        host_sprint_id: DbId,
        sprint: &NewSprint,
    ) -> RepoResult<Sprint> {
        GuestRepo::create_guest_sprint(&self.pool, host_sprint_id, sprint)
            .await
            .map(Into::into)
            .map_err(map_sqlx_error)
    }

    async fn guest_sprints(&self, host_sprint_id: DbId) -> RepoResult<Vec<Sprint>> {
        let rows = GuestRepo::list_guests(&self.pool, host_sprint_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
