//! Repository for the `sprints` table and the milestone aggregates over it.
//!
//! Every read goes through [`SELECT`], which attaches the most recent invite
//! of the sprint (if any) so callers see `invite_slug` / `invite_comment`.

use autochrone_core::milestone::{MilestoneWindow, SprintMetric};
use autochrone_core::sprint::{NewSprint, Sprint};
use autochrone_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::sprint::SprintRow;

pub(crate) const SELECT: &str = "SELECT s.id, s.slug, s.project_id, s.time_start, s.duration, \
                             s.word_count, s.pomodoro_break, s.is_milestone, s.comment, \
                             i.invite_slug, i.invite_comment \
                      FROM sprints s \
                      LEFT JOIN LATERAL ( \
                          SELECT h.invite_slug, h.comment AS invite_comment \
                          FROM host_sprints h \
                          WHERE h.host_sprint_id = s.id \
                          ORDER BY h.id DESC \
                          LIMIT 1 \
                      ) i ON true";

/// `RETURNING` list for fresh rows, which never carry an invite.
pub(crate) const RETURNING: &str = "id, slug, project_id, time_start, duration, word_count, \
                                    pomodoro_break, is_milestone, comment, \
                                    NULL::TEXT AS invite_slug, NULL::TEXT AS invite_comment";

pub(crate) fn insert_query() -> String {
    format!(
        "INSERT INTO sprints (slug, project_id, time_start, duration, pomodoro_break)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {RETURNING}"
    )
}

fn metric_column(metric: SprintMetric) -> &'static str {
    match metric {
        SprintMetric::WordCount => "word_count",
        SprintMetric::Duration => "duration",
    }
}

pub struct SprintRepo;

impl SprintRepo {
    pub async fn create(pool: &PgPool, input: &NewSprint) -> Result<SprintRow, sqlx::Error> {
        sqlx::query_as::<_, SprintRow>(&insert_query())
            .bind(&input.slug)
            .bind(input.project_id)
            .bind(input.time_start)
            .bind(input.duration)
            .bind(input.pomodoro_break)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SprintRow>, sqlx::Error> {
        let query = format!("{SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, SprintRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<SprintRow>, sqlx::Error> {
        let query = format!("{SELECT} WHERE s.slug = $1");
        sqlx::query_as::<_, SprintRow>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// The host sprint that handed out `invite_slug`.
    pub async fn find_by_invite_slug(
        pool: &PgPool,
        invite_slug: &str,
    ) -> Result<Option<SprintRow>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE s.id = (SELECT host_sprint_id FROM host_sprints WHERE invite_slug = $1)"
        );
        sqlx::query_as::<_, SprintRow>(&query)
            .bind(invite_slug)
            .fetch_optional(pool)
            .await
    }

    /// Sprints of a project, oldest start first.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<SprintRow>, sqlx::Error> {
        let query = format!("{SELECT} WHERE s.project_id = $1 ORDER BY s.time_start, s.id");
        sqlx::query_as::<_, SprintRow>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Write word count, milestone flag and comment. Returns `true` if a row matched.
    pub async fn update(pool: &PgPool, sprint: &Sprint) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sprints SET word_count = $2, is_milestone = $3, comment = $4 WHERE id = $1",
        )
        .bind(sprint.id)
        .bind(sprint.word_count)
        .bind(sprint.is_milestone)
        .bind(&sprint.comment)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sprints WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Earliest sprint of the project starting strictly after `after`.
    pub async fn first_after(
        pool: &PgPool,
        project_id: DbId,
        after: Timestamp,
    ) -> Result<Option<SprintRow>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE s.project_id = $1 AND s.time_start > $2 \
             ORDER BY s.time_start LIMIT 1"
        );
        sqlx::query_as::<_, SprintRow>(&query)
            .bind(project_id)
            .bind(after)
            .fetch_optional(pool)
            .await
    }

    pub async fn first_start(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<Timestamp>>(
            "SELECT MIN(time_start) FROM sprints WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// Latest milestone of the project starting strictly before `before`.
    pub async fn latest_milestone_before(
        pool: &PgPool,
        project_id: DbId,
        before: Timestamp,
    ) -> Result<Option<SprintRow>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE s.project_id = $1 AND s.is_milestone AND s.time_start < $2 \
             ORDER BY s.time_start DESC LIMIT 1"
        );
        sqlx::query_as::<_, SprintRow>(&query)
            .bind(project_id)
            .bind(before)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_milestones(
        pool: &PgPool,
        project_id: DbId,
        up_to: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sprints \
             WHERE project_id = $1 AND is_milestone AND time_start <= $2",
        )
        .bind(project_id)
        .bind(up_to)
        .fetch_one(pool)
        .await
    }

    /// `SUM` of one column over the window. An empty window yields 0, not NULL.
    pub async fn sum_in_window(
        pool: &PgPool,
        project_id: DbId,
        window: &MilestoneWindow,
        metric: SprintMetric,
    ) -> Result<i64, sqlx::Error> {
        let column = metric_column(metric);
        let query = format!(
            "SELECT COALESCE(SUM({column}), 0)::BIGINT FROM sprints \
             WHERE project_id = $1 \
               AND time_start <= $2 \
               AND ($3::TIMESTAMPTZ IS NULL OR time_start > $3)"
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(project_id)
            .bind(window.up_to)
            .bind(window.after)
            .fetch_one(pool)
            .await
    }
}
