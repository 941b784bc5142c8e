//! Repository for the `projects` table.

use autochrone_core::project::ProjectDetails;
use autochrone_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::ProjectRow;

const COLUMNS: &str = "id, user_id, name, slug, date_start, date_end, \
                       word_count_start, word_count_goal";

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &ProjectDetails,
    ) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (user_id, name, slug, date_start, date_end, word_count_start, word_count_goal)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(input.date_start)
            .bind(input.date_end)
            .bind(input.word_count_start)
            .bind(input.word_count_goal)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(
        pool: &PgPool,
        user_id: DbId,
        slug: &str,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE user_id = $1 AND slug = $2");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// All projects of one owner, ordered by name.
    pub async fn list_by_owner(pool: &PgPool, user_id: DbId) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE user_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the editable fields. The slug is never changed.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProjectDetails,
    ) -> Result<Option<ProjectRow>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = $2,
                date_start = $3,
                date_end = $4,
                word_count_start = $5,
                word_count_goal = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.date_start)
            .bind(input.date_end)
            .bind(input.word_count_start)
            .bind(input.word_count_goal)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project; its sprints go with it through `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
