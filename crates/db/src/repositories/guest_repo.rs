//! Repository for invites (`host_sprints`) and host-to-guest links
//! (`guest_sprints`).

use autochrone_core::sprint::NewSprint;
use autochrone_core::types::DbId;
use sqlx::PgPool;

use crate::models::sprint::SprintRow;
use crate::repositories::sprint_repo;

pub struct GuestRepo;

impl GuestRepo {
    pub async fn create_invite(
        pool: &PgPool,
        host_sprint_id: DbId,
        invite_slug: &str,
        comment: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO host_sprints (host_sprint_id, invite_slug, comment) VALUES ($1, $2, $3)",
        )
        .bind(host_sprint_id)
        .bind(invite_slug)
        .bind(comment)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Insert the guest sprint and its link in one transaction.
    pub async fn create_guest_sprint(
        pool: &PgPool,
        host_sprint_id: DbId,
        input: &NewSprint,
    ) -> Result<SprintRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let guest = sqlx::query_as::<_, SprintRow>(&sprint_repo::insert_query())
            .bind(&input.slug)
            .bind(input.project_id)
            .bind(input.time_start)
            .bind(input.duration)
            .bind(input.pomodoro_break)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO guest_sprints (host_sprint_id, guest_sprint_id) VALUES ($1, $2)")
            .bind(host_sprint_id)
            .bind(guest.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(guest)
    }

    /// Guest sprints linked to a host, each with its own latest invite.
    pub async fn list_guests(
        pool: &PgPool,
        host_sprint_id: DbId,
    ) -> Result<Vec<SprintRow>, sqlx::Error> {
        let query = format!(
            "{} JOIN guest_sprints g ON g.guest_sprint_id = s.id \
             WHERE g.host_sprint_id = $1 \
             ORDER BY s.id",
            sprint_repo::SELECT
        );
        sqlx::query_as::<_, SprintRow>(&query)
            .bind(host_sprint_id)
            .fetch_all(pool)
            .await
    }
}
