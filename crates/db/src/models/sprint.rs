use autochrone_core::sprint::Sprint;
use autochrone_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Row from the `sprints` table joined with its latest invite, if any.
#[derive(Debug, Clone, FromRow)]
pub struct SprintRow {
    pub id: DbId,
    pub slug: String,
    pub project_id: DbId,
    pub time_start: Timestamp,
    pub duration: i32,
    pub word_count: i32,
    pub pomodoro_break: i32,
    pub is_milestone: bool,
    pub comment: String,
    pub invite_slug: Option<String>,
    pub invite_comment: Option<String>,
}

impl From<SprintRow> for Sprint {
    fn from(row: SprintRow) -> Self {
        Sprint {
            id: row.id,
            slug: row.slug,
            project_id: row.project_id,
            time_start: row.time_start,
            duration: row.duration,
            word_count: row.word_count,
            pomodoro_break: row.pomodoro_break,
            is_milestone: row.is_milestone,
            comment: row.comment,
            invite_slug: row.invite_slug,
            invite_comment: row.invite_comment,
        }
    }
}
