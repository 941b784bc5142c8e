use autochrone_core::project::Project;
use autochrone_core::types::{Date, DbId};
use sqlx::FromRow;

/// Row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub slug: String,
    pub date_start: Date,
    pub date_end: Date,
    pub word_count_start: i32,
    pub word_count_goal: i32,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            slug: row.slug,
            date_start: row.date_start,
            date_end: row.date_end,
            word_count_start: row.word_count_start,
            word_count_goal: row.word_count_goal,
        }
    }
}
