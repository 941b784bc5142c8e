use autochrone_core::types::DbId;
use autochrone_core::user::User;
use sqlx::FromRow;

/// Row from the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub scopes: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            scopes: row.scopes,
        }
    }
}
