//! Database row types, mapped directly from SQLite rows.
//! Distinct from factguard-types API models to keep the DB layer independent.

use factguard_types::models::{Role, User};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub political_leaning: Option<String>,
    pub created_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            role: row.role,
            political_leaning: row.political_leaning,
            created_at: row.created_at,
        }
    }
}
