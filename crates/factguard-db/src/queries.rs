use crate::error::unique_violation;
use crate::models::UserRow;
use crate::{Database, DbError};
use factguard_types::models::Role;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, username, email, password, role, political_leaning, created_at";

impl Database {
    // -- Users --

    /// Inserts a new account. Email uniqueness is left to the store's
    /// constraint rather than checked up front.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        political_leaning: Option<&str>,
    ) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password, role, political_leaning)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![username, email, password_hash, role.as_str(), political_leaning],
            )
            .map_err(|e| email_conflict(e.into()))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DbError> {
        self.with_conn(|conn| query_user(conn, "email = ?1", email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>, DbError> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    pub fn update_profile(
        &self,
        id: i64,
        username: &str,
        email: &str,
        political_leaning: Option<&str>,
    ) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE users SET username = ?1, email = ?2,
                     political_leaning = COALESCE(?3, political_leaning)
                     WHERE id = ?4",
                    rusqlite::params![username, email, political_leaning, id],
                )
                .map_err(|e| email_conflict(e.into()))?;
            if changed == 0 {
                return Err(DbError::NotFound("User"));
            }
            Ok(())
        })
    }

    pub fn update_password(&self, id: i64, password_hash: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?1 WHERE id = ?2",
                rusqlite::params![password_hash, id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound("User"));
            }
            Ok(())
        })
    }

    /// Removes only the user row. Owned resources are cleaned up separately
    /// by the caller.
    pub fn delete_user(&self, id: i64) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(DbError::NotFound("User"));
            }
            Ok(())
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_users(&self) -> Result<u64, DbError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
            Ok(count as u64)
        })
    }
}

fn query_user(
    conn: &Connection,
    predicate: &str,
    value: impl rusqlite::ToSql,
) -> Result<Option<UserRow>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE {predicate}"
    ))?;

    stmt.query_row([value], user_from_row).optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    let role: String = row.get(4)?;
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: role.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?,
        political_leaning: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn email_conflict(err: DbError) -> DbError {
    match unique_violation(&err) {
        Some("users.email") => DbError::DuplicateEmail,
        _ => err,
    }
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, DbError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, DbError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
