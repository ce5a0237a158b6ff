use rusqlite::Connection;

use crate::DbError;

/// Resets the AUTOINCREMENT watermark of `table` to the highest surviving
/// `row_id` (0 when the table is empty), so row ids freed at the top are
/// handed out again.
///
/// Works against the internal `row_id` key, never the public code in `id`.
/// `table` must be one of the crate's own table names.
pub fn reconcile(conn: &Connection, table: &str) -> Result<i64, DbError> {
    conn.execute(
        &format!(
            "UPDATE sqlite_sequence
             SET seq = (SELECT COALESCE(MAX(row_id), 0) FROM {table})
             WHERE name = ?1"
        ),
        [table],
    )?;

    let seq = conn
        .query_row(
            "SELECT seq FROM sqlite_sequence WHERE name = ?1",
            [table],
            |r| r.get(0),
        )
        .or_else(|e| match e {
            // No row until the first insert ever happens.
            rusqlite::Error::QueryReturnedNoRows => Ok(0),
            e => Err(e),
        })?;

    Ok(seq)
}
