use std::marker::PhantomData;
use std::sync::Arc;

use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::unique_violation;
use crate::queries::OptionalExt;
use crate::{Database, DbError, IdentifierAllocator, sequence};

/// A record type stored in its own owner-scoped table.
///
/// Tables must have an AUTOINCREMENT `row_id`, a UNIQUE public `id`, an
/// `owner_id`, a `date` column, and a UNIQUE constraint over the dedup key.
pub trait Resource: Sized {
    /// Validated-on-create payload submitted by the client.
    type Draft;

    const TABLE: &'static str;
    /// Prefix of the public identifier.
    const PREFIX: &'static str;
    /// Used in error messages ("Detection not found").
    const LABEL: &'static str;
    /// SELECT list understood by [`Resource::from_row`].
    const COLUMNS: &'static str;

    fn validate(draft: &Self::Draft) -> Result<(), DbError>;

    /// Whether `owner_id` already stores a record with the draft's dedup key.
    fn is_duplicate(conn: &Connection, owner_id: i64, draft: &Self::Draft)
    -> Result<bool, DbError>;

    fn insert(
        conn: &Connection,
        id: &str,
        owner_id: i64,
        draft: &Self::Draft,
    ) -> Result<(), DbError>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Builds the stored record from an accepted draft without re-reading it.
    fn hydrate(id: String, owner_id: i64, draft: Self::Draft) -> Self;
}

/// Owner-scoped CRUD over one [`Resource`] table.
///
/// Every read and delete filters on both `id` and `owner_id`, so a record
/// belonging to someone else is reported exactly like a missing one.
pub struct ResourceCollection<R> {
    db: Arc<Database>,
    allocator: IdentifierAllocator,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceCollection<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            allocator: self.allocator,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceCollection<R> {
    pub fn new(db: Arc<Database>, allocator: IdentifierAllocator) -> Self {
        Self {
            db,
            allocator,
            _resource: PhantomData,
        }
    }

    /// Validates, rejects duplicates, allocates an identifier and stores the
    /// draft.
    ///
    /// The duplicate check and the insert take the connection separately.
    /// A concurrent create with the same dedup key can slip in between; the
    /// insert then trips the UNIQUE constraint and reports `Duplicate` all
    /// the same.
    pub fn create(&self, owner_id: i64, draft: R::Draft) -> Result<R, DbError> {
        R::validate(&draft)?;

        if self
            .db
            .with_conn(|conn| R::is_duplicate(conn, owner_id, &draft))?
        {
            return Err(DbError::Duplicate(R::LABEL));
        }

        let id = self.insert_allocated(owner_id, &draft)?;
        debug!("{} {} created for user {}", R::LABEL, id, owner_id);
        Ok(R::hydrate(id, owner_id, draft))
    }

    /// Insert step of [`Self::create`]: draws identifiers until one is free.
    pub(crate) fn insert_allocated(&self, owner_id: i64, draft: &R::Draft) -> Result<String, DbError> {
        let id_column = format!("{}.id", R::TABLE);
        let attempts = self.allocator.max_attempts();

        self.db.with_conn(|conn| {
            for attempt in 1..=attempts {
                let id = self.allocator.allocate(R::PREFIX);
                let err = match R::insert(conn, &id, owner_id, draft) {
                    Ok(()) => return Ok(id),
                    Err(err) => err,
                };
                match unique_violation(&err) {
                    Some(columns) if columns == id_column => {
                        debug!("Identifier {} taken (attempt {}/{})", id, attempt, attempts);
                    }
                    Some(_) => return Err(DbError::Duplicate(R::LABEL)),
                    None => return Err(err),
                }
            }
            warn!(
                "Gave up allocating a {} identifier after {} attempts",
                R::PREFIX,
                attempts
            );
            Err(DbError::IdentifierExhausted {
                prefix: R::PREFIX,
                attempts,
            })
        })
    }

    pub fn get(&self, owner_id: i64, id: &str) -> Result<R, DbError> {
        self.db
            .with_conn(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM {} WHERE id = ?1 AND owner_id = ?2",
                    R::COLUMNS,
                    R::TABLE
                ))?;
                stmt.query_row(rusqlite::params![id, owner_id], R::from_row)
                    .optional()
            })?
            .ok_or(DbError::NotFound(R::LABEL))
    }

    /// Newest first.
    pub fn list(&self, owner_id: i64) -> Result<Vec<R>, DbError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {} WHERE owner_id = ?1 ORDER BY date DESC, row_id DESC",
                R::COLUMNS,
                R::TABLE
            ))?;
            let rows = stmt
                .query_map([owner_id], R::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete(&self, owner_id: i64, id: &str) -> Result<(), DbError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                &format!("DELETE FROM {} WHERE id = ?1 AND owner_id = ?2", R::TABLE),
                rusqlite::params![id, owner_id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound(R::LABEL));
            }
            reconcile_logged::<R>(conn);
            Ok(())
        })
    }

    /// Removes every record of `owner_id`; returns how many went.
    pub fn delete_all_for_owner(&self, owner_id: i64) -> Result<usize, DbError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                &format!("DELETE FROM {} WHERE owner_id = ?1", R::TABLE),
                [owner_id],
            )?;
            reconcile_logged::<R>(conn);
            Ok(changed)
        })
    }

    pub fn count_for_owner(&self, owner_id: i64) -> Result<u64, DbError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE owner_id = ?1", R::TABLE),
                [owner_id],
                |r| r.get(0),
            )?;
            Ok(count as u64)
        })
    }

    pub fn count_all(&self) -> Result<u64, DbError> {
        self.db.with_conn(|conn| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", R::TABLE), [], |r| r.get(0))?;
            Ok(count as u64)
        })
    }
}

fn reconcile_logged<R: Resource>(conn: &Connection) {
    match sequence::reconcile(conn, R::TABLE) {
        Ok(seq) => debug!("Sequence for {} reset to {}", R::TABLE, seq),
        Err(e) => warn!("Failed to reset {} sequence: {}", R::TABLE, e),
    }
}

/// Reads a JSON-encoded TEXT column.
pub(crate) fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
