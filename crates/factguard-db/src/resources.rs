//! Table bindings for the two stored resource kinds.

use factguard_types::api::{NewClaim, NewDetection};
use factguard_types::models::{Claim, Detection};
use rusqlite::{Connection, Row};

use crate::collection::{Resource, json_column};
use crate::queries::OptionalExt;
use crate::DbError;

/// Upper bound on claims, ratings and links stored per fact-check query.
pub const MAX_CLAIM_ENTRIES: usize = 3;

impl Resource for Detection {
    type Draft = NewDetection;

    const TABLE: &'static str = "detections";
    const PREFIX: &'static str = "FGD";
    const LABEL: &'static str = "Detection";
    const COLUMNS: &'static str = "id, owner_id, title, content, models, confidence, \
        true_probabilities, fake_probabilities, predictions, final_prediction, date";

    fn validate(draft: &NewDetection) -> Result<(), DbError> {
        require_text("title", &draft.title)?;
        require_text("content", &draft.content)?;
        require_text("final_prediction", &draft.final_prediction)?;
        require_list("models", &draft.models)?;
        if !draft.confidence.is_finite() {
            return Err(DbError::Invalid("confidence must be a number".into()));
        }

        // One entry per model in every per-model vector.
        let models = draft.models.len();
        for (field, len) in [
            ("true_probabilities", draft.true_probabilities.len()),
            ("fake_probabilities", draft.fake_probabilities.len()),
            ("predictions", draft.predictions.len()),
        ] {
            if len != models {
                return Err(DbError::Invalid(format!(
                    "{field} must have one entry per model ({models})"
                )));
            }
        }
        Ok(())
    }

    fn is_duplicate(conn: &Connection, owner_id: i64, draft: &NewDetection) -> Result<bool, DbError> {
        let found = conn
            .query_row(
                "SELECT 1 FROM detections WHERE owner_id = ?1 AND title = ?2 AND content = ?3",
                rusqlite::params![owner_id, draft.title, draft.content],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(conn: &Connection, id: &str, owner_id: i64, draft: &NewDetection) -> Result<(), DbError> {
        conn.execute(
            "INSERT INTO detections (id, owner_id, title, content, models, confidence,
                true_probabilities, fake_probabilities, predictions, final_prediction, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                id,
                owner_id,
                draft.title,
                draft.content,
                serde_json::to_string(&draft.models)?,
                draft.confidence,
                serde_json::to_string(&draft.true_probabilities)?,
                serde_json::to_string(&draft.fake_probabilities)?,
                serde_json::to_string(&draft.predictions)?,
                draft.final_prediction,
                draft.date,
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Detection {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            models: json_column(row, 4)?,
            confidence: row.get(5)?,
            true_probabilities: json_column(row, 6)?,
            fake_probabilities: json_column(row, 7)?,
            predictions: json_column(row, 8)?,
            final_prediction: row.get(9)?,
            date: row.get(10)?,
        })
    }

    fn hydrate(id: String, owner_id: i64, draft: NewDetection) -> Self {
        Detection {
            id,
            owner_id,
            title: draft.title,
            content: draft.content,
            models: draft.models,
            confidence: draft.confidence,
            true_probabilities: draft.true_probabilities,
            fake_probabilities: draft.fake_probabilities,
            predictions: draft.predictions,
            final_prediction: draft.final_prediction,
            date: draft.date,
        }
    }
}

impl Resource for Claim {
    type Draft = NewClaim;

    const TABLE: &'static str = "claims";
    const PREFIX: &'static str = "FGV";
    const LABEL: &'static str = "Claim";
    const COLUMNS: &'static str = "id, owner_id, query, claims, ratings, links, language, date";

    fn validate(draft: &NewClaim) -> Result<(), DbError> {
        require_text("query", &draft.query)?;
        require_text("language", &draft.language)?;
        require_list("claims", &draft.claims)?;
        require_list("ratings", &draft.ratings)?;
        require_list("links", &draft.links)?;

        if draft.claims.len() > MAX_CLAIM_ENTRIES
            || draft.ratings.len() > MAX_CLAIM_ENTRIES
            || draft.links.len() > MAX_CLAIM_ENTRIES
        {
            return Err(DbError::Invalid(format!(
                "A maximum of {MAX_CLAIM_ENTRIES} claims, ratings, and links are allowed per query"
            )));
        }
        if draft.ratings.len() != draft.claims.len() || draft.links.len() != draft.claims.len() {
            return Err(DbError::Invalid(
                "claims, ratings and links must have the same length".into(),
            ));
        }
        Ok(())
    }

    fn is_duplicate(conn: &Connection, owner_id: i64, draft: &NewClaim) -> Result<bool, DbError> {
        let found = conn
            .query_row(
                "SELECT 1 FROM claims WHERE owner_id = ?1 AND query = ?2",
                rusqlite::params![owner_id, draft.query],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(conn: &Connection, id: &str, owner_id: i64, draft: &NewClaim) -> Result<(), DbError> {
        conn.execute(
            "INSERT INTO claims (id, owner_id, query, claims, ratings, links, language, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                id,
                owner_id,
                draft.query,
                serde_json::to_string(&draft.claims)?,
                serde_json::to_string(&draft.ratings)?,
                serde_json::to_string(&draft.links)?,
                draft.language,
                draft.date,
            ],
        )?;
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Claim {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            query: row.get(2)?,
            claims: json_column(row, 3)?,
            ratings: json_column(row, 4)?,
            links: json_column(row, 5)?,
            language: row.get(6)?,
            date: row.get(7)?,
        })
    }

    fn hydrate(id: String, owner_id: i64, draft: NewClaim) -> Self {
        Claim {
            id,
            owner_id,
            query: draft.query,
            claims: draft.claims,
            ratings: draft.ratings,
            links: draft.links,
            language: draft.language,
            date: draft.date,
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DbError> {
    if value.trim().is_empty() {
        return Err(DbError::Invalid(format!("{field} is required")));
    }
    Ok(())
}

fn require_list<T>(field: &str, values: &[T]) -> Result<(), DbError> {
    if values.is_empty() {
        return Err(DbError::Invalid(format!("{field} is required")));
    }
    Ok(())
}
