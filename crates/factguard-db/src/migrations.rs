use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        // No REFERENCES users(id) on resource tables: account deletion drops
        // the user row before its resources.
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                username            TEXT NOT NULL,
                email               TEXT NOT NULL UNIQUE,
                password            TEXT NOT NULL,
                role                TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
                political_leaning   TEXT,
                created_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE detections (
                row_id              INTEGER PRIMARY KEY AUTOINCREMENT,
                id                  TEXT NOT NULL UNIQUE,
                owner_id            INTEGER NOT NULL,
                title               TEXT NOT NULL,
                content             TEXT NOT NULL,
                models              TEXT NOT NULL,
                confidence          REAL NOT NULL,
                true_probabilities  TEXT NOT NULL,
                fake_probabilities  TEXT NOT NULL,
                predictions         TEXT NOT NULL,
                final_prediction    TEXT NOT NULL,
                date                TEXT NOT NULL,
                UNIQUE(owner_id, title, content)
            );

            CREATE INDEX idx_detections_owner ON detections(owner_id, date);

            CREATE TABLE claims (
                row_id      INTEGER PRIMARY KEY AUTOINCREMENT,
                id          TEXT NOT NULL UNIQUE,
                owner_id    INTEGER NOT NULL,
                query       TEXT NOT NULL,
                claims      TEXT NOT NULL,
                ratings     TEXT NOT NULL,
                links       TEXT NOT NULL,
                language    TEXT NOT NULL,
                date        TEXT NOT NULL,
                UNIQUE(owner_id, query)
            );

            CREATE INDEX idx_claims_owner ON claims(owner_id, date);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
