//! SQLite-based decision history and app state.
//!
//! Provides persistent storage for:
//! - Finished reflections (the decision ledger)
//! - Key-value store for application state (buddies, notifications)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::purchase::Purchase;
use crate::reflection::{DecisionLedger, Outcome, ReflectionResult};

/// SQLite database for ledger storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/impause/impause.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("impause.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ledger (
                id        TEXT PRIMARY KEY,
                purchase  TEXT NOT NULL,
                date      TEXT NOT NULL,
                outcome   TEXT NOT NULL,
                notes     TEXT
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_ledger_date ON ledger(date);",
        )?;
        Ok(())
    }

    /// Append one finished reflection.
    pub fn record_result(&self, result: &ReflectionResult) -> Result<(), DatabaseError> {
        let purchase = serde_json::to_string(&result.purchase).map_err(|e| {
            DatabaseError::CorruptRow {
                table: "ledger",
                message: e.to_string(),
            }
        })?;
        self.conn.execute(
            "INSERT INTO ledger (id, purchase, date, outcome, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                result.id.to_string(),
                purchase,
                result.date.to_rfc3339(),
                result.outcome.as_str(),
                result.reflection_notes,
            ],
        )?;
        Ok(())
    }

    /// All stored reflections, most recent first.
    pub fn ledger_entries(&self) -> Result<Vec<ReflectionResult>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, purchase, date, outcome, notes FROM ledger
             ORDER BY date DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, purchase, date, outcome, notes) = row?;
            entries.push(decode_row(&id, &purchase, &date, &outcome, notes)?);
        }
        Ok(entries)
    }

    /// Rebuild the in-memory ledger from stored rows.
    pub fn load_ledger(&self) -> Result<DecisionLedger, DatabaseError> {
        Ok(DecisionLedger::from_recent_first(self.ledger_entries()?))
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn decode_row(
    id: &str,
    purchase: &str,
    date: &str,
    outcome: &str,
    notes: Option<String>,
) -> Result<ReflectionResult, DatabaseError> {
    let corrupt = |message: String| DatabaseError::CorruptRow {
        table: "ledger",
        message,
    };
    let id = Uuid::parse_str(id).map_err(|e| corrupt(e.to_string()))?;
    let purchase: Purchase = serde_json::from_str(purchase).map_err(|e| corrupt(e.to_string()))?;
    let date = DateTime::parse_from_rfc3339(date)
        .map_err(|e| corrupt(e.to_string()))?
        .with_timezone(&Utc);
    let outcome = match outcome {
        "purchased" => Outcome::Purchased,
        "declined" => Outcome::Declined,
        other => return Err(corrupt(format!("unknown outcome '{other}'"))),
    };
    Ok(ReflectionResult {
        id,
        purchase,
        date,
        outcome,
        reflection_notes: notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchase::PurchaseDraft;
    use chrono::Duration;

    fn purchase(name: &str, price: f64) -> Purchase {
        Purchase::from_draft(PurchaseDraft {
            name: name.into(),
            price,
            category: "Electronics".into(),
            reason: "Old one broke".into(),
            need_score: 6,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn record_and_query_most_recent_first() {
        let db = Database::open_memory().unwrap();
        let mut older = ReflectionResult::new(purchase("Headphones", 199.99), Outcome::Declined, None);
        older.date = Utc::now() - Duration::hours(2);
        let newer = ReflectionResult::new(
            purchase("Keyboard", 89.0),
            Outcome::Purchased,
            Some("Needed for work".into()),
        );
        db.record_result(&older).unwrap();
        db.record_result(&newer).unwrap();

        let entries = db.ledger_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, newer.id);
        assert_eq!(entries[0].reflection_notes.as_deref(), Some("Needed for work"));
        assert_eq!(entries[1].purchase.name(), "Headphones");
        assert_eq!(entries[1].outcome, Outcome::Declined);
    }

    #[test]
    fn load_ledger_keeps_order_and_summary() {
        let db = Database::open_memory().unwrap();
        db.record_result(&ReflectionResult::new(purchase("Lamp", 40.0), Outcome::Declined, None))
            .unwrap();
        let ledger = db.load_ledger().unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.summary().amount_saved, 40.0);
    }

    #[test]
    fn corrupt_outcome_is_reported() {
        let db = Database::open_memory().unwrap();
        let result = ReflectionResult::new(purchase("Lamp", 40.0), Outcome::Declined, None);
        db.record_result(&result).unwrap();
        db.conn
            .execute("UPDATE ledger SET outcome = 'maybe'", [])
            .unwrap();
        assert!(matches!(
            db.ledger_entries(),
            Err(DatabaseError::CorruptRow { table: "ledger", .. })
        ));
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "world").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "world");
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impause.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.record_result(&ReflectionResult::new(purchase("Mug", 12.5), Outcome::Purchased, None))
                .unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.ledger_entries().unwrap()[0].purchase.price(), 12.5);
    }
}
