//! SQLite store for subscribers and the announcement ledger.
//!
//! Two concerns share one database: the subscriber store (who is subscribed,
//! with which preferences) and the contest ledger (which contests have been
//! announced, which reminders delivered). Every write is committed before
//! the call returns; all marks are idempotent so retries are harmless.

use crate::settings::SubscriberSettings;
use contest_core::Platform;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Database handle, cheap to clone (shares the pool).
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the SQLite database at the given path, creating it and
    /// running migrations as needed.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                chat_id INTEGER PRIMARY KEY
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Platforms and offsets are JSON arrays; parsing happens in
        // get_settings and malformed values degrade to defaults.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscriber_settings (
                chat_id INTEGER PRIMARY KEY,
                platforms TEXT NOT NULL DEFAULT '[]',
                reminder_offsets TEXT NOT NULL DEFAULT '[]'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS announced_contests (
                contest_id TEXT PRIMARY KEY,
                first_seen_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sent_reminders (
                contest_id TEXT NOT NULL,
                reminder_offset INTEGER NOT NULL,
                chat_id INTEGER NOT NULL,
                sent_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (contest_id, reminder_offset, chat_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ---- Subscriber store ----

    /// Register a chat. Inserting the subscriber row and the default
    /// settings row are separate statements; if the second is ever missed,
    /// `get_settings` falls back to defaults.
    pub async fn subscribe(&self, chat_id: i64) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO subscribers (chat_id) VALUES (?)")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        let defaults = SubscriberSettings::default();
        sqlx::query(
            "INSERT OR IGNORE INTO subscriber_settings (chat_id, platforms, reminder_offsets) VALUES (?, ?, ?)",
        )
        .bind(chat_id)
        .bind(serde_json::to_string(&defaults.platforms).unwrap_or_default())
        .bind(serde_json::to_string(&defaults.offsets).unwrap_or_default())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a chat and its settings. Re-subscribing starts from defaults.
    pub async fn unsubscribe(&self, chat_id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM subscribers WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM subscriber_settings WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All currently subscribed chats.
    pub async fn list_subscribers(&self) -> Result<Vec<i64>, StoreError> {
        let rows = sqlx::query_scalar::<_, i64>("SELECT chat_id FROM subscribers")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Load a chat's settings. Missing rows, malformed JSON, and empty lists
    /// all degrade to defaults, per field.
    pub async fn get_settings(&self, chat_id: i64) -> Result<SubscriberSettings, StoreError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT platforms, reminder_offsets FROM subscriber_settings WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        let defaults = SubscriberSettings::default();
        let Some((platforms_json, offsets_json)) = row else {
            return Ok(defaults);
        };

        let mut platforms: Vec<Platform> =
            serde_json::from_str(&platforms_json).unwrap_or_default();
        let mut offsets: Vec<i64> = serde_json::from_str(&offsets_json).unwrap_or_default();
        if platforms.is_empty() {
            platforms = defaults.platforms;
        }
        offsets.retain(|&secs| secs > 0);
        if offsets.is_empty() {
            offsets = defaults.offsets;
        }

        Ok(SubscriberSettings { platforms, offsets })
    }

    /// Persist a chat's settings, replacing any previous row.
    pub async fn save_settings(
        &self,
        chat_id: i64,
        settings: &SubscriberSettings,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO subscriber_settings (chat_id, platforms, reminder_offsets) VALUES (?, ?, ?)",
        )
        .bind(chat_id)
        .bind(serde_json::to_string(&settings.platforms).unwrap_or_default())
        .bind(serde_json::to_string(&settings.offsets).unwrap_or_default())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---- Contest ledger ----

    /// Whether a "new contest" notification was already sent for this id.
    pub async fn is_announced(&self, contest_id: &str) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM announced_contests WHERE contest_id = ?",
        )
        .bind(contest_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Record that a contest has been announced. Idempotent.
    pub async fn mark_announced(&self, contest_id: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO announced_contests (contest_id) VALUES (?)")
            .bind(contest_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Whether a reminder was already delivered for this (contest, offset,
    /// chat) triple.
    pub async fn is_reminder_sent(
        &self,
        contest_id: &str,
        offset: i64,
        chat_id: i64,
    ) -> Result<bool, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sent_reminders WHERE contest_id = ? AND reminder_offset = ? AND chat_id = ?",
        )
        .bind(contest_id)
        .bind(offset)
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Record a delivered reminder. Idempotent.
    pub async fn mark_reminder_sent(
        &self,
        contest_id: &str,
        offset: i64,
        chat_id: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR IGNORE INTO sent_reminders (contest_id, reminder_offset, chat_id) VALUES (?, ?, ?)",
        )
        .bind(contest_id)
        .bind(offset)
        .bind(chat_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
