use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

use super::{ApplicationDraft, ApplicationStore, DraftStore, StoreError};
use crate::workflows::state::{ApplicationPatch, ConcessionApplication};
use crate::workflows::types::{ApplicationId, ApplicationStatus, UserId};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL,
        status TEXT NOT NULL,
        body TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_applications_user ON applications(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status)",
    r#"
    CREATE TABLE IF NOT EXISTS drafts (
        user_id TEXT PRIMARY KEY,
        body TEXT NOT NULL
    )
    "#,
];

/// SQLite-backed store. Records are kept as their flat JSON body with the
/// owner and status duplicated into indexed columns.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        info!(database_url, "SQLite store ready");

        Ok(Self { pool })
    }

    fn decode_rows(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<ConcessionApplication>, StoreError> {
        rows.into_iter()
            .map(|row| {
                let body: String = row.get("body");
                Ok(serde_json::from_str(&body)?)
            })
            .collect()
    }
}

#[async_trait]
impl ApplicationStore for SqliteStore {
    async fn create(&self, application: &ConcessionApplication) -> Result<(), StoreError> {
        let body = serde_json::to_string(application)?;
        let result = sqlx::query(
            "INSERT OR IGNORE INTO applications (id, user_id, status, body) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(application.id().as_str())
        .bind(application.user_id().as_str())
        .bind(application.status().as_str())
        .bind(body)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(application.id().clone()));
        }
        Ok(())
    }

    async fn get_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ConcessionApplication>, StoreError> {
        let row = sqlx::query("SELECT body FROM applications WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn list_by_owner(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConcessionApplication>, StoreError> {
        let rows = sqlx::query("SELECT body FROM applications WHERE user_id = ?1 ORDER BY seq DESC")
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await?;
        Self::decode_rows(rows)
    }

    async fn list_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ConcessionApplication>, StoreError> {
        let rows = sqlx::query("SELECT body FROM applications WHERE status = ?1 ORDER BY seq DESC")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Self::decode_rows(rows)
    }

    async fn list_all(&self) -> Result<Vec<ConcessionApplication>, StoreError> {
        let rows = sqlx::query("SELECT body FROM applications ORDER BY seq DESC")
            .fetch_all(&self.pool)
            .await?;
        Self::decode_rows(rows)
    }

    async fn update(
        &self,
        id: &ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<Option<ConcessionApplication>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT body FROM applications WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let body: String = row.get("body");
        let mut application: ConcessionApplication = serde_json::from_str(&body)?;
        application.apply_patch(patch);

        sqlx::query("UPDATE applications SET status = ?1, body = ?2 WHERE id = ?3")
            .bind(application.status().as_str())
            .bind(serde_json::to_string(&application)?)
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(application))
    }
}

#[async_trait]
impl DraftStore for SqliteStore {
    async fn save_draft(
        &self,
        user_id: &UserId,
        draft: &ApplicationDraft,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT OR REPLACE INTO drafts (user_id, body) VALUES (?1, ?2)")
            .bind(user_id.as_str())
            .bind(serde_json::to_string(draft)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_draft(&self, user_id: &UserId) -> Result<Option<ApplicationDraft>, StoreError> {
        let row = sqlx::query("SELECT body FROM drafts WHERE user_id = ?1")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    async fn clear_draft(&self, user_id: &UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM drafts WHERE user_id = ?1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
