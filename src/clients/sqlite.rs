use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{FromRow, SqlitePool};

use super::VisitStore;
use crate::error::ServiceError;
use crate::models::Visit;

#[derive(FromRow)]
struct VisitRow {
    user_email: String,
    user_ip: String,
    timestamp: String,
}

/// Document store backed by a local SQLite table, one row per
/// `(namespace, user_email)`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, namespace: &str, key: &str) -> Result<Option<Visit>, ServiceError> {
        let row: Option<VisitRow> = sqlx::query_as(
            "SELECT user_email, user_ip, timestamp FROM visits WHERE namespace = ? AND user_email = ?",
        )
        .bind(namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<Visit, ServiceError> {
            let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
                .map_err(|e| ServiceError::InvalidResponse(format!("stored timestamp: {e}")))?;
            Ok(Visit::at(timestamp.with_timezone(&Utc), row.user_email, row.user_ip))
        })
        .transpose()
    }

    pub async fn count(&self, namespace: &str) -> Result<i64, ServiceError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits WHERE namespace = ?")
            .bind(namespace)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl VisitStore for SqliteStore {
    async fn put(&self, namespace: &str, key: &str, visit: &Visit) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO visits (namespace, user_email, user_ip, timestamp)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (namespace, user_email)
            DO UPDATE SET user_ip = excluded.user_ip, timestamp = excluded.timestamp
            "#,
        )
        .bind(namespace)
        .bind(key)
        .bind(visit.user_ip())
        .bind(visit.timestamp().to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
