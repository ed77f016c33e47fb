// src/coverage/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{coverage::CoverageStore, error::AppError, models::coverage::TopicCoverageState};

/// Coverage state stored as JSONB in the `topic_coverage` table.
#[derive(Debug, Clone)]
pub struct PgCoverageStore {
    pool: PgPool,
}

impl PgCoverageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoverageStore for PgCoverageStore {
    async fn get(&self, key: &str) -> Result<Option<TopicCoverageState>, AppError> {
        let row: Option<(Json<TopicCoverageState>,)> =
            sqlx::query_as("SELECT state FROM topic_coverage WHERE document = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load topic coverage: {:?}", e);
                    AppError::from(e)
                })?;

        Ok(row.map(|(Json(state),)| state))
    }

    async fn put(&self, key: &str, state: &TopicCoverageState) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO topic_coverage (document, state, updated_at)
            VALUES ($1, $2, CURRENT_TIMESTAMP)
            ON CONFLICT (document) DO UPDATE SET
                state = EXCLUDED.state,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(Json(state))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist topic coverage: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM topic_coverage WHERE document = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
