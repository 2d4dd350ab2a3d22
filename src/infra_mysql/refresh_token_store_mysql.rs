use super::util::bounded;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::time::Duration;

const REFRESH_TOKEN_DDL: &str = include_str!("refresh_token.sql");

pub struct MySqlRefreshTokenStore {
    pool: MySqlPool,
    op_timeout: Duration,
}

impl MySqlRefreshTokenStore {
    pub fn new(pool: MySqlPool, op_timeout: Duration) -> Self {
        MySqlRefreshTokenStore { pool, op_timeout }
    }

    pub async fn ensure_schema(&self) -> Result<(), AuthError> {
        bounded(
            self.op_timeout,
            "create refresh_token",
            sqlx::query(REFRESH_TOKEN_DDL).execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    fn row_to_record(row: MySqlRow) -> Result<RefreshTokenRecord, AuthError> {
        let decode = |e: sqlx::Error| AuthError::InternalError(format!("decode refresh_token: {e}"));

        Ok(RefreshTokenRecord {
            id: row.try_get::<RecordId, _>("id").map_err(decode)?,
            member_id: row.try_get::<MemberId, _>("member_id").map_err(decode)?,
            token: row.try_get::<String, _>("token").map_err(decode)?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at").map_err(decode)?,
        })
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn find_by_member(
        &self,
        member_id: MemberId,
    ) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let row_opt = bounded(
            self.op_timeout,
            "find by member",
            sqlx::query(
                r#"
SELECT id, member_id, token, expires_at
FROM refresh_token
WHERE member_id = ?
"#,
            )
            .bind(member_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError> {
        let row_opt = bounded(
            self.op_timeout,
            "find by token",
            sqlx::query(
                r#"
SELECT id, member_id, token, expires_at
FROM refresh_token
WHERE token = ?
"#,
            )
            .bind(token)
            .fetch_optional(&self.pool),
        )
        .await?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn upsert(
        &self,
        member_id: MemberId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        // One statement keyed on the member unique index; no read-then-write.
        bounded(
            self.op_timeout,
            "upsert",
            sqlx::query(
                r#"
INSERT INTO refresh_token (member_id, token, expires_at)
VALUES (?, ?, ?)
ON DUPLICATE KEY UPDATE token = VALUES(token), expires_at = VALUES(expires_at)
"#,
            )
            .bind(member_id)
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, AuthError> {
        let result = bounded(
            self.op_timeout,
            "delete by token",
            sqlx::query("DELETE FROM refresh_token WHERE token = ?")
                .bind(token)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_before(&self, before: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = bounded(
            self.op_timeout,
            "delete expired",
            sqlx::query("DELETE FROM refresh_token WHERE expires_at < ?")
                .bind(before)
                .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected())
    }
}
