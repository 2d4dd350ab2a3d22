use super::MemberId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on a stored token string; matches the width of the
/// `refresh_token.token` column.
pub const MAX_TOKEN_LEN: usize = 500;

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct RecordId(pub i64);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Access,
    Refresh,
}

/// Payload carried inside a signed token. Timestamps travel as Unix epoch
/// seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub category: TokenCategory,
    pub member_id: MemberId,
    pub role: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    pub jti: String,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// One row per member. Overwritten in place on every issuance, removed on
/// logout or by the expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: RecordId,
    pub member_id: MemberId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
