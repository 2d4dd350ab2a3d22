use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn find_by_member(
        &self,
        member_id: MemberId,
    ) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Returns the record even when its `expires_at` has passed; the caller
    /// still has to verify the token itself.
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenRecord>, AuthError>;

    /// Insert-or-replace keyed on `member_id`, atomic per member. An existing
    /// row keeps its id.
    async fn upsert(
        &self,
        member_id: MemberId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    async fn delete_by_token(&self, token: &str) -> Result<bool, AuthError>;

    /// Removes every record with `expires_at < before`. Returns the number removed.
    async fn delete_expired_before(&self, before: DateTime<Utc>) -> Result<u64, AuthError>;
}
