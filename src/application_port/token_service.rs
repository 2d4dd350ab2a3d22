use crate::domain_model::{MemberId, TokenCategory, TokenClaims};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token not found")]
    TokenNotFound,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Only a backend hiccup is worth retrying; the rest are final answers.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed token")]
    Malformed,
    #[error("signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<CodecError> for AuthError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::Malformed | CodecError::BadSignature => AuthError::TokenInvalid,
            CodecError::Expired => AuthError::TokenExpired,
            CodecError::Signing(e) => AuthError::InternalError(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Signs and verifies compact tokens. Verification is pure CPU work and never
/// touches storage.
pub trait TokenCodec: Send + Sync {
    fn sign(
        &self,
        category: TokenCategory,
        member_id: MemberId,
        role: &str,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), CodecError>;

    /// Checks the signature before any claim is looked at, then the expiry.
    fn verify(&self, token: &str) -> Result<TokenClaims, CodecError>;

    /// `Ok(true)` for a genuine token past its expiry. Structural and
    /// signature faults stay errors.
    fn is_expired(&self, token: &str) -> Result<bool, CodecError> {
        match self.verify(token) {
            Ok(_) => Ok(false),
            Err(CodecError::Expired) => Ok(true),
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    async fn issue(&self, member_id: MemberId, role: &str) -> Result<IssuedTokens, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError>;
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;
}
