use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::RefreshTokenStore;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TokenTtl {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtl {
    fn default() -> Self {
        TokenTtl {
            access: Duration::from_secs(30 * 60),           // 30 minutes
            refresh: Duration::from_secs(14 * 24 * 60 * 60), // 14 days
        }
    }
}

pub struct RealTokenService {
    token_codec: Arc<dyn TokenCodec>,
    token_store: Arc<dyn RefreshTokenStore>,
    ttl: TokenTtl,
}

impl RealTokenService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        token_store: Arc<dyn RefreshTokenStore>,
        ttl: TokenTtl,
    ) -> Self {
        Self {
            token_codec,
            token_store,
            ttl,
        }
    }

    fn validate_role(role: &str) -> Result<(), AuthError> {
        if role.trim().is_empty() {
            return Err(AuthError::InvalidRequest("role must not be blank".to_string()));
        }
        Ok(())
    }

    fn sign_access(&self, member_id: MemberId, role: &str) -> Result<AccessToken, AuthError> {
        let (token, _) =
            self.token_codec
                .sign(TokenCategory::Access, member_id, role, self.ttl.access)?;
        Ok(AccessToken(token))
    }
}

#[async_trait::async_trait]
impl TokenService for RealTokenService {
    async fn issue(&self, member_id: MemberId, role: &str) -> Result<IssuedTokens, AuthError> {
        Self::validate_role(role)?;

        let access_token = self.sign_access(member_id, role)?;
        let (refresh_token, refresh_exp) =
            self.token_codec
                .sign(TokenCategory::Refresh, member_id, role, self.ttl.refresh)?;

        if refresh_token.len() > MAX_TOKEN_LEN {
            return Err(AuthError::InvalidRequest(format!(
                "refresh token exceeds {MAX_TOKEN_LEN} chars; role is too long"
            )));
        }

        self.token_store
            .upsert(member_id, &refresh_token, refresh_exp)
            .await?;

        debug!(%member_id, %refresh_exp, "issued token pair");
        Ok(IssuedTokens {
            access_token,
            refresh_token: RefreshToken(refresh_token),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        // The store is the revocation authority: a deleted or replaced token is
        // dead even while its signature still checks out.
        let record = self
            .token_store
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        let claims = self.token_codec.verify(refresh_token)?;

        let access_token = self.sign_access(record.member_id, &claims.role)?;
        debug!(member_id = %record.member_id, "refreshed access token");
        Ok(access_token)
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let record = self
            .token_store
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if !self.token_store.delete_by_token(&record.token).await? {
            return Err(AuthError::TokenNotFound);
        }

        debug!(member_id = %record.member_id, "refresh token revoked");
        Ok(())
    }
}
