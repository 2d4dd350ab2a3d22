use crate::application_port::{CodecError, TokenCodec};
use crate::domain_model::{MemberId, TokenCategory, TokenClaims};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::Duration;

/// HS256 codec over a single shared secret.
pub struct JwtHs256Codec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn new(signing_key: &[u8]) -> anyhow::Result<Self> {
        anyhow::ensure!(!signing_key.is_empty(), "signing key must not be empty");

        // Expiry lives in our own `expiresAt` claim and is checked after the
        // signature, so the library only verifies the MAC and the algorithm.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(JwtHs256Codec {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        })
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn encode_claims(&self, claims: &TokenClaims) -> Result<String, CodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CodecError::Signing(e.to_string()))
    }
}

#[inline]
fn classify(error: jsonwebtoken::errors::Error) -> CodecError {
    match error.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => CodecError::BadSignature,
        _ => CodecError::Malformed,
    }
}

impl TokenCodec for JwtHs256Codec {
    fn sign(
        &self,
        category: TokenCategory,
        member_id: MemberId,
        role: &str,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), CodecError> {
        let ttl = TimeDelta::from_std(ttl).map_err(|e| CodecError::Signing(e.to_string()))?;
        let issued_at = Utc::now().trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| CodecError::Signing("ttl out of range".to_string()))?;

        let claims = TokenClaims {
            category,
            member_id,
            role: role.to_owned(),
            issued_at,
            expires_at,
            jti: Self::gen_jti(),
        };
        let token = self.encode_claims(&claims)?;
        Ok((token, expires_at))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, CodecError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify)?;

        if data.claims.is_expired_at(Utc::now()) {
            return Err(CodecError::Expired);
        }
        Ok(data.claims)
    }
}
