use super::error::ApiErrorCode;
use crate::application_port::*;
use crate::domain_model::*;
use std::sync::Arc;
use warp::http::HeaderValue;
use warp::http::header::{AUTHORIZATION, HeaderMap};
use warp::{Filter, Rejection, reject};

const BEARER_PREFIX: &str = "Bearer ";

/// Result of inspecting one request's `Authorization` header.
#[derive(Debug)]
pub enum AuthOutcome {
    /// No bearer credential; downstream decides whether that is acceptable.
    Anonymous,
    Rejected(AuthError),
    Authenticated(Principal),
}

/// Signature and expiry only. The refresh-token store is never consulted, so a
/// logged-out access token stays usable until its own expiry.
pub fn authenticate(codec: &dyn TokenCodec, authorization: Option<&HeaderValue>) -> AuthOutcome {
    let Some(authorization) = authorization else {
        return AuthOutcome::Anonymous;
    };
    // A header that is present but not text can never carry a token.
    let Ok(authorization) = authorization.to_str() else {
        return AuthOutcome::Rejected(AuthError::TokenInvalid);
    };
    let Some(token) = authorization.strip_prefix(BEARER_PREFIX) else {
        return AuthOutcome::Anonymous;
    };

    match codec.verify(token.trim()) {
        Ok(claims) if claims.category == TokenCategory::Access => {
            AuthOutcome::Authenticated(Principal {
                member_id: claims.member_id,
                role: claims.role,
            })
        }
        Ok(_) => AuthOutcome::Rejected(AuthError::TokenInvalid),
        Err(e) => AuthOutcome::Rejected(e.into()),
    }
}

pub fn with_principal(
    codec: Arc<dyn TokenCodec>,
) -> impl Filter<Extract = (Option<Principal>,), Error = Rejection> + Clone {
    // Raw map rather than `warp::header::optional`, which turns non-text
    // values into an `InvalidHeader` rejection before we see them.
    warp::header::headers_cloned().and_then(
        move |headers: HeaderMap| {
            let codec = codec.clone();
            async move {
                match authenticate(codec.as_ref(), headers.get(AUTHORIZATION)) {
                    AuthOutcome::Anonymous => Ok(None),
                    AuthOutcome::Authenticated(principal) => Ok(Some(principal)),
                    AuthOutcome::Rejected(e) => Err(reject::custom(ApiErrorCode::from(e))),
                }
            }
        },
    )
}

pub fn require_principal(
    codec: Arc<dyn TokenCodec>,
) -> impl Filter<Extract = (Principal,), Error = Rejection> + Clone {
    with_principal(codec).and_then(|principal: Option<Principal>| async move {
        principal.ok_or_else(|| reject::custom(ApiErrorCode::Unauthenticated))
    })
}
