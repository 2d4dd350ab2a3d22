use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{InvalidHeader, LengthRequired, MethodNotAllowed, MissingHeader, PayloadTooLarge};
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if let Some(code) = err.find::<ApiErrorCode>() {
        (*code, code.to_string())
    } else if let Some(e) = err.find::<MissingHeader>() {
        (ApiErrorCode::BadRequest, format!("Missing header: {}", e.name()))
    } else if let Some(e) = err.find::<InvalidHeader>() {
        (ApiErrorCode::BadRequest, format!("Invalid header: {}", e.name()))
    } else if err.find::<LengthRequired>().is_some() {
        (ApiErrorCode::BadRequest, "Content-Length is required".to_string())
    } else if err.find::<PayloadTooLarge>().is_some() {
        (ApiErrorCode::PayloadTooLarge, ApiErrorCode::PayloadTooLarge.to_string())
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        (ApiErrorCode::BadRequest, e.to_string())
    } else if err.find::<MethodNotAllowed>().is_some() {
        (ApiErrorCode::MethodNotAllowed, ApiErrorCode::MethodNotAllowed.to_string())
    } else if err.is_not_found() {
        (ApiErrorCode::NotFound, ApiErrorCode::NotFound.to_string())
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (ApiErrorCode::InternalError, ApiErrorCode::InternalError.to_string())
    };

    let json = warp::reply::json(&ApiError { code, message });
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Refresh token not found")]
    TokenNotFound,
    /// Same cause as `TokenNotFound`, answered with 401 on the refresh path.
    #[error("Refresh token not found")]
    RefreshTokenNotFound,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Bad request")]
    BadRequest,
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Service temporarily unavailable")]
    StoreUnavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::TokenNotFound | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::RefreshTokenNotFound
            | ApiErrorCode::TokenExpired
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        if error.is_transient() {
            warn!("Store unavailable: {}", error);
            return ApiErrorCode::StoreUnavailable;
        }
        match error {
            AuthError::TokenNotFound => ApiErrorCode::TokenNotFound,
            AuthError::TokenExpired => ApiErrorCode::TokenExpired,
            AuthError::TokenInvalid => ApiErrorCode::InvalidToken,
            AuthError::StoreUnavailable(_) => ApiErrorCode::StoreUnavailable,
            AuthError::InvalidRequest(e) => {
                debug!("Rejected request: {}", e);
                ApiErrorCode::BadRequest
            }
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_statuses() {
        let status = |e: AuthError| ApiErrorCode::from(e).status();
        assert_eq!(status(AuthError::TokenNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::TokenInvalid), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(AuthError::StoreUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(AuthError::InvalidRequest("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AuthError::InternalError("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
