use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub member_id: MemberId,
    pub role: String,
}

pub async fn issue(
    body: IssueRequest,
    token_service: Arc<dyn TokenService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let tokens = token_service
        .issue(body.member_id, &body.role)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&tokens))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: AccessToken,
}

pub async fn refresh(
    refresh_token: String,
    token_service: Arc<dyn TokenService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let access_token = token_service
        .refresh(&refresh_token)
        .await
        .map_err(|e| match e {
            AuthError::TokenNotFound => ApiErrorCode::RefreshTokenNotFound,
            e => ApiErrorCode::from(e),
        })
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&RefreshResponse { access_token }))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

pub async fn logout(
    refresh_token: String,
    token_service: Arc<dyn TokenService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    token_service
        .logout(&refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&LogoutResponse {
        message: "Logged out",
    }))
}

pub async fn me(principal: Principal) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&principal))
}
