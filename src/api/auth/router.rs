use super::handler;
use super::middleware::require_principal;
use crate::application_port::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub const REFRESH_TOKEN_HEADER: &str = "refresh-token";

/// `{memberId, role}` fits comfortably; anything larger is not an issue request.
pub const MAX_ISSUE_BODY_BYTES: u64 = 4 * 1024;

/// `/auth/...` routes. Path segments are matched before the method so an
/// unknown path answers 404 rather than 405.
pub fn routes(
    token_service: Arc<dyn TokenService>,
    token_codec: Arc<dyn TokenCodec>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let issue = warp::path("issue")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_ISSUE_BODY_BYTES))
        .and(warp::body::json())
        .and(with(token_service.clone()))
        .and_then(handler::issue);

    let refresh = warp::path("refresh")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::<String>(REFRESH_TOKEN_HEADER))
        .and(with(token_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::path("logout")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::<String>(REFRESH_TOKEN_HEADER))
        .and(with(token_service))
        .and_then(handler::logout);

    let me = warp::path("me")
        .and(warp::path::end())
        .and(warp::get())
        .and(require_principal(token_codec))
        .and_then(handler::me);

    warp::path("auth").and(issue.or(refresh).or(logout).or(me))
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
