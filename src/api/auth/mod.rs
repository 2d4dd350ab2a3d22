mod error;
mod handler;
mod middleware;
mod router;

pub use error::{ApiError, ApiErrorCode, recover_error};
pub use handler::{IssueRequest, RefreshResponse};
pub use middleware::{AuthOutcome, authenticate, require_principal, with_principal};
pub use router::{MAX_ISSUE_BODY_BYTES, REFRESH_TOKEN_HEADER, routes};
