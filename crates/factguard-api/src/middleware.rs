use axum::{
    Extension,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use factguard_types::models::Role;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// Identity resolved from a verified session token. Handlers take it from
/// the request extensions; it is never read from a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

/// Extract and validate the bearer token from the Authorization header.
///
/// No header (or no bearer token in it) is 403; any token failure is 401.
/// A token whose subject no longer exists is treated as invalid, which is
/// what shuts out tokens of deleted accounts before they expire.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingToken)?;

        state.tokens.verify(token)?
    };

    let user_id = caller.id;
    let known = blocking(&state, move |s| s.db.get_user_by_id(user_id)).await?;
    if known.is_none() {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

/// Layered inside `require_auth` on admin-only routes.
pub async fn require_admin(
    Extension(caller): Extension<Caller>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if caller.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(next.run(req).await)
}
