use axum::{Extension, Json, extract::State, response::IntoResponse};
use axum_extra::extract::WithRejection;
use factguard_types::api::{
    AccountUpdateRequest, MessageResponse, ProfileResponse, ResetPasswordRequest,
};
use tracing::{info, warn};

use crate::auth::{AppState, AppStateInner};
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::Caller;

pub async fn profile(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(&state, move |s| s.db.get_user_by_id(caller.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        username: user.username,
        email: user.email,
        role: user.role,
        political_leaning: user.political_leaning,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Json(req), _): WithRejection<Json<AccountUpdateRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |s| {
        s.credentials.update_profile(
            caller.id,
            &req.name,
            &req.email,
            req.political_leaning.as_deref(),
        )
    })
    .await?;

    Ok(Json(MessageResponse::new("Profile updated successfully.")))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Json(req), _): WithRejection<Json<ResetPasswordRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |s| {
        s.credentials
            .update_password(caller.id, &req.old_password, &req.new_password)
    })
    .await?;

    Ok(Json(MessageResponse::new("Password reset successfully.")))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |s| remove_account(s, caller.id)).await?;
    Ok(Json(MessageResponse::new("Account deleted successfully.")))
}

/// Deletes the user row, then the user's claims and detections.
///
/// The three steps share no transaction. Once the user row is gone the
/// deletion counts as done: a failing fan-out step is logged and the
/// orphaned rows are left behind.
pub(crate) fn remove_account(state: &AppStateInner, user_id: i64) -> Result<(), ApiError> {
    state.credentials.delete_user(user_id)?;

    match state.claims.delete_all_for_owner(user_id) {
        Ok(n) => info!("Deleted {} claims of user {}", n, user_id),
        Err(e) => warn!("Failed to delete claims of user {}: {}", user_id, e),
    }
    match state.detections.delete_all_for_owner(user_id) {
        Ok(n) => info!("Deleted {} detections of user {}", n, user_id),
        Err(e) => warn!("Failed to delete detections of user {}: {}", user_id, e),
    }

    info!("Account {} deleted", user_id);
    Ok(())
}
