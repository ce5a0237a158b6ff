use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use factguard_types::api::{AdminOverview, MessageResponse};
use factguard_types::models::User;
use tracing::info;

use crate::account::remove_account;
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::Caller;

/// GET /admin/profile: the admin's own identity plus store-wide counts.
pub async fn overview(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = blocking(&state, move |s| {
        let me = s
            .db
            .get_user_by_id(caller.id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        Ok::<_, ApiError>(AdminOverview {
            username: me.username,
            email: me.email,
            users: s.db.count_users()?,
            detections: s.detections.count_all()?,
            claims: s.claims.count_all()?,
        })
    })
    .await?;

    Ok(Json(overview))
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = blocking(&state, |s| s.db.list_users()).await?;
    Ok(Json(users.into_iter().map(User::from).collect::<Vec<_>>()))
}

/// DELETE /users/{id}: same cascade as a self-service account deletion.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Path(user_id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(&state, move |s| remove_account(s, user_id)).await?;
    info!("Admin {} deleted user {}", caller.id, user_id);
    Ok(Json(MessageResponse::new("User deleted successfully.")))
}
