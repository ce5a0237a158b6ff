//! Owner-scoped handlers shared by `/detections` and `/claims`.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use factguard_db::{Resource, ResourceCollection};
use factguard_types::models::{Claim, Detection};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::{AppState, AppStateInner};
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::Caller;

/// A resource exposed over HTTP, tied to its collection in the shared state.
pub trait Stored:
    Resource<Draft: DeserializeOwned + Send + 'static> + Serialize + Send + 'static
{
    fn collection(state: &AppStateInner) -> &ResourceCollection<Self>;
}

impl Stored for Detection {
    fn collection(state: &AppStateInner) -> &ResourceCollection<Self> {
        &state.detections
    }
}

impl Stored for Claim {
    fn collection(state: &AppStateInner) -> &ResourceCollection<Self> {
        &state.claims
    }
}

pub async fn list<R: Stored>(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let records = blocking(&state, move |s| R::collection(s).list(caller.id)).await?;
    Ok(Json(records))
}

pub async fn get<R: Stored>(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let record = blocking(&state, move |s| R::collection(s).get(caller.id, &id)).await?;
    Ok(Json(record))
}

pub async fn create<R: Stored>(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Json(draft), _): WithRejection<Json<R::Draft>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let record = blocking(&state, move |s| R::collection(s).create(caller.id, draft)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn delete<R: Stored>(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    WithRejection(Path(id), _): WithRejection<Path<String>, ApiError>,
) -> Result<StatusCode, ApiError> {
    blocking(&state, move |s| R::collection(s).delete(caller.id, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
