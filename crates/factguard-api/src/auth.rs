use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use factguard_db::{Database, IdentifierAllocator, ResourceCollection};
use factguard_types::api::{
    EmailExistsResponse, EmailQuery, LoginRequest, SignupRequest, TokenResponse,
};
use factguard_types::models::{Claim, Detection};
use tracing::info;

use crate::blocking;
use crate::credentials::CredentialStore;
use crate::error::ApiError;
use crate::settings::Settings;
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

/// Process-wide state, built once from [`Settings`] and never mutated.
pub struct AppStateInner {
    pub db: Arc<Database>,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub detections: ResourceCollection<Detection>,
    pub claims: ResourceCollection<Claim>,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, settings: &Settings) -> anyhow::Result<Self> {
        let allocator =
            IdentifierAllocator::new(settings.identifier_digits, settings.identifier_attempts);

        Ok(Self {
            tokens: TokenService::new(&settings.jwt_secret),
            credentials: CredentialStore::new(db.clone(), settings)?,
            detections: ResourceCollection::new(db.clone(), allocator),
            claims: ResourceCollection::new(db.clone(), allocator),
            db,
        })
    }
}

pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<SignupRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let (user_id, role) = blocking(&state, move |s| {
        s.credentials.create(
            &req.username,
            &req.email,
            &req.password,
            req.political_leaning.as_deref(),
        )
    })
    .await?;

    let token = state.tokens.issue(user_id, role)?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "User registered successfully".into(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".into(),
        ));
    }

    let user = blocking(&state, move |s| s.credentials.verify(&req.email, &req.password)).await?;
    let token = state.tokens.issue(user.id, user.role)?;
    info!("User {} logged in", user.id);

    Ok(Json(TokenResponse {
        message: "Login successful".into(),
        token,
    }))
}

/// GET /check-email: signup-form probe, always 200.
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let exists = email_exists(&state, query).await?;
    Ok(Json(EmailExistsResponse { exists }))
}

/// GET /check-login-email: login-form probe, 404 for unknown emails.
pub async fn check_login_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !email_exists(&state, query).await? {
        return Err(ApiError::NotFound(
            "User not registered. Redirecting to Sign Up...".into(),
        ));
    }
    Ok(Json(EmailExistsResponse { exists: true }))
}

async fn email_exists(state: &AppState, query: EmailQuery) -> Result<bool, ApiError> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("email is required".into()))?;

    let user = blocking(state, move |s| s.db.get_user_by_email(&email)).await?;
    Ok(user.is_some())
}
