pub mod account;
pub mod admin;
pub mod auth;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod resources;
pub mod settings;
pub mod token;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use settings::Settings;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use factguard_types::models::{Claim, Detection};
use tracing::error;

use crate::middleware::{require_admin, require_auth};

/// All routes, with auth layered onto the protected groups. Transport
/// concerns (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/check-email", get(auth::check_email))
        .route("/check-login-email", get(auth::check_login_email))
        .route("/health", get(|| async { "ok" }));

    let protected_routes = Router::new()
        .route("/profile", get(account::profile))
        .route("/account-update", post(account::update))
        .route("/reset-password", post(account::reset_password))
        .route("/delete-account", delete(account::delete_account))
        .route(
            "/detections",
            get(resources::list::<Detection>).post(resources::create::<Detection>),
        )
        .route(
            "/detections/{id}",
            get(resources::get::<Detection>).delete(resources::delete::<Detection>),
        )
        .route(
            "/claims",
            get(resources::list::<Claim>).post(resources::create::<Claim>),
        )
        .route(
            "/claims/{id}",
            get(resources::get::<Claim>).delete(resources::delete::<Claim>),
        )
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    // Layers run outside-in: authentication first, then the role check.
    let admin_routes = Router::new()
        .route("/admin/profile", get(admin::overview))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .layer(axum_middleware::from_fn(require_admin))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .with_state(state)
}

/// Runs blocking store or hashing work off the async runtime.
pub(crate) async fn blocking<F, T, E>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(Into::into)
}
