use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Role;

// -- JWT Claims --

/// Session token payload. Canonical definition lives here so the token
/// service and any out-of-process verifier agree on the shape. `sub` is the
/// numeric user id rendered as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

// -- Identity --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "politicalLeaning")]
    pub political_leaning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailExistsResponse {
    pub exists: bool,
}

// -- Account --

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub political_leaning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountUpdateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "politicalLeaning")]
    pub political_leaning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// -- Admin --

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminOverview {
    pub username: String,
    pub email: String,
    pub users: u64,
    pub detections: u64,
    pub claims: u64,
}

// -- Resources --

/// Body of `POST /detections`. String and list fields default to empty so
/// that a missing field surfaces as a validation failure, not a parse one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDetection {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub models: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub true_probabilities: Vec<f64>,
    #[serde(default)]
    pub fake_probabilities: Vec<f64>,
    #[serde(default)]
    pub predictions: Vec<String>,
    #[serde(default)]
    pub final_prediction: String,
    pub date: DateTime<Utc>,
}

/// Body of `POST /claims`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClaim {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub claims: Vec<String>,
    #[serde(default)]
    pub ratings: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub language: String,
    pub date: DateTime<Utc>,
}
