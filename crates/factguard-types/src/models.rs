use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Account as exposed to admins. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub political_leaning: Option<String>,
    pub created_at: String,
}

/// A stored fake-news analysis. The scoring itself happens upstream; this is
/// the finished record the client submits for safekeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub models: Vec<String>,
    pub confidence: f64,
    pub true_probabilities: Vec<f64>,
    pub fake_probabilities: Vec<f64>,
    pub predictions: Vec<String>,
    pub final_prediction: String,
    pub date: DateTime<Utc>,
}

/// A stored fact-check lookup. `claims`, `ratings` and `links` are aligned
/// by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_id: i64,
    pub query: String,
    pub claims: Vec<String>,
    pub ratings: Vec<String>,
    pub links: Vec<String>,
    pub language: String,
    pub date: DateTime<Utc>,
}
