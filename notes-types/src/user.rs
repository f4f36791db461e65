//! Users and authentication payloads.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// The signed-in user as cached by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

/// Account details returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "est_actif", alias = "is_active", default = "default_active")]
    pub is_active: bool,
    #[serde(rename = "date_creation", alias = "created_at", default)]
    pub created_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl From<UserProfile> for User {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
        }
    }
}

/// Body of a successful `POST /auth/login` (or `/auth/refresh`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Some deployments embed the user; most only return tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}
