//! Sharing results and public links.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bare `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Outcome of sharing or unsharing a note, or revoking a public link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareResult {
    #[serde(default)]
    pub message: String,
    /// Absent in most backend replies; a reply without an error is a success.
    #[serde(default = "default_success")]
    pub success: bool,
}

fn default_success() -> bool {
    true
}

/// A freshly created public link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicLink {
    #[serde(alias = "token_publique", alias = "token")]
    pub public_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One recipient of a shared note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteShare {
    #[serde(alias = "email")]
    pub user_email: String,
    /// Sent as a timestamp string by some deployments and as a number by others.
    #[serde(alias = "date_partage", default, skip_serializing_if = "Option::is_none")]
    pub shared_at: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
}
