use crate::endpoints;
use crate::error::ApiResult;
use crate::http::ApiClient;
use notes_types::{Note, NoteId, NoteShare, PublicLink, ShareResult};
use serde_json::Value;
use std::sync::Arc;

/// Page size used by [`SharingService::shared_with_me`] when the caller has
/// no preference.
pub const DEFAULT_SHARED_LIMIT: u32 = 20;

/// Per-user sharing and public links.
#[derive(Debug, Clone)]
pub struct SharingService {
    client: Arc<ApiClient>,
}

impl SharingService {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn share_with(&self, note_id: &NoteId, email: &str) -> ApiResult<ShareResult> {
        self.client
            .post::<Value, _>(&endpoints::share(note_id, email.trim()), None)
            .await
    }

    pub async fn unshare_with(&self, note_id: &NoteId, email: &str) -> ApiResult<ShareResult> {
        self.client
            .delete(&endpoints::share(note_id, email.trim()))
            .await
    }

    /// Notes other users shared with the signed-in user.
    pub async fn shared_with_me(&self, skip: u32, limit: u32) -> ApiResult<Vec<Note>> {
        self.client
            .get(&endpoints::shared_with_me(skip, limit))
            .await
    }

    /// Who `note_id` is shared with.
    pub async fn note_shares(&self, note_id: &NoteId) -> ApiResult<Vec<NoteShare>> {
        self.client.get(&endpoints::note_shares(note_id)).await
    }

    pub async fn create_public_link(&self, note_id: &NoteId) -> ApiResult<PublicLink> {
        self.client
            .post::<Value, _>(&endpoints::public_link(note_id), None)
            .await
    }

    pub async fn revoke_public_link(&self, note_id: &NoteId) -> ApiResult<ShareResult> {
        self.client.delete(&endpoints::public_link(note_id)).await
    }

    /// Reads a note through its public token. Works without a session.
    pub async fn public_note(&self, token: &str) -> ApiResult<Note> {
        self.client.get(&endpoints::public_note(token)).await
    }
}
