use crate::endpoints;
use crate::error::ApiResult;
use crate::http::ApiClient;
use notes_types::{Note, NoteDraft, NoteId, NoteUpdate, Visibility};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Page size used by [`NotesService::search`] when the caller has no preference.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Note CRUD and search.
#[derive(Debug, Clone)]
pub struct NotesService {
    client: Arc<ApiClient>,
}

impl NotesService {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// All notes owned by the signed-in user.
    pub async fn list(&self) -> ApiResult<Vec<Note>> {
        self.client.get(endpoints::NOTES).await
    }

    pub async fn get(&self, id: &NoteId) -> ApiResult<Note> {
        self.client.get(&endpoints::note(id)).await
    }

    pub async fn create(&self, draft: &NoteDraft) -> ApiResult<Note> {
        let mut draft = draft.clone();
        draft.tags = normalize_tags(draft.tags);
        self.client.post(endpoints::NOTES, Some(&draft)).await
    }

    /// Applies `update`. Tag names are trimmed and deduplicated first.
    pub async fn update(&self, id: &NoteId, update: &NoteUpdate) -> ApiResult<Note> {
        let mut update = update.clone();
        update.tags = update.tags.map(normalize_tags);
        self.client.put(&endpoints::note(id), Some(&update)).await
    }

    pub async fn delete(&self, id: &NoteId) -> ApiResult<()> {
        let _: Value = self.client.delete(&endpoints::note(id)).await?;
        debug!("Deleted note {}", id);
        Ok(())
    }

    /// Full-text search. Pass `0` and [`DEFAULT_SEARCH_LIMIT`] for the first page.
    pub async fn search(&self, query: &str, skip: u32, limit: u32) -> ApiResult<Vec<Note>> {
        self.client
            .get(&endpoints::search_notes(query, skip, limit))
            .await
    }

    pub async fn by_tag(&self, tag: &str) -> ApiResult<Vec<Note>> {
        self.client.get(&endpoints::notes_by_tag(tag.trim())).await
    }

    pub async fn by_visibility(&self, visibility: Visibility) -> ApiResult<Vec<Note>> {
        self.client
            .get(&endpoints::notes_by_visibility(visibility))
            .await
    }
}

/// Trims tag names, drops blanks and keeps the first occurrence of each.
#[must_use]
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let name = tag.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_tags_trims_and_dedupes() {
        let tags = vec![" work ".into(), "".into(), "work".into(), "home".into()];
        assert_eq!(normalize_tags(tags), vec!["work", "home"]);
    }
}
