//! Client-side filtering of an already loaded note list.

use crate::note::{Note, Visibility};

/// Narrows a note list by free text, visibility and tags.
///
/// Every criterion that is set must match. Tags match if the note carries
/// all of the requested names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub search: Option<String>,
    pub visibility: Option<Visibility>,
    pub tags: Vec<String>,
}

impl NoteFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    #[must_use]
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(name.into());
        self
    }

    /// Returns true if `note` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(v) = self.visibility {
            if note.visibility != v {
                return false;
            }
        }
        if let Some(text) = &self.search {
            if !note.mentions(text.trim()) {
                return false;
            }
        }
        self.tags.iter().all(|t| note.has_tag(t))
    }

    /// Returns the matching notes, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        notes.iter().filter(|n| self.matches(n)).collect()
    }
}
