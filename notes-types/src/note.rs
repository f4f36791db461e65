//! Notes, tags and visibility levels.

use crate::ids::{NoteId, TagId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who can read a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Only the owner.
    #[default]
    #[serde(rename = "prive", alias = "private")]
    Private,
    /// The owner and the users it was shared with.
    #[serde(rename = "partage", alias = "shared")]
    Shared,
    /// Anyone holding the public link.
    #[serde(rename = "public")]
    Public,
}

impl Visibility {
    /// All visibility levels, in increasing order of exposure.
    pub const ALL: [Self; 3] = [Self::Private, Self::Shared, Self::Public];

    /// Returns the name the backend uses for this level.
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Private => "prive",
            Self::Shared => "partage",
            Self::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Visibility {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prive" | "private" => Ok(Self::Private),
            "partage" | "shared" => Ok(Self::Shared),
            "public" => Ok(Self::Public),
            other => Err(crate::Error::InvalidVisibility(other.to_string())),
        }
    }
}

/// A tag attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    #[serde(rename = "nom", alias = "name")]
    pub name: String,
}

/// A note as returned by the backend.
///
/// Public-link reads omit the owner and visibility, so those fall back to
/// defaults. Timestamps are kept exactly as the backend sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(rename = "titre", alias = "title")]
    pub title: String,
    #[serde(rename = "contenu", alias = "content")]
    pub content: String,
    #[serde(rename = "visibilite", alias = "visibility", default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(alias = "utilisateur_id", default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
    #[serde(
        rename = "token_publique",
        alias = "public_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_token: Option<String>,
    #[serde(rename = "date_creation", alias = "created_at", default)]
    pub created_at: Option<String>,
    #[serde(rename = "date_modification", alias = "updated_at", default)]
    pub updated_at: Option<String>,
}

impl Note {
    /// Returns the tag names in the order the backend sent them.
    #[must_use]
    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }

    /// Returns true if the note carries a tag with this name (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if the title or content contains `needle` (case-insensitive).
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
    }
}

/// Payload for creating a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "contenu")]
    pub content: String,
    #[serde(rename = "visibilite")]
    pub visibility: Visibility,
    /// Tag names; the backend creates missing tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NoteDraft {
    /// Creates a private, untagged draft.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            visibility: Visibility::Private,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of a note. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteUpdate {
    #[serde(rename = "titre", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "contenu", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "visibilite", skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Tag names. The backend replaces the whole tag set when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NoteUpdate {
    /// Builds a full update from an edited note, reducing its tags to names.
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: Some(note.title.clone()),
            content: Some(note.content.clone()),
            visibility: Some(note.visibility),
            tags: Some(note.tag_names()),
        }
    }

    /// Replaces the tag set with the names of `tags`.
    #[must_use]
    pub fn with_tags(mut self, tags: &[Tag]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.name.clone()).collect());
        self
    }

    /// Returns true if the update would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.visibility.is_none()
            && self.tags.is_none()
    }
}
