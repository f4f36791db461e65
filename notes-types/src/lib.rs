//! Domain types for the notes API client.
//!
//! These are the entities the backend returns and accepts:
//! - Notes, tags and visibility levels
//! - Users and profiles
//! - Sharing results and public links
//! - Client-side note filtering
//!
//! The backend speaks a localized field set (`titre`, `contenu`,
//! `visibilite`, ...). That is what gets serialized. Older English field
//! names are still accepted when decoding.

mod filter;
mod ids;
mod note;
mod sharing;
mod user;

pub use filter::NoteFilter;
pub use ids::{NoteId, TagId, UserId};
pub use note::{Note, NoteDraft, NoteUpdate, Tag, Visibility};
pub use sharing::{MessageResponse, NoteShare, PublicLink, ShareResult};
pub use user::{LoginResponse, User, UserProfile};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid visibility: {0}")]
    InvalidVisibility(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
