//! Thin wrappers over the API's endpoint groups.
//!
//! Services hold no state beyond a shared [`ApiClient`](crate::ApiClient):
//! they pick the endpoint, shape the body and decode the reply.

mod auth;
mod notes;
mod sharing;

pub use auth::AuthService;
pub use notes::{DEFAULT_SEARCH_LIMIT, NotesService};
pub use sharing::{DEFAULT_SHARED_LIMIT, SharingService};
