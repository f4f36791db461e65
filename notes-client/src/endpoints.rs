//! Relative endpoint paths. Every dynamic segment is percent-encoded.

use notes_types::{NoteId, Visibility};
use urlencoding::encode;

pub const REGISTER: &str = "/auth/register";
pub const LOGIN: &str = "/auth/login";
pub const LOGOUT: &str = "/auth/logout";
pub const REFRESH: &str = "/auth/refresh";
pub const ME: &str = "/auth/me";
pub const NOTES: &str = "/notes/notes/";

pub fn note(id: &NoteId) -> String {
    format!("/notes/notes/{}", encode(id.as_str()))
}

pub fn search_notes(query: &str, skip: u32, limit: u32) -> String {
    format!(
        "/notes/notes/search/?query={}&skip={skip}&limit={limit}",
        encode(query)
    )
}

pub fn notes_by_visibility(visibility: Visibility) -> String {
    format!("/notes/notes/filter/visibility/{}", visibility.as_wire())
}

pub fn notes_by_tag(tag: &str) -> String {
    format!("/search/tags?tag={}", encode(tag))
}

pub fn share(note_id: &NoteId, email: &str) -> String {
    format!(
        "/sharing/{}/share/{}",
        encode(note_id.as_str()),
        encode(email)
    )
}

pub fn shared_with_me(skip: u32, limit: u32) -> String {
    format!("/shared-with-me?skip={skip}&limit={limit}")
}

pub fn note_shares(note_id: &NoteId) -> String {
    format!("/notes/{}/shared-with", encode(note_id.as_str()))
}

pub fn public_link(note_id: &NoteId) -> String {
    format!("/sharing/notes/{}/public-link", encode(note_id.as_str()))
}

pub fn public_note(token: &str) -> String {
    format!("/public/{}", encode(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_dynamic_segments() {
        let id = NoteId::new("7");
        assert_eq!(share(&id, "a+b@c.com"), "/sharing/7/share/a%2Bb%40c.com");
        assert_eq!(
            search_notes("hello world", 0, 10),
            "/notes/notes/search/?query=hello%20world&skip=0&limit=10"
        );
        assert_eq!(public_note("x/y"), "/public/x%2Fy");
    }

    #[test]
    fn visibility_uses_wire_names() {
        assert_eq!(
            notes_by_visibility(Visibility::Shared),
            "/notes/notes/filter/visibility/partage"
        );
    }
}
