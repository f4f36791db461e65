use notes_types::{LoginResponse, NoteShare, PublicLink, ShareResult, User, UserProfile};
use serde_json::json;

#[test]
fn share_result_defaults_to_success() {
    let r: ShareResult = serde_json::from_value(json!({ "message": "Note partagée" })).unwrap();
    assert!(r.success);
    assert_eq!(r.message, "Note partagée");
}

#[test]
fn public_link_accepts_backend_token_key() {
    let link: PublicLink = serde_json::from_value(json!({
        "message": "Lien public créé",
        "public_url": "/api/v1/notes/public/abc",
        "token": "abc"
    }))
    .unwrap();
    assert_eq!(link.public_token, "abc");
    assert_eq!(link.public_url.as_deref(), Some("/api/v1/notes/public/abc"));
}

#[test]
fn note_share_tolerates_numeric_timestamp() {
    let share: NoteShare = serde_json::from_value(json!({
        "email": "bob@example.com",
        "shared_at": 12,
        "can_edit": false
    }))
    .unwrap();
    assert_eq!(share.user_email, "bob@example.com");
    assert_eq!(share.shared_at, Some(json!(12)));
    assert_eq!(share.can_edit, Some(false));
}

#[test]
fn login_response_with_only_access_token() {
    let r: LoginResponse = serde_json::from_value(json!({ "access_token": "t1" })).unwrap();
    assert_eq!(r.access_token, "t1");
    assert!(r.refresh_token.is_none());
    assert!(r.user.is_none());
}

#[test]
fn profile_converts_to_user() {
    let profile: UserProfile = serde_json::from_value(json!({
        "id": 3,
        "email": "a@b.com",
        "est_actif": true,
        "date_creation": "2024-01-01T00:00:00"
    }))
    .unwrap();
    assert!(profile.is_active);
    let user = User::from(profile);
    assert_eq!(user.id.as_str(), "3");
    assert_eq!(user.email, "a@b.com");
}
