mod common;

use common::{client_with, signed_in};
use notes_client::{Credentials, DEFAULT_SEARCH_LIMIT, DEFAULT_SHARED_LIMIT};
use notes_types::{NoteDraft, NoteId, NoteUpdate, Tag, TagId, Visibility};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn note_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "titre": title,
        "contenu": "body",
        "visibilite": "prive",
        "tags": [{"id": 1, "nom": "work"}],
        "owner_id": 42,
        "date_creation": "2024-01-01T10:00:00"
    })
}

// ── Auth ────────────────────────────────────────────────────────

#[tokio::test]
async fn register_sends_localized_password_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({"email": "a@b.com", "mot_de_passe": "secret"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Credentials::default());
    let response = client.auth().register("a@b.com", "secret").await.unwrap();
    assert_eq!(response.message, "created");
}

#[tokio::test]
async fn me_decodes_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42, "email": "a@b.com", "est_actif": false, "date_creation": "2024-01-01"
        })))
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let profile = client.auth().me().await.unwrap();
    assert_eq!(profile.email, "a@b.com");
    assert!(!profile.is_active);
}

// ── Notes ───────────────────────────────────────────────────────

#[tokio::test]
async fn list_and_get_notes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/notes/"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([note_json(1, "a"), note_json(2, "b")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes/notes/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(note_json(2, "b")))
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let notes = client.notes().list().await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].tag_names(), vec!["work"]);

    let note = client.notes().get(&NoteId::new("2")).await.unwrap();
    assert_eq!(note.title, "b");
    assert_eq!(note.visibility, Visibility::Private);
}

#[tokio::test]
async fn create_sends_draft_with_normalized_tags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notes/notes/"))
        .and(body_json(json!({
            "titre": "t",
            "contenu": "c",
            "visibilite": "partage",
            "tags": ["work", "home"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(note_json(5, "t")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let draft = NoteDraft::new("t", "c")
        .with_visibility(Visibility::Shared)
        .with_tags([" work", "home", "", "work "]);
    let note = client.notes().create(&draft).await.unwrap();
    assert_eq!(note.id, NoteId::new("5"));
}

#[tokio::test]
async fn update_sends_tag_names_only() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/notes/notes/5"))
        .and(body_json(json!({"titre": "renamed", "tags": ["work", "ideas"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(note_json(5, "renamed")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let tags = [
        Tag {
            id: TagId::new("1"),
            name: "work".into(),
        },
        Tag {
            id: TagId::new("2"),
            name: "ideas".into(),
        },
    ];
    let update = NoteUpdate {
        title: Some("renamed".into()),
        ..Default::default()
    }
    .with_tags(&tags);

    let note = client
        .notes()
        .update(&NoteId::new("5"), &update)
        .await
        .unwrap();
    assert_eq!(note.title, "renamed");
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/notes/notes/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    client.notes().delete(&NoteId::new("5")).await.unwrap();
}

#[tokio::test]
async fn search_encodes_query_and_paging() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/notes/search/"))
        .and(query_param("query", "rust & go"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([note_json(1, "a")])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let notes = client
        .notes()
        .search("rust & go", 0, DEFAULT_SEARCH_LIMIT)
        .await
        .unwrap();
    assert_eq!(notes.len(), 1);
}

#[tokio::test]
async fn by_tag_and_by_visibility() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/tags"))
        .and(query_param("tag", "c++"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes/notes/filter/visibility/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([note_json(3, "p")])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    assert!(client.notes().by_tag(" c++ ").await.unwrap().is_empty());
    let public = client
        .notes()
        .by_visibility(Visibility::Public)
        .await
        .unwrap();
    assert_eq!(public.len(), 1);
}

// ── Sharing ─────────────────────────────────────────────────────

#[tokio::test]
async fn share_and_unshare_encode_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sharing/5/share/friend%2Btag%40b.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Note shared"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/sharing/5/share/friend%2Btag%40b.com"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let id = NoteId::new("5");

    let shared = client.sharing().share_with(&id, "friend+tag@b.com").await.unwrap();
    assert_eq!(shared.message, "Note shared");
    assert!(shared.success);

    let unshared = client.sharing().unshare_with(&id, "friend+tag@b.com").await.unwrap();
    assert!(unshared.success);
}

#[tokio::test]
async fn share_with_unknown_user_surfaces_structured_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "{'status': 'error', 'code': 'USER_NOT_FOUND', 'message': 'no such user'}"
        })))
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let err = client
        .sharing()
        .share_with(&NoteId::new("5"), "ghost@b.com")
        .await
        .unwrap_err();

    assert_eq!(err.user_message("Could not share"), "no such user");
    assert_eq!(err.structured().unwrap().code, "USER_NOT_FOUND");
}

#[tokio::test]
async fn shared_with_me_and_note_shares() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shared-with-me"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([note_json(7, "s")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes/7/shared-with"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"user_email": "c@d.com", "shared_at": 1_700_000_000},
            {"email": "e@f.com", "date_partage": "2024-02-02"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let notes = client
        .sharing()
        .shared_with_me(0, DEFAULT_SHARED_LIMIT)
        .await
        .unwrap();
    assert_eq!(notes[0].id, NoteId::new("7"));

    let shares = client.sharing().note_shares(&NoteId::new("7")).await.unwrap();
    let emails: Vec<_> = shares.iter().map(|s| s.user_email.as_str()).collect();
    assert_eq!(emails, vec!["c@d.com", "e@f.com"]);
}

#[tokio::test]
async fn public_link_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sharing/notes/5/public-link"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_token": "abc",
            "public_url": "http://localhost:3000/public/abc",
            "message": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/sharing/notes/5/public-link"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "revoked"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "titre": "open", "contenu": "hello", "tags": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, signed_in("t1"));
    let id = NoteId::new("5");

    let link = client.sharing().create_public_link(&id).await.unwrap();
    assert_eq!(link.public_token, "abc");

    let revoked = client.sharing().revoke_public_link(&id).await.unwrap();
    assert_eq!(revoked.message, "revoked");

    let note = client.sharing().public_note("abc").await.unwrap();
    assert_eq!(note.title, "open");
    assert_eq!(note.owner_id, None);
}

#[tokio::test]
async fn public_note_works_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "titre": "open", "contenu": "hello"
        })))
        .mount(&server)
        .await;

    let (client, _) = client_with(&server, Credentials::default());
    let note = client.sharing().public_note("xyz").await.unwrap();
    assert_eq!(note.id, NoteId::new("9"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}
