//! Shared test helpers for client tests.

#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use notes_client::{
    ApiClient, ApiResult, ClientConfig, CredentialStore, Credentials, MemoryCredentialStore,
    NotesClient, SessionState,
};
use notes_types::{User, UserId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::MockServer;

/// Config pointing at a mock server.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        credentials_path: None,
    }
}

/// Builds an unsigned `header.payload.signature` token around `claims`.
pub fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
    format!("{header}.{payload}.signature")
}

pub fn test_user() -> User {
    User {
        id: UserId::new("42"),
        email: "a@b.com".to_string(),
    }
}

/// Credentials for a signed-in `a@b.com`.
pub fn signed_in(token: &str) -> Credentials {
    Credentials {
        token: Some(token.to_string()),
        refresh_token: Some("r1".to_string()),
        user: Some(test_user()),
    }
}

/// Client over an in-memory store holding `credentials`.
pub fn client_with(
    server: &MockServer,
    credentials: Credentials,
) -> (NotesClient, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::with_credentials(credentials));
    let client = NotesClient::new(&config_for(server), store.clone()).expect("valid config");
    (client, store)
}

/// Client whose base URL refuses connections.
pub fn offline_client(credentials: Credentials) -> (NotesClient, Arc<MemoryCredentialStore>) {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
        credentials_path: None,
    };
    let store = Arc::new(MemoryCredentialStore::with_credentials(credentials));
    let client = NotesClient::new(&config, store.clone()).expect("valid config");
    (client, store)
}

/// Bare executor over `store`.
pub fn api_with(server: &MockServer, store: Arc<dyn CredentialStore>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&config_for(server), SessionState::new(store)).expect("valid config"))
}

/// In-memory store that counts how often it is cleared.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryCredentialStore,
    clears: AtomicUsize,
}

impl CountingStore {
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: MemoryCredentialStore::with_credentials(credentials),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialStore for CountingStore {
    fn snapshot(&self) -> Credentials {
        self.inner.snapshot()
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Credentials)) -> ApiResult<()> {
        self.inner.update(apply)
    }

    fn clear_all(&self) -> ApiResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear_all()
    }
}
