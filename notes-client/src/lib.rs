//! Access layer for the notes API.
//!
//! This crate owns everything between the UI and the backend:
//! - [`ApiClient`]: request execution, header injection, error normalization
//! - [`CredentialStore`]: persisted token, refresh token and user
//! - [`SessionController`]: login, logout, refresh and 401 handling
//! - [`classify`]: user-facing messages from any error envelope
//! - [`AuthService`], [`NotesService`], [`SharingService`]: endpoint wrappers
//!
//! # Example
//!
//! ```no_run
//! use notes_client::{ClientConfig, NotesClient};
//!
//! # async fn run() -> notes_client::ApiResult<()> {
//! let client = NotesClient::from_config(&ClientConfig::from_env()?)?;
//! client.session().restore();
//! for note in client.notes().list().await? {
//!     println!("{}", note.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
mod config;
pub mod credentials;
pub mod endpoints;
mod error;
pub mod generation;
mod http;
mod interceptor;
mod services;
mod session;
pub mod token;

pub use config::{
    ClientConfig, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_CREDENTIALS_PATH, ENV_TIMEOUT_SECS,
};
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use error::{
    ApiError, ApiResult, AUTHENTICATION_EXPIRED_CODE, NormalizedError, RawPayload,
    SESSION_EXPIRED_MESSAGE,
};
pub use generation::{Generation, Generations, Latest};
pub use http::{ApiClient, ApiRequest, RequestBody, default_headers, normalize_failure};
pub use interceptor::{ResponseContext, ResponseInterceptor, TracingInterceptor};
pub use services::{
    AuthService, DEFAULT_SEARCH_LIMIT, DEFAULT_SHARED_LIMIT, NotesService, SharingService,
};
pub use session::{SessionController, SessionSignal, SessionState, SessionStatus};

use std::sync::Arc;

/// Everything a front end needs, wired to one session.
#[derive(Debug, Clone)]
pub struct NotesClient {
    api: Arc<ApiClient>,
    session: SessionController,
    auth: AuthService,
    notes: NotesService,
    sharing: SharingService,
}

impl NotesClient {
    /// Builds a client over `store`.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> ApiResult<Self> {
        let api = ApiClient::new(config, SessionState::new(store))?;
        Ok(Self::from_api(Arc::new(api)))
    }

    /// Builds a client persisting credentials to the configured file.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let store = FileCredentialStore::open(config.resolve_credentials_path()?)?;
        Self::new(config, Arc::new(store))
    }

    /// Wraps an already configured [`ApiClient`], e.g. one with extra
    /// interceptors.
    #[must_use]
    pub fn from_api(api: Arc<ApiClient>) -> Self {
        Self {
            session: SessionController::new(api.clone()),
            auth: AuthService::new(api.clone()),
            notes: NotesService::new(api.clone()),
            sharing: SharingService::new(api.clone()),
            api,
        }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub fn notes(&self) -> &NotesService {
        &self.notes
    }

    #[must_use]
    pub fn sharing(&self) -> &SharingService {
        &self.sharing
    }
}
