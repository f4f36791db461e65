//! Session ownership and lifecycle.
//!
//! [`SessionState`] is the single writer of the credential store. The
//! executor holds it to read the bearer token and to expire the session on
//! a 401; [`SessionController`] holds it to sign in and out. UI code reads
//! the current [`SessionStatus`] through a `watch` channel and listens for
//! [`SessionSignal::LoginRequired`] on a `broadcast` channel.

use crate::credentials::{CredentialStore, Credentials};
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, normalize_failure};
use crate::services::AuthService;
use crate::token;
use notes_types::{LoginResponse, User, UserId};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Where the session currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    /// A login call is in flight.
    Authenticating,
    Authenticated(User),
}

impl SessionStatus {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Authenticating)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Side-channel notifications for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// The server rejected a request for lack of a valid session; send the
    /// user to the login screen.
    LoginRequired,
}

/// Shared session state: the credential store plus its observers.
pub struct SessionState {
    store: Arc<dyn CredentialStore>,
    status: watch::Sender<SessionStatus>,
    signals: broadcast::Sender<SessionSignal>,
    writer: Mutex<()>,
}

impl SessionState {
    /// Wraps `store`. The initial status is Unauthenticated until
    /// [`SessionController::restore`] runs.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Arc<Self> {
        let (status, _) = watch::channel(SessionStatus::Unauthenticated);
        let (signals, _) = broadcast::channel(16);
        Arc::new(Self {
            store,
            status,
            signals,
            writer: Mutex::new(()),
        })
    }

    /// Read-only access to the credential store.
    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Current bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn signals(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }

    fn set_status(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }

    /// Loads a persisted session. A store holding a token without a user (or
    /// the reverse) is cleared.
    fn restore(&self) -> SessionStatus {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let stored = self.store.snapshot();

        let status = match stored {
            Credentials {
                token: Some(_),
                user: Some(user),
                ..
            } => SessionStatus::Authenticated(user),
            ref partial if !partial.is_empty() => {
                warn!("Discarding incomplete stored session");
                if let Err(e) = self.store.clear_all() {
                    warn!("Failed to clear incomplete session: {}", e);
                }
                SessionStatus::Unauthenticated
            }
            _ => SessionStatus::Unauthenticated,
        };

        self.set_status(status.clone());
        status
    }

    /// Moves to Authenticating and returns the status to go back to on failure.
    fn begin_login(&self) -> SessionStatus {
        self.status.send_replace(SessionStatus::Authenticating)
    }

    /// Persists a freshly issued session and publishes it.
    fn establish(&self, access_token: &str, refresh_token: Option<&str>, user: &User) -> ApiResult<()> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.update(&mut |c| {
            c.token = Some(access_token.to_string());
            c.refresh_token = refresh_token.map(str::to_string);
            c.user = Some(user.clone());
        })?;
        self.set_status(SessionStatus::Authenticated(user.clone()));
        Ok(())
    }

    /// Swaps in new tokens for the same user.
    fn replace_tokens(&self, previous: &str, access_token: &str, refresh_token: Option<&str>) -> ApiResult<bool> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.store.token().as_deref() != Some(previous) {
            return Ok(false);
        }
        self.store.update(&mut |c| {
            c.token = Some(access_token.to_string());
            if let Some(refresh) = refresh_token {
                c.refresh_token = Some(refresh.to_string());
            }
        })?;
        Ok(true)
    }

    fn update_user(&self, user: &User) -> ApiResult<()> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.store.token().is_none() {
            return Err(ApiError::NotAuthenticated);
        }
        self.store.set_user(user)?;
        self.set_status(SessionStatus::Authenticated(user.clone()));
        Ok(())
    }

    /// Clears everything and publishes Unauthenticated.
    fn end(&self) -> ApiResult<()> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let cleared = self.store.clear_all();
        self.set_status(SessionStatus::Unauthenticated);
        cleared
    }

    /// Handles a 401 for a request sent with `sent_token`.
    ///
    /// Only the first caller for a given token clears anything: once the
    /// store no longer holds `sent_token`, later calls are no-ops. A request
    /// sent without a token clears nothing but still asks for a login.
    /// Returns true if this call cleared the session.
    pub fn expire(&self, sent_token: Option<&str>) -> bool {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sent_token) = sent_token else {
            debug!("Unauthenticated request rejected");
            let _ = self.signals.send(SessionSignal::LoginRequired);
            return false;
        };
        if self.store.token().as_deref() != Some(sent_token) {
            debug!("Session already expired or replaced; ignoring stale 401");
            return false;
        }

        if let Err(e) = self.store.clear_all() {
            warn!("Failed to clear credentials after 401: {}", e);
        }
        self.set_status(SessionStatus::Unauthenticated);
        // No subscribers is fine: nobody is waiting to redirect.
        let _ = self.signals.send(SessionSignal::LoginRequired);
        info!("Session expired; login required");
        true
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

/// Drives login, logout and refresh on top of [`SessionState`].
#[derive(Debug, Clone)]
pub struct SessionController {
    state: Arc<SessionState>,
    auth: AuthService,
}

impl SessionController {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            state: client.session().clone(),
            auth: AuthService::new(client),
        }
    }

    /// Restores a persisted session without contacting the server.
    pub fn restore(&self) -> SessionStatus {
        let status = self.state.restore();
        match status.user() {
            Some(user) => info!("Restored session for {}", user.email),
            None => debug!("No stored session"),
        }
        status
    }

    /// Confirms the restored session with `GET /auth/me`.
    ///
    /// A rejected session is ended. Transport failures leave the session in
    /// place so an offline start does not sign the user out.
    pub async fn revalidate(&self) -> ApiResult<User> {
        let token = self.state.token().ok_or(ApiError::NotAuthenticated)?;
        match self.auth.me().await {
            Ok(profile) => {
                let user = User::from(profile);
                self.state.update_user(&user)?;
                Ok(user)
            }
            Err(e @ ApiError::Network(_)) => Err(e),
            Err(e) => {
                warn!("Stored session rejected: {}", e);
                self.state.expire(Some(&token));
                Err(e)
            }
        }
    }

    /// Signs in and persists the session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let previous = self.state.begin_login();
        info!("Signing in as {}", email);

        let response = match self.auth.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                let fallback = if self.state.store().session().is_some() {
                    previous
                } else {
                    SessionStatus::Unauthenticated
                };
                self.state.set_status(fallback);
                return Err(credentials_rejected(e));
            }
        };

        let user = derive_user(&response, email);
        if let Err(e) = self.state.establish(
            &response.access_token,
            response.refresh_token.as_deref(),
            &user,
        ) {
            self.state.set_status(SessionStatus::Unauthenticated);
            return Err(e);
        }

        info!("Signed in as {}", user.email);
        Ok(user)
    }

    /// Signs out. The server is told on a best-effort basis; local
    /// credentials are always cleared.
    pub async fn logout(&self) -> ApiResult<()> {
        if self.state.token().is_some() {
            if let Err(e) = self.auth.logout().await {
                warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }
        self.state.end()?;
        info!("Signed out");
        Ok(())
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// If the exchange fails the session is ended as if the server had
    /// rejected it.
    pub async fn refresh(&self) -> ApiResult<()> {
        let snapshot = self.state.store().snapshot();
        let (Some(current), Some(refresh_token)) = (snapshot.token, snapshot.refresh_token) else {
            return Err(ApiError::NotAuthenticated);
        };

        match self.auth.refresh(&refresh_token).await {
            Ok(tokens) => {
                let replaced = self.state.replace_tokens(
                    &current,
                    &tokens.access_token,
                    tokens.refresh_token.as_deref(),
                )?;
                if !replaced {
                    debug!("Session changed during refresh; discarding new tokens");
                    return Err(ApiError::NotAuthenticated);
                }
                debug!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.state.expire(Some(&current));
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.status().user().cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.status().is_loading()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.status().is_authenticated()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn signals(&self) -> broadcast::Receiver<SessionSignal> {
        self.state.signals()
    }
}

/// A 401 from the login endpoint means wrong credentials, not an expired
/// session: report it with the backend's own message and code.
fn credentials_rejected(error: ApiError) -> ApiError {
    match error {
        ApiError::AuthenticationExpired(expired) => {
            let status = StatusCode::from_u16(expired.status).unwrap_or(StatusCode::UNAUTHORIZED);
            let payload = expired.raw_payload.map(|raw| raw.data).unwrap_or(Value::Null);
            ApiError::Http(normalize_failure(status, payload))
        }
        other => other,
    }
}

/// Picks the user for a new session: the one the server sent, else the
/// token's subject, else a locally generated id.
fn derive_user(response: &LoginResponse, email: &str) -> User {
    if let Some(user) = &response.user {
        return user.clone();
    }
    let id = token::subject(&response.access_token)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    User {
        id: UserId::new(id),
        email: email.to_string(),
    }
}
