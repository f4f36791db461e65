//! Credential persistence.
//!
//! The access token, refresh token and cached user profile always move
//! together: they are written as one record and cleared as one record, so no
//! caller can observe a half-cleared store.

use crate::error::{ApiError, ApiResult};
use crate::token;
use notes_types::User;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Everything the client remembers about the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Credentials {
    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    /// True when both a token and a user are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

/// Key-value persistence for the session's credentials.
///
/// Implementations must apply each `update` and `clear_all` atomically with
/// respect to concurrent readers.
pub trait CredentialStore: Send + Sync {
    /// Returns a copy of the stored credentials.
    fn snapshot(&self) -> Credentials;

    /// Applies `apply` to the stored credentials and persists the result.
    fn update(&self, apply: &mut dyn FnMut(&mut Credentials)) -> ApiResult<()>;

    /// Removes the token, refresh token and user in one step.
    fn clear_all(&self) -> ApiResult<()>;

    fn token(&self) -> Option<String> {
        self.snapshot().token
    }

    fn set_token(&self, token: &str) -> ApiResult<()> {
        self.update(&mut |c| c.token = Some(token.to_string()))
    }

    fn refresh_token(&self) -> Option<String> {
        self.snapshot().refresh_token
    }

    fn set_refresh_token(&self, refresh_token: &str) -> ApiResult<()> {
        self.update(&mut |c| c.refresh_token = Some(refresh_token.to_string()))
    }

    fn user(&self) -> Option<User> {
        self.snapshot().user
    }

    fn set_user(&self, user: &User) -> ApiResult<()> {
        self.update(&mut |c| c.user = Some(user.clone()))
    }

    /// The stored credentials, if they form a complete session.
    fn session(&self) -> Option<Credentials> {
        Some(self.snapshot()).filter(Credentials::is_complete)
    }

    /// True if a token is stored and its `exp` claim is still in the future.
    fn has_valid_token(&self) -> bool {
        self.token().is_some_and(|t| token::is_unexpired(&t))
    }
}

/// Credentials that live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Credentials>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn snapshot(&self) -> Credentials {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Credentials)) -> ApiResult<()> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut guard);
        Ok(())
    }

    fn clear_all(&self) -> ApiResult<()> {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Credentials::default();
        Ok(())
    }
}

/// Credentials persisted as a single JSON document.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so the document on disk is always either the old or the new record.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    cache: RwLock<Credentials>,
}

impl FileCredentialStore {
    /// Opens the store at `path`, loading whatever is already there.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// treated as empty too; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> ApiResult<Self> {
        let path = path.into();
        let cache = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("Ignoring corrupt credentials file {}: {}", path.display(), e);
                Credentials::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Credentials::default(),
            Err(e) => {
                return Err(ApiError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, credentials: &Credentials) -> ApiResult<()> {
        if credentials.is_empty() {
            return self.remove_file();
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let bytes = serde_json::to_vec_pretty(credentials)
            .map_err(|e| ApiError::Storage(format!("failed to encode credentials: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .map_err(|e| ApiError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            ApiError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    fn remove_file(&self) -> ApiResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed credentials file {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Storage(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn snapshot(&self) -> Credentials {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn update(&self, apply: &mut dyn FnMut(&mut Credentials)) -> ApiResult<()> {
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        apply(&mut next);
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn clear_all(&self) -> ApiResult<()> {
        let mut guard = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Memory is cleared even if the file cannot be removed.
        *guard = Credentials::default();
        self.remove_file()
    }
}
