//! Error types for the API access layer.

use crate::classify::MAX_DETAIL_LEN;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message surfaced when a request fails because the session expired.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Code surfaced when a request fails because the session expired.
pub const AUTHENTICATION_EXPIRED_CODE: &str = "AUTHENTICATION_EXPIRED";

/// The response half of a failed call, kept verbatim for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    /// Parsed JSON body, or `null` when the body was empty or not JSON.
    pub data: Value,
    pub status: u16,
    pub status_text: String,
}

/// Uniform shape of every non-2xx response, whatever envelope the backend used.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedError {
    pub message: String,
    pub status: u16,
    pub code: String,
    /// `payload.errors` when present, otherwise the whole payload.
    pub raw_errors: Option<Value>,
    pub raw_payload: Option<RawPayload>,
}

impl NormalizedError {
    /// Returns the field → messages map if the backend sent one.
    #[must_use]
    pub fn field_errors(&self) -> Option<&serde_json::Map<String, Value>> {
        let map = self.backend_errors()?.as_object()?;
        let is_field_map = !map.is_empty()
            && map
                .values()
                .all(|v| v.as_array().is_some_and(|a| a.iter().all(Value::is_string)));
        is_field_map.then_some(map)
    }

    /// The `errors` field exactly as the backend sent it.
    ///
    /// Unlike [`Self::raw_errors`] this never falls back to the whole payload.
    #[must_use]
    pub fn backend_errors(&self) -> Option<&Value> {
        match &self.raw_payload {
            Some(raw) => raw.data.get("errors").filter(|e| !e.is_null()),
            None => self.raw_errors.as_ref(),
        }
    }

    /// True if the message is an over-long `detail` (an HTML page, a trace).
    fn message_is_dump(&self) -> bool {
        self.raw_payload
            .as_ref()
            .and_then(|raw| raw.data.get("detail"))
            .and_then(Value::as_str)
            .is_some_and(|detail| {
                detail == self.message && detail.chars().count() >= MAX_DETAIL_LEN
            })
    }

    /// JSON view of the whole error.
    ///
    /// A message copied from an over-long `detail` is left out, as is any
    /// `errors` entry the backend did not send itself.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut view = json!({
            "status": self.status,
            "code": self.code,
        });
        if !self.message_is_dump() {
            view["message"] = json!(self.message);
        }
        if let Some(errors) = self.backend_errors() {
            view["errors"] = errors.clone();
        }
        if let Some(raw) = &self.raw_payload {
            view["response"] = json!({
                "data": raw.data,
                "status": raw.status,
                "statusText": raw.status_text,
            });
        }
        view
    }

    /// [`Self::to_value`] without the executor's own message, so the
    /// classifier only sees what the backend sent.
    #[must_use]
    pub fn classifier_view(&self) -> Value {
        let mut view = self.to_value();
        if let Some(map) = view.as_object_mut() {
            map.remove("message");
        }
        view
    }
}

/// Errors that can occur when talking to the notes API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: unreachable host, TLS, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("{}", .0.message)]
    Http(NormalizedError),

    /// Any 401. A session the request was sent with has already been cleared.
    #[error("{}", .0.message)]
    AuthenticationExpired(NormalizedError),

    /// 422, or a response carrying per-field messages.
    #[error("{}", .0.message)]
    Validation(NormalizedError),

    /// A 2xx body that does not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The operation needs a signed-in session and there is none.
    #[error("not signed in")]
    NotAuthenticated,

    /// Credential persistence failed.
    #[error("credential storage error: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns the normalized response error, if this came from an HTTP status.
    #[must_use]
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Http(e) | Self::AuthenticationExpired(e) | Self::Validation(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => self.normalized().map(|e| e.status),
        }
    }

    /// Error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.normalized().map(|e| e.code.as_str())
    }

    #[must_use]
    pub fn is_authentication_expired(&self) -> bool {
        matches!(self, Self::AuthenticationExpired(_))
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// JSON view of this error for the classifier.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self.normalized() {
            Some(e) => e.to_value(),
            None => json!({ "message": self.to_string() }),
        }
    }

    /// Best human-readable message for this error.
    ///
    /// An expired session always reads as [`SESSION_EXPIRED_MESSAGE`], whatever
    /// the backend said. A response the classifier cannot read (an HTML error
    /// page, an empty body) yields `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::AuthenticationExpired(e) => e.message.clone(),
            Self::Http(e) | Self::Validation(e) => {
                crate::classify::api_error_message(&e.classifier_view(), fallback)
            }
            _ => crate::classify::api_error_message(&self.to_value(), fallback),
        }
    }

    /// Structured descriptor embedded in the error, if one can be recovered.
    #[must_use]
    pub fn structured(&self) -> Option<crate::classify::StructuredApiError> {
        let view = match self.normalized() {
            Some(e) => e.classifier_view(),
            None => self.to_value(),
        };
        crate::classify::extract_api_error(&view)
    }
}
