//! Request execution and response normalization.
//!
//! Every call goes through [`ApiClient::execute`], which attaches headers,
//! runs the registered interceptors and turns any non-2xx response into a
//! [`NormalizedError`] wrapped in the matching [`ApiError`] variant.

use crate::config::ClientConfig;
use crate::error::{
    ApiError, ApiResult, AUTHENTICATION_EXPIRED_CODE, NormalizedError, RawPayload,
    SESSION_EXPIRED_MESSAGE,
};
use crate::interceptor::{ResponseContext, ResponseInterceptor, TracingInterceptor};
use crate::session::SessionState;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// URL-encoded form fields; the transport picks the content type.
    Form(Vec<(String, String)>),
}

/// A single call against the API, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    body: RequestBody,
    headers: HeaderMap,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
        }
    }

    /// Sets a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Sets a form body.
    #[must_use]
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Overrides a default header for this request only.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// Default headers sent with every request.
#[must_use]
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// HTTP client for the notes API.
pub struct ApiClient {
    base_url: String,
    client: Client,
    default_headers: HeaderMap,
    session: Arc<SessionState>,
    interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClient {
    /// Creates a client for `config`, reading and expiring credentials
    /// through `session`. A [`TracingInterceptor`] is registered by default.
    pub fn new(config: &ClientConfig, session: Arc<SessionState>) -> ApiResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.normalized_base_url().to_string(),
            client,
            default_headers: default_headers(),
            session,
            interceptors: vec![Arc::new(TracingInterceptor)],
        })
    }

    /// Registers another response observer.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    fn headers_for(&self, request: &ApiRequest, token: Option<&str>) -> ApiResult<HeaderMap> {
        let mut headers = self.default_headers.clone();
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }
        if matches!(request.body, RequestBody::Form(_)) {
            headers.remove(CONTENT_TYPE);
        }
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Storage("stored token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Performs `request` and returns the parsed JSON body.
    ///
    /// 204 yields an empty object. A body that is not JSON yields `null`.
    pub async fn execute(&self, request: ApiRequest) -> ApiResult<Value> {
        let token = self.session.token();
        let headers = self.headers_for(&request, token.as_deref())?;

        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.endpoint))
            .headers(headers);
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let response = builder.send().await.map_err(|e| {
            warn!("{} {} failed: {}", request.method, request.endpoint, e);
            ApiError::Network(e)
        })?;

        let status = response.status();
        let context = ResponseContext {
            method: &request.method,
            endpoint: &request.endpoint,
            status: status.as_u16(),
            authenticated: token.is_some(),
        };
        for interceptor in &self.interceptors {
            interceptor.on_response(&context);
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(json!({}));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
        let payload = if is_json {
            match response.bytes().await {
                Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or(Value::Null),
                Err(e) => {
                    debug!("Failed to read response body: {}", e);
                    Value::Null
                }
            }
        } else {
            Value::Null
        };

        if status.is_success() {
            return Ok(payload);
        }

        let normalized = normalize_failure(status, payload);
        Err(self.classify_failure(normalized, token.as_deref()))
    }

    fn classify_failure(&self, mut error: NormalizedError, sent_token: Option<&str>) -> ApiError {
        if error.status == StatusCode::UNAUTHORIZED.as_u16() {
            self.session.expire(sent_token);
            error.message = SESSION_EXPIRED_MESSAGE.to_string();
            error.code = AUTHENTICATION_EXPIRED_CODE.to_string();
            return ApiError::AuthenticationExpired(error);
        }

        let has_detail_list = error
            .raw_payload
            .as_ref()
            .and_then(|raw| raw.data.get("detail"))
            .is_some_and(Value::is_array);
        if error.status == StatusCode::UNPROCESSABLE_ENTITY.as_u16()
            || error.field_errors().is_some()
            || has_detail_list
        {
            return ApiError::Validation(error);
        }

        ApiError::Http(error)
    }

    /// [`Self::execute`], decoding the body into `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let value = self.execute(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.execute_as(ApiRequest::new(Method::GET, endpoint)).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_as(with_body(ApiRequest::new(Method::POST, endpoint), body)?)
            .await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_as(with_body(ApiRequest::new(Method::PUT, endpoint), body)?)
            .await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute_as(with_body(ApiRequest::new(Method::PATCH, endpoint), body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        self.execute_as(ApiRequest::new(Method::DELETE, endpoint)).await
    }

    /// POSTs URL-encoded form fields. Any `Content-Type` override is dropped.
    pub async fn post_form<K, V, T>(
        &self,
        endpoint: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> ApiResult<T>
    where
        K: Into<String>,
        V: Into<String>,
        T: DeserializeOwned,
    {
        self.execute_as(ApiRequest::new(Method::POST, endpoint).form(fields))
            .await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

fn with_body<B: Serialize + ?Sized>(request: ApiRequest, body: Option<&B>) -> ApiResult<ApiRequest> {
    match body {
        Some(body) => request.json(body),
        None => Ok(request),
    }
}

/// Builds the normalized error for a non-2xx `status` with parsed `payload`.
///
/// Message: `detail` (string), else `message`, else
/// `"HTTP <status>: <reason>"`. Readable validation text is left to
/// [`crate::classify`]. Code: `code`, else
/// `error_code`, else `"HTTP_<status>"`.
#[must_use]
pub fn normalize_failure(status: StatusCode, payload: Value) -> NormalizedError {
    let status_text = status.canonical_reason().unwrap_or("Unknown Status").to_string();

    let text = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };
    let message = text("detail")
        .or_else(|| text("message"))
        .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), status_text));

    let code = ["code", "error_code"]
        .iter()
        .find_map(|key| match payload.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));

    let raw_errors = payload
        .get("errors")
        .filter(|e| !e.is_null())
        .cloned()
        .or_else(|| (!payload.is_null()).then(|| payload.clone()));

    NormalizedError {
        message,
        status: status.as_u16(),
        code,
        raw_errors,
        raw_payload: Some(RawPayload {
            data: payload,
            status: status.as_u16(),
            status_text,
        }),
    }
}
