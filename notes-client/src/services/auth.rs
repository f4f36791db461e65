use crate::endpoints;
use crate::error::ApiResult;
use crate::http::ApiClient;
use notes_types::{LoginResponse, MessageResponse, UserProfile};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    mot_de_passe: &'a str,
}

/// Registration, login and token endpoints.
///
/// Nothing here touches the credential store; that is
/// [`SessionController`](crate::SessionController)'s job.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn register(&self, email: &str, password: &str) -> ApiResult<MessageResponse> {
        let body = CredentialsBody {
            email,
            mot_de_passe: password,
        };
        self.client.post(endpoints::REGISTER, Some(&body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = CredentialsBody {
            email,
            mot_de_passe: password,
        };
        self.client.post(endpoints::LOGIN, Some(&body)).await
    }

    pub async fn logout(&self) -> ApiResult<()> {
        let _: Value = self.client.post::<Value, _>(endpoints::LOGOUT, None).await?;
        Ok(())
    }

    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.client.get(endpoints::ME).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<LoginResponse> {
        let body = json!({ "refresh_token": refresh_token });
        self.client.post(endpoints::REFRESH, Some(&body)).await
    }
}
