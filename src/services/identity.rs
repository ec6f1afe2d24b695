//! HTTP client for the external identity provider. The provider issues a
//! token and a role claim per user; we consume it, never reimplement it.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::ports::{IdentityError, IdentityProvider, Session, User};

#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl HttpIdentityProvider {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        let response = self
            .client
            .post(format!("{}/auth/sign-in", self.base_url))
            .json(&SignInRequest { email, password })
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IdentityError::Unauthorized(
                "invalid credentials".to_string(),
            )),
            status if status.is_success() => response
                .json::<Session>()
                .await
                .map_err(|e| IdentityError::Upstream(format!("invalid session payload: {e}"))),
            status => Err(IdentityError::Upstream(format!(
                "identity provider returned {status}"
            ))),
        }
    }

    async fn current_user(&self, token: &str) -> Result<User, IdentityError> {
        let response = self
            .client
            .get(format!("{}/auth/user", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::Unauthorized("session expired".to_string()))
            }
            status if status.is_success() => response
                .json::<User>()
                .await
                .map_err(|e| IdentityError::Upstream(format!("invalid user payload: {e}"))),
            status => Err(IdentityError::Upstream(format!(
                "identity provider returned {status}"
            ))),
        }
    }
}
