//! Username/password login against the backend auth service.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiError};
use crate::models::Credential;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    token: String,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    pub username: String,
}

impl LoginResponse {
    /// The bearer credential issued by the auth service.
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential::new(self.token.clone())
    }
}

/// Client for the backend auth service.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    /// Create an auth client over a shared API client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange a username and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 401 for bad credentials, or another
    /// error if the backend call fails.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        self.api.post("auth/login", &body, None).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::ExposeSecret;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ApiConfig;

    fn auth_for(server: &MockServer) -> AuthClient {
        let config =
            ApiConfig::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
        AuthClient::new(ApiClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_login_returns_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"username": "ana", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "eyJ.payload.sig",
                "type": "Bearer",
                "username": "ana"
            })))
            .mount(&server)
            .await;

        let response = auth_for(&server)
            .login("ana", &SecretString::from("hunter22"))
            .await
            .unwrap();

        assert_eq!(response.username, "ana");
        assert_eq!(response.token_type.as_deref(), Some("Bearer"));
        assert_eq!(response.credential().token().expose_secret(), "eyJ.payload.sig");
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = auth_for(&server)
            .login("ana", &SecretString::from("wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 401));
    }
}
