//! Auth service client.
//!
//! `login` and `register` store the returned bearer token; every other call
//! sends it. `logout` always clears the local token.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::token::TokenStore;
use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    /// Whatever else the service returns (names, role).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

pub struct AuthClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl AuthClient {
    pub fn new(http: Client, base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        let token = self.tokens.get()?.ok_or(AuthError::NotAuthenticated)?;
        Ok(req.bearer_auth(token))
    }

    fn check(operation: &'static str, resp: Response) -> Result<Response, AuthError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            tracing::warn!(operation, status, "Auth service rejected request");
            Err(AuthError::Rejected { operation, status })
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let resp = self
            .http
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let data: AuthResponse = Self::check("login", resp)?.json().await?;
        self.tokens.set(&data.token)?;
        tracing::info!(email, "Signed in");
        Ok(data)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthResponse, AuthError> {
        let resp = self
            .http
            .post(self.url("/register"))
            .json(&json!({
                "email": email,
                "password": password,
                "firstName": first_name,
                "lastName": last_name,
            }))
            .send()
            .await?;
        let data: AuthResponse = Self::check("registration", resp)?.json().await?;
        self.tokens.set(&data.token)?;
        tracing::info!(email, "Registered account");
        Ok(data)
    }

    pub async fn me(&self) -> Result<UserProfile, AuthError> {
        let resp = self.authorized(self.http.get(self.url("/me")))?.send().await?;
        Ok(Self::check("profile fetch", resp)?.json().await?)
    }

    pub async fn update_password(&self, current: &str, new: &str) -> Result<(), AuthError> {
        let resp = self
            .authorized(self.http.post(self.url("/update-password")))?
            .json(&json!({ "currentPassword": current, "newPassword": new }))
            .send()
            .await?;
        Self::check("password update", resp)?;
        Ok(())
    }

    /// Best-effort server logout. The local token is cleared whatever the
    /// service answers; only a token store failure is returned.
    pub async fn logout(&self) -> Result<(), AuthError> {
        if let Ok(req) = self.authorized(self.http.post(self.url("/logout"))) {
            match req.send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!(status = resp.status().as_u16(), "Logout API call failed");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Error during logout API call"),
            }
        }
        self.tokens.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard, store: Arc<MemoryTokenStore>) -> AuthClient {
        AuthClient::new(Client::new(), server.url(), store)
    }

    #[tokio::test]
    async fn login_stores_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/login")
            .match_body(Matcher::Json(
                json!({"email": "sam@example.com", "password": "hunter22"}),
            ))
            .with_status(200)
            .with_body(r#"{"token":"tok-123"}"#)
            .create_async()
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let auth = client(&server, store.clone());
        let resp = auth.login("sam@example.com", "hunter22").await.unwrap();
        assert_eq!(resp.token, "tok-123");
        assert_eq!(store.get().unwrap().as_deref(), Some("tok-123"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_login_leaves_store_untouched() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_status(401)
            .create_async()
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        let err = client(&server, store.clone())
            .login("sam@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Rejected {
                operation: "login",
                status: 401
            }
        ));
        assert_eq!(store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn register_sends_camel_case_names() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/register")
            .match_body(Matcher::PartialJson(
                json!({"firstName": "Sam", "lastName": "Lee"}),
            ))
            .with_status(201)
            .with_body(r#"{"token":"tok-new"}"#)
            .create_async()
            .await;

        let store = Arc::new(MemoryTokenStore::new());
        client(&server, store.clone())
            .register("sam@example.com", "hunter22", "Sam", "Lee")
            .await
            .unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("tok-new"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn me_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/me")
            .match_header("authorization", "Bearer tok-123")
            .with_status(200)
            .with_body(r#"{"id":"u1","email":"sam@example.com","firstName":"Sam"}"#)
            .create_async()
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("tok-123"));
        let profile = client(&server, store).me().await.unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.extra["firstName"], "Sam");
    }

    #[tokio::test]
    async fn me_without_token_is_not_authenticated() {
        let server = mockito::Server::new_async().await;
        let store = Arc::new(MemoryTokenStore::new());
        assert!(matches!(
            client(&server, store).me().await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn update_password_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/update-password")
            .match_body(Matcher::Json(
                json!({"currentPassword": "old", "newPassword": "new-secret"}),
            ))
            .with_status(204)
            .create_async()
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("tok"));
        client(&server, store)
            .update_password("old", "new-secret")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn logout_clears_token_even_when_service_fails() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/logout")
            .with_status(500)
            .create_async()
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("tok"));
        client(&server, store.clone()).logout().await.unwrap();
        assert_eq!(store.get().unwrap(), None);
        mock.assert_async().await;
    }
}
