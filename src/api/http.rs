// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::lock::Mutex;
use log::{debug, warn};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{
    credentials,
    error::{Result, ServerError},
    metadata,
    model::{
        AccountSnapshot, AuthResponse, LoginRequest, RefreshTokenBody, RegisterRequest,
        TokenRefresh, UserProfile,
    },
    storage,
};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Auth {
    None,
    Bearer,
}

/// [`super::Api`] over HTTP. The access token for authenticated requests is
/// read from the shared token storage on every call.
pub(crate) struct Http<Storage: storage::Storage> {
    http: reqwest::Client,
    base_url: Url,
    storage: Arc<Mutex<Storage>>,
}

impl<Storage: storage::Storage> Http<Storage> {
    pub(crate) fn new(base_url: Url, storage: Arc<Mutex<Storage>>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(metadata::USER_AGENT.as_str())
            .build()?;
        Ok(Self::with_http_client(http, base_url, storage))
    }

    pub(crate) fn with_http_client(
        http: reqwest::Client,
        mut base_url: Url,
        storage: Arc<Mutex<Storage>>,
    ) -> Self {
        // Endpoint paths are joined relative to the base, which only keeps the
        // last path segment if it ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            http,
            base_url,
            storage,
        }
    }

    async fn request(&self, method: Method, path: &str, auth: Auth) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        debug!("Sending request: {} {}", method, url);

        let req = self.http.request(method, url);
        if auth == Auth::None {
            return Ok(req);
        }

        let token = {
            let mut storage = self.storage.lock().await;
            credentials::access_token(&mut *storage).await?
        };
        Ok(match token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T> {
        let req = self.request(Method::GET, path, auth).await?;
        Self::receive(req).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth,
        body: &B,
    ) -> Result<T> {
        let req = self.request(Method::POST, path, auth).await?.json(body);
        Self::receive(req).await
    }

    async fn receive<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
        let response = Self::ensure_success(req.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(_) => serde_json::Value::String(text),
            },
            Err(e) => {
                warn!("Could not read the body of a failed response: {}", e);
                serde_json::Value::Null
            }
        };
        debug!("Server rejected request with HTTP {}", status.as_u16());
        Err(ServerError::new(status, body).into())
    }
}

#[async_trait]
impl<Storage: storage::Storage> super::Api for Http<Storage> {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        self.post("auth/register/", Auth::None, req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        self.post("auth/login/", Auth::None, req).await
    }

    async fn logout(&self, refresh_token: &SecretString) -> Result<()> {
        let body = RefreshTokenBody {
            refresh: refresh_token.expose_secret(),
        };
        // Only the status matters; the body may be empty.
        let req = self
            .request(Method::POST, "auth/logout/", Auth::Bearer)
            .await?
            .json(&body);
        _ = Self::ensure_success(req.send().await?).await?;
        Ok(())
    }

    async fn get_user_profile(&self) -> Result<UserProfile> {
        self.get("auth/profile/", Auth::Bearer).await
    }

    async fn get_user_account(&self) -> Result<AccountSnapshot> {
        self.get("account/", Auth::Bearer).await
    }

    async fn refresh_access_token(&self, refresh_token: &SecretString) -> Result<TokenRefresh> {
        let body = RefreshTokenBody {
            refresh: refresh_token.expose_secret(),
        };
        self.post("auth/token/refresh/", Auth::None, &body).await
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, header_exists, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        api::Api as _,
        error::{self, Error},
        storage::{Memory, Storage as _},
    };

    use super::*;

    fn profile_json() -> serde_json::Value {
        json!({
            "id": "6f1c5a52-2d1e-4c57-9a3e-0d7f1b8a9c01",
            "email": "a@x.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "date_joined": "2024-05-01T10:00:00Z",
        })
    }

    async fn client(server: &MockServer, storage: Memory) -> error::Result<Http<Memory>> {
        let base_url = Url::parse(&format!("{}/api", server.uri()))?;
        Http::new(base_url, Arc::new(Mutex::new(storage)))
    }

    #[tokio::test]
    async fn login_posts_credentials_without_authorization() -> error::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .and(body_json(json!({"email": "a@x.com", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login successful",
                "user": profile_json(),
                "tokens": {"refresh": "T_ref", "access": "T_acc"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut storage = Memory::new();
        storage.set(credentials::ACCESS_TOKEN_KEY, "stale").await?;
        let api = client(&server, storage).await?;

        let resp = api
            .login(&LoginRequest {
                email: "a@x.com".to_owned(),
                password: SecretString::new("secret".to_owned()),
            })
            .await?;
        assert_eq!(resp.user.first_name, "Ada");
        assert_eq!(resp.tokens.access.expose_secret(), "T_acc");
        assert_eq!(resp.tokens.refresh.expose_secret(), "T_ref");
        Ok(())
    }

    #[tokio::test]
    async fn profile_and_account_carry_stored_access_token() -> error::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/profile/"))
            .and(header("authorization", "Bearer T_acc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/account/"))
            .and(header("authorization", "Bearer T_acc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "0b3f6a8e-51c4-4c0e-8d4b-2f1a6f0e9d10",
                "user": profile_json(),
                "balance": "100.00",
                "account_number": "NB1234567890",
                "account_type": "Premium Elite",
                "created_at": "2024-05-01T10:00:00Z",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut storage = Memory::new();
        storage.set(credentials::ACCESS_TOKEN_KEY, "T_acc").await?;
        let api = client(&server, storage).await?;

        let profile = api.get_user_profile().await?;
        let account = api.get_user_account().await?;
        assert_eq!(profile.email, "a@x.com");
        assert_eq!(account.balance, "100.00");
        assert_eq!(account.user.id(), profile.id);
        Ok(())
    }

    #[tokio::test]
    async fn logout_sends_refresh_token() -> error::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout/"))
            .and(header("authorization", "Bearer T_acc"))
            .and(body_json(json!({"refresh": "T_ref"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "Logout successful"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut storage = Memory::new();
        storage.set(credentials::ACCESS_TOKEN_KEY, "T_acc").await?;
        let api = client(&server, storage).await?;

        api.logout(&SecretString::new("T_ref".to_owned())).await
    }

    #[tokio::test]
    async fn logout_accepts_empty_response() -> error::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, Memory::new()).await?;
        api.logout(&SecretString::new("T_ref".to_owned())).await
    }

    #[tokio::test]
    async fn refresh_exchanges_refresh_token() -> error::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/token/refresh/"))
            .and(body_json(json!({"refresh": "T_ref"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T_new"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, Memory::new()).await?;
        let renewed = api
            .refresh_access_token(&SecretString::new("T_ref".to_owned()))
            .await?;
        assert_eq!(renewed.access.expose_secret(), "T_new");
        assert!(renewed.refresh.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn rejection_carries_status_and_detail() -> error::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"non_field_errors": ["Invalid credentials"]})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/auth/profile/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let api = client(&server, Memory::new()).await?;
        let err = api
            .login(&LoginRequest {
                email: "a@x.com".to_owned(),
                password: SecretString::new("wrong".to_owned()),
            })
            .await;
        match err {
            Err(Error::Api(error::Api::ServerError(e))) => {
                assert_eq!(e.status(), StatusCode::BAD_REQUEST);
                assert_eq!(e.detail().as_deref(), Some("Invalid credentials"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let err = api.get_user_profile().await;
        match err {
            Err(e @ Error::Api(_)) => {
                assert!(e.is_unauthorized());
                assert_eq!(e.to_string(), "API error: Unauthorized");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn base_url_with_trailing_slash_is_kept() -> error::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/profile/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
            .expect(1)
            .mount(&server)
            .await;

        let base_url = Url::parse(&format!("{}/api/", server.uri()))?;
        let api = Http::new(base_url, Arc::new(Mutex::new(Memory::new())))?;
        let profile = api.get_user_profile().await?;
        assert_eq!(profile.last_name, "Lovelace");
        Ok(())
    }
}
