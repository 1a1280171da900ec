// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

mod http;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::{
    error::Result,
    model::{AccountSnapshot, AuthResponse, LoginRequest, RegisterRequest, TokenRefresh, UserProfile},
};

pub(crate) use http::Http;

/// The remote NeoBank API. Every call is attempted once; implementations do
/// not retry.
///
/// Authenticated calls carry whatever access token the implementation has
/// been given access to.
#[async_trait]
pub(crate) trait Api: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse>;

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse>;

    /// Invalidates the session the refresh token belongs to on the server.
    async fn logout(&self, refresh_token: &SecretString) -> Result<()>;

    async fn get_user_profile(&self) -> Result<UserProfile>;

    async fn get_user_account(&self) -> Result<AccountSnapshot>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &SecretString) -> Result<TokenRefresh>;
}
