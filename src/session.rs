// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The signed-in user as seen by this client.
//!
//! [`Manager`] owns the [`State`] for the lifetime of the process. It is the
//! only writer of the stored tokens and of the state; callers read a snapshot
//! with [`Manager::state`] or follow changes with [`Manager::subscribe`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures_util::lock::Mutex;
use log::{debug, error, info, warn};
use secrecy::SecretString;
use tokio::sync::watch;

use crate::{
    api::Api,
    credentials,
    error::Result,
    model::{AccountSnapshot, AuthResponse, LoginRequest, RegisterRequest, UserProfile},
    storage::Storage,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
    pub(crate) user: Option<UserProfile>,
    pub(crate) account: Option<AccountSnapshot>,
    /// Only ever set together with `user` and `account`.
    pub(crate) is_authenticated: bool,
    /// Set while a login, registration or restore is in flight.
    pub(crate) is_loading: bool,
}

impl State {
    const fn starting() -> Self {
        Self {
            user: None,
            account: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    fn sign_out(&mut self) {
        self.user = None;
        self.account = None;
        self.is_authenticated = false;
    }

    fn sign_in(&mut self, user: UserProfile, account: AccountSnapshot) {
        self.user = Some(user);
        self.account = Some(account);
        self.is_authenticated = true;
    }
}

/// Marks the state as loading until dropped.
struct Loading<'state> {
    state: &'state watch::Sender<State>,
}

impl<'state> Loading<'state> {
    fn begin(state: &'state watch::Sender<State>) -> Self {
        state.send_modify(|s| s.is_loading = true);
        Self { state }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}

pub(crate) struct Manager<A: Api, S: Storage> {
    api: A,
    storage: Arc<Mutex<S>>,
    state: watch::Sender<State>,
    restored: AtomicBool,
}

impl<A: Api, S: Storage> Manager<A, S> {
    /// A manager with no user. The state stays loading until [`Self::restore`]
    /// has run.
    pub(crate) fn new(api: A, storage: Arc<Mutex<S>>) -> Self {
        let (state, _) = watch::channel(State::starting());
        Self {
            api,
            storage,
            state,
            restored: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> State {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Picks up the session left behind by a previous process, if any. Only
    /// the first call does anything.
    ///
    /// Failures are not reported: a session that cannot be resumed is
    /// discarded and the user starts out signed out.
    pub(crate) async fn restore(&self) {
        if self.restored.swap(true, Ordering::SeqCst) {
            return;
        }
        let _loading = Loading::begin(&self.state);

        let token = {
            let mut storage = self.storage.lock().await;
            credentials::access_token(&mut *storage).await
        };
        match token {
            Ok(Some(_)) => {}
            Ok(None) => return,
            Err(e) => {
                warn!("Could not read stored access token: {}", e);
                self.discard_tokens().await;
                self.state.send_modify(State::sign_out);
                return;
            }
        }

        match self.fetch_user_data().await {
            Ok((user, account)) => self.state.send_modify(|s| s.sign_in(user, account)),
            Err(e) => {
                warn!("Could not resume previous session: {}", e);
                self.discard_tokens().await;
                self.state.send_modify(State::sign_out);
            }
        }
    }

    pub(crate) async fn login(&self, email: &str, password: &SecretString) -> Result<()> {
        let _loading = Loading::begin(&self.state);
        let req = LoginRequest {
            email: email.to_owned(),
            password: password.clone(),
        };

        let result = match self.api.login(&req).await {
            Ok(resp) => self.establish(resp).await,
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            error!("Login failed: {}", e);
        }
        result
    }

    pub(crate) async fn register(&self, req: &RegisterRequest) -> Result<()> {
        let _loading = Loading::begin(&self.state);

        let result = match self.api.register(req).await {
            Ok(resp) => self.establish(resp).await,
            Err(e) => Err(e),
        };
        if let Err(ref e) = result {
            error!("Registration failed: {}", e);
        }
        result
    }

    /// Signs out locally no matter what the server says.
    pub(crate) async fn logout(&self) {
        let refresh = {
            let mut storage = self.storage.lock().await;
            credentials::refresh_token(&mut *storage).await
        };
        match refresh {
            Ok(Some(refresh)) => {
                if let Err(e) = self.api.logout(&refresh).await {
                    warn!("Logout API call failed: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Could not read stored refresh token: {}", e),
        }

        self.discard_tokens().await;
        self.state.send_modify(State::sign_out);
    }

    /// Fetches the profile and account again, replacing both only if both
    /// fetches succeed.
    pub(crate) async fn refresh_user_data(&self) -> Result<()> {
        match self.fetch_user_data().await {
            Ok((user, account)) => {
                self.state.send_modify(|s| s.sign_in(user, account));
                Ok(())
            }
            Err(e) => {
                error!("Failed to refresh user data: {}", e);
                Err(e)
            }
        }
    }

    // The profile is published before the account is requested. When the
    // account request fails the caller sees a profile on a session that is not
    // authenticated, with the tokens already stored. Whatever session was
    // signed in before is gone either way.
    async fn establish(&self, resp: AuthResponse) -> Result<()> {
        if let Some(ref message) = resp.message {
            debug!("Server says: {}", message);
        }
        {
            let mut storage = self.storage.lock().await;
            credentials::store(&mut *storage, &resp.tokens).await?;
        }
        let user = resp.user;
        self.state.send_modify(|s| {
            s.user = Some(user);
            s.account = None;
            s.is_authenticated = false;
        });

        let account = self.api.get_user_account().await?;
        self.state.send_modify(|s| {
            s.account = Some(account);
            s.is_authenticated = true;
        });
        Ok(())
    }

    async fn fetch_user_data(&self) -> Result<(UserProfile, AccountSnapshot)> {
        match self.fetch_profile_and_account().await {
            Err(e) if e.is_unauthorized() => {
                if self.renew_access_token().await? {
                    self.fetch_profile_and_account().await
                } else {
                    Err(e)
                }
            }
            result => result,
        }
    }

    async fn fetch_profile_and_account(&self) -> Result<(UserProfile, AccountSnapshot)> {
        let (user, account) =
            tokio::try_join!(self.api.get_user_profile(), self.api.get_user_account())?;
        if account.user.id() != user.id {
            warn!("Account {} does not belong to user {}", account.id, user.id);
        }
        Ok((user, account))
    }

    /// Returns whether a new access token was stored.
    async fn renew_access_token(&self) -> Result<bool> {
        let refresh = {
            let mut storage = self.storage.lock().await;
            credentials::refresh_token(&mut *storage).await?
        };
        let Some(refresh) = refresh else {
            return Ok(false);
        };

        info!("Access token was rejected; renewing it");
        let renewed = self.api.refresh_access_token(&refresh).await?;

        let mut storage = self.storage.lock().await;
        credentials::set_access_token(&mut *storage, &renewed.access).await?;
        if let Some(ref rotated) = renewed.refresh {
            credentials::set_refresh_token(&mut *storage, rotated).await?;
        }
        Ok(true)
    }

    async fn discard_tokens(&self) {
        let mut storage = self.storage.lock().await;
        if let Err(e) = credentials::clear(&mut *storage).await {
            warn!("Could not remove stored tokens: {}", e);
        }
    }
}
