// SPDX-FileCopyrightText: 2022-2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::convert::Infallible;

use async_trait::async_trait;
use log::info;
use secrecy::SecretString;

use crate::{api::Api, error::Result, password::Prompt, session, storage::Storage};

pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod refresh;
pub(crate) mod register;
pub(crate) mod status;

/// What a command gets to work with.
pub(crate) struct Context<'ctx, A: Api, S: Storage> {
    pub(crate) session: &'ctx session::Manager<A, S>,
    pub(crate) prompt: &'ctx (dyn Prompt + 'ctx),
}

impl<'ctx, A: Api, S: Storage> Context<'ctx, A, S> {
    pub(crate) fn new(
        session: &'ctx session::Manager<A, S>,
        prompt: &'ctx (dyn Prompt + 'ctx),
    ) -> Self {
        Self { session, prompt }
    }
}

#[async_trait]
pub(crate) trait Command {
    async fn execute<A: Api, S: Storage>(self, ctx: Context<'_, A, S>) -> Result<()>;
}

/// Signs out a session resumed at startup, so that its tokens are revoked
/// rather than overwritten by a new sign-in.
async fn end_current_session<A: Api, S: Storage>(ctx: &Context<'_, A, S>) {
    if ctx.session.state().is_authenticated {
        info!("Signing out of the current session first");
        ctx.session.logout().await;
    }
}

#[allow(clippy::unnecessary_wraps)]
fn parse_secret(value: &str) -> Result<SecretString, Infallible> {
    Ok(SecretString::new(value.to_owned()))
}
