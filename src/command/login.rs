// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::info;
use secrecy::SecretString;

use crate::{
    api::Api,
    error::Result,
    form,
    password::{self, RequestBuilder},
    storage::Storage,
};

/// Sign in with an email address and password.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The email address you registered with.
    #[arg(short, long)]
    email: String,

    /// The password to sign in with. Prompted for when not given.
    #[arg(long, env = "NEOBANK_PASSWORD", hide_env_values = true, value_parser = super::parse_secret)]
    password: Option<SecretString>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute<A: Api, S: Storage>(self, ctx: super::Context<'_, A, S>) -> Result<()> {
        let password = match self.password {
            Some(password) => password,
            None => password::require(ctx.prompt, RequestBuilder::new("Password").into_request())
                .await?,
        };
        form::check_login(&self.email, &password)?;

        super::end_current_session(&ctx).await;
        ctx.session.login(self.email.trim(), &password).await?;

        let state = ctx.session.state();
        if let Some(ref user) = state.user {
            info!("Signed in as {}", user.email);
            println!("Welcome back, {}!", user.first_name);
        }
        println!("{}", super::status::render(&state));
        Ok(())
    }
}
