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

/// Open a new NeoBank account.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// The email address to register.
    #[arg(short, long)]
    email: String,

    /// Your full name. The first word is used as your first name.
    #[arg(short, long)]
    name: String,

    /// The password for the new account. Prompted for, along with a
    /// confirmation, when not given.
    #[arg(long, env = "NEOBANK_PASSWORD", hide_env_values = true, value_parser = super::parse_secret)]
    password: Option<SecretString>,
}

#[async_trait]
impl super::Command for Command {
    async fn execute<A: Api, S: Storage>(self, ctx: super::Context<'_, A, S>) -> Result<()> {
        let (password, password_confirm) = match self.password {
            Some(password) => (password.clone(), password),
            None => {
                let password = password::require(
                    ctx.prompt,
                    RequestBuilder::new("Password")
                        .with_description(&format!(
                            "Choose a password of at least {} characters.",
                            form::MIN_PASSWORD_LENGTH
                        ))
                        .into_request(),
                )
                .await?;
                let password_confirm = password::require(
                    ctx.prompt,
                    RequestBuilder::new("Confirm password")
                        .with_description("Enter the same password again.")
                        .into_request(),
                )
                .await?;
                (password, password_confirm)
            }
        };
        let req = form::registration(&self.name, &self.email, password, password_confirm)?;

        super::end_current_session(&ctx).await;
        ctx.session.register(&req).await?;

        let state = ctx.session.state();
        info!("Registered {}", req.email);
        println!("Welcome to NeoBank, {}!", req.first_name);
        println!("{}", super::status::render(&state));
        Ok(())
    }
}
