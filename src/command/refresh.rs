// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{
    api::Api,
    error::{Error, Result},
    storage::Storage,
};

/// Fetch the latest profile and account data from the server.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute<A: Api, S: Storage>(self, ctx: super::Context<'_, A, S>) -> Result<()> {
        if !ctx.session.state().is_authenticated {
            return Err(Error::NotAuthenticated);
        }

        ctx.session.refresh_user_data().await?;
        println!("{}", super::status::render(&ctx.session.state()));
        Ok(())
    }
}
