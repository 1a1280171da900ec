// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;

use crate::{api::Api, error::Result, storage::Storage};

/// Sign out and forget the stored tokens.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute<A: Api, S: Storage>(self, ctx: super::Context<'_, A, S>) -> Result<()> {
        ctx.session.logout().await;
        println!("You have been signed out.");
        Ok(())
    }
}
