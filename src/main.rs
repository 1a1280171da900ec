// SPDX-FileCopyrightText: 2022-2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod command;
mod credentials;
mod error;
mod form;
mod metadata;
mod model;
mod password;
mod session;
mod storage;

use std::{path::PathBuf, process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use futures_util::lock::Mutex;
use log::{debug, error, info, warn};
use storage::IsPersistent as _;
use tokio::sync::watch;
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::login::Command),
    Register(command::register::Command),
    Logout(command::logout::Command),
    Status(command::status::Command),
    Refresh(command::refresh::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute<A: api::Api, S: storage::Storage>(
        self,
        ctx: command::Context<'_, A, S>,
    ) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(ctx).await,
            Self::Register(cmd) => cmd.execute(ctx).await,
            Self::Logout(cmd) => cmd.execute(ctx).await,
            Self::Status(cmd) => cmd.execute(ctx).await,
            Self::Refresh(cmd) => cmd.execute(ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the NeoBank API.
    #[arg(long, env = "NEOBANK_API_URL", default_value = "http://127.0.0.1:8000/api/", value_parser = Url::parse)]
    api_url: Url,

    /// Keep tokens in memory only. Every invocation then starts signed out.
    #[arg(long)]
    no_persist_tokens: bool,

    /// The file to keep tokens in between invocations. Defaults to a file in
    /// the user's data directory.
    #[arg(long, value_hint = clap::ValueHint::FilePath, conflicts_with = "no_persist_tokens")]
    token_file: Option<PathBuf>,

    /// The path to the Pinentry program to use when asking for a password.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

fn get_token_storage(args: &Args) -> Box<dyn storage::Storage> {
    if !args.no_persist_tokens {
        if let Some(ref path) = args.token_file {
            return Box::new(storage::File::with_path(path));
        }

        if let Some(file_storage) = storage::File::new("tokens.json") {
            debug!("Keeping tokens in {}", file_storage.path().display());
            return Box::new(file_storage);
        }

        warn!("We need to fall back to in-memory token storage because there is no data directory");
    }

    Box::new(storage::Memory::new())
}

async fn log_transitions(mut rx: watch::Receiver<session::State>) {
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update();
        debug!(
            "Session state changed: authenticated={}, loading={}",
            state.is_authenticated, state.is_loading
        );
    }
}

async fn run(args: Args) -> Result<()> {
    let prompt: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let token_storage = get_token_storage(&args);
    if !token_storage.is_persistent() {
        info!("Tokens will not outlive this process");
    }
    let token_storage = Arc::new(Mutex::new(token_storage));

    match args.api_url.scheme() {
        "http" | "https" => {}
        _ => {
            error!(
                "The URL scheme {} of URL {} is not supported",
                args.api_url.scheme(),
                args.api_url
            );
            return Err(error::Error::Command);
        }
    }
    let api = api::Http::new(args.api_url, Arc::clone(&token_storage))?;
    let session = session::Manager::new(api, token_storage);
    let watcher = tokio::spawn(log_transitions(session.subscribe()));

    session.restore().await;
    let result =
        command::Command::execute(args.command, command::Context::new(&session, &prompt)).await;

    // Closing the state channel lets the watcher finish.
    drop(session);
    watcher.await?;

    result
}

#[tokio::main]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("NEOBANK_LOG", "warn")
        .write_style("NEOBANK_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
