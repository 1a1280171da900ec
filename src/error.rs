// SPDX-FileCopyrightText: 2022-2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{convert::Infallible, fmt, io, result};

use reqwest::StatusCode;
use thiserror::Error;

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("API error: {0}")]
    Api(#[from] Api),
    #[error("password retrieval error: {0}")]
    Password(#[from] Password),
    #[error("{0}")]
    Validation(#[from] Validation),
    #[error("you are not logged in; run the login command first")]
    NotAuthenticated,
    #[error("command execution failed")]
    Command,
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Whether the server rejected the request because the access token was
    /// missing, invalid or expired.
    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(Api::ServerError(e)) if e.status() == StatusCode::UNAUTHORIZED)
    }
}

impl From<pinentry::Error> for Error {
    fn from(value: pinentry::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(
            clippy::wildcard_enum_match_arm,
            clippy::match_wildcard_for_single_variants
        )]
        match value {
            pinentry::Error::Cancelled | pinentry::Error::Timeout => Self::Cancelled,
            pinentry::Error::Io(e) => Self::Io(e),
            _ => Self::Password(Password::Pinentry(value)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

impl From<Infallible> for Error {
    fn from(_: Infallible) -> Self {
        unreachable!()
    }
}

#[derive(Error, Debug)]
pub(crate) enum Api {
    #[error("{0}")]
    ServerError(ServerError),
}

/// A request the server answered with a non-success status.
#[derive(Debug, Clone)]
pub(crate) struct ServerError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ServerError {
    pub(crate) const fn new(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub(crate) const fn status(&self) -> StatusCode {
        self.status
    }

    /// Picks the most specific message the server put in the response body.
    pub(crate) fn detail(&self) -> Option<String> {
        fn first(value: Option<&serde_json::Value>) -> Option<String> {
            match value? {
                serde_json::Value::Array(items) => items.first().and_then(|v| first(Some(v))),
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }
        }

        if let serde_json::Value::String(ref s) = self.body {
            return (!s.is_empty()).then(|| s.clone());
        }

        first(self.body.get("email"))
            .map(|e| format!("Email: {e}"))
            .or_else(|| first(self.body.get("password")).map(|e| format!("Password: {e}")))
            .or_else(|| first(self.body.get("non_field_errors")))
            .or_else(|| first(self.body.get("detail")))
            .or_else(|| first(self.body.get("error")))
            .or_else(|| first(self.body.get("message")))
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{detail}"),
            None => write!(f, "server returned HTTP {}", self.status.as_u16()),
        }
    }
}

impl From<ServerError> for Error {
    fn from(value: ServerError) -> Self {
        Self::Api(Api::ServerError(value))
    }
}

#[derive(Error, Debug)]
pub(crate) enum Password {
    #[error("no password prompt available")]
    NoPrompt,
    #[error("Pinentry implementation error: {0}")]
    Pinentry(pinentry::Error),
}

#[derive(Error, Debug, PartialEq)]
pub(crate) enum Validation {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),
}
