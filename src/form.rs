// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Checks made on user input before it is sent to the server.

use secrecy::{ExposeSecret as _, SecretString};

use crate::{error::Validation, model::RegisterRequest};

pub(crate) const MIN_PASSWORD_LENGTH: usize = 8;

pub(crate) fn check_login(email: &str, password: &SecretString) -> Result<(), Validation> {
    if email.trim().is_empty() || password.expose_secret().is_empty() {
        return Err(Validation::MissingFields);
    }
    Ok(())
}

/// Splits a full name into first and last name. A single word serves as
/// both.
pub(crate) fn split_name(full_name: &str) -> Option<(String, String)> {
    let mut words = full_name.split_whitespace();
    let first = words.next()?.to_owned();
    let rest = words.collect::<Vec<_>>().join(" ");
    let last = if rest.is_empty() { first.clone() } else { rest };
    Some((first, last))
}

pub(crate) fn registration(
    full_name: &str,
    email: &str,
    password: SecretString,
    password_confirm: SecretString,
) -> Result<RegisterRequest, Validation> {
    let email = email.trim();
    let Some((first_name, last_name)) = split_name(full_name) else {
        return Err(Validation::MissingFields);
    };
    if email.is_empty()
        || password.expose_secret().is_empty()
        || password_confirm.expose_secret().is_empty()
    {
        return Err(Validation::MissingFields);
    }

    if password.expose_secret() != password_confirm.expose_secret() {
        return Err(Validation::PasswordMismatch);
    }
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Validation::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    Ok(RegisterRequest {
        email: email.to_owned(),
        first_name,
        last_name,
        password,
        password_confirm,
    })
}
