// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The two tokens a session needs, kept in a [`Storage`] under fixed keys.

use secrecy::{ExposeSecret as _, SecretString};

use crate::{error::Result, model::TokenPair, storage::Storage};

pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";

async fn token<S: Storage + ?Sized>(storage: &mut S, key: &str) -> Result<Option<SecretString>> {
    Ok(storage
        .get(key)
        .await?
        .filter(|value| !value.is_empty())
        .map(SecretString::new))
}

pub(crate) async fn access_token<S: Storage + ?Sized>(
    storage: &mut S,
) -> Result<Option<SecretString>> {
    token(storage, ACCESS_TOKEN_KEY).await
}

pub(crate) async fn refresh_token<S: Storage + ?Sized>(
    storage: &mut S,
) -> Result<Option<SecretString>> {
    token(storage, REFRESH_TOKEN_KEY).await
}

pub(crate) async fn set_access_token<S: Storage + ?Sized>(
    storage: &mut S,
    access: &SecretString,
) -> Result<()> {
    storage
        .set(ACCESS_TOKEN_KEY, access.expose_secret())
        .await
}

pub(crate) async fn set_refresh_token<S: Storage + ?Sized>(
    storage: &mut S,
    refresh: &SecretString,
) -> Result<()> {
    storage
        .set(REFRESH_TOKEN_KEY, refresh.expose_secret())
        .await
}

pub(crate) async fn store<S: Storage + ?Sized>(storage: &mut S, tokens: &TokenPair) -> Result<()> {
    set_access_token(storage, &tokens.access).await?;
    set_refresh_token(storage, &tokens.refresh).await
}

/// Removes both tokens. Both removals are attempted even if the first fails.
pub(crate) async fn clear<S: Storage + ?Sized>(storage: &mut S) -> Result<()> {
    let access = storage.remove(ACCESS_TOKEN_KEY).await;
    let refresh = storage.remove(REFRESH_TOKEN_KEY).await;
    access.and(refresh)
}

#[cfg(test)]
mod tests {
    use crate::storage::Memory;

    use super::*;

    #[tokio::test]
    async fn empty_token_counts_as_absent() -> Result<()> {
        let mut storage = Memory::new();
        assert!(access_token(&mut storage).await?.is_none());

        storage.set(ACCESS_TOKEN_KEY, "").await?;
        assert!(access_token(&mut storage).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn store_then_clear() -> Result<()> {
        let mut storage = Memory::new();
        let tokens = TokenPair {
            access: SecretString::new("T_acc".to_owned()),
            refresh: SecretString::new("T_ref".to_owned()),
        };

        store(&mut storage, &tokens).await?;
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).await?.as_deref(), Some("T_acc"));
        assert_eq!(
            refresh_token(&mut storage)
                .await?
                .map(|t| t.expose_secret().clone())
                .as_deref(),
            Some("T_ref")
        );

        clear(&mut storage).await?;
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).await?, None);
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).await?, None);
        Ok(())
    }
}
