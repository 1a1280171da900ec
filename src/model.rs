// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct UserProfile {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) date_joined: String,
}

impl UserProfile {
    pub(crate) fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// The user an account belongs to. Depending on how the server serializes the
/// relation this is either the whole profile or only its identifier.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub(crate) enum Owner {
    Profile(UserProfile),
    Id(Uuid),
}

impl Owner {
    pub(crate) const fn id(&self) -> Uuid {
        match *self {
            Self::Profile(ref profile) => profile.id,
            Self::Id(id) => id,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct AccountSnapshot {
    pub(crate) id: Uuid,
    pub(crate) user: Owner,
    /// Decimal amount exactly as the server rendered it, e.g. `"100.00"`.
    pub(crate) balance: String,
    pub(crate) account_number: String,
    pub(crate) account_type: String,
    pub(crate) created_at: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TokenPair {
    pub(crate) access: SecretString,
    pub(crate) refresh: SecretString,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(default)]
    pub(crate) message: Option<String>,
    pub(crate) user: UserProfile,
    pub(crate) tokens: TokenPair,
}

/// Result of exchanging a refresh token. The server only sends a new refresh
/// token when it rotates them.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TokenRefresh {
    pub(crate) access: SecretString,
    #[serde(default)]
    pub(crate) refresh: Option<SecretString>,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    #[serde(serialize_with = "expose")]
    pub(crate) password: SecretString,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct RegisterRequest {
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    #[serde(serialize_with = "expose")]
    pub(crate) password: SecretString,
    #[serde(serialize_with = "expose")]
    pub(crate) password_confirm: SecretString,
}

#[derive(Serialize)]
pub(crate) struct RefreshTokenBody<'token> {
    pub(crate) refresh: &'token str,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use serde_test::{assert_ser_tokens, Token};
    use uuid::uuid;

    use crate::error::Result;

    use super::*;

    #[test]
    fn login_request_exposes_password_only_on_the_wire() {
        let req = LoginRequest {
            email: "a@x.com".to_owned(),
            password: SecretString::new("secret".to_owned()),
        };

        assert_ser_tokens(
            &req,
            &[
                Token::Struct {
                    name: "LoginRequest",
                    len: 2,
                },
                Token::Str("email"),
                Token::Str("a@x.com"),
                Token::Str("password"),
                Token::Str("secret"),
                Token::StructEnd,
            ],
        );
        assert!(!format!("{req:?}").contains("secret"));
    }

    #[test]
    fn account_owner_accepts_nested_profile_or_id() -> Result<()> {
        let owner_id = uuid!("6f1c5a52-2d1e-4c57-9a3e-0d7f1b8a9c01");
        let profile = json!({
            "id": owner_id,
            "email": "a@x.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "date_joined": "2024-05-01T10:00:00Z",
        });
        let account = |user: serde_json::Value| {
            json!({
                "id": "0b3f6a8e-51c4-4c0e-8d4b-2f1a6f0e9d10",
                "user": user,
                "balance": "100.00",
                "account_number": "NB1234567890",
                "account_type": "Premium Elite",
                "created_at": "2024-05-01T10:00:00Z",
            })
        };

        let nested: AccountSnapshot = serde_json::from_value(account(profile))?;
        assert!(matches!(nested.user, Owner::Profile(ref p) if p.first_name == "Ada"));
        assert_eq!(nested.user.id(), owner_id);
        assert_eq!(nested.balance, "100.00");

        let flat: AccountSnapshot = serde_json::from_value(account(json!(owner_id)))?;
        assert_eq!(flat.user, Owner::Id(owner_id));
        Ok(())
    }

    #[test]
    fn refresh_token_is_optional_in_renewal() -> Result<()> {
        let renewed: TokenRefresh = serde_json::from_value(json!({"access": "new"}))?;
        assert_eq!(renewed.access.expose_secret(), "new");
        assert!(renewed.refresh.is_none());
        Ok(())
    }
}
