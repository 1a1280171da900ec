// SPDX-FileCopyrightText: 2026 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::{
    api::Api,
    error::{Error, Result},
    model::{AccountSnapshot, UserProfile},
    session::State,
    storage::Storage,
};

/// Show the signed-in user and their account.
#[derive(Debug, Parser)]
pub(crate) struct Command {}

#[async_trait]
impl super::Command for Command {
    async fn execute<A: Api, S: Storage>(self, ctx: super::Context<'_, A, S>) -> Result<()> {
        let state = ctx.session.state();
        if !state.is_authenticated {
            return Err(Error::NotAuthenticated);
        }

        println!("{}", render(&state));
        Ok(())
    }
}

#[derive(Tabled)]
struct Field {
    #[tabled(rename = "Field")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn date(timestamp: &str) -> &str {
    timestamp.split_once('T').map_or(timestamp, |(date, _)| date)
}

fn user_fields(user: &UserProfile) -> Vec<Field> {
    vec![
        Field {
            name: "Name",
            value: user.full_name(),
        },
        Field {
            name: "Email",
            value: user.email.clone(),
        },
        Field {
            name: "Member since",
            value: date(&user.date_joined).to_owned(),
        },
        Field {
            name: "User ID",
            value: user.id.to_string(),
        },
    ]
}

fn account_fields(account: &AccountSnapshot) -> Vec<Field> {
    vec![
        Field {
            name: "Account number",
            value: account.account_number.clone(),
        },
        Field {
            name: "Account type",
            value: account.account_type.clone(),
        },
        Field {
            name: "Balance",
            value: format_balance(&account.balance),
        },
        Field {
            name: "Opened",
            value: date(&account.created_at).to_owned(),
        },
    ]
}

fn table(fields: Vec<Field>) -> String {
    Table::new(fields)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()))
        .to_string()
}

/// Renders the dashboard for a session. Sections for data that has not been
/// loaded are left out.
pub(crate) fn render(state: &State) -> String {
    let mut sections = Vec::new();
    if let Some(ref user) = state.user {
        sections.push(format!("User information\n{}", table(user_fields(user))));
    }
    if let Some(ref account) = state.account {
        sections.push(format!("Account\n{}", table(account_fields(account))));
    }
    sections.join("\n\n")
}

/// Formats a decimal amount in dollars with thousands separators and two
/// decimal places. Anything that isn't a number is returned as is.
pub(crate) fn format_balance(balance: &str) -> String {
    let amount = match balance.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => amount,
        _ => return balance.to_owned(),
    };

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use uuid::uuid;

    use crate::model::Owner;

    use super::*;

    #[test]
    fn balance_is_grouped_with_two_decimals() {
        assert_eq!(format_balance("127589.45"), "$127,589.45");
        assert_eq!(format_balance("100"), "$100.00");
        assert_eq!(format_balance("1000.5"), "$1,000.50");
        assert_eq!(format_balance("0.00"), "$0.00");
        assert_eq!(format_balance("1234567.891"), "$1,234,567.89");
        assert_eq!(format_balance("-2500.00"), "-$2,500.00");
    }

    #[test]
    fn unparseable_balance_is_shown_verbatim() {
        assert_eq!(format_balance("n/a"), "n/a");
        assert_eq!(format_balance("inf"), "inf");
    }

    #[test]
    fn timestamps_are_shown_as_dates() {
        assert_eq!(date("2024-05-01T10:00:00Z"), "2024-05-01");
        assert_eq!(date("2024-05-01"), "2024-05-01");
    }

    #[test]
    fn dashboard_lists_user_and_account() {
        let user = UserProfile {
            id: uuid!("6f1c5a52-2d1e-4c57-9a3e-0d7f1b8a9c01"),
            email: "a@x.com".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            date_joined: "2024-05-01T10:00:00Z".to_owned(),
        };
        let state = State {
            account: Some(AccountSnapshot {
                id: uuid!("0b3f6a8e-51c4-4c0e-8d4b-2f1a6f0e9d10"),
                user: Owner::Id(user.id),
                balance: "127589.45".to_owned(),
                account_number: "NB1234567890".to_owned(),
                account_type: "Premium Elite".to_owned(),
                created_at: "2024-05-02T09:30:00Z".to_owned(),
            }),
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        };

        let out = render(&state);
        for expected in [
            "User information",
            "Ada Lovelace",
            "a@x.com",
            "2024-05-01",
            "Account",
            "NB1234567890",
            "Premium Elite",
            "$127,589.45",
            "2024-05-02",
        ] {
            assert!(out.contains(expected), "missing {expected:?} in\n{out}");
        }
    }

    #[test]
    fn dashboard_of_empty_state_is_empty() {
        let state = State {
            user: None,
            account: None,
            is_authenticated: false,
            is_loading: false,
        };
        assert_eq!(render(&state), "");
    }
}
