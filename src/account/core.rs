//! The account model and its database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    auth::UserID,
    database_id::{AccountId, RowsAffected},
};

/// What sort of account holds the money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Other,
}

impl AccountKind {
    pub const ALL: [Self; 4] = [
        Self::Checking,
        Self::Savings,
        Self::CreditCard,
        Self::Other,
    ];

    /// The text stored in the database and used in forms.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::CreditCard => "credit_card",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
            Self::CreditCard => "Credit card",
            Self::Other => "Other",
        }
    }
}

impl FromStr for AccountKind {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == text)
            .ok_or(())
    }
}

impl Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bank account, savings account or credit card and its current balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    /// Unique among the accounts of one user.
    pub name: String,
    pub kind: AccountKind,
    /// Negative balances on credit cards are money owed.
    pub balance: Decimal,
    /// The last four digits of the account or card number.
    pub last_four: Option<String>,
    /// The bank or card issuer.
    pub institution: Option<String>,
    pub created_at: OffsetDateTime,
}

/// The fields needed to insert a new [Account].
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub last_four: Option<String>,
    pub institution: Option<String>,
}

/// Totals across all of a user's accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountSummary {
    /// The sum of every balance.
    pub total_balance: Decimal,
    /// The money owed on credit cards, as a positive number.
    pub total_debt: Decimal,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            balance TEXT NOT NULL,
            last_four TEXT,
            institution TEXT,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create a new account for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateAccountName] if `user_id` already has an account with the same name,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(
    user_id: UserID,
    new_account: NewAccount,
    connection: &Connection,
) -> Result<Account, Error> {
    let now = OffsetDateTime::now_utc();
    let created_at = now.replace_nanosecond(0).unwrap_or(now);
    let created_at_text = created_at
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidDateFormat(error.to_string()))?;

    let id = connection
        .prepare(
            "INSERT INTO account (user_id, name, kind, balance, last_four, institution, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                &new_account.name,
                new_account.kind.as_str(),
                new_account.balance.to_string(),
                &new_account.last_four,
                &new_account.institution,
                created_at_text,
            ),
            |row| row.get(0),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, Some(_))
                if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Error::DuplicateAccountName(new_account.name.clone())
            }
            error => error.into(),
        })?;

    Ok(Account {
        id,
        name: new_account.name,
        kind: new_account.kind,
        balance: new_account.balance,
        last_four: new_account.last_four,
        institution: new_account.institution,
        created_at,
    })
}

/// Get the accounts of `user_id`, most recently created first.
///
/// Accounts created within the same second are ordered by descending ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_accounts(user_id: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, balance, last_four, institution, created_at FROM account
             WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_account_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Delete the account `id` if it is owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_account(
    user_id: UserID,
    id: AccountId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM account WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(|error| error.into())
}

/// Total the balances of `accounts` and the debt owed on credit cards.
///
/// Totals saturate at the bounds of [Decimal] instead of overflowing.
pub fn summarize_accounts(accounts: &[Account]) -> AccountSummary {
    accounts
        .iter()
        .fold(AccountSummary::default(), |summary, account| {
            let debt = match account.kind {
                AccountKind::CreditCard if account.balance < Decimal::ZERO => -account.balance,
                _ => Decimal::ZERO,
            };

            AccountSummary {
                total_balance: summary.total_balance.saturating_add(account.balance),
                total_debt: summary.total_debt.saturating_add(debt),
            }
        })
}

fn conversion_error(column: usize, text: &str, what: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        Type::Text,
        format!("{text:?} is not a valid {what}").into(),
    )
}

fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let kind_text: String = row.get(2)?;
    let balance_text: String = row.get(3)?;
    let created_at_text: String = row.get(6)?;

    let kind = kind_text
        .parse::<AccountKind>()
        .map_err(|_| conversion_error(2, &kind_text, "account kind"))?;
    let balance = balance_text
        .parse::<Decimal>()
        .map_err(|_| conversion_error(3, &balance_text, "balance"))?;
    let created_at = OffsetDateTime::parse(&created_at_text, &Rfc3339)
        .map_err(|_| conversion_error(6, &created_at_text, "timestamp"))?;

    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        kind,
        balance,
        last_four: row.get(4)?,
        institution: row.get(5)?,
        created_at,
    })
}
