//! Fintrack is a web app for tracking personal finances.
//!
//! This library provides a REST API that directly serves HTML pages: a
//! dashboard, a filterable list of transactions, and the user's accounts.
//! All pages other than the log-in page sit behind a session gate.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword, get_user_by_id, set_user_password};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::get_404_not_found_response,
    transaction::MalformedRecordError,
};

/// Wait for Ctrl+C or SIGTERM, then give open connections one second to
/// finish before `handle` stops the server.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down."),
            Err(error) => {
                tracing::error!("Could not listen for Ctrl+C: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                tracing::info!("Received SIGTERM, shutting down.");
            }
            Err(error) => {
                tracing::error!("Could not listen for SIGTERM: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The password or session cookie did not check out.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request has no session cookie.
    #[error("the session cookie is missing")]
    CookieMissing,

    /// A date could not be formatted, e.g. the session expiry or a stored
    /// timestamp.
    #[error("could not format a date: {0}")]
    InvalidDateFormat(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// bcrypt failed. The message is for the server logs only.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A transaction was dated after today in the server's timezone.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A transaction amount was zero, negative or had more than two decimal
    /// places.
    #[error("\"{0}\" is not a valid transaction amount")]
    InvalidAmount(String),

    /// An account balance was not a number with at most two decimal places.
    #[error("\"{0}\" is not a valid account balance")]
    InvalidBalance(String),

    /// The last four digits of an account number were not exactly four digits.
    #[error("\"{0}\" is not a valid account number suffix")]
    InvalidAccountNumber(String),

    /// An empty string was used as an account name.
    #[error("account name cannot be empty")]
    EmptyAccountName,

    /// A query for a single row found nothing, or the row belongs to
    /// another user.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Any other SQLite error.
    #[error("SQL error: {0}")]
    SqlError(rusqlite::Error),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The user already has an account with this name.
    #[error("the account \"{0}\" already exists in the database")]
    DuplicateAccountName(String),

    /// The database mutex was poisoned by a panic in another request.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A delete request matched no transaction of the user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// A delete request matched no account of the user.
    #[error("tried to delete an account that is not in the database")]
    DeleteMissingAccount,

    /// A stored transaction could not be decoded.
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

fn invalid_timezone_fix(timezone: &str) -> String {
    format!(
        "\"{timezone}\" is not a known timezone. Restart the server with a canonical \
        timezone name such as \"Pacific/Auckland\"."
    )
}

/// Full error pages for page routes.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &invalid_timezone_fix(&timezone),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// An alert fragment for HTMX requests, swapped into `#alert-container`.
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => {
                Alert::error("Invalid Timezone Settings", &invalid_timezone_fix(&timezone))
                    .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Error::FutureDate(date) => Alert::error(
                "Invalid transaction date",
                &format!("{date} is a date in the future, which is not allowed."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidAmount(amount) => Alert::error(
                "Invalid transaction amount",
                &format!(
                    "\"{amount}\" is not a valid amount. Enter a positive number with at most \
                    two decimal places."
                ),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidBalance(balance) => Alert::error(
                "Invalid account balance",
                &format!(
                    "\"{balance}\" is not a valid balance. Enter a number with at most two \
                    decimal places, using a minus sign for money owed."
                ),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidAccountNumber(digits) => Alert::error(
                "Invalid account number",
                &format!("\"{digits}\" must be exactly the last four digits of the account number."),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::EmptyAccountName => {
                Alert::error("Invalid account name", "The account name cannot be empty.")
                    .into_response_with_status(StatusCode::BAD_REQUEST)
            }
            Error::DeleteMissingTransaction => Alert::error(
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DeleteMissingAccount => Alert::error(
                "Could not delete account",
                "The account could not be found. \
                Try refreshing the page to see if the account has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DuplicateAccountName(name) => Alert::error(
                "Duplicate Account Name",
                &format!(
                    "The account {name} already exists. \
                    Choose a different account name, or delete the existing account.",
                ),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
