//! Defines the endpoint for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::core::{AccountKind, NewAccount, create_account},
    auth::UserID,
    endpoints,
    transaction::MAX_AMOUNT,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating an account.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub name: String,
    pub kind: AccountKind,
    /// The balance in dollars, as typed.
    pub balance: String,
    #[serde(default)]
    pub last_four: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn is_last_four(digits: &str) -> bool {
    digits.len() == 4 && digits.bytes().all(|byte| byte.is_ascii_digit())
}

impl TryFrom<AccountForm> for NewAccount {
    type Error = Error;

    fn try_from(form: AccountForm) -> Result<Self, Self::Error> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(Error::EmptyAccountName);
        }

        let balance = form
            .balance
            .trim()
            .parse::<Decimal>()
            .map(|balance| balance.normalize())
            .ok()
            .filter(|balance| balance.scale() <= 2 && balance.abs() <= MAX_AMOUNT)
            .ok_or_else(|| Error::InvalidBalance(form.balance.clone()))?;

        let last_four = non_blank(form.last_four.as_deref());
        if let Some(digits) = last_four.as_ref().filter(|digits| !is_last_four(digits)) {
            return Err(Error::InvalidAccountNumber(digits.clone()));
        }

        Ok(NewAccount {
            name: name.to_owned(),
            kind: form.kind,
            balance,
            last_four,
            institution: non_blank(form.institution.as_deref()),
        })
    }
}

/// A route handler for creating a new account, redirects to accounts view on success.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<AccountForm>,
) -> Response {
    let new_account = match NewAccount::try_from(form) {
        Ok(new_account) => new_account,
        Err(error) => {
            tracing::warn!("Rejected new account: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_account(user_id, new_account, &connection) {
        tracing::error!("could not create account: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod create_account_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;

    use crate::{
        Error,
        account::core::{AccountKind, NewAccount, get_accounts},
        auth::UserID,
        endpoints,
        test_utils::{assert_hx_redirect, get_test_connection},
    };

    use super::{AccountForm, CreateAccountState, create_account_endpoint};

    const USER: UserID = UserID::new(1);

    fn form(name: &str, balance: &str, last_four: Option<&str>) -> AccountForm {
        AccountForm {
            name: name.to_owned(),
            kind: AccountKind::CreditCard,
            balance: balance.to_owned(),
            last_four: last_four.map(str::to_owned),
            institution: Some("   ".to_owned()),
        }
    }

    fn get_state() -> CreateAccountState {
        CreateAccountState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        }
    }

    #[tokio::test]
    async fn creates_account_and_redirects() {
        let state = get_state();

        let response = create_account_endpoint(
            State(state.clone()),
            Extension(USER),
            Form(form(" Visa ", "-120.50", Some("0042"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let accounts = get_accounts(USER, &connection).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "Visa");
        assert_eq!(accounts[0].balance, Decimal::new(-12_050, 2));
        assert_eq!(accounts[0].last_four.as_deref(), Some("0042"));
        assert_eq!(accounts[0].institution, None);
    }

    #[tokio::test]
    async fn duplicate_name_is_bad_request() {
        let state = get_state();
        create_account_endpoint(
            State(state.clone()),
            Extension(USER),
            Form(form("Visa", "0", None)),
        )
        .await;

        let response = create_account_endpoint(
            State(state.clone()),
            Extension(USER),
            Form(form("Visa", "10", None)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validates_form() {
        let cases = [
            (form("  ", "1", None), Error::EmptyAccountName),
            (
                form("Visa", "12.345", None),
                Error::InvalidBalance("12.345".to_owned()),
            ),
            (
                form("Visa", "abc", None),
                Error::InvalidBalance("abc".to_owned()),
            ),
            (
                form("Visa", "-1000000000000.01", None),
                Error::InvalidBalance("-1000000000000.01".to_owned()),
            ),
            (
                form("Visa", "79228162514264337593543950335", None),
                Error::InvalidBalance("79228162514264337593543950335".to_owned()),
            ),
            (
                form("Visa", "1", Some("12a4")),
                Error::InvalidAccountNumber("12a4".to_owned()),
            ),
            (
                form("Visa", "1", Some("12345")),
                Error::InvalidAccountNumber("12345".to_owned()),
            ),
        ];

        for (form, want) in cases {
            assert_eq!(NewAccount::try_from(form), Err(want));
        }
    }

    #[test]
    fn blank_last_four_is_none() {
        let new_account = NewAccount::try_from(form("Visa", "1", Some(""))).unwrap();

        assert_eq!(new_account.last_four, None);
    }
}
