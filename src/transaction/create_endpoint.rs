//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    timezone::local_today,
    transaction::{MAX_AMOUNT, Transaction, TransactionType, core::create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The value of the transaction in dollars, as typed.
    pub amount: String,
    /// Whether the money came in or went out.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The date when the transaction ocurred.
    pub date: Date,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Parse a dollar amount that is greater than zero, at most [MAX_AMOUNT] and
/// has at most two decimal places, e.g. "12.3" or "1000".
fn parse_amount(text: &str) -> Result<Decimal, Error> {
    let invalid = || Error::InvalidAmount(text.to_owned());

    let amount = text
        .trim()
        .parse::<Decimal>()
        .map_err(|_| invalid())?
        .normalize();

    if amount <= Decimal::ZERO || amount > MAX_AMOUNT || amount.scale() > 2 {
        return Err(invalid());
    }

    Ok(amount)
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let amount = match parse_amount(&form.amount) {
        Ok(amount) => amount,
        Err(error) => {
            tracing::warn!("Rejected transaction amount {:?}", form.amount);
            return error.into_alert_response();
        }
    };

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > today {
        tracing::error!(
            "Tried to perform an operation with a future date (e.g., create a transaction)"
        );

        return Error::FutureDate(form.date).into_alert_response();
    }

    let transaction = Transaction::build(amount, form.kind, form.date, form.description.trim())
        .category(form.category.as_deref());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_transaction(user_id, transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod create_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rust_decimal::Decimal;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::UserID,
        endpoints,
        test_utils::{assert_hx_redirect, get_test_connection},
        transaction::{TransactionType, count_transactions, get_transaction},
    };

    use super::{CreateTransactionState, TransactionForm, create_transaction_endpoint, parse_amount};

    const USER: UserID = UserID::new(1);

    fn get_state() -> CreateTransactionState {
        CreateTransactionState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn form(amount: &str) -> TransactionForm {
        TransactionForm {
            amount: amount.to_owned(),
            kind: TransactionType::Expense,
            date: OffsetDateTime::now_utc().date(),
            description: "  Groceries  ".to_owned(),
            category: Some(" Food ".to_owned()),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_state();

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(USER), Form(form("12.30")))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(USER, 1, &connection).unwrap();
        assert_eq!(transaction.amount, Decimal::new(123, 1));
        assert_eq!(transaction.kind, TransactionType::Expense);
        assert_eq!(transaction.description, "Groceries");
        assert_eq!(transaction.category.as_deref(), Some("Food"));
    }

    #[tokio::test]
    async fn rejects_future_date() {
        let state = get_state();
        let mut future = form("1");
        future.date = OffsetDateTime::now_utc().date() + Duration::days(2);

        let response =
            create_transaction_endpoint(State(state.clone()), Extension(USER), Form(future)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_transactions(USER, &connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn rejects_invalid_amounts() {
        for amount in ["0", "-5", "1.234", "ten", ""] {
            let state = get_state();

            let response = create_transaction_endpoint(
                State(state.clone()),
                Extension(USER),
                Form(form(amount)),
            )
            .await;

            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "want amount {amount:?} to be rejected"
            );
            let connection = state.db_connection.lock().unwrap();
            assert_eq!(count_transactions(USER, &connection).unwrap(), 0);
        }
    }

    #[test]
    fn parse_amount_allows_trailing_zeros() {
        assert_eq!(parse_amount("1.500"), Ok(Decimal::new(15, 1)));
        assert_eq!(parse_amount(" 42 "), Ok(Decimal::new(42, 0)));
        assert_eq!(
            parse_amount("0.001"),
            Err(Error::InvalidAmount("0.001".to_owned()))
        );
    }

    #[test]
    fn parse_amount_caps_at_one_trillion() {
        assert_eq!(parse_amount("1000000000000"), Ok(Decimal::new(1_000_000_000_000, 0)));
        assert_eq!(
            parse_amount("1000000000000.01"),
            Err(Error::InvalidAmount("1000000000000.01".to_owned()))
        );
        assert_eq!(
            parse_amount("79228162514264337593543950335"),
            Err(Error::InvalidAmount("79228162514264337593543950335".to_owned()))
        );
    }
}
