//! The transactions page: a filtered, searched and sorted list with totals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    transaction::{
        core::load_transaction_snapshot,
        listing::{ViewOptions, ViewQuery, compute_view},
        view::transactions_view,
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the signed in user's transactions.
///
/// The query string selects the type filter (`type`), search text (`q`),
/// sort field (`sort`) and sort order (`order`). Missing or unknown values
/// fall back to showing everything, newest first. A repeated key uses its
/// last value.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, Error> {
    let options = ViewOptions::from(ViewQuery::from_iter(pairs));

    let snapshot = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_transaction_snapshot(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not load transactions: {error}"))?
    };

    let view = compute_view(&snapshot.transactions, &options);

    Ok(transactions_view(
        &view,
        &options,
        !snapshot.transactions.is_empty(),
        snapshot.malformed.len(),
    )
    .into_response())
}
