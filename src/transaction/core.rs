//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    database_id::{RowsAffected, TransactionId},
};

/// How dates are written to and read from the `date` column, e.g. "2024-01-31".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The largest amount of money accepted for a transaction or an account
/// balance: one trillion dollars.
///
/// Larger input is rejected, and larger stored amounts are treated as
/// malformed when loaded.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

// ============================================================================
// MODELS
// ============================================================================

/// Whether money came in or went out.
///
/// This alone decides the direction of a transaction, amounts are always
/// stored as magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// The text stored in the database and used in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    fn from_db_text(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned, always zero or more.
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    pub kind: TransactionType,
    /// A text description of what the transaction was for.
    pub description: String,
    /// A free text label such as "Groceries".
    pub category: Option<String>,
    /// When the transaction happened.
    pub date: Date,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: Decimal,
        kind: TransactionType,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            kind,
            date,
            description: description.to_owned(),
            category: None,
        }
    }

    /// Whether this transaction is money coming in.
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }
}

/// The fields needed to insert a new [Transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The magnitude of the transaction. The sign is dropped when stored.
    pub amount: Decimal,
    pub kind: TransactionType,
    /// The date the money moved. Must not be in the future, which is checked
    /// by the create endpoint.
    pub date: Date,
    pub description: String,
    pub category: Option<String>,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    ///
    /// Blank categories are stored as no category.
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned);
        self
    }
}

/// A stored row that could not be turned into a [Transaction].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedRecordError {
    #[error("transaction {id} has an amount that is not a number within range: {text:?}")]
    InvalidAmount { id: TransactionId, text: String },

    #[error("transaction {id} has a date that is not a calendar date: {text:?}")]
    InvalidDate { id: TransactionId, text: String },

    #[error("transaction {id} has a type that is neither income nor expense: {text:?}")]
    InvalidType { id: TransactionId, text: String },
}

/// Every transaction of one user at a point in time.
#[derive(Debug, Default, PartialEq)]
pub struct TransactionSnapshot {
    /// The rows that decoded cleanly, in insertion order.
    pub transactions: Vec<Transaction>,
    /// The rows that were skipped.
    pub malformed: Vec<MalformedRecordError>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// Amounts, dates and types are stored as text and decoded when loaded, see
/// [load_transaction_snapshot].
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                type TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT,
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user ON \"transaction\"(user_id);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `user_id` does not refer to a user.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = builder.amount.abs().normalize();
    let date_text = format_date(builder.date)?;

    let id = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, amount, type, description, category, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id",
        )?
        .query_row(
            (
                user_id.as_i64(),
                amount.to_string(),
                builder.kind.as_str(),
                &builder.description,
                &builder.category,
                date_text,
            ),
            |row| row.get(0),
        )?;

    Ok(Transaction {
        id,
        amount,
        kind: builder.kind,
        description: builder.description,
        category: builder.category,
        date: builder.date,
    })
}

/// Retrieve the transaction `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - [Error::MalformedRecord] if the stored row cannot be decoded,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let row = connection
        .prepare(
            "SELECT id, amount, type, description, category, date FROM \"transaction\"
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_raw_row,
        )?;

    Ok(row.decode()?)
}

/// Delete the transaction `id` if it is owned by `user_id`.
///
/// Returns zero if there was nothing to delete.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            &[(":id", &id), (":user_id", &user_id.as_i64())],
        )
        .map_err(|error| error.into())
}

/// Load all transactions of `user_id` in insertion order.
///
/// Rows that cannot be decoded are left out of
/// [TransactionSnapshot::transactions] and reported in
/// [TransactionSnapshot::malformed] instead.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn load_transaction_snapshot(
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionSnapshot, Error> {
    let mut statement = connection.prepare(
        "SELECT id, amount, type, description, category, date FROM \"transaction\"
         WHERE user_id = :user_id
         ORDER BY id ASC",
    )?;
    let rows = statement.query_map(&[(":user_id", &user_id.as_i64())], map_raw_row)?;

    let mut snapshot = TransactionSnapshot::default();

    for row in rows {
        match row?.decode() {
            Ok(transaction) => snapshot.transactions.push(transaction),
            Err(error) => {
                tracing::warn!("Skipping malformed row: {error}");
                snapshot.malformed.push(error);
            }
        }
    }

    Ok(snapshot)
}

/// Get the number of transactions owned by `user_id`, including malformed rows.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn format_date(date: Date) -> Result<String, Error> {
    date.format(DATE_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string()))
}

/// A transaction row before its text columns have been checked.
struct RawTransactionRow {
    id: TransactionId,
    amount: String,
    kind: String,
    description: String,
    category: Option<String>,
    date: String,
}

fn map_raw_row(row: &Row) -> Result<RawTransactionRow, rusqlite::Error> {
    Ok(RawTransactionRow {
        id: row.get(0)?,
        amount: row.get(1)?,
        kind: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
    })
}

impl RawTransactionRow {
    fn decode(self) -> Result<Transaction, MalformedRecordError> {
        let id = self.id;

        let amount = self
            .amount
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|amount| amount.abs() <= MAX_AMOUNT)
            .ok_or_else(|| MalformedRecordError::InvalidAmount {
                id,
                text: self.amount.clone(),
            })?;

        let kind = TransactionType::from_db_text(&self.kind).ok_or_else(|| {
            MalformedRecordError::InvalidType {
                id,
                text: self.kind.clone(),
            }
        })?;

        let date = Date::parse(self.date.trim(), DATE_FORMAT).map_err(|_| {
            MalformedRecordError::InvalidDate {
                id,
                text: self.date.clone(),
            }
        })?;

        Ok(Transaction {
            id,
            amount,
            kind,
            description: self.description,
            category: self.category,
            date,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        test_utils::{get_test_connection, insert_second_user},
        transaction::{
            MAX_AMOUNT, MalformedRecordError, Transaction, TransactionType, count_transactions,
            create_transaction, delete_transaction, get_transaction, load_transaction_snapshot,
        },
    };

    const USER: UserID = UserID::new(1);

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    fn insert_raw(connection: &Connection, amount: &str, kind: &str, date: &str) {
        connection
            .execute(
                "INSERT INTO \"transaction\" (user_id, amount, type, description, date)
                 VALUES (1, ?1, ?2, 'raw', ?3)",
                (amount, kind, date),
            )
            .unwrap();
    }

    #[test]
    fn create_and_get_round_trip() {
        let connection = get_test_connection();
        let builder = Transaction::build(
            dec("12.30"),
            TransactionType::Expense,
            date!(2025 - 10 - 05),
            "Coffee",
        )
        .category(Some("Food"));

        let created = create_transaction(USER, builder, &connection).unwrap();
        let got = get_transaction(USER, created.id, &connection).unwrap();

        assert_eq!(got, created);
        assert_eq!(got.amount, dec("12.3"));
        assert_eq!(got.category.as_deref(), Some("Food"));
    }

    #[test]
    fn amount_is_stored_as_magnitude() {
        let connection = get_test_connection();

        let created = create_transaction(
            USER,
            Transaction::build(
                dec("-5"),
                TransactionType::Expense,
                date!(2025 - 10 - 05),
                "",
            ),
            &connection,
        )
        .unwrap();

        assert_eq!(created.amount, dec("5"));
    }

    #[test]
    fn blank_category_is_none() {
        let builder = Transaction::build(
            dec("1"),
            TransactionType::Income,
            date!(2025 - 10 - 05),
            "",
        )
        .category(Some("   "));

        assert_eq!(builder.category, None);
    }

    #[test]
    fn get_other_users_transaction_is_not_found() {
        let connection = get_test_connection();
        let other_user = insert_second_user(&connection);
        let created = create_transaction(
            other_user,
            Transaction::build(
                dec("1"),
                TransactionType::Income,
                date!(2025 - 10 - 05),
                "",
            ),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(USER, created.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_removes_transaction() {
        let connection = get_test_connection();
        let created = create_transaction(
            USER,
            Transaction::build(
                dec("1.23"),
                TransactionType::Expense,
                date!(2025 - 10 - 26),
                "Test",
            ),
            &connection,
        )
        .unwrap();

        let rows_affected = delete_transaction(USER, created.id, &connection).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            get_transaction(USER, created.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_other_users_transaction_affects_nothing() {
        let connection = get_test_connection();
        let other_user = insert_second_user(&connection);
        let created = create_transaction(
            other_user,
            Transaction::build(
                dec("1"),
                TransactionType::Income,
                date!(2025 - 10 - 05),
                "",
            ),
            &connection,
        )
        .unwrap();

        let rows_affected = delete_transaction(USER, created.id, &connection).unwrap();

        assert_eq!(rows_affected, 0);
        assert_eq!(count_transactions(other_user, &connection), Ok(1));
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let connection = get_test_connection();
        let build = || {
            Transaction::build(
                dec("1"),
                TransactionType::Income,
                date!(2025 - 10 - 05),
                "",
            )
        };
        let first = create_transaction(USER, build(), &connection).unwrap();
        delete_transaction(USER, first.id, &connection).unwrap();

        let second = create_transaction(USER, build(), &connection).unwrap();

        assert!(second.id > first.id);
    }

    #[test]
    fn snapshot_is_scoped_to_user_in_insertion_order() {
        let connection = get_test_connection();
        let other_user = insert_second_user(&connection);
        let mut want = Vec::new();
        for i in 1..=3 {
            want.push(
                create_transaction(
                    USER,
                    Transaction::build(
                        Decimal::from(i),
                        TransactionType::Expense,
                        date!(2025 - 10 - 05),
                        "",
                    ),
                    &connection,
                )
                .unwrap(),
            );
        }
        create_transaction(
            other_user,
            Transaction::build(
                dec("99"),
                TransactionType::Income,
                date!(2025 - 10 - 05),
                "",
            ),
            &connection,
        )
        .unwrap();

        let snapshot = load_transaction_snapshot(USER, &connection).unwrap();

        assert_eq!(snapshot.transactions, want);
        assert!(snapshot.malformed.is_empty());
    }

    #[test]
    fn snapshot_skips_and_counts_malformed_rows() {
        let connection = get_test_connection();
        insert_raw(&connection, "12.50", "expense", "2024-01-01");
        insert_raw(&connection, "twelve", "expense", "2024-01-01");
        insert_raw(&connection, "1", "refund", "2024-01-01");
        insert_raw(&connection, "1", "income", "2024-02-30");

        let snapshot = load_transaction_snapshot(USER, &connection).unwrap();

        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].amount, dec("12.50"));
        assert_eq!(
            snapshot.malformed,
            vec![
                MalformedRecordError::InvalidAmount {
                    id: 2,
                    text: "twelve".to_owned()
                },
                MalformedRecordError::InvalidType {
                    id: 3,
                    text: "refund".to_owned()
                },
                MalformedRecordError::InvalidDate {
                    id: 4,
                    text: "2024-02-30".to_owned()
                },
            ]
        );
    }

    #[test]
    fn snapshot_treats_out_of_range_amounts_as_malformed() {
        let connection = get_test_connection();
        insert_raw(&connection, "1000000000000", "income", "2024-01-01");
        insert_raw(&connection, "79228162514264337593543950335", "income", "2024-01-01");

        let snapshot = load_transaction_snapshot(USER, &connection).unwrap();

        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].amount, MAX_AMOUNT);
        assert_eq!(
            snapshot.malformed,
            vec![MalformedRecordError::InvalidAmount {
                id: 2,
                text: "79228162514264337593543950335".to_owned()
            }]
        );
    }

    #[test]
    fn max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, dec("1000000000000"));
    }

    #[test]
    fn count_includes_malformed_rows() {
        let connection = get_test_connection();
        insert_raw(&connection, "1", "expense", "2024-01-01");
        insert_raw(&connection, "oops", "expense", "2024-01-01");

        assert_eq!(count_transactions(USER, &connection), Ok(2));
    }
}
