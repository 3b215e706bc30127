//! Transactions: money earned or spent on a given date.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, loading and deleting transactions
//! - The view engine that filters, searches, sorts and totals a snapshot
//! - Route handlers for the transaction pages and endpoints

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod listing;
mod transactions_page;
mod view;

pub use core::{
    MAX_AMOUNT, MalformedRecordError, Transaction, TransactionBuilder, TransactionSnapshot, TransactionType,
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    load_transaction_snapshot,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use listing::{
    SortKey, SortOrder, Totals, TransactionView, TypeFilter, ViewOptions, ViewQuery, compute_view,
};
pub use transactions_page::get_transactions_page;
pub(crate) use view::{format_date, format_description, signed_amount, totals_view};

#[cfg(test)]
pub use core::count_transactions;
