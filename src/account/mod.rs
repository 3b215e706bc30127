//! Bank accounts, savings accounts and credit cards with their balances.

mod accounts_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;

pub use accounts_page::get_accounts_page;
pub(crate) use accounts_page::account_summary_view;
pub use core::{
    Account, AccountKind, AccountSummary, NewAccount, create_account, create_account_table,
    delete_account, get_accounts, summarize_accounts,
};
pub use create_endpoint::create_account_endpoint;
pub use create_page::get_create_account_page;
pub use delete_endpoint::delete_account_endpoint;
