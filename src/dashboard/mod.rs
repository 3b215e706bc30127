//! Dashboard module
//!
//! Provides an overview page with account totals, income and expense totals
//! and the most recent transactions.

mod handlers;

pub use handlers::get_dashboard_page;
