//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{AccountSummary, account_summary_view, get_accounts, summarize_accounts},
    auth::UserID,
    endpoints,
    html::{PAGE_CONTAINER_STYLE, amount_class, base, format_currency, link},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionView, ViewOptions, compute_view, format_date, format_description,
        load_transaction_snapshot, signed_amount, totals_view,
    },
};

/// How many transactions to list under "Recent transactions".
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading accounts and transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn recent_transaction_view(transaction: &Transaction) -> Markup {
    let (description, tooltip) = format_description(&transaction.description);

    html! {
        li class="flex justify-between gap-4 px-4 py-3" data-transaction-id=(transaction.id)
        {
            div
            {
                p class="font-medium" title=[tooltip] { (description) }
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    time datetime=(transaction.date) { (format_date(transaction)) }
                }
            }

            p class={ "tabular-nums " (amount_class(transaction.is_income())) }
            {
                (format_currency(signed_amount(transaction)))
            }
        }
    }
}

fn recent_transactions_view(transactions: &[Transaction]) -> Markup {
    html! {
        ul class="w-full divide-y divide-gray-200 dark:divide-gray-700 rounded bg-white dark:bg-gray-800 shadow"
        {
            @for transaction in transactions {
                (recent_transaction_view(transaction))
            }

            @if transactions.is_empty() {
                li class="px-4 py-3 text-center" data-empty-state="true"
                {
                    "No transactions yet. "
                    (link(endpoints::NEW_TRANSACTION_VIEW, "Add your first transaction"))
                }
            }
        }
    }
}

fn dashboard_view(account_summary: &AccountSummary, view: &TransactionView) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let recent: Vec<Transaction> = view
        .transactions
        .iter()
        .take(RECENT_TRANSACTION_COUNT)
        .cloned()
        .collect();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="space-y-6 w-full lg:max-w-5xl"
            {
                section class="space-y-2"
                {
                    h2 class="text-xl font-bold" { "Accounts" }
                    (account_summary_view(account_summary))
                }

                section class="space-y-2"
                {
                    h2 class="text-xl font-bold" { "All time" }
                    (totals_view(&view.totals))
                }

                section class="space-y-2"
                {
                    header class="flex justify-between items-end"
                    {
                        h2 class="text-xl font-bold" { "Recent transactions" }
                        (link(endpoints::TRANSACTIONS_VIEW, "View all"))
                    }

                    (recent_transactions_view(&recent))
                }
            }
        }
    };

    base("Dashboard", &[], &content)
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (accounts, snapshot) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let accounts = get_accounts(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
        let snapshot = load_transaction_snapshot(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not load transactions: {error}"))?;

        (accounts, snapshot)
    };

    let account_summary = summarize_accounts(&accounts);
    let view = compute_view(&snapshot.transactions, &ViewOptions::default());

    Ok(dashboard_view(&account_summary, &view).into_response())
}

#[cfg(test)]
mod dashboard_route_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rust_decimal::Decimal;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::{Date, Duration, macros::date};

    use crate::{
        account::{AccountKind, NewAccount, create_account},
        auth::UserID,
        test_utils::{assert_status_ok, assert_valid_html, get_test_connection, parse_html_document},
        transaction::{Transaction, TransactionType, create_transaction},
    };

    use super::{DashboardState, get_dashboard_page};

    const USER: UserID = UserID::new(1);

    async fn render(connection: Connection) -> Html {
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_dashboard_page(State(state), Extension(USER))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        html
    }

    fn text_of(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();

        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("nothing matches {selector:?}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    fn add(connection: &Connection, cents: i64, kind: TransactionType, date: Date) {
        create_transaction(
            USER,
            Transaction::build(Decimal::new(cents, 2), kind, date, &date.to_string()),
            connection,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn shows_account_summary_and_totals() {
        let connection = get_test_connection();
        create_account(
            USER,
            NewAccount {
                name: "Visa".to_owned(),
                kind: AccountKind::CreditCard,
                balance: Decimal::new(-25_000, 2),
                last_four: None,
                institution: None,
            },
            &connection,
        )
        .unwrap();
        create_account(
            USER,
            NewAccount {
                name: "Everyday".to_owned(),
                kind: AccountKind::Checking,
                balance: Decimal::new(100_000, 2),
                last_four: None,
                institution: None,
            },
            &connection,
        )
        .unwrap();
        add(&connection, 300_000, TransactionType::Income, date!(2024 - 01 - 01));
        add(&connection, 45_025, TransactionType::Expense, date!(2024 - 01 - 02));

        let html = render(connection).await;

        assert_eq!(text_of(&html, "[data-summary=total-balance]"), "$750.00");
        assert_eq!(text_of(&html, "[data-summary=total-debt]"), "$250.00");
        assert_eq!(text_of(&html, "[data-total=income]"), "$3,000.00");
        assert_eq!(text_of(&html, "[data-total=expenses]"), "-$450.25");
        assert_eq!(text_of(&html, "[data-total=net]"), "$2,549.75");
    }

    #[tokio::test]
    async fn lists_five_most_recent_transactions() {
        let connection = get_test_connection();
        let first_day = date!(2024 - 05 - 01);
        for offset in 0..7 {
            add(
                &connection,
                100,
                TransactionType::Expense,
                first_day + Duration::days(offset),
            );
        }

        let html = render(connection).await;

        let items = Selector::parse("li[data-transaction-id] time").unwrap();
        let dates: Vec<_> = html
            .select(&items)
            .filter_map(|time| time.value().attr("datetime"))
            .collect();
        assert_eq!(
            dates,
            [
                "2024-05-07",
                "2024-05-06",
                "2024-05-05",
                "2024-05-04",
                "2024-05-03"
            ]
        );
    }

    #[tokio::test]
    async fn empty_dashboard_prompts_to_add_transaction() {
        let html = render(get_test_connection()).await;

        assert!(text_of(&html, "li[data-empty-state]").starts_with("No transactions yet"));
        assert_eq!(text_of(&html, "[data-total=net]"), "$0.00");
    }
}
