//! Displays accounts and their balances.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rust_decimal::Decimal;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::{Account, AccountKind, AccountSummary, get_accounts, summarize_accounts},
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, amount_class, base, delete_action_link, format_currency,
    },
    navigation::NavBar,
};

/// The state needed for the [get_accounts_page](crate::account::get_accounts_page) route handler.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Cards for the total balance and credit card debt.
pub(crate) fn account_summary_view(summary: &AccountSummary) -> Markup {
    html! {
        div class="grid grid-cols-1 sm:grid-cols-2 gap-4 w-full"
        {
            div class="rounded bg-white dark:bg-gray-800 shadow px-4 py-3"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total balance" }
                p
                    class={ "text-lg font-semibold tabular-nums "
                        (amount_class(summary.total_balance >= Decimal::ZERO)) }
                    data-summary="total-balance"
                {
                    (format_currency(summary.total_balance))
                }
            }

            div class="rounded bg-white dark:bg-gray-800 shadow px-4 py-3"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Credit card debt" }
                p class="text-lg font-semibold tabular-nums" data-summary="total-debt"
                {
                    (format_currency(summary.total_debt))
                }
            }
        }
    }
}

fn account_row_view(account: &Account) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_ACCOUNT, account.id);
    let confirm_message = format!(
        "Are you sure you want to delete the account '{}'? This cannot be undone.",
        account.name
    );
    let is_debt = account.kind == AccountKind::CreditCard && account.balance < Decimal::ZERO;

    html! {
        tr class=(TABLE_ROW_STYLE) data-account-id=(account.id)
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (account.name)

                @if let Some(last_four) = &account.last_four {
                    span class="ml-2 text-gray-500 dark:text-gray-400" { "•••• " (last_four) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(BADGE_STYLE) { (account.kind.label()) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (account.institution.as_deref().unwrap_or("-"))
            }

            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(!is_debt)) }
            {
                (format_currency(account.balance))
            }

            td class=(TABLE_CELL_STYLE)
            {
                (delete_action_link(&delete_url, &confirm_message, "closest tr"))
            }
        }
    }
}

fn accounts_view(accounts: &[Account], summary: &AccountSummary) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE)
                    {
                        "Add Account"
                    }
                }

                (account_summary_view(summary))

                div class="overflow-x-auto rounded"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class="px-6 py-3" { "Name" }
                                th scope="col" class="px-6 py-3" { "Type" }
                                th scope="col" class="px-6 py-3" { "Institution" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class="px-6 py-3" { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                (account_row_view(account))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td colspan="5" data-empty-state="true" class="px-6 py-4 text-center"
                                    {
                                        "No accounts yet. "
                                        a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE)
                                        {
                                            "Add an account"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Accounts", &[], &content)
}

/// Render the signed in user's accounts with their total balance and debt.
pub async fn get_accounts_page(
    State(state): State<AccountState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let accounts = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_accounts(user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?
    };

    let summary = summarize_accounts(&accounts);

    Ok(accounts_view(&accounts, &summary).into_response())
}

#[cfg(test)]
mod accounts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rust_decimal::Decimal;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        account::core::{AccountKind, NewAccount, create_account},
        auth::UserID,
        endpoints::{self, format_endpoint},
        test_utils::{assert_status_ok, assert_valid_html, get_test_connection, parse_html_document},
    };

    use super::{AccountState, get_accounts_page};

    const USER: UserID = UserID::new(1);

    async fn render(connection: Connection) -> Html {
        let state = AccountState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_accounts_page(State(state), Extension(USER))
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

    #[tokio::test]
    async fn lists_accounts_with_summary() {
        let connection = get_test_connection();
        let checking = create_account(
            USER,
            NewAccount {
                name: "Everyday".to_owned(),
                kind: AccountKind::Checking,
                balance: Decimal::new(250_000, 2),
                last_four: Some("4321".to_owned()),
                institution: Some("ANZ".to_owned()),
            },
            &connection,
        )
        .unwrap();
        create_account(
            USER,
            NewAccount {
                name: "Visa".to_owned(),
                kind: AccountKind::CreditCard,
                balance: Decimal::new(-40_000, 2),
                last_four: None,
                institution: None,
            },
            &connection,
        )
        .unwrap();

        let html = render(connection).await;

        let rows = Selector::parse("tbody tr[data-account-id]").unwrap();
        assert_eq!(html.select(&rows).count(), 2);
        assert_eq!(text_of(&html, "[data-summary=total-balance]"), "$2,100.00");
        assert_eq!(text_of(&html, "[data-summary=total-debt]"), "$400.00");

        let delete_button = Selector::parse(&format!(
            "button[hx-delete=\"{}\"]",
            format_endpoint(endpoints::DELETE_ACCOUNT, checking.id)
        ))
        .unwrap();
        assert!(html.select(&delete_button).next().is_some());
    }

    #[tokio::test]
    async fn no_accounts_shows_empty_state() {
        let html = render(get_test_connection()).await;

        assert!(text_of(&html, "td[data-empty-state]").starts_with("No accounts yet"));
        assert_eq!(text_of(&html, "[data-summary=total-balance]"), "$0.00");
    }
}
