//! HTML rendering for the transactions page.

use maud::{Markup, html};
use rust_decimal::Decimal;
use time::{format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, amount_class,
        base, delete_action_link, format_currency,
    },
    navigation::NavBar,
    transaction::{
        Transaction,
        listing::{SortKey, SortOrder, Totals, TransactionView, TypeFilter, ViewOptions},
    },
};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day] [month repr:short] [year]");

/// Shorten long descriptions. Returns the full text as a tooltip if it was cut.
pub(crate) fn format_description(description: &str) -> (String, Option<&str>) {
    if description.graphemes(true).count() <= MAX_DESCRIPTION_GRAPHEMES {
        return (description.to_owned(), None);
    }

    let truncated: String = description
        .graphemes(true)
        .take(MAX_DESCRIPTION_GRAPHEMES - 3)
        .collect();

    (truncated + "...", Some(description))
}

/// The amount with expenses shown as negative numbers.
pub(crate) fn signed_amount(transaction: &Transaction) -> Decimal {
    if transaction.is_income() {
        transaction.amount.abs()
    } else {
        -transaction.amount.abs()
    }
}

pub(crate) fn format_date(transaction: &Transaction) -> String {
    transaction
        .date
        .format(DISPLAY_DATE_FORMAT)
        .unwrap_or_else(|_| transaction.date.to_string())
}

/// Cards for total income, expenses and net.
pub(crate) fn totals_view(totals: &Totals) -> Markup {
    let card = |label: &str, amount: Decimal, class: &str| {
        html! {
            div class="rounded bg-white dark:bg-gray-800 shadow px-4 py-3"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                p class={ "text-lg font-semibold tabular-nums " (class) } data-total=(label.to_lowercase())
                {
                    (format_currency(amount))
                }
            }
        }
    };

    html! {
        div class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full"
        {
            (card("Income", totals.income, amount_class(true)))
            (card("Expenses", -totals.expenses, amount_class(false)))
            (card("Net", totals.net, amount_class(totals.net >= Decimal::ZERO)))
        }
    }
}

fn controls_view(options: &ViewOptions) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-2 lg:grid-cols-5 gap-4 items-end w-full"
        {
            div class="col-span-2"
            {
                label for="q" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    type="search"
                    name="q"
                    id="q"
                    value=(options.search)
                    placeholder="Search descriptions"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                select name="type" id="type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for filter in TypeFilter::ALL {
                        option value=(filter.as_query_value()) selected[filter == options.type_filter]
                        {
                            (filter.label())
                        }
                    }
                }
            }

            div
            {
                label for="sort" class=(FORM_LABEL_STYLE) { "Sort by" }
                select name="sort" id="sort" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for key in SortKey::ALL {
                        option value=(key.as_query_value()) selected[key == options.sort_by]
                        {
                            (key.label())
                        }
                    }
                }
            }

            div
            {
                label for="order" class=(FORM_LABEL_STYLE) { "Order" }
                select name="order" id="order" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for order in SortOrder::ALL {
                        option value=(order.as_query_value()) selected[order == options.sort_order]
                        {
                            (order.label())
                        }
                    }
                }
            }

            div class="col-span-2 lg:col-span-5 flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Reset" }
            }
        }
    }
}

fn sort_header(label: &str, key: SortKey, options: &ViewOptions, extra_class: &str) -> Markup {
    let href = format!(
        "{}?{}",
        endpoints::TRANSACTIONS_VIEW,
        options.toggle_sort(key).to_query_string()
    );
    let arrow = match (options.sort_by == key, options.sort_order) {
        (false, _) => "",
        (true, SortOrder::Ascending) => " ▲",
        (true, SortOrder::Descending) => " ▼",
    };

    html! {
        th
            scope="col"
            class={ "px-6 py-3 " (extra_class) }
            aria-sort=[(options.sort_by == key).then_some(match options.sort_order {
                SortOrder::Ascending => "ascending",
                SortOrder::Descending => "descending",
            })]
        {
            a href=(href) class="hover:underline" { (label) (arrow) }
        }
    }
}

fn transaction_row_view(transaction: &Transaction) -> Markup {
    let (description, tooltip) = format_description(&transaction.description);
    let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.date) { (format_date(transaction)) }
            }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(category) = &transaction.category {
                    span class=(BADGE_STYLE) { (category) }
                } @else {
                    span class="text-gray-400 dark:text-gray-500" { "-" }
                }
            }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(transaction.is_income())) }
            {
                (format_currency(signed_amount(transaction)))
            }
            td class=(TABLE_CELL_STYLE)
            {
                (delete_action_link(&delete_url, &confirm_message, "closest tr"))
            }
        }
    }
}

fn empty_state_view(has_any_transactions: bool) -> Markup {
    html! {
        tr
        {
            td colspan="5" data-empty-state="true" class="px-6 py-4 text-center"
            {
                @if has_any_transactions {
                    "No transactions match these filters."
                } @else {
                    "No transactions yet. "
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add your first transaction"
                    }
                }
            }
        }
    }
}

fn malformed_notice_view(malformed_count: usize) -> Markup {
    let noun = if malformed_count == 1 {
        "transaction"
    } else {
        "transactions"
    };

    html! {
        div
            role="status"
            data-malformed-count=(malformed_count)
            class="w-full p-4 text-sm text-yellow-800 rounded-lg bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300"
        {
            (malformed_count) " stored " (noun) " could not be read and "
            @if malformed_count == 1 { "was" } @else { "were" }
            " left out of this page and its totals."
        }
    }
}

pub(crate) fn transactions_view(
    view: &TransactionView,
    options: &ViewOptions,
    has_any_transactions: bool,
    malformed_count: usize,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (controls_view(options))

                @if malformed_count > 0 {
                    (malformed_notice_view(malformed_count))
                }

                (totals_view(&view.totals))

                div class="overflow-x-auto rounded"
                {
                    table class="w-full my-2 text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                (sort_header("Date", SortKey::Date, options, ""))
                                (sort_header("Description", SortKey::Description, options, ""))
                                th scope="col" class="px-6 py-3" { "Category" }
                                (sort_header("Amount", SortKey::Amount, options, "text-right"))
                                th scope="col" class="px-6 py-3" { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in &view.transactions {
                                (transaction_row_view(transaction))
                            }

                            @if view.transactions.is_empty() {
                                (empty_state_view(has_any_transactions))
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}
