//! Shared page layout, styles and small HTML helpers.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use rust_decimal::Decimal;

use crate::endpoints;

pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 rounded text-white \
    bg-blue-500 dark:bg-blue-600 hover:enabled:bg-blue-600 disabled:bg-blue-700";

const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline cursor-pointer";

pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white bg-gray-50 dark:bg-gray-700 \
    border border-gray-300 dark:border-gray-600 focus:border-blue-600";

pub const TABLE_HEADER_STYLE: &str =
    "text-xs uppercase text-gray-700 bg-gray-50 dark:bg-gray-700 dark:text-gray-400";
pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";
pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

pub const BADGE_STYLE: &str = "inline-flex px-2.5 py-0.5 rounded-full text-xs \
    font-semibold text-blue-800 bg-blue-100 dark:bg-blue-900 dark:text-blue-300";

pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white";

/// Puts a dollar sign in front of the number inputs wrapped in `.input-wrapper`.
pub const DOLLAR_INPUT_STYLE: &str = r#"
    .input-wrapper { position: relative; }
    .input-wrapper input[type="number"] { padding-left: 1.4rem; }
    .input-wrapper::before {
        content: '$';
        position: absolute;
        left: 0.6rem;
        top: 50%;
        transform: translateY(-50%);
        pointer-events: none;
    }
"#;

const INDICATOR_STYLE: &str = r#"
    .htmx-indicator { display: none; }
    .htmx-request .htmx-indicator, .htmx-request.htmx-indicator { display: inline; }
"#;

/// The page skeleton: stylesheets, HTMX and the container for alerts.
///
/// `styles` are extra CSS rules added to the head of this page only.
pub fn base(title: &str, styles: &[&str], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Fintrack" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";
                script src="/static/htmx.min.js" {}
                script src="/static/response-targets.js" {}
                style { (PreEscaped(INDICATOR_STYLE)) }

                @for rules in styles {
                    style { (PreEscaped(rules)) }
                }
            }

            body
                hx-ext="response-targets"
                class="min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)

                div id="alert-container" class="hidden" {}
            }
        }
    }
}

/// A full page for errors, e.g. "404" with a description and a hint for the user.
pub fn error_view(title: &str, code: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        main class="py-16 px-4 mx-auto max-w-screen-sm text-center text-gray-900 dark:text-white"
        {
            h1 class="mb-4 text-7xl font-extrabold text-blue-600 dark:text-blue-500" { (code) }
            p class="mb-4 text-3xl font-bold" { (description) }
            p class="mb-4 text-xl" { (fix) }
            a href=(endpoints::ROOT) class=(LINK_STYLE) { "Back to the dashboard" }
        }
    };

    base(title, &[], &content)
}

/// The centred card layout used by the log-in page.
pub fn log_in_card(form_title: &str, form: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            p class="mb-6 text-2xl font-semibold text-gray-900 dark:text-white" { "Fintrack" }

            div class="w-full sm:max-w-md p-6 sm:p-8 space-y-4 rounded-lg shadow bg-white dark:bg-gray-800"
            {
                h1 class="text-xl font-bold text-gray-900 md:text-2xl dark:text-white"
                {
                    (form_title)
                }

                (form)
            }
        }
    }
}

pub fn password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="password" class=(FORM_LABEL_STYLE) { "Password" }

            input
                type="password"
                name="password"
                id="password"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus;

            @if let Some(error_message) = error_message {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

/// A spinning ring shown while an HTMX request is in flight.
pub fn loading_spinner() -> Markup {
    html! {
        svg
            aria-hidden="true"
            class="inline w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 24 24"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            circle cx="12" cy="12" r="10" stroke="#E5E7EB" stroke-width="4" {}
            path d="M22 12a10 10 0 0 0-10-10" stroke="currentColor" stroke-width="4" {}
        }
    }
}

/// Format `amount` as dollars with a thousands separator and two decimal places, e.g. "-$1,234.50".
///
/// The digits come straight from the [Decimal], so large totals are shown exactly.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let digits = format!("{:.2}", rounded.abs());
    let (dollars, cents) = digits.split_once('.').unwrap_or((&digits, "00"));

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (index, digit) in dollars.chars().enumerate() {
        if index > 0 && (dollars.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{cents}")
}

/// The text colour for an amount of money coming in (`is_income`) or going out.
pub fn amount_class(is_income: bool) -> &'static str {
    if is_income {
        "text-green-700 dark:text-green-300"
    } else {
        "text-red-700 dark:text-red-300"
    }
}

/// A button that deletes the row it belongs to via HTMX.
///
/// `hx_target` selects the element that is replaced with the response on
/// success, e.g. "closest tr". Errors are shown in the alert container.
pub fn delete_action_link(delete_url: &str, confirm_message: &str, hx_target: &str) -> Markup {
    html! {
        button
            type="button"
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(hx_target)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}

pub fn link(url: &str, text: &str) -> Markup {
    html! {
        a href=(url) class=(LINK_STYLE) { (text) }
    }
}

#[cfg(test)]
mod format_currency_tests {
    use rust_decimal::Decimal;

    use super::format_currency;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(Decimal::ZERO), "$0.00");
        assert_eq!(format_currency(dec("-0.001")), "$0.00");
    }

    #[test]
    fn formats_whole_dollars() {
        assert_eq!(format_currency(dec("12")), "$12.00");
    }

    #[test]
    fn pads_single_decimal() {
        assert_eq!(format_currency(dec("12.3")), "$12.30");
    }

    #[test]
    fn formats_negative_with_separator() {
        assert_eq!(format_currency(dec("-1234.56")), "-$1,234.56");
    }

    #[test]
    fn formats_largest_decimal_exactly() {
        assert_eq!(
            format_currency(Decimal::MAX),
            "$79,228,162,514,264,337,593,543,950,335.00"
        );
        assert_eq!(
            format_currency(dec("-1000000000000.01")),
            "-$1,000,000,000,000.01"
        );
    }

    #[test]
    fn groups_only_above_a_thousand() {
        assert_eq!(format_currency(dec("999.99")), "$999.99");
        assert_eq!(format_currency(dec("100000")), "$100,000.00");
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(format_currency(dec("0.125")), "$0.12");
    }
}
