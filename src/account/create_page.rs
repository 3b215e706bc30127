//! Defines the route handler for the page for creating an account.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    account::core::AccountKind,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, DOLLAR_INPUT_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
};

fn create_account_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::ACCOUNTS_API)
                hx-target-error="#alert-container"
                class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Account" }

                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        name="name"
                        id="name"
                        type="text"
                        placeholder="e.g. Everyday"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                    select name="kind" id="kind" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for kind in AccountKind::ALL {
                            option value=(kind.as_str()) { (kind.label()) }
                        }
                    }
                }

                div
                {
                    label for="balance" class=(FORM_LABEL_STYLE) { "Balance" }

                    div class="input-wrapper w-full"
                    {
                        input
                            name="balance"
                            id="balance"
                            type="number"
                            step="0.01"
                            placeholder="0.00"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="last_four" class=(FORM_LABEL_STYLE) { "Last four digits (optional)" }

                    input
                        name="last_four"
                        id="last_four"
                        type="text"
                        inputmode="numeric"
                        pattern="[0-9]{4}"
                        maxlength="4"
                        placeholder="1234"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="institution" class=(FORM_LABEL_STYLE) { "Institution (optional)" }

                    input
                        name="institution"
                        id="institution"
                        type="text"
                        placeholder="e.g. Kiwibank"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Create Account"
                }
            }
        }
    };

    base("Create Account", &[DOLLAR_INPUT_STYLE], &content)
}

/// Renders the page for creating an account.
pub async fn get_create_account_page() -> Response {
    create_account_view().into_response()
}
