//! The navigation bar shown on every page behind the session gate.

use maud::{Markup, html};

use crate::endpoints;

/// The pages listed in the navigation bar, in display order.
const PAGES: [(&str, &str); 3] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::TRANSACTIONS_VIEW, "Transactions"),
    (endpoints::ACCOUNTS_VIEW, "Accounts"),
];

const ACTIVE_LINK_STYLE: &str = "px-3 py-2 rounded font-semibold text-blue-700 \
    bg-blue-50 dark:text-blue-300 dark:bg-blue-900/30";

const LINK_STYLE: &str = "px-3 py-2 rounded text-gray-700 hover:text-blue-700 \
    hover:bg-gray-100 dark:text-gray-300 dark:hover:text-blue-300 dark:hover:bg-gray-800";

/// The navigation bar with the link to `active_endpoint` highlighted.
///
/// Sub-pages such as the new transaction form do not highlight any link.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl<'a> NavBar<'a> {
    pub fn new(active_endpoint: &'a str) -> Self {
        Self { active_endpoint }
    }

    fn is_active(&self, url: &str) -> bool {
        self.active_endpoint == url
    }

    pub fn into_html(self) -> Markup {
        html! {
            nav class="bg-white border-b border-gray-200 dark:bg-gray-900 dark:border-gray-700"
            {
                div class="max-w-screen-xl mx-auto flex flex-wrap items-center justify-between gap-4 p-4"
                {
                    a href=(endpoints::ROOT) class="text-2xl font-semibold dark:text-white"
                    {
                        "Fintrack"
                    }

                    ul class="flex flex-wrap items-center gap-2 text-sm" aria-label="Primary"
                    {
                        @for (url, title) in PAGES {
                            @let is_active = self.is_active(url);
                            li
                            {
                                a
                                    href=(url)
                                    class=(if is_active { ACTIVE_LINK_STYLE } else { LINK_STYLE })
                                    aria-current=[is_active.then_some("page")]
                                {
                                    (title)
                                }
                            }
                        }

                        li
                        {
                            a href=(endpoints::LOG_OUT) class=(LINK_STYLE) { "Log out" }
                        }
                    }
                }
            }
        }
    }
}
