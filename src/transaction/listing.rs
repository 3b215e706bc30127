//! Filtering, searching, sorting and totalling a snapshot of transactions.
//!
//! [compute_view] is a pure function of its inputs. The transactions page
//! calls it once per request on a freshly loaded snapshot.

use std::{cmp::Ordering, str::FromStr};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::transaction::{Transaction, TransactionType};

/// Which transactions to keep by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

/// The field used to order the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Date,
    /// Orders by magnitude, so the largest transactions sit together
    /// whether they are income or expenses.
    Amount,
    /// Orders case-insensitively.
    Description,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl TypeFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Income, Self::Expense];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Income => "Income",
            Self::Expense => "Expenses",
        }
    }
}

impl FromStr for TypeFilter {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_query_value() == text)
            .ok_or(())
    }
}

impl SortKey {
    pub const ALL: [Self; 3] = [Self::Date, Self::Amount, Self::Description];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Description => "description",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Amount => "Amount",
            Self::Description => "Description",
        }
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_query_value() == text)
            .ok_or(())
    }
}

impl SortOrder {
    pub const ALL: [Self; 2] = [Self::Ascending, Self::Descending];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ascending => "Ascending",
            Self::Descending => "Descending",
        }
    }

    /// The other order, used for the column header links.
    pub fn reverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_query_value() == text)
            .ok_or(())
    }
}

/// The query string of the transactions page as sent by the browser.
///
/// Every field is optional and left as text so that unknown values can fall
/// back to the defaults instead of rejecting the request. Build one from the
/// raw key-value pairs with [FromIterator]: unknown keys are ignored and a
/// repeated key keeps its last value.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub type_filter: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// How to filter and order the transactions page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub type_filter: TypeFilter,
    /// Case-insensitive text to look for in descriptions. Blank means no search.
    pub search: String,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl FromIterator<(String, String)> for ViewQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = Self::default();

        for (key, value) in pairs {
            let field = match key.as_str() {
                "type" => &mut query.type_filter,
                "q" => &mut query.q,
                "sort" => &mut query.sort,
                "order" => &mut query.order,
                _ => continue,
            };
            *field = Some(value);
        }

        query
    }
}

fn parse_or_default<T: FromStr + Default>(text: Option<&str>) -> T {
    text.and_then(|text| text.trim().parse().ok())
        .unwrap_or_default()
}

impl From<ViewQuery> for ViewOptions {
    fn from(query: ViewQuery) -> Self {
        Self {
            type_filter: parse_or_default(query.type_filter.as_deref()),
            search: query.q.unwrap_or_default(),
            sort_by: parse_or_default(query.sort.as_deref()),
            sort_order: parse_or_default(query.order.as_deref()),
        }
    }
}

#[derive(Serialize)]
struct ViewQueryParams<'a> {
    #[serde(rename = "type")]
    type_filter: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    q: &'a str,
    sort: &'a str,
    order: &'a str,
}

impl ViewOptions {
    /// Encode these options as a query string, e.g. "type=all&sort=date&order=desc".
    pub fn to_query_string(&self) -> String {
        let params = ViewQueryParams {
            type_filter: self.type_filter.as_query_value(),
            q: self.search.trim(),
            sort: self.sort_by.as_query_value(),
            order: self.sort_order.as_query_value(),
        };

        serde_urlencoded::to_string(&params).unwrap_or_else(|error| {
            tracing::error!("Could not encode view options {self:?}: {error}");
            String::new()
        })
    }

    /// The options for clicking the column header for `sort_by`.
    ///
    /// Clicking the column that is already sorted flips the order, clicking
    /// another column sorts by it in the current order.
    pub fn toggle_sort(&self, sort_by: SortKey) -> Self {
        let sort_order = if self.sort_by == sort_by {
            self.sort_order.reverse()
        } else {
            self.sort_order
        };

        Self {
            sort_by,
            sort_order,
            ..self.clone()
        }
    }
}

/// Sums over the transactions in a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Total money in.
    pub income: Decimal,
    /// Total money out, as a positive number.
    pub expenses: Decimal,
    /// `income - expenses`.
    pub net: Decimal,
}

impl Totals {
    /// Sum the magnitudes of `transactions` by type.
    ///
    /// Sums saturate at [Decimal::MAX] instead of overflowing.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let (income, expenses) = transactions.into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expenses), transaction| {
                let amount = transaction.amount.abs();
                match transaction.kind {
                    TransactionType::Income => (income.saturating_add(amount), expenses),
                    TransactionType::Expense => (income, expenses.saturating_add(amount)),
                }
            },
        );

        Self {
            income,
            expenses,
            net: income.saturating_sub(expenses),
        }
    }
}

/// The transactions to show and their totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionView {
    pub transactions: Vec<Transaction>,
    pub totals: Totals,
}

fn matches_type(transaction: &Transaction, type_filter: TypeFilter) -> bool {
    match type_filter {
        TypeFilter::All => true,
        TypeFilter::Income => transaction.kind == TransactionType::Income,
        TypeFilter::Expense => transaction.kind == TransactionType::Expense,
    }
}

fn compare(left: &Transaction, right: &Transaction, sort_by: SortKey) -> Ordering {
    match sort_by {
        SortKey::Date => left.date.cmp(&right.date),
        SortKey::Amount => left.amount.abs().cmp(&right.amount.abs()),
        SortKey::Description => left
            .description
            .to_lowercase()
            .cmp(&right.description.to_lowercase()),
    }
}

/// Filter, sort and total `transactions` according to `options`.
///
/// Transactions are kept if they match the type filter and, when the search
/// text is not blank, their description contains the trimmed search text
/// ignoring case. The kept transactions are stably sorted, so transactions
/// that compare equal keep their input order in both sort orders. Totals
/// cover the kept transactions only.
pub fn compute_view(transactions: &[Transaction], options: &ViewOptions) -> TransactionView {
    let search = options.search.trim().to_lowercase();

    let mut kept: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| matches_type(transaction, options.type_filter))
        .filter(|transaction| {
            search.is_empty() || transaction.description.to_lowercase().contains(&search)
        })
        .cloned()
        .collect();

    match options.sort_order {
        SortOrder::Ascending => kept.sort_by(|left, right| compare(left, right, options.sort_by)),
        SortOrder::Descending => kept.sort_by(|left, right| compare(right, left, options.sort_by)),
    }

    let totals = Totals::from_transactions(&kept);

    TransactionView {
        transactions: kept,
        totals,
    }
}
