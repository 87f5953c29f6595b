//! Dashboard routes
//!
//! Structure:
//! - api.rs: form actions (POST /dashboard), answered with a redirect
//! - page.rs: dashboard and edit form rendering

pub mod api;
pub mod page;

pub use api::dashboard_action;
pub use page::{page_dashboard, page_edit_transaction};

use ledgerdash_core::{CoreError, CoreResult, DateRange, Variant};

use crate::routes::{range_query, url_with_query};
use crate::AppState;

/// Outcome banner shown after a successful form action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    IncomeAdded,
    ExpenseAdded,
    CategoryAdded,
    Updated,
    Deleted,
}

impl Flash {
    pub fn added(variant: Variant) -> Self {
        match variant {
            Variant::Income => Flash::IncomeAdded,
            Variant::Expense => Flash::ExpenseAdded,
        }
    }

    /// Value carried in the `msg` query parameter
    pub fn code(&self) -> &'static str {
        match self {
            Flash::IncomeAdded => "income_added",
            Flash::ExpenseAdded => "expense_added",
            Flash::CategoryAdded => "category_added",
            Flash::Updated => "updated",
            Flash::Deleted => "deleted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "income_added" => Some(Flash::IncomeAdded),
            "expense_added" => Some(Flash::ExpenseAdded),
            "category_added" => Some(Flash::CategoryAdded),
            "updated" => Some(Flash::Updated),
            "deleted" => Some(Flash::Deleted),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::IncomeAdded => "Income added.",
            Flash::ExpenseAdded => "Expense added.",
            Flash::CategoryAdded => "Category added.",
            Flash::Updated => "Entry updated.",
            Flash::Deleted => "Entry deleted.",
        }
    }
}

/// `/dashboard` URL keeping the active range and an optional banner
pub(crate) fn dashboard_url(state: &AppState, range: &DateRange, flash: Option<Flash>) -> String {
    let mut pairs = range_query(state, range);
    if let Some(flash) = flash {
        pairs.push(("msg", flash.code().to_string()));
    }
    url_with_query("/dashboard", &pairs)
}

pub(crate) fn parse_variant(raw: &str) -> CoreResult<Variant> {
    raw.parse::<Variant>().map_err(CoreError::validation)
}

pub(crate) fn parse_id(raw: &str) -> CoreResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CoreError::validation(format!("invalid id: {}", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_codes_round_trip() {
        for flash in [
            Flash::IncomeAdded,
            Flash::ExpenseAdded,
            Flash::CategoryAdded,
            Flash::Updated,
            Flash::Deleted,
        ] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn test_parse_variant_and_id() {
        assert_eq!(parse_variant("expense").unwrap(), Variant::Expense);
        assert!(parse_variant("refund").is_err());
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        assert!(parse_id("seven").is_err());
    }
}
