//! Rows read from the stores and the inputs accepted by them

use chrono::NaiveDate;
use ledgerdash_config::IconFallback;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::error::{CoreError, CoreResult};
use crate::types::Variant;

/// Label used for transactions without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Amounts are stored as whole minor units (pence, cents) with this many decimals
pub const AMOUNT_SCALE: u32 = 2;

/// Icon used by the name lookup when nothing matches
const UNKNOWN_ICON: &str = "❓";

/// Icons for common category names, used when a category has none
const ICONS_BY_NAME: &[(&str, &str)] = &[
    ("Salary", "💼"),
    ("Additional Work / Freelance", "🧰"),
    ("Business Income", "🧾"),
    ("Bonus / Commission", "🎁"),
    ("Rental Income", "🏠"),
    ("Investment Returns", "📈"),
    ("Other", "💸"),
    ("Rent / Mortgage", "🏠"),
    ("Utilities", "💡"),
    ("Groceries", "🛒"),
    ("Fuel / Transport", "⛽"),
    ("Education", "🎓"),
    ("Subscriptions", "📺"),
    ("Entertainment", "🎬"),
    ("Insurance", "📄"),
    ("Medical", "🏥"),
];

/// A user-defined income or expense category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub icon: Option<String>,
}

impl Category {
    /// `icon name`, with the configured fallback when no icon was given
    pub fn label(&self, variant: Variant, fallback: IconFallback) -> String {
        format!(
            "{} {}",
            resolve_icon(self.icon.as_deref(), &self.name, variant, fallback),
            self.name
        )
    }
}

/// A transaction joined with its category, as listed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: i64,
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_at: NaiveDate,
    pub category_id: Option<i64>,
    /// Category name, `Uncategorized` when absent
    pub category: String,
    /// Category icon, empty when absent
    pub icon: String,
}

impl<'r> FromRow<'r, SqliteRow> for TransactionRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            amount: from_minor_units(row.try_get("amount_cents")?),
            note: row.try_get("note")?,
            created_at: row.try_get("created_at")?,
            category_id: row.try_get("category_id")?,
            category: row.try_get("category")?,
            icon: row.try_get("icon")?,
        })
    }
}

impl TransactionRow {
    pub fn category_label(&self, variant: Variant, fallback: IconFallback) -> String {
        let icon = if self.icon.is_empty() { None } else { Some(self.icon.as_str()) };
        format!(
            "{} {}",
            resolve_icon(icon, &self.category, variant, fallback),
            self.category
        )
    }
}

/// Fields accepted when adding or editing a transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub note: Option<String>,
    /// `None` means today on insert and "unchanged" on edit
    pub date: Option<NaiveDate>,
}

impl TransactionInput {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Checks the amount and normalizes the note
    pub fn validated(mut self) -> CoreResult<Self> {
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::validation(format!(
                "amount must be greater than 0, got {}",
                self.amount
            )));
        }
        to_minor_units(self.amount)?;
        self.note = self
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(self)
    }
}

/// Pick the icon to show next to a category name
pub fn resolve_icon<'a>(
    icon: Option<&'a str>,
    name: &str,
    variant: Variant,
    fallback: IconFallback,
) -> &'a str {
    if let Some(icon) = icon.filter(|i| !i.trim().is_empty()) {
        return icon;
    }
    match fallback {
        IconFallback::Variant => variant.default_icon(),
        IconFallback::ByName => ICONS_BY_NAME
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, icon)| *icon)
            .unwrap_or(UNKNOWN_ICON),
    }
}

// ==================== Amounts ====================

/// Convert an amount to the integer minor units kept in the database
pub fn to_minor_units(amount: Decimal) -> CoreResult<i64> {
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(CoreError::validation(format!(
            "amount {} has more than {} decimal places",
            amount, AMOUNT_SCALE
        )));
    }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|units| units.to_i64())
        .ok_or_else(|| CoreError::validation(format!("amount {} is too large", amount)))
}

/// Convert stored minor units back to an amount
pub fn from_minor_units(units: i64) -> Decimal {
    Decimal::new(units, AMOUNT_SCALE)
}

// ==================== Form Parsing ====================

/// Parse a submitted amount; blank or garbage reads as 0 and fails validation later
pub fn parse_amount(raw: &str) -> Decimal {
    raw.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Parse an optional category id; blank means uncategorized
pub fn parse_category_id(raw: &str) -> CoreResult<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| CoreError::validation(format!("invalid category id: {}", raw)))
}

/// Parse an optional `YYYY-MM-DD` form date; blank means "not given"
pub fn parse_form_date(raw: &str) -> CoreResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CoreError::validation(format!("invalid date: {}", raw)))
}
