//! Core data model, stores and reporting for ledgerdash
//!
//! - `store`: Category Store and Transaction Store over SQLite
//! - `reports`: totals, category breakdown and monthly series
//! - `time`: inclusive date ranges and their SQL predicates
//! - `models` / `types`: rows, inputs, variants and user identity

pub mod error;
pub mod models;
pub mod reports;
pub mod store;
pub mod time;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use models::{
    from_minor_units, parse_amount, parse_category_id, parse_form_date, resolve_icon, to_minor_units,
    Category, TransactionInput, TransactionRow, AMOUNT_SCALE, UNCATEGORIZED,
};
pub use reports::{BreakdownEntry, MonthlySeries, PieChart, Report, Reporting, Totals, MONTH_LABELS};
pub use store::Store;
pub use time::DateRange;
pub use types::{UserId, Variant};
pub use rust_decimal::Decimal;
