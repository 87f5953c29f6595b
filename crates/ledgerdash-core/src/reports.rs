//! Report structures and the queries that derive them

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::error::CoreResult;
use crate::models::{from_minor_units, UNCATEGORIZED};
use crate::store::Store;
use crate::time::DateRange;
use crate::types::{UserId, Variant};

/// Bar chart labels, index 0 = January
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Period totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    /// Always `income - expense`
    pub balance: Decimal,
}

impl Totals {
    pub fn new(income: Decimal, expense: Decimal) -> Self {
        Self {
            income,
            expense,
            balance: income - expense,
        }
    }
}

/// Expense sum for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub total: Decimal,
}

/// Sums per calendar month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub income: [Decimal; 12],
    pub expense: [Decimal; 12],
}

/// Pie chart payload: parallel label and value arrays
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub labels: Vec<String>,
    pub data: Vec<Decimal>,
}

/// Everything the dashboard shows, recomputed per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub period: DateRange,
    pub totals: Totals,
    pub category_breakdown: Vec<BreakdownEntry>,
    pub monthly_series: MonthlySeries,
}

impl Report {
    pub fn pie_chart(&self) -> PieChart {
        PieChart {
            labels: self.category_breakdown.iter().map(|e| e.name.clone()).collect(),
            data: self.category_breakdown.iter().map(|e| e.total).collect(),
        }
    }
}

/// Read-side aggregate queries
#[async_trait]
pub trait Reporting {
    /// Income, expense and balance over `range`; zeros when empty
    async fn totals(&self, user: UserId, range: &DateRange) -> CoreResult<Totals>;

    /// Expense sums per category, largest first, non-positive sums dropped
    async fn category_breakdown(&self, user: UserId, range: &DateRange) -> CoreResult<Vec<BreakdownEntry>>;

    /// Sums bucketed by calendar month regardless of year
    async fn monthly_series(&self, user: UserId, variant: Variant, range: &DateRange) -> CoreResult<[Decimal; 12]>;

    /// All of the above for one dashboard render
    async fn report(&self, user: UserId, range: &DateRange) -> CoreResult<Report> {
        let totals = self.totals(user, range).await?;
        let category_breakdown = self.category_breakdown(user, range).await?;
        let monthly_series = MonthlySeries {
            income: self.monthly_series(user, Variant::Income, range).await?,
            expense: self.monthly_series(user, Variant::Expense, range).await?,
        };
        log::debug!(
            target: "ledgerdash::reports",
            "Report for user {} over {}: income {}, expense {}, {} categories",
            user,
            range.description(),
            totals.income,
            totals.expense,
            category_breakdown.len()
        );
        Ok(Report {
            period: *range,
            totals,
            category_breakdown,
            monthly_series,
        })
    }
}

impl Store {
    async fn sum(&self, user: UserId, variant: Variant, range: &DateRange) -> CoreResult<Decimal> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COALESCE(SUM(amount_cents), 0) AS total FROM ");
        qb.push(variant.table())
            .push(" WHERE user_id = ")
            .push_bind(user.0);
        range.push_predicate(&mut qb, "created_at");
        let row = qb.build().fetch_one(self.pool()).await?;
        Ok(from_minor_units(row.try_get("total")?))
    }
}

#[async_trait]
impl Reporting for Store {
    async fn totals(&self, user: UserId, range: &DateRange) -> CoreResult<Totals> {
        let income = self.sum(user, Variant::Income, range).await?;
        let expense = self.sum(user, Variant::Expense, range).await?;
        Ok(Totals::new(income, expense))
    }

    async fn category_breakdown(&self, user: UserId, range: &DateRange) -> CoreResult<Vec<BreakdownEntry>> {
        let variant = Variant::Expense;
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COALESCE(c.name, '");
        qb.push(UNCATEGORIZED)
            .push("') AS name, SUM(t.amount_cents) AS total FROM ")
            .push(variant.table())
            .push(" t LEFT JOIN ")
            .push(variant.category_table())
            .push(" c ON c.id = t.category_id WHERE t.user_id = ")
            .push_bind(user.0);
        range.push_predicate(&mut qb, "t.created_at");
        qb.push(" GROUP BY c.id HAVING SUM(t.amount_cents) > 0 ORDER BY total DESC, MIN(t.id) ASC");

        qb.build()
            .fetch_all(self.pool())
            .await?
            .iter()
            .map(|row| -> CoreResult<BreakdownEntry> {
                Ok(BreakdownEntry {
                    name: row.try_get("name")?,
                    total: from_minor_units(row.try_get("total")?),
                })
            })
            .collect()
    }

    async fn monthly_series(&self, user: UserId, variant: Variant, range: &DateRange) -> CoreResult<[Decimal; 12]> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT CAST(strftime('%m', created_at) AS INTEGER) AS month, SUM(amount_cents) AS total FROM ",
        );
        qb.push(variant.table())
            .push(" WHERE user_id = ")
            .push_bind(user.0);
        range.push_predicate(&mut qb, "created_at");
        qb.push(" GROUP BY month");

        let mut series = [Decimal::ZERO; 12];
        for row in qb.build().fetch_all(self.pool()).await? {
            let month: i64 = row.try_get("month")?;
            let total = from_minor_units(row.try_get("total")?);
            match usize::try_from(month) {
                Ok(m @ 1..=12) => series[m - 1] = total,
                _ => log::warn!(target: "ledgerdash::reports", "Skipping {} rows with unreadable month {}", variant, month),
            }
        }
        Ok(series)
    }
}
