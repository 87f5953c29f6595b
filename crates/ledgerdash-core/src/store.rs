//! Category and transaction stores backed by SQLite
//!
//! Every statement is scoped by the caller's `UserId`. Table names are only
//! ever taken from `Variant`, and all values are bound as parameters.

use chrono::{Local, NaiveDate};
use ledgerdash_config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::models::{to_minor_units, Category, TransactionInput, TransactionRow, UNCATEGORIZED};
use crate::time::DateRange;
use crate::types::{UserId, Variant};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS income_categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        icon TEXT
    )",
    "CREATE TABLE IF NOT EXISTS expense_categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        icon TEXT
    )",
    "CREATE TABLE IF NOT EXISTS incomes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
        category_id INTEGER REFERENCES income_categories(id),
        note TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS expenses (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
        category_id INTEGER REFERENCES expense_categories(id),
        note TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_incomes_user_date ON incomes (user_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses (user_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_income_categories_user ON income_categories (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_expense_categories_user ON expense_categories (user_id)",
];

/// Handle to the relational store shared by all requests
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the configured database and apply the schema
    pub async fn connect(config: &DatabaseConfig) -> CoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        log::info!(target: "ledgerdash::store", "Connected to {}", config.url);
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database; a single never-recycled connection keeps it alive
    pub async fn in_memory() -> CoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes that do not exist yet
    pub async fn migrate(&self) -> CoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        log::debug!(target: "ledgerdash::store", "Schema up to date");
        Ok(())
    }

    // ==================== Category Store ====================

    /// Insert a category and return its id
    pub async fn add_category(
        &self,
        user: UserId,
        variant: Variant,
        name: &str,
        icon: Option<&str>,
    ) -> CoreResult<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("category name must not be empty"));
        }
        let icon = icon.map(str::trim).filter(|i| !i.is_empty());

        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        qb.push(variant.category_table())
            .push(" (user_id, name, icon) VALUES (")
            .push_bind(user.0)
            .push(", ")
            .push_bind(name.to_string())
            .push(", ")
            .push_bind(icon.map(str::to_string))
            .push(")");
        let id = qb.build().execute(&self.pool).await?.last_insert_rowid();

        log::info!(target: "ledgerdash::store", "User {} added {} category {} ({})", user, variant, id, name);
        Ok(id)
    }

    /// Categories owned by `user`, in insertion order
    pub async fn list_categories(&self, user: UserId, variant: Variant) -> CoreResult<Vec<Category>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, user_id, name, icon FROM ");
        qb.push(variant.category_table())
            .push(" WHERE user_id = ")
            .push_bind(user.0)
            .push(" ORDER BY id ASC");
        Ok(qb.build_query_as::<Category>().fetch_all(&self.pool).await?)
    }

    /// A single category, if it exists and belongs to `user`
    pub async fn category(&self, user: UserId, variant: Variant, id: i64) -> CoreResult<Option<Category>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, user_id, name, icon FROM ");
        qb.push(variant.category_table())
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user.0);
        Ok(qb.build_query_as::<Category>().fetch_optional(&self.pool).await?)
    }

    // ==================== Transaction Store ====================

    /// Insert a transaction and return its id; the date defaults to today
    pub async fn add_transaction(
        &self,
        user: UserId,
        variant: Variant,
        input: TransactionInput,
    ) -> CoreResult<i64> {
        let input = self.checked_input(user, variant, input).await?;
        let cents = to_minor_units(input.amount)?;
        let date = input.date.unwrap_or_else(today);

        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        qb.push(variant.table())
            .push(" (user_id, amount_cents, category_id, note, created_at) VALUES (")
            .push_bind(user.0)
            .push(", ")
            .push_bind(cents)
            .push(", ")
            .push_bind(input.category_id)
            .push(", ")
            .push_bind(input.note)
            .push(", ")
            .push_bind(date)
            .push(")");
        let id = qb.build().execute(&self.pool).await?.last_insert_rowid();

        log::info!(target: "ledgerdash::store", "User {} added {} {} of {} on {}", user, variant, id, input.amount, date);
        Ok(id)
    }

    /// Update a transaction owned by `user`; a missing date keeps the stored one
    pub async fn edit_transaction(
        &self,
        user: UserId,
        variant: Variant,
        id: i64,
        input: TransactionInput,
    ) -> CoreResult<()> {
        if id <= 0 {
            return Err(CoreError::validation(format!("invalid transaction id: {}", id)));
        }
        let input = self.checked_input(user, variant, input).await?;
        let cents = to_minor_units(input.amount)?;

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE ");
        qb.push(variant.table())
            .push(" SET amount_cents = ")
            .push_bind(cents)
            .push(", category_id = ")
            .push_bind(input.category_id)
            .push(", note = ")
            .push_bind(input.note)
            .push(", created_at = COALESCE(")
            .push_bind(input.date)
            .push(", created_at) WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user.0);
        let affected = qb.build().execute(&self.pool).await?.rows_affected();

        if affected == 0 {
            log::warn!(target: "ledgerdash::store", "User {} tried to edit missing or foreign {} {}", user, variant, id);
            return Err(CoreError::not_found(format!("{} {}", variant, id)));
        }
        log::info!(target: "ledgerdash::store", "User {} updated {} {}", user, variant, id);
        Ok(())
    }

    /// Delete a transaction owned by `user`
    pub async fn delete_transaction(&self, user: UserId, variant: Variant, id: i64) -> CoreResult<()> {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM ");
        qb.push(variant.table())
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user.0);
        let affected = qb.build().execute(&self.pool).await?.rows_affected();

        if affected == 0 {
            log::warn!(target: "ledgerdash::store", "User {} tried to delete missing or foreign {} {}", user, variant, id);
            return Err(CoreError::not_found(format!("{} {}", variant, id)));
        }
        log::info!(target: "ledgerdash::store", "User {} deleted {} {}", user, variant, id);
        Ok(())
    }

    /// One transaction owned by `user`, joined with its category
    pub async fn transaction(&self, user: UserId, variant: Variant, id: i64) -> CoreResult<TransactionRow> {
        let mut qb = joined_select(variant);
        qb.push(" WHERE t.user_id = ")
            .push_bind(user.0)
            .push(" AND t.id = ")
            .push_bind(id);
        qb.build_query_as::<TransactionRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("{} {}", variant, id)))
    }

    /// Latest `limit` transactions, newest first
    pub async fn list_recent(&self, user: UserId, variant: Variant, limit: usize) -> CoreResult<Vec<TransactionRow>> {
        self.list_recent_in(user, variant, &DateRange::all(), limit).await
    }

    /// Latest `limit` transactions inside `range`, newest first
    pub async fn list_recent_in(
        &self,
        user: UserId,
        variant: Variant,
        range: &DateRange,
        limit: usize,
    ) -> CoreResult<Vec<TransactionRow>> {
        let mut qb = joined_select(variant);
        qb.push(" WHERE t.user_id = ").push_bind(user.0);
        range.push_predicate(&mut qb, "t.created_at");
        qb.push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(limit as i64);
        Ok(qb.build_query_as::<TransactionRow>().fetch_all(&self.pool).await?)
    }

    /// Validate the input and make sure its category is one of the user's own
    async fn checked_input(
        &self,
        user: UserId,
        variant: Variant,
        input: TransactionInput,
    ) -> CoreResult<TransactionInput> {
        let input = input.validated()?;
        if let Some(category_id) = input.category_id {
            if self.category(user, variant, category_id).await?.is_none() {
                return Err(CoreError::validation(format!(
                    "{} category {} does not exist",
                    variant, category_id
                )));
            }
        }
        Ok(input)
    }
}

/// `SELECT ... FROM <table> t LEFT JOIN <categories> c`, ready for a WHERE clause
fn joined_select(variant: Variant) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT t.id, t.amount_cents, t.note, t.created_at, t.category_id, COALESCE(c.name, '",
    );
    qb.push(UNCATEGORIZED)
        .push("') AS category, COALESCE(c.icon, '') AS icon FROM ")
        .push(variant.table())
        .push(" t LEFT JOIN ")
        .push(variant.category_table())
        .push(" c ON c.id = t.category_id");
    qb
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn test_add_category_trims_and_lists_in_order() {
        let store = Store::in_memory().await.unwrap();
        let first = store.add_category(ALICE, Variant::Expense, "  Groceries ", Some("🛒")).await.unwrap();
        let second = store.add_category(ALICE, Variant::Expense, "Rent", Some("  ")).await.unwrap();
        assert!(second > first);

        let cats = store.list_categories(ALICE, Variant::Expense).await.unwrap();
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].name, "Groceries");
        assert_eq!(cats[0].icon.as_deref(), Some("🛒"));
        assert_eq!(cats[1].name, "Rent");
        assert_eq!(cats[1].icon, None);

        assert!(store.list_categories(ALICE, Variant::Income).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_category_rejects_blank_name() {
        let store = Store::in_memory().await.unwrap();
        let err = store.add_category(ALICE, Variant::Income, "   ", None).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert!(store.list_categories(ALICE, Variant::Income).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_are_per_user() {
        let store = Store::in_memory().await.unwrap();
        let id = store.add_category(ALICE, Variant::Income, "Salary", None).await.unwrap();
        assert!(store.list_categories(BOB, Variant::Income).await.unwrap().is_empty());
        assert!(store.category(BOB, Variant::Income, id).await.unwrap().is_none());
        assert!(store.category(ALICE, Variant::Income, id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_then_list_recent_defaults_to_today() {
        let store = Store::in_memory().await.unwrap();
        let cat = store.add_category(ALICE, Variant::Income, "Salary", None).await.unwrap();
        let input = TransactionInput::new(dec("1500")).with_category(cat).with_note("March pay");
        store.add_transaction(ALICE, Variant::Income, input).await.unwrap();

        let rows = store.list_recent(ALICE, Variant::Income, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec("1500"));
        assert_eq!(rows[0].note.as_deref(), Some("March pay"));
        assert_eq!(rows[0].created_at, today());
        assert_eq!(rows[0].category, "Salary");
        assert_eq!(rows[0].category_id, Some(cat));
    }

    #[tokio::test]
    async fn test_non_positive_amount_writes_nothing() {
        let store = Store::in_memory().await.unwrap();
        for amount in ["0", "-1", "-0.01", "0.005"] {
            let err = store
                .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec(amount)))
                .await
                .unwrap_err();
            assert!(matches!(err, CoreError::ValidationError { .. }));
        }
        assert!(store.list_recent(ALICE, Variant::Expense, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_or_cross_variant_category_is_rejected() {
        let store = Store::in_memory().await.unwrap();
        let bobs = store.add_category(BOB, Variant::Expense, "Food", None).await.unwrap();
        store.add_category(ALICE, Variant::Income, "Salary", None).await.unwrap();
        let income_cat = store.add_category(ALICE, Variant::Income, "Bonus", None).await.unwrap();
        assert_ne!(income_cat, bobs);

        let err = store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("5")).with_category(bobs))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let err = store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("5")).with_category(income_cat))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        assert!(store.list_recent(ALICE, Variant::Expense, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uncategorized_rows() {
        let store = Store::in_memory().await.unwrap();
        store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("10")).on(date(2024, 3, 15)))
            .await
            .unwrap();
        let rows = store.list_recent(ALICE, Variant::Expense, 10).await.unwrap();
        assert_eq!(rows[0].category, UNCATEGORIZED);
        assert_eq!(rows[0].icon, "");
        assert_eq!(rows[0].note, None);
    }

    #[tokio::test]
    async fn test_list_recent_order_and_limit() {
        let store = Store::in_memory().await.unwrap();
        let a = store.add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("1")).on(date(2024, 1, 5))).await.unwrap();
        let b = store.add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("2")).on(date(2024, 2, 5))).await.unwrap();
        let c = store.add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("3")).on(date(2024, 2, 5))).await.unwrap();
        store.add_transaction(BOB, Variant::Expense, TransactionInput::new(dec("4")).on(date(2024, 3, 5))).await.unwrap();

        let ids: Vec<i64> = store
            .list_recent(ALICE, Variant::Expense, 10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![c, b, a]);

        let limited = store.list_recent(ALICE, Variant::Expense, 2).await.unwrap();
        assert_eq!(limited.len(), 2);

        let january = DateRange::new(Some(date(2024, 1, 1)), Some(date(2024, 1, 31)));
        let rows = store.list_recent_in(ALICE, Variant::Expense, &january, 10).await.unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a]);
    }

    #[tokio::test]
    async fn test_edit_keeps_date_when_blank() {
        let store = Store::in_memory().await.unwrap();
        let id = store
            .add_transaction(ALICE, Variant::Income, TransactionInput::new(dec("100")).with_note("old").on(date(2024, 5, 1)))
            .await
            .unwrap();

        store
            .edit_transaction(ALICE, Variant::Income, id, TransactionInput::new(dec("120")).with_note("new"))
            .await
            .unwrap();
        let row = store.transaction(ALICE, Variant::Income, id).await.unwrap();
        assert_eq!(row.amount, dec("120"));
        assert_eq!(row.note.as_deref(), Some("new"));
        assert_eq!(row.created_at, date(2024, 5, 1));

        store
            .edit_transaction(ALICE, Variant::Income, id, TransactionInput::new(dec("120")).on(date(2024, 6, 2)))
            .await
            .unwrap();
        let row = store.transaction(ALICE, Variant::Income, id).await.unwrap();
        assert_eq!(row.created_at, date(2024, 6, 2));
        assert_eq!(row.note, None);
    }

    #[tokio::test]
    async fn test_edit_by_other_user_affects_nothing() {
        let store = Store::in_memory().await.unwrap();
        let id = store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("42.5")).on(date(2024, 3, 1)))
            .await
            .unwrap();

        let err = store
            .edit_transaction(BOB, Variant::Expense, id, TransactionInput::new(dec("1")))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));

        let row = store.transaction(ALICE, Variant::Expense, id).await.unwrap();
        assert_eq!(row.amount, dec("42.5"));
    }

    #[tokio::test]
    async fn test_edit_validates_before_writing() {
        let store = Store::in_memory().await.unwrap();
        let id = store.add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("5"))).await.unwrap();

        let err = store
            .edit_transaction(ALICE, Variant::Expense, id, TransactionInput::new(dec("0")))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        let err = store
            .edit_transaction(ALICE, Variant::Expense, 0, TransactionInput::new(dec("3")))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));

        assert_eq!(store.transaction(ALICE, Variant::Expense, id).await.unwrap().amount, dec("5"));
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped() {
        let store = Store::in_memory().await.unwrap();
        let id = store.add_transaction(ALICE, Variant::Income, TransactionInput::new(dec("9"))).await.unwrap();

        assert!(matches!(
            store.delete_transaction(BOB, Variant::Income, id).await,
            Err(CoreError::NotFound { .. })
        ));
        // wrong variant table
        assert!(matches!(
            store.delete_transaction(ALICE, Variant::Expense, id).await,
            Err(CoreError::NotFound { .. })
        ));

        store.delete_transaction(ALICE, Variant::Income, id).await.unwrap();
        assert!(store.list_recent(ALICE, Variant::Income, 10).await.unwrap().is_empty());
        assert!(matches!(
            store.transaction(ALICE, Variant::Income, id).await,
            Err(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_note_with_quotes_is_stored_verbatim() {
        let store = Store::in_memory().await.unwrap();
        let note = "'); DROP TABLE expenses; --";
        store
            .add_transaction(ALICE, Variant::Expense, TransactionInput::new(dec("1")).with_note(note))
            .await
            .unwrap();
        let rows = store.list_recent(ALICE, Variant::Expense, 10).await.unwrap();
        assert_eq!(rows[0].note.as_deref(), Some(note));
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = Store::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
    }
}
