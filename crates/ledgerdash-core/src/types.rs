//! Basic types shared by the stores and the reporting layer

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user; every query is scoped by it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Income or expense: the two parallel transaction/category kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Income,
    Expense,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Income, Variant::Expense];

    /// Transaction table for this variant
    pub fn table(&self) -> &'static str {
        match self {
            Variant::Income => "incomes",
            Variant::Expense => "expenses",
        }
    }

    /// Category table for this variant
    pub fn category_table(&self) -> &'static str {
        match self {
            Variant::Income => "income_categories",
            Variant::Expense => "expense_categories",
        }
    }

    /// Icon shown for categories without one
    pub fn default_icon(&self) -> &'static str {
        match self {
            Variant::Income => "💼",
            Variant::Expense => "💸",
        }
    }

    /// Capitalized label, e.g. for "Income added."
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Income => "Income",
            Variant::Expense => "Expense",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Variant::Income),
            "expense" => Ok(Variant::Expense),
            _ => Err(format!("Invalid variant: {}", s)),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Income => write!(f, "income"),
            Variant::Expense => write!(f, "expense"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing() {
        assert_eq!("income".parse::<Variant>().unwrap(), Variant::Income);
        assert_eq!(" Expense ".parse::<Variant>().unwrap(), Variant::Expense);
        assert!("expenses".parse::<Variant>().is_err());
        assert!("".parse::<Variant>().is_err());
    }

    #[test]
    fn test_variant_tables_are_distinct() {
        assert_ne!(Variant::Income.table(), Variant::Expense.table());
        assert_eq!(Variant::Expense.category_table(), "expense_categories");
    }
}
