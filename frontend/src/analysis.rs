//! Balance analysis over the current income and expense records.

use serde::{Deserialize, Serialize};
use shared::{BudgetEntity, ExpenseField, ExpenseRecord, IncomeRecord, RecordField};

/// Share of income recommended for monthly savings
pub const RECOMMENDED_SAVINGS_RATE: f64 = 0.2;

pub fn balance(income: &IncomeRecord, expenses: &ExpenseRecord) -> f64 {
    income.total() - expenses.total()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub income_total: f64,
    pub expense_total: f64,
    pub balance: f64,
    /// Zero balance counts as surplus
    pub is_surplus: bool,
    pub recommended_savings: f64,
    /// How much expenses exceed income; 0 when in surplus
    pub deficit: f64,
}

impl BalanceSummary {
    pub fn new(income: &IncomeRecord, expenses: &ExpenseRecord) -> Self {
        let balance = balance(income, expenses);
        Self {
            income_total: income.total(),
            expense_total: expenses.total(),
            balance,
            is_surplus: balance >= 0.0,
            recommended_savings: income.total() * RECOMMENDED_SAVINGS_RATE,
            deficit: if balance < 0.0 { -balance } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSlice {
    pub category: ExpenseField,
    pub amount: f64,
    /// Fraction of total expenses, 0.0 to 1.0
    pub share: f64,
}

/// Non-zero expense categories with their share of the total, in display order
pub fn expense_breakdown(expenses: &ExpenseRecord) -> Vec<ExpenseSlice> {
    let total = expenses.total();
    expenses
        .values()
        .into_iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(category, amount)| ExpenseSlice {
            category,
            amount,
            share: if total > 0.0 { amount / total } else { 0.0 },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeExpenseComparison {
    pub income: f64,
    pub expenses: f64,
}

pub fn compare(income: &IncomeRecord, expenses: &ExpenseRecord) -> IncomeExpenseComparison {
    IncomeExpenseComparison {
        income: income.total(),
        expenses: expenses.total(),
    }
}

/// Totals shown in the bar pinned to the bottom of every tab
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSummary {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
    /// Income as a percentage of income plus expenses, capped at 100
    pub income_ratio_percent: f64,
}

impl QuickSummary {
    pub fn new(income: &IncomeRecord, expenses: &ExpenseRecord) -> Self {
        let combined = income.total() + expenses.total();
        let ratio = if combined > 0.0 {
            (income.total() / combined * 100.0).min(100.0)
        } else {
            0.0
        };
        Self {
            income: income.total(),
            expenses: expenses.total(),
            balance: balance(income, expenses),
            income_ratio_percent: ratio,
        }
    }
}

/// Savings capacity as shown on the planning view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub available_monthly_savings: f64,
    pub needs_budget_improvement: bool,
}

impl FinancialSummary {
    pub fn from_balance(balance: f64) -> Self {
        Self {
            available_monthly_savings: balance,
            needs_budget_improvement: balance <= 0.0,
        }
    }
}

/// Category key as used by the translation dictionary and chart legends
pub fn category_key(category: ExpenseField) -> &'static str {
    category.key()
}
