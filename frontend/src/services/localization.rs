//! Localization: translated strings, text direction and number formatting.
//!
//! The selected language lives in the session only; it is never persisted.

use log::info;
use serde::{Deserialize, Serialize};
use shared::EntityKind;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Some(Language::Arabic),
            "en" | "english" => Some(Language::English),
            _ => None,
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }

    pub fn other(&self) -> Self {
        match self {
            Language::Arabic => Language::English,
            Language::English => Language::Arabic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    // Navigation
    AppTitle,
    AppTitleShort,
    Income,
    Expenses,
    Analysis,
    Planning,
    Logout,
    LogoutFull,

    // Common
    Save,
    Saving,
    Saved,
    Loading,
    Welcome,
    Balance,
    Total,
    Currency,
    Monthly,

    // Income
    IncomeEntry,
    Salary,
    Freelance,
    Investments,
    Other,
    Amount,

    // Expenses
    ExpenseEntry,
    Housing,
    Food,
    Transportation,
    Entertainment,
    Healthcare,
    Education,

    // Analysis
    BalanceAnalysis,
    MonthlyIncome,
    MonthlyExpenses,
    NetBalance,

    // Planning
    FinancialPlanning,
    GoalAmount,
    Timeframe,
    MonthlySavings,
    Target,
    EmergencyFund,
    NewCar,

    PersonalBudgetApp,

    // Notifications
    ErrorTitle,
    IncomeLoadFailed,
    IncomeSaveFailed,
    IncomeSaved,
    ExpenseLoadFailed,
    ExpenseSaveFailed,
    ExpenseSaved,
}

impl TranslationKey {
    pub fn load_failed(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Income => TranslationKey::IncomeLoadFailed,
            EntityKind::Expense => TranslationKey::ExpenseLoadFailed,
        }
    }

    pub fn save_failed(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Income => TranslationKey::IncomeSaveFailed,
            EntityKind::Expense => TranslationKey::ExpenseSaveFailed,
        }
    }

    pub fn saved(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Income => TranslationKey::IncomeSaved,
            EntityKind::Expense => TranslationKey::ExpenseSaved,
        }
    }
}

/// Dictionary lookup for one language
pub fn translate(language: Language, key: TranslationKey) -> &'static str {
    match language {
        Language::Arabic => arabic(key),
        Language::English => english(key),
    }
}

fn arabic(key: TranslationKey) -> &'static str {
    use TranslationKey::*;
    match key {
        AppTitle => "حاسبة الميزانية الشخصية",
        AppTitleShort => "حاسبة الميزانية",
        Income => "الدخل",
        Expenses => "المصروفات",
        Analysis => "التحليل",
        Planning => "التخطيط",
        Logout => "خروج",
        LogoutFull => "تسجيل الخروج",
        Save => "حفظ",
        Saving => "جاري الحفظ...",
        Saved => "تم الحفظ",
        Loading => "جاري التحميل...",
        Welcome => "مرحباً بك",
        Balance => "الرصيد",
        Total => "المجموع",
        Currency => "ريال",
        Monthly => "شهرياً",
        IncomeEntry => "إدخال الدخل",
        Salary => "الراتب",
        Freelance => "العمل الحر",
        Investments => "الاستثمارات",
        Other => "أخرى",
        Amount => "المبلغ",
        ExpenseEntry => "إدخال المصروفات",
        Housing => "السكن",
        Food => "الطعام",
        Transportation => "المواصلات",
        Entertainment => "الترفيه",
        Healthcare => "الرعاية الصحية",
        Education => "التعليم",
        BalanceAnalysis => "تحليل الرصيد",
        MonthlyIncome => "الدخل الشهري",
        MonthlyExpenses => "المصروفات الشهرية",
        NetBalance => "صافي الرصيد",
        FinancialPlanning => "التخطيط المالي",
        GoalAmount => "مبلغ الهدف",
        Timeframe => "الإطار الزمني",
        MonthlySavings => "الادخار الشهري",
        Target => "الهدف",
        EmergencyFund => "صندوق الطوارئ",
        NewCar => "سيارة جديدة",
        PersonalBudgetApp => "تطبيق إدارة الميزانية الشخصية",
        ErrorTitle => "خطأ",
        IncomeLoadFailed => "فشل في تحميل بيانات الدخل",
        IncomeSaveFailed => "فشل في حفظ بيانات الدخل",
        IncomeSaved => "تم حفظ بيانات الدخل بنجاح",
        ExpenseLoadFailed => "فشل في تحميل بيانات المصروفات",
        ExpenseSaveFailed => "فشل في حفظ بيانات المصروفات",
        ExpenseSaved => "تم حفظ بيانات المصروفات بنجاح",
    }
}

fn english(key: TranslationKey) -> &'static str {
    use TranslationKey::*;
    match key {
        AppTitle => "Personal Budget Calculator",
        AppTitleShort => "Budget Calculator",
        Income => "Income",
        Expenses => "Expenses",
        Analysis => "Analysis",
        Planning => "Planning",
        Logout => "Logout",
        LogoutFull => "Sign Out",
        Save => "Save",
        Saving => "Saving...",
        Saved => "Saved",
        Loading => "Loading...",
        Welcome => "Welcome",
        Balance => "Balance",
        Total => "Total",
        Currency => "SAR",
        Monthly => "monthly",
        IncomeEntry => "Income Entry",
        Salary => "Salary",
        Freelance => "Freelance",
        Investments => "Investments",
        Other => "Other",
        Amount => "Amount",
        ExpenseEntry => "Expense Entry",
        Housing => "Housing",
        Food => "Food",
        Transportation => "Transportation",
        Entertainment => "Entertainment",
        Healthcare => "Healthcare",
        Education => "Education",
        BalanceAnalysis => "Balance Analysis",
        MonthlyIncome => "Monthly Income",
        MonthlyExpenses => "Monthly Expenses",
        NetBalance => "Net Balance",
        FinancialPlanning => "Financial Planning",
        GoalAmount => "Goal Amount",
        Timeframe => "Timeframe",
        MonthlySavings => "Monthly Savings",
        Target => "Target",
        EmergencyFund => "Emergency Fund",
        NewCar => "New Car",
        PersonalBudgetApp => "Personal Budget Management App",
        ErrorTitle => "Error",
        IncomeLoadFailed => "Failed to load income data",
        IncomeSaveFailed => "Failed to save income data",
        IncomeSaved => "Income data saved successfully",
        ExpenseLoadFailed => "Failed to load expense data",
        ExpenseSaveFailed => "Failed to save expense data",
        ExpenseSaved => "Expense data saved successfully",
    }
}

/// Session-scoped language selection shared by every component
#[derive(Debug, Default)]
pub struct Localizer {
    language: RwLock<Language>,
}

impl Localizer {
    pub fn new(language: Language) -> Self {
        Self {
            language: RwLock::new(language),
        }
    }

    pub fn language(&self) -> Language {
        *self.language.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_language(&self, language: Language) {
        *self.language.write().unwrap_or_else(PoisonError::into_inner) = language;
        info!("[localization] Language set to {}", language.code());
    }

    /// Switch between Arabic and English, returning the new language
    pub fn toggle(&self) -> Language {
        let next = self.language().other();
        self.set_language(next);
        next
    }

    pub fn translate(&self, key: TranslationKey) -> &'static str {
        translate(self.language(), key)
    }

    pub fn is_rtl(&self) -> bool {
        self.language().is_rtl()
    }

    pub fn format_amount(&self, amount: f64) -> String {
        format_amount(self.language(), amount)
    }
}

/// Group thousands and print up to two decimals in the digits of the language.
///
/// Arabic uses Arabic-Indic digits with `٬` for grouping and `٫` as the decimal mark.
pub fn format_amount(language: Language, amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }

    let rounded = format!("{:.2}", amount.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let (group_sep, decimal_sep) = match language {
        Language::Arabic => ('٬', '٫'),
        Language::English => (',', '.'),
    };

    let mut out = String::new();
    if amount < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(group_sep);
        }
        out.push(localize_digit(language, digit));
    }
    if !fraction.is_empty() {
        out.push(decimal_sep);
        out.extend(fraction.chars().map(|d| localize_digit(language, d)));
    }
    out
}

fn localize_digit(language: Language, digit: char) -> char {
    match (language, digit.to_digit(10)) {
        (Language::Arabic, Some(d)) => char::from_u32(0x0660 + d).unwrap_or(digit),
        _ => digit,
    }
}
