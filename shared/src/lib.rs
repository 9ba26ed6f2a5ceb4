use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Identity of the signed-in user, as handed out by the authentication provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// The two budget entities that are synchronized with the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Income,
    Expense,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Income => "income",
            EntityKind::Expense => "expense",
        }
    }

    /// Table holding the rows for this entity in the record store
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Income => "income_entries",
            EntityKind::Expense => "expense_entries",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a user-entered amount: anything that is not a finite, positive
/// number is stored as 0.
pub fn coerce_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Parse raw form input into an amount. Blank or non-numeric input yields 0.
pub fn parse_amount(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .map(coerce_amount)
        .unwrap_or(0.0)
}

/// Sum of the constituent fields of a record
pub fn derived_total<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().sum()
}

/// A named numeric field of a budget record
pub trait RecordField: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// camelCase key used on the wire and for translation lookup
    fn key(&self) -> &'static str;

    /// snake_case column name in the record store
    fn column(&self) -> &'static str;
}

/// A fixed-shape budget record made of named amounts plus a derived total.
///
/// Implementors keep `total` in sync inside [`BudgetEntity::store`]; there is
/// no way to write the total directly.
pub trait BudgetEntity:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Field: RecordField;

    const KIND: EntityKind;

    /// Every constituent field, in display order
    fn fields() -> &'static [Self::Field];

    fn get(&self, field: Self::Field) -> f64;

    /// Store a coerced value for one field and recompute the total
    fn store(&mut self, field: Self::Field, value: f64);

    fn total(&self) -> f64;

    fn set(&mut self, field: Self::Field, value: f64) {
        self.store(field, value);
    }

    /// Apply several field changes as one edit
    fn apply<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (Self::Field, f64)>,
    {
        for (field, value) in changes {
            self.store(field, value);
        }
    }

    fn values(&self) -> Vec<(Self::Field, f64)> {
        Self::fields().iter().map(|f| (*f, self.get(*f))).collect()
    }

    fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Self::Field, f64)>,
    {
        let mut record = Self::default();
        record.apply(values);
        record
    }

    /// Total recomputed from the fields, independent of the cached value
    fn computed_total(&self) -> f64 {
        derived_total(Self::fields().iter().map(|f| self.get(*f)))
    }
}

/// Monthly income line items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncomeField {
    BasicSalary,
    Freelance,
    Rent,
    Investments,
    Other,
}

impl RecordField for IncomeField {
    fn key(&self) -> &'static str {
        match self {
            IncomeField::BasicSalary => "basicSalary",
            IncomeField::Freelance => "freelance",
            IncomeField::Rent => "rent",
            IncomeField::Investments => "investments",
            IncomeField::Other => "other",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            IncomeField::BasicSalary => "basic_salary",
            IncomeField::Freelance => "freelance",
            IncomeField::Rent => "rent",
            IncomeField::Investments => "investments",
            IncomeField::Other => "other",
        }
    }
}

const INCOME_FIELDS: [IncomeField; 5] = [
    IncomeField::BasicSalary,
    IncomeField::Freelance,
    IncomeField::Rent,
    IncomeField::Investments,
    IncomeField::Other,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRecord {
    basic_salary: f64,
    freelance: f64,
    rent: f64,
    investments: f64,
    other: f64,
    total: f64,
}

/// Wire shape of an income record; missing fields default to 0 and any
/// submitted total is discarded in favour of the recomputed one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct IncomeRecordWire {
    basic_salary: f64,
    freelance: f64,
    rent: f64,
    investments: f64,
    other: f64,
}

impl From<IncomeRecordWire> for IncomeRecord {
    fn from(wire: IncomeRecordWire) -> Self {
        IncomeRecord::new(
            wire.basic_salary,
            wire.freelance,
            wire.rent,
            wire.investments,
            wire.other,
        )
    }
}

impl<'de> Deserialize<'de> for IncomeRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        IncomeRecordWire::deserialize(deserializer).map(IncomeRecord::from)
    }
}

impl IncomeRecord {
    pub fn new(basic_salary: f64, freelance: f64, rent: f64, investments: f64, other: f64) -> Self {
        Self::from_values([
            (IncomeField::BasicSalary, basic_salary),
            (IncomeField::Freelance, freelance),
            (IncomeField::Rent, rent),
            (IncomeField::Investments, investments),
            (IncomeField::Other, other),
        ])
    }

    pub fn basic_salary(&self) -> f64 {
        self.basic_salary
    }

    pub fn freelance(&self) -> f64 {
        self.freelance
    }

    pub fn rent(&self) -> f64 {
        self.rent
    }

    pub fn investments(&self) -> f64 {
        self.investments
    }

    pub fn other(&self) -> f64 {
        self.other
    }
}

impl BudgetEntity for IncomeRecord {
    type Field = IncomeField;

    const KIND: EntityKind = EntityKind::Income;

    fn fields() -> &'static [IncomeField] {
        &INCOME_FIELDS
    }

    fn get(&self, field: IncomeField) -> f64 {
        match field {
            IncomeField::BasicSalary => self.basic_salary,
            IncomeField::Freelance => self.freelance,
            IncomeField::Rent => self.rent,
            IncomeField::Investments => self.investments,
            IncomeField::Other => self.other,
        }
    }

    fn store(&mut self, field: IncomeField, value: f64) {
        let value = coerce_amount(value);
        match field {
            IncomeField::BasicSalary => self.basic_salary = value,
            IncomeField::Freelance => self.freelance = value,
            IncomeField::Rent => self.rent = value,
            IncomeField::Investments => self.investments = value,
            IncomeField::Other => self.other = value,
        }
        self.total = self.computed_total();
    }

    fn total(&self) -> f64 {
        self.total
    }
}

/// Monthly expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpenseField {
    Housing,
    Utilities,
    Food,
    Transportation,
    Education,
    Entertainment,
    Health,
    Savings,
}

impl RecordField for ExpenseField {
    fn key(&self) -> &'static str {
        match self {
            ExpenseField::Housing => "housing",
            ExpenseField::Utilities => "utilities",
            ExpenseField::Food => "food",
            ExpenseField::Transportation => "transportation",
            ExpenseField::Education => "education",
            ExpenseField::Entertainment => "entertainment",
            ExpenseField::Health => "health",
            ExpenseField::Savings => "savings",
        }
    }

    fn column(&self) -> &'static str {
        // Column names match the wire keys for every expense category
        self.key()
    }
}

const EXPENSE_FIELDS: [ExpenseField; 8] = [
    ExpenseField::Housing,
    ExpenseField::Utilities,
    ExpenseField::Food,
    ExpenseField::Transportation,
    ExpenseField::Education,
    ExpenseField::Entertainment,
    ExpenseField::Health,
    ExpenseField::Savings,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    housing: f64,
    utilities: f64,
    food: f64,
    transportation: f64,
    education: f64,
    entertainment: f64,
    health: f64,
    savings: f64,
    total: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ExpenseRecordWire {
    housing: f64,
    utilities: f64,
    food: f64,
    transportation: f64,
    education: f64,
    entertainment: f64,
    health: f64,
    savings: f64,
}

impl From<ExpenseRecordWire> for ExpenseRecord {
    fn from(wire: ExpenseRecordWire) -> Self {
        ExpenseRecord::from_values([
            (ExpenseField::Housing, wire.housing),
            (ExpenseField::Utilities, wire.utilities),
            (ExpenseField::Food, wire.food),
            (ExpenseField::Transportation, wire.transportation),
            (ExpenseField::Education, wire.education),
            (ExpenseField::Entertainment, wire.entertainment),
            (ExpenseField::Health, wire.health),
            (ExpenseField::Savings, wire.savings),
        ])
    }
}

impl<'de> Deserialize<'de> for ExpenseRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        ExpenseRecordWire::deserialize(deserializer).map(ExpenseRecord::from)
    }
}

impl ExpenseRecord {
    pub fn housing(&self) -> f64 {
        self.housing
    }

    pub fn utilities(&self) -> f64 {
        self.utilities
    }

    pub fn food(&self) -> f64 {
        self.food
    }

    pub fn transportation(&self) -> f64 {
        self.transportation
    }

    pub fn education(&self) -> f64 {
        self.education
    }

    pub fn entertainment(&self) -> f64 {
        self.entertainment
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn savings(&self) -> f64 {
        self.savings
    }
}

impl BudgetEntity for ExpenseRecord {
    type Field = ExpenseField;

    const KIND: EntityKind = EntityKind::Expense;

    fn fields() -> &'static [ExpenseField] {
        &EXPENSE_FIELDS
    }

    fn get(&self, field: ExpenseField) -> f64 {
        match field {
            ExpenseField::Housing => self.housing,
            ExpenseField::Utilities => self.utilities,
            ExpenseField::Food => self.food,
            ExpenseField::Transportation => self.transportation,
            ExpenseField::Education => self.education,
            ExpenseField::Entertainment => self.entertainment,
            ExpenseField::Health => self.health,
            ExpenseField::Savings => self.savings,
        }
    }

    fn store(&mut self, field: ExpenseField, value: f64) {
        let value = coerce_amount(value);
        match field {
            ExpenseField::Housing => self.housing = value,
            ExpenseField::Utilities => self.utilities = value,
            ExpenseField::Food => self.food = value,
            ExpenseField::Transportation => self.transportation = value,
            ExpenseField::Education => self.education = value,
            ExpenseField::Entertainment => self.entertainment = value,
            ExpenseField::Health => self.health = value,
            ExpenseField::Savings => self.savings = value,
        }
        self.total = self.computed_total();
    }

    fn total(&self) -> f64 {
        self.total
    }
}

/// Savings goal category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Emergency,
    #[default]
    Savings,
    Purchase,
    Travel,
    Education,
    Health,
}

impl GoalCategory {
    pub const ALL: [GoalCategory; 6] = [
        GoalCategory::Emergency,
        GoalCategory::Savings,
        GoalCategory::Purchase,
        GoalCategory::Travel,
        GoalCategory::Education,
        GoalCategory::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Emergency => "emergency",
            GoalCategory::Savings => "savings",
            GoalCategory::Purchase => "purchase",
            GoalCategory::Travel => "travel",
            GoalCategory::Education => "education",
            GoalCategory::Health => "health",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            GoalCategory::Emergency => "🚨",
            GoalCategory::Savings => "💰",
            GoalCategory::Purchase => "🛍️",
            GoalCategory::Travel => "✈️",
            GoalCategory::Education => "📚",
            GoalCategory::Health => "🏥",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Estimated number of months until a goal is funded from the monthly balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "months")]
pub enum MonthsToGoal {
    /// Nothing left to save
    Reached,
    Months(u32),
    /// The monthly balance is zero or negative
    Unreachable,
}

impl fmt::Display for MonthsToGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthsToGoal::Reached => write!(f, "0"),
            MonthsToGoal::Months(months) => write!(f, "{}", months),
            MonthsToGoal::Unreachable => write!(f, "∞"),
        }
    }
}

/// A session-only savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Goal ID in format: "goal::epoch_millis"
    pub id: String,
    pub title: String,
    pub target_amount: f64,
    /// Never negative; may exceed the target
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub category: GoalCategory,
}

impl Goal {
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("goal::{}", epoch_millis)
    }

    /// Parse a goal ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, GoalIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 2 || parts[0] != "goal" {
            return Err(GoalIdError::InvalidFormat);
        }

        parts[1].parse::<u64>().map_err(|_| GoalIdError::InvalidTimestamp)
    }

    pub fn remaining(&self) -> f64 {
        self.target_amount - self.current_amount
    }

    /// Completion percentage; above 100 once the target is overshot
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        self.current_amount / self.target_amount * 100.0
    }

    pub fn months_to_goal(&self, balance: f64) -> MonthsToGoal {
        let remaining = self.remaining();
        if remaining <= 0.0 {
            return MonthsToGoal::Reached;
        }
        if balance <= 0.0 || !balance.is_finite() {
            return MonthsToGoal::Unreachable;
        }
        let months = (remaining / balance).ceil();
        if months > u32::MAX as f64 {
            MonthsToGoal::Unreachable
        } else {
            MonthsToGoal::Months(months as u32)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GoalIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for GoalIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalIdError::InvalidFormat => write!(f, "Invalid goal ID format"),
            GoalIdError::InvalidTimestamp => write!(f, "Invalid timestamp in goal ID"),
        }
    }
}

impl std::error::Error for GoalIdError {}

/// A record row as kept by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord<E> {
    pub id: String,
    pub user_id: String,
    pub record: E,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestRecordResponse<E> {
    pub kind: EntityKind,
    /// None when the user has never saved this entity
    pub record: Option<StoredRecord<E>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRecordRequest<E> {
    pub record: E,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRecordResponse<E> {
    pub record: StoredRecord<E>,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
