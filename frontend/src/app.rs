//! # Budget Session
//!
//! One signed-in browser session: the injected collaborators, both entity
//! hooks, the goal list (seeded with the example goals) and the trigger that
//! loads data on sign-in.

use log::info;
use shared::{ExpenseRecord, IncomeRecord};
use std::sync::Arc;

use crate::analysis::{self, BalanceSummary, FinancialSummary, QuickSummary};
use crate::config::SessionConfig;
use crate::hooks::{EntityDataHook, IdentityAware, LoadTrigger};
use crate::planning::{GoalMetrics, GoalTracker};
use crate::services::auth::AuthSession;
use crate::services::gateway::{EmbeddedGateway, RecordGateway};
use crate::services::http_gateway::HttpGateway;
use crate::services::localization::Localizer;
use crate::services::notifications::{NotificationCenter, Notifier};

pub struct BudgetSession {
    auth: Arc<AuthSession>,
    localizer: Arc<Localizer>,
    notifications: Arc<NotificationCenter>,
    income: EntityDataHook<IncomeRecord>,
    expenses: EntityDataHook<ExpenseRecord>,
    goals: GoalTracker,
    _load_trigger: LoadTrigger,
}

impl BudgetSession {
    /// Wire up a session. Must be called from within a tokio runtime.
    pub fn new(
        config: &SessionConfig,
        auth: Arc<AuthSession>,
        income_gateway: Arc<dyn RecordGateway<IncomeRecord>>,
        expense_gateway: Arc<dyn RecordGateway<ExpenseRecord>>,
    ) -> Self {
        let localizer = Arc::new(Localizer::new(config.language));
        let notifications = Arc::new(NotificationCenter::new(config.notification_capacity));
        let notifier: Arc<dyn Notifier> = notifications.clone();

        let income = EntityDataHook::new(
            income_gateway,
            auth.clone(),
            localizer.clone(),
            notifier.clone(),
            config.autosave_delay(),
        );
        let expenses = EntityDataHook::new(
            expense_gateway,
            auth.clone(),
            localizer.clone(),
            notifier,
            config.autosave_delay(),
        );

        let targets: Vec<Arc<dyn IdentityAware>> = vec![
            Arc::new(income.clone()) as Arc<dyn IdentityAware>,
            Arc::new(expenses.clone()) as Arc<dyn IdentityAware>,
        ];
        let load_trigger = LoadTrigger::spawn(&auth, targets);

        info!(
            "[session] Budget session ready (language {}, autosave {} ms)",
            config.language.code(),
            config.autosave_ms
        );

        Self {
            auth,
            localizer,
            notifications,
            income,
            expenses,
            goals: GoalTracker::with_examples(config.language),
            _load_trigger: load_trigger,
        }
    }

    /// Session backed by the record services of an in-process backend
    pub fn embedded(config: &SessionConfig, auth: Arc<AuthSession>, state: &backend::AppState) -> Self {
        Self::new(
            config,
            auth,
            Arc::new(EmbeddedGateway::income(state)),
            Arc::new(EmbeddedGateway::expense(state)),
        )
    }

    /// Session talking to the REST API at `config.api_base_url`
    pub fn remote(config: &SessionConfig, auth: Arc<AuthSession>) -> Self {
        let client = reqwest::Client::new();
        Self::new(
            config,
            auth,
            Arc::new(HttpGateway::with_client(client.clone(), config.api_base_url.clone())),
            Arc::new(HttpGateway::with_client(client, config.api_base_url.clone())),
        )
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn income(&self) -> &EntityDataHook<IncomeRecord> {
        &self.income
    }

    pub fn expenses(&self) -> &EntityDataHook<ExpenseRecord> {
        &self.expenses
    }

    pub fn goals(&self) -> &GoalTracker {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut GoalTracker {
        &mut self.goals
    }

    /// Income total minus expense total
    pub fn balance(&self) -> f64 {
        analysis::balance(&self.income.record(), &self.expenses.record())
    }

    pub fn quick_summary(&self) -> QuickSummary {
        QuickSummary::new(&self.income.record(), &self.expenses.record())
    }

    pub fn balance_summary(&self) -> BalanceSummary {
        BalanceSummary::new(&self.income.record(), &self.expenses.record())
    }

    pub fn financial_summary(&self) -> FinancialSummary {
        FinancialSummary::from_balance(self.balance())
    }

    pub fn goal_metrics(&self, goal_id: &str) -> Option<GoalMetrics> {
        self.goals.metrics(goal_id, self.balance())
    }

    pub fn sign_out(&self) {
        self.auth.sign_out();
    }
}
