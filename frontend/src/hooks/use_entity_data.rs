//! Entity data hook: one income or expense record, kept in sync with the store.
//!
//! Edits are applied to the local record immediately (the total is recomputed
//! in the same step) and written back after a quiet period. A manual save
//! writes at once and supersedes the pending autosave.
//!
//! Remote failures never escape the hook; they are logged and turned into
//! error notifications, and the change flag stays set so a later save retries.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use shared::{parse_amount, BudgetEntity, UserIdentity};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;

use super::debounce::DebounceScheduler;
use super::use_identity_load::IdentityAware;
use crate::services::auth::AuthSession;
use crate::services::gateway::{GatewayError, RecordGateway};
use crate::services::localization::{Localizer, TranslationKey};
use crate::services::notifications::{Notifier, Severity};

/// Where the hook is in its load / edit / save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No record has been loaded for any identity yet
    Uninitialized,
    Loading,
    Clean,
    Dirty,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing to write, or nobody signed in
    Skipped,
    Saved,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveMode {
    Manual,
    Autosave,
}

/// Everything the view needs to render one entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot<E> {
    pub record: E,
    pub has_changes: bool,
    pub loading: bool,
    pub status: SyncStatus,
}

struct HookState<E> {
    record: E,
    has_changes: bool,
    /// Bumped on every local edit and on every load that replaces the record
    revision: u64,
    /// Identity whose data the local record belongs to
    owner: Option<String>,
    initialized: bool,
    loading: bool,
    /// The write currently in flight, if any
    in_flight: Option<InFlight>,
}

/// A write under way. A manual save of the same revision joins it instead of
/// writing again, and flags it so completion raises the success message.
struct InFlight {
    revision: u64,
    manual: Arc<AtomicBool>,
    done: watch::Receiver<Option<SaveOutcome>>,
}

enum WriteStart<E> {
    Join(watch::Receiver<Option<SaveOutcome>>),
    Write {
        record: E,
        revision: u64,
        manual: Arc<AtomicBool>,
        done: watch::Sender<Option<SaveOutcome>>,
    },
}

impl<E: BudgetEntity> HookState<E> {
    fn new() -> Self {
        Self {
            record: E::default(),
            has_changes: false,
            revision: 0,
            owner: None,
            initialized: false,
            loading: false,
            in_flight: None,
        }
    }

    fn status(&self) -> SyncStatus {
        if self.loading {
            SyncStatus::Loading
        } else if self.in_flight.is_some() {
            SyncStatus::Saving
        } else if self.has_changes {
            SyncStatus::Dirty
        } else if self.initialized {
            SyncStatus::Clean
        } else {
            SyncStatus::Uninitialized
        }
    }
}

struct HookInner<E: BudgetEntity> {
    gateway: Arc<dyn RecordGateway<E>>,
    auth: Arc<AuthSession>,
    localizer: Arc<Localizer>,
    notifier: Arc<dyn Notifier>,
    scheduler: DebounceScheduler,
    state: Mutex<HookState<E>>,
}

/// Local state plus synchronization for one budget entity.
///
/// Cloning is cheap and every clone drives the same state.
pub struct EntityDataHook<E: BudgetEntity> {
    inner: Arc<HookInner<E>>,
}

impl<E: BudgetEntity> Clone for EntityDataHook<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: BudgetEntity> EntityDataHook<E> {
    pub fn new(
        gateway: Arc<dyn RecordGateway<E>>,
        auth: Arc<AuthSession>,
        localizer: Arc<Localizer>,
        notifier: Arc<dyn Notifier>,
        autosave_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(HookInner {
                gateway,
                auth,
                localizer,
                notifier,
                scheduler: DebounceScheduler::new(autosave_delay),
                state: Mutex::new(HookState::new()),
            }),
        }
    }

    /// Fetch the latest stored record for the signed-in user.
    ///
    /// A user without a stored record keeps the zeroed default. When the
    /// identity differs from the one the local record belongs to, local state
    /// is reset before the fetch.
    pub async fn load(&self) {
        let component = component(E::KIND);

        let Some(user) = self.inner.auth.current_user() else {
            error!("[{}] Load requested without a signed-in user", component);
            self.inner.notify_error(TranslationKey::load_failed(E::KIND));
            return;
        };

        {
            let mut state = self.inner.lock();
            if state.owner.as_deref().is_some_and(|owner| owner != user.id) {
                info!("[{}] Identity changed to {}, discarding local record", component, user.id);
                self.inner.scheduler.cancel();
                state.record = E::default();
                state.has_changes = false;
                state.revision += 1;
                state.initialized = false;
            }
            state.owner = Some(user.id.clone());
            state.loading = true;
        }

        debug!("[{}] Loading latest record for {}", component, user.id);
        let result = self.inner.gateway.fetch_latest(&user.id).await;

        let mut state = self.inner.lock();
        state.loading = false;
        match result {
            Ok(Some(stored)) => {
                self.inner.scheduler.cancel();
                // Rebuild from the fields so the total is never taken on trust
                state.record = E::from_values(stored.record.values());
                state.has_changes = false;
                state.revision += 1;
                state.initialized = true;
                info!(
                    "[{}] Loaded record for {} (total {:.2})",
                    component,
                    user.id,
                    state.record.total()
                );
            }
            Ok(None) | Err(GatewayError::NotFound) => {
                state.initialized = true;
                info!("[{}] No stored record for {}, starting from zero", component, user.id);
            }
            Err(e) => {
                drop(state);
                error!("[{}] Error loading record for {}: {}", component, user.id, e);
                self.inner.notify_error(TranslationKey::load_failed(E::KIND));
            }
        }
    }

    /// Apply field changes as one edit and schedule an autosave.
    ///
    /// Outside a tokio runtime the edit still applies but no autosave is
    /// scheduled; `save_manually` writes it later.
    pub fn update<I>(&self, changes: I)
    where
        I: IntoIterator<Item = (E::Field, f64)>,
    {
        self.edit(|record| record.apply(changes));
    }

    /// Apply raw form input for one field; blank or invalid input stores 0
    pub fn update_input(&self, field: E::Field, input: &str) {
        let value = parse_amount(input);
        self.edit(|record| record.set(field, value));
    }

    /// Replace every field with those of `record`
    pub fn replace(&self, record: E) {
        self.edit(|current| current.apply(record.values()));
    }

    /// Write the record now if it has unsaved changes.
    ///
    /// Supersedes a pending autosave. When a write of the current revision is
    /// already in flight, waits for it instead of writing again; its outcome
    /// is reported as this save's. Without changes this is a no-op.
    pub async fn save_manually(&self) -> SaveOutcome {
        self.inner.scheduler.cancel();
        let user = self.inner.auth.current_user();
        self.inner.persist(user, SaveMode::Manual).await
    }

    pub fn record(&self) -> E {
        self.inner.lock().record.clone()
    }

    pub fn total(&self) -> f64 {
        self.inner.lock().record.total()
    }

    pub fn has_changes(&self) -> bool {
        self.inner.lock().has_changes
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.lock().status()
    }

    /// True while an autosave is waiting for its quiet period to end
    pub fn autosave_pending(&self) -> bool {
        self.inner.scheduler.is_armed()
    }

    pub fn snapshot(&self) -> EntitySnapshot<E> {
        let state = self.inner.lock();
        EntitySnapshot {
            record: state.record.clone(),
            has_changes: state.has_changes,
            loading: state.loading,
            status: state.status(),
        }
    }

    fn edit<F>(&self, mutate: F)
    where
        F: FnOnce(&mut E),
    {
        {
            let mut state = self.inner.lock();
            mutate(&mut state.record);
            state.has_changes = true;
            state.revision += 1;
            debug!(
                "[{}] Edit #{} (total {:.2})",
                component(E::KIND),
                state.revision,
                state.record.total()
            );
        }
        self.arm_autosave();
    }

    fn arm_autosave(&self) {
        // The write goes to whoever was signed in when the edit happened
        let user = self.inner.auth.current_user();
        let hook: Weak<HookInner<E>> = Arc::downgrade(&self.inner);
        let armed = self.inner.scheduler.arm(async move {
            if let Some(inner) = hook.upgrade() {
                inner.persist(user, SaveMode::Autosave).await;
            }
        });
        if !armed {
            warn!("[{}] Autosave unavailable, edit kept until a manual save", component(E::KIND));
        }
    }
}

impl<E: BudgetEntity> HookInner<E> {
    fn lock(&self) -> MutexGuard<'_, HookState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn persist(&self, user: Option<UserIdentity>, mode: SaveMode) -> SaveOutcome {
        let component = component(E::KIND);

        let Some(user) = user else {
            warn!("[{}] Not saving: no signed-in user", component);
            return SaveOutcome::Skipped;
        };

        let start = {
            let mut state = self.lock();
            if !state.has_changes {
                debug!("[{}] Nothing to save", component);
                return SaveOutcome::Skipped;
            }
            let current = state.revision;
            match state.in_flight.as_ref().filter(|w| w.revision == current) {
                Some(_) if mode == SaveMode::Autosave => {
                    debug!("[{}] Revision #{} is already being written", component, current);
                    return SaveOutcome::Skipped;
                }
                Some(write) => {
                    write.manual.store(true, Ordering::SeqCst);
                    WriteStart::Join(write.done.clone())
                }
                None => {
                    let manual = Arc::new(AtomicBool::new(mode == SaveMode::Manual));
                    let (done, rx) = watch::channel(None);
                    state.in_flight = Some(InFlight {
                        revision: current,
                        manual: manual.clone(),
                        done: rx,
                    });
                    WriteStart::Write {
                        record: state.record.clone(),
                        revision: current,
                        manual,
                        done,
                    }
                }
            }
        };

        let (record, revision, manual, done) = match start {
            WriteStart::Join(mut done) => {
                debug!("[{}] Joining the write already in flight", component);
                let outcome = done.wait_for(Option::is_some).await.ok().and_then(|o| *o);
                return outcome.unwrap_or(SaveOutcome::Failed);
            }
            WriteStart::Write {
                record,
                revision,
                manual,
                done,
            } => (record, revision, manual, done),
        };

        info!(
            "[{}] Saving record for {} ({:?}, total {:.2})",
            component,
            user.id,
            mode,
            record.total()
        );
        let result = self.gateway.upsert(&user.id, &record).await;

        {
            let mut state = self.lock();
            if state.in_flight.as_ref().is_some_and(|w| w.revision == revision) {
                state.in_flight = None;
            }
            if result.is_ok() && state.revision == revision {
                state.has_changes = false;
            }
        }

        let outcome = match result {
            Ok(_) => {
                if manual.load(Ordering::SeqCst) {
                    self.notify(
                        TranslationKey::Saved,
                        TranslationKey::saved(E::KIND),
                        Severity::Success,
                    );
                }
                SaveOutcome::Saved
            }
            Err(e) => {
                error!("[{}] Error saving record for {}: {}", component, user.id, e);
                self.notify_error(TranslationKey::save_failed(E::KIND));
                SaveOutcome::Failed
            }
        };
        done.send_replace(Some(outcome));
        outcome
    }

    fn notify_error(&self, message: TranslationKey) {
        self.notify(TranslationKey::ErrorTitle, message, Severity::Error);
    }

    fn notify(&self, title: TranslationKey, message: TranslationKey, severity: Severity) {
        self.notifier.notify(
            self.localizer.translate(title),
            self.localizer.translate(message),
            severity,
        );
    }
}

#[async_trait]
impl<E: BudgetEntity> IdentityAware for EntityDataHook<E> {
    fn name(&self) -> &'static str {
        component(E::KIND)
    }

    async fn on_identity(&self) {
        self.load().await;
    }
}

fn component(kind: shared::EntityKind) -> &'static str {
    match kind {
        shared::EntityKind::Income => "income-data",
        shared::EntityKind::Expense => "expense-data",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::localization::Language;
    use crate::services::notifications::NotificationCenter;
    use crate::services::test_utils::RecordingGateway;
    use shared::{ExpenseField, ExpenseRecord, IncomeField, IncomeRecord};

    const DELAY: Duration = Duration::from_millis(2000);

    struct Fixture<E: BudgetEntity> {
        hook: EntityDataHook<E>,
        gateway: Arc<RecordingGateway<E>>,
        auth: Arc<AuthSession>,
        notifications: Arc<NotificationCenter>,
    }

    fn fixture<E: BudgetEntity>(user: Option<&str>) -> Fixture<E> {
        let gateway = RecordingGateway::<E>::new();
        let auth = Arc::new(AuthSession::new());
        auth.resolve(user.map(UserIdentity::new));
        let notifications = Arc::new(NotificationCenter::new(10));
        let hook = EntityDataHook::new(
            gateway.clone(),
            auth.clone(),
            Arc::new(Localizer::new(Language::English)),
            notifications.clone(),
            DELAY,
        );
        Fixture {
            hook,
            gateway,
            auth,
            notifications,
        }
    }

    async fn wait_past_quiet_period() {
        tokio::time::sleep(DELAY + Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_user_gets_zeroed_record_without_errors() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        assert_eq!(f.hook.status(), SyncStatus::Uninitialized);

        f.hook.load().await;

        assert_eq!(f.hook.record(), IncomeRecord::default());
        assert!(!f.hook.has_changes());
        assert!(!f.hook.is_loading());
        assert_eq!(f.hook.status(), SyncStatus::Clean);
        assert!(f.notifications.is_empty());
        assert_eq!(f.gateway.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_on_load_is_not_an_error() {
        let f = fixture::<ExpenseRecord>(Some("user-1"));
        f.gateway.script_fetch(Err(GatewayError::NotFound));

        f.hook.load().await;

        assert_eq!(f.hook.status(), SyncStatus::Clean);
        assert!(f.notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_replaces_local_state() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.gateway.script_fetch(Ok(Some(IncomeRecord::new(3000.0, 0.0, 500.0, 0.0, 0.0))));

        f.hook.load().await;

        assert_eq!(f.hook.record().basic_salary(), 3000.0);
        assert_eq!(f.hook.total(), 3500.0);
        assert!(!f.hook.has_changes());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_failure_keeps_state_and_notifies() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.update([(IncomeField::Rent, 700.0)]);
        f.hook.save_manually().await;
        f.notifications.drain();

        f.gateway.script_fetch(Err(GatewayError::Backend("connection reset".into())));
        f.hook.load().await;

        assert_eq!(f.hook.record().rent(), 700.0);
        let errors = f.notifications.drain();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].severity, Severity::Error);
        assert_eq!(errors[0].message, "Failed to load income data");
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_without_identity_notifies_and_fetches_nothing() {
        let f = fixture::<IncomeRecord>(None);

        f.hook.load().await;

        assert_eq!(f.gateway.fetch_count(), 0);
        assert_eq!(f.notifications.count(Severity::Error), 1);
        assert_eq!(f.hook.status(), SyncStatus::Uninitialized);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_are_coalesced_into_one_autosave() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.load().await;

        f.hook.update([(IncomeField::BasicSalary, 5000.0)]);
        assert_eq!(f.hook.total(), 5000.0);
        assert!(f.hook.has_changes());
        assert_eq!(f.hook.status(), SyncStatus::Dirty);

        tokio::time::sleep(Duration::from_millis(500)).await;
        f.hook.update([(IncomeField::Freelance, 1500.0)]);
        assert_eq!(f.hook.total(), 6500.0);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(f.gateway.upserts().is_empty());

        wait_past_quiet_period().await;

        let upserts = f.gateway.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].0, "user-1");
        assert_eq!(upserts[0].1.total(), 6500.0);
        assert!(!f.hook.has_changes());
        assert_eq!(f.hook.status(), SyncStatus::Clean);
        // Autosave is silent
        assert!(f.notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_many_keystrokes_write_the_last_state() {
        let f = fixture::<ExpenseRecord>(Some("user-1"));
        f.hook.load().await;

        for input in ["1", "12", "120", "1200"] {
            f.hook.update_input(ExpenseField::Housing, input);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        wait_past_quiet_period().await;

        let upserts = f.gateway.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].1.housing(), 1200.0);
        assert_eq!(upserts[0].1.total(), 1200.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_stores_zero() {
        let f = fixture::<ExpenseRecord>(Some("user-1"));

        f.hook.update_input(ExpenseField::Food, "900");
        f.hook.update_input(ExpenseField::Health, "abc");
        f.hook.update_input(ExpenseField::Savings, "");

        let record = f.hook.record();
        assert_eq!(record.health(), 0.0);
        assert_eq!(record.savings(), 0.0);
        assert_eq!(record.total(), 900.0);
        assert!(!record.total().is_nan());
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_supersedes_pending_autosave() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.load().await;

        f.hook.update([(IncomeField::BasicSalary, 5000.0), (IncomeField::Freelance, 1500.0)]);
        assert!(f.hook.autosave_pending());

        assert_eq!(f.hook.save_manually().await, SaveOutcome::Saved);
        assert!(!f.hook.autosave_pending());
        wait_past_quiet_period().await;

        assert_eq!(f.gateway.upserts().len(), 1);
        let success = f.notifications.drain();
        assert_eq!(success.len(), 1);
        assert_eq!(success[0].severity, Severity::Success);
        assert_eq!(success[0].message, "Income data saved successfully");
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_is_idempotent() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.update([(IncomeField::Other, 40.0)]);

        assert_eq!(f.hook.save_manually().await, SaveOutcome::Saved);
        assert_eq!(f.hook.save_manually().await, SaveOutcome::Skipped);

        assert_eq!(f.gateway.upserts().len(), 1);
        assert_eq!(f.notifications.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_without_changes_is_noop() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.load().await;

        assert_eq!(f.hook.save_manually().await, SaveOutcome::Skipped);
        assert!(f.gateway.upserts().is_empty());
        assert!(f.notifications.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_manual_save_keeps_changes_for_retry() {
        let f = fixture::<ExpenseRecord>(Some("user-1"));
        f.gateway.fail_upserts_with(Some(GatewayError::Backend("disk full".into())));
        f.hook.update([(ExpenseField::Food, 900.0)]);

        assert_eq!(f.hook.save_manually().await, SaveOutcome::Failed);
        assert!(f.hook.has_changes());
        assert_eq!(f.hook.status(), SyncStatus::Dirty);
        let errors = f.notifications.drain();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Failed to save expense data");

        f.gateway.fail_upserts_with(None);
        assert_eq!(f.hook.save_manually().await, SaveOutcome::Saved);
        assert!(!f.hook.has_changes());
        assert_eq!(f.gateway.upserts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_autosave_notifies_and_does_not_retry() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.gateway.fail_upserts_with(Some(GatewayError::Backend("timeout".into())));
        f.hook.update([(IncomeField::Rent, 1000.0)]);

        wait_past_quiet_period().await;
        assert_eq!(f.gateway.upserts().len(), 1);
        assert!(f.hook.has_changes());
        assert_eq!(f.notifications.count(Severity::Error), 1);
        assert!(!f.hook.autosave_pending());

        tokio::time::sleep(DELAY * 5).await;
        assert_eq!(f.gateway.upserts().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_save_stays_dirty() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.gateway.delay_upserts(Duration::from_millis(300));
        f.hook.update([(IncomeField::BasicSalary, 100.0)]);

        let saving = {
            let hook = f.hook.clone();
            tokio::spawn(async move { hook.save_manually().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(f.hook.status(), SyncStatus::Saving);

        f.hook.update([(IncomeField::BasicSalary, 200.0)]);
        assert_eq!(saving.await.unwrap(), SaveOutcome::Saved);
        assert!(f.hook.has_changes());

        tokio::time::sleep(DELAY + Duration::from_millis(500)).await;
        let upserts = f.gateway.upserts();
        assert_eq!(upserts.len(), 2);
        assert_eq!(upserts[1].1.basic_salary(), 200.0);
        assert!(!f.hook.has_changes());
    }

    #[test]
    fn test_edit_outside_runtime_is_kept_without_autosave() {
        let f = fixture::<ExpenseRecord>(Some("user-1"));

        f.hook.update_input(ExpenseField::Food, "450");

        assert_eq!(f.hook.total(), 450.0);
        assert!(f.hook.has_changes());
        assert!(!f.hook.autosave_pending());
        assert_eq!(f.hook.status(), SyncStatus::Dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_manual_saves_write_once() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.gateway.delay_upserts(Duration::from_millis(300));
        f.hook.update([(IncomeField::Investments, 250.0)]);

        let first = {
            let hook = f.hook.clone();
            tokio::spawn(async move { hook.save_manually().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(f.hook.save_manually().await, SaveOutcome::Saved);
        assert_eq!(first.await.unwrap(), SaveOutcome::Saved);
        assert_eq!(f.gateway.upserts().len(), 1);
        assert_eq!(f.notifications.count(Severity::Success), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_during_autosave_write_reports_success() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.gateway.delay_upserts(Duration::from_millis(1000));
        f.hook.update([(IncomeField::BasicSalary, 5000.0)]);

        // Autosave has fired and its write is still pending
        wait_past_quiet_period().await;
        assert_eq!(f.hook.status(), SyncStatus::Saving);
        assert!(f.hook.has_changes());

        assert_eq!(f.hook.save_manually().await, SaveOutcome::Saved);

        assert_eq!(f.gateway.upserts().len(), 1);
        assert!(!f.hook.has_changes());
        assert_eq!(f.notifications.count(Severity::Success), 1);
        assert_eq!(f.notifications.count(Severity::Error), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_save_joining_failed_autosave_reports_failure() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.gateway.delay_upserts(Duration::from_millis(1000));
        f.gateway.fail_upserts_with(Some(GatewayError::Backend("disk full".into())));
        f.hook.update([(IncomeField::Rent, 700.0)]);

        wait_past_quiet_period().await;
        assert_eq!(f.hook.save_manually().await, SaveOutcome::Failed);

        assert_eq!(f.gateway.upserts().len(), 1);
        assert!(f.hook.has_changes());
        assert_eq!(f.notifications.count(Severity::Error), 1);
        assert_eq!(f.notifications.count(Severity::Success), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_without_identity_are_not_written() {
        let f = fixture::<IncomeRecord>(None);
        f.hook.update([(IncomeField::BasicSalary, 10.0)]);

        wait_past_quiet_period().await;
        assert_eq!(f.hook.save_manually().await, SaveOutcome::Skipped);

        assert!(f.gateway.upserts().is_empty());
        assert!(f.notifications.is_empty());
        assert!(f.hook.has_changes());
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_change_resets_local_state() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.load().await;
        f.hook.update([(IncomeField::BasicSalary, 5000.0)]);

        f.auth.sign_in(UserIdentity::new("user-2"));
        f.hook.load().await;

        assert_eq!(f.hook.record(), IncomeRecord::default());
        assert!(!f.hook.has_changes());
        assert!(!f.hook.autosave_pending());

        wait_past_quiet_period().await;
        assert!(f.gateway.upserts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_goes_to_the_user_who_edited() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.update([(IncomeField::Freelance, 300.0)]);

        f.auth.sign_out();
        wait_past_quiet_period().await;

        let upserts = f.gateway.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].0, "user-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_is_visible_during_fetch() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.gateway.delay_fetches(Duration::from_millis(300));

        let loading = {
            let hook = f.hook.clone();
            tokio::spawn(async move { hook.load().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(f.hook.is_loading());
        assert_eq!(f.hook.status(), SyncStatus::Loading);

        loading.await.unwrap();
        assert!(!f.hook.is_loading());
        assert_eq!(f.hook.snapshot().status, SyncStatus::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_updates_every_field() {
        let f = fixture::<IncomeRecord>(Some("user-1"));
        f.hook.update([(IncomeField::Other, 99.0)]);

        f.hook.replace(IncomeRecord::new(1.0, 2.0, 3.0, 4.0, 0.0));

        let snapshot = f.hook.snapshot();
        assert_eq!(snapshot.record.other(), 0.0);
        assert_eq!(snapshot.record.total(), 10.0);
        assert!(snapshot.has_changes);
    }
}
