use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;

use posewave_domain::account::{Account, AccountService, Credentials};
use posewave_domain::events::{DomainEvent, EventBus};
use posewave_domain::ledger::LedgerRepository;
use posewave_domain::local_state::{CachedStreak, LocalStateRepository};
use posewave_domain::profile::{ProfileRepository, UserProfile};
use posewave_domain::round::{
    Classification, Frame, FrameSource, PoseClassifier, RoundConfig, RoundTally,
};
use posewave_domain::session::{
    DailyBuckets, GameSession, HistoryListener, SessionHistoryRepository, SubscriptionHandle,
};
use posewave_domain::shared::{AccountId, DomainError, SessionKey};

use super::*;

// Mock collaborators for service tests

struct MockAccountService {
    account: Option<Account>,
}

impl MockAccountService {
    fn signed_in(id: &str) -> Self {
        Self {
            account: Some(
                Account::new(
                    AccountId::from_string(id),
                    format!("{}@example.com", id),
                    true,
                )
                .unwrap(),
            ),
        }
    }

    fn signed_out() -> Self {
        Self { account: None }
    }
}

#[async_trait]
impl AccountService for MockAccountService {
    async fn sign_in(&self, _credentials: &Credentials) -> Result<Account, DomainError> {
        unimplemented!("not exercised by these tests")
    }

    async fn sign_up(&self, _credentials: &Credentials) -> Result<Account, DomainError> {
        unimplemented!("not exercised by these tests")
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), DomainError> {
        Ok(())
    }

    async fn send_email_verification(&self, _account: &Account) -> Result<(), DomainError> {
        Ok(())
    }

    async fn reload_account(&self, account: &Account) -> Result<Account, DomainError> {
        Ok(account.clone())
    }

    fn current_account(&self) -> Option<Account> {
        self.account.clone()
    }
}

#[derive(Default)]
struct MockHistoryRepository {
    history: tokio::sync::RwLock<DailyBuckets>,
    appended: tokio::sync::RwLock<Vec<GameSession>>,
    fail_reads: AtomicBool,
}

impl MockHistoryRepository {
    fn with_history(history: DailyBuckets) -> Self {
        Self {
            history: tokio::sync::RwLock::new(history),
            ..Default::default()
        }
    }

    fn failing() -> Self {
        let repo = Self::default();
        repo.fail_reads.store(true, Ordering::Release);
        repo
    }

    async fn appended_sessions(&self) -> Vec<GameSession> {
        self.appended.read().await.clone()
    }
}

#[async_trait]
impl SessionHistoryRepository for MockHistoryRepository {
    async fn append(&self, session: &GameSession) -> Result<SessionKey, DomainError> {
        self.appended.write().await.push(session.clone());
        self.history.write().await.insert(session.clone());
        Ok(session.key().clone())
    }

    async fn load_history(&self, _owner_id: &AccountId) -> Result<DailyBuckets, DomainError> {
        if self.fail_reads.load(Ordering::Acquire) {
            return Err(DomainError::RemoteReadFailed("boom".to_string()));
        }
        Ok(self.history.read().await.clone())
    }

    async fn subscribe(
        &self,
        _owner_id: &AccountId,
        _listener: HistoryListener,
    ) -> Result<SubscriptionHandle, DomainError> {
        Ok(SubscriptionHandle::new(Box::new(|| {})))
    }
}

#[derive(Default)]
struct MockLedgerRepository {
    spent: tokio::sync::RwLock<Option<i64>>,
}

impl MockLedgerRepository {
    fn with_spent(spent: i64) -> Self {
        Self {
            spent: tokio::sync::RwLock::new(Some(spent)),
        }
    }

    async fn stored_spent(&self) -> Option<i64> {
        *self.spent.read().await
    }
}

#[async_trait]
impl LedgerRepository for MockLedgerRepository {
    async fn read_spent(&self, _owner_id: &AccountId) -> Result<Option<i64>, DomainError> {
        Ok(*self.spent.read().await)
    }

    async fn write_spent(&self, _owner_id: &AccountId, spent: u64) -> Result<(), DomainError> {
        *self.spent.write().await = Some(spent as i64);
        Ok(())
    }
}

#[derive(Default)]
struct MockLocalState {
    streak: tokio::sync::RwLock<Option<CachedStreak>>,
    legacy_spent: tokio::sync::RwLock<Option<i64>>,
}

impl MockLocalState {
    fn with_cached_streak(days: u32) -> Self {
        Self {
            streak: tokio::sync::RwLock::new(Some(CachedStreak {
                days,
                last_play_date: None,
            })),
            ..Default::default()
        }
    }

    fn with_legacy_spent(spent: i64) -> Self {
        Self {
            legacy_spent: tokio::sync::RwLock::new(Some(spent)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LocalStateRepository for MockLocalState {
    async fn cached_streak(&self) -> Result<Option<CachedStreak>, DomainError> {
        Ok(*self.streak.read().await)
    }

    async fn store_streak(&self, streak: &CachedStreak) -> Result<(), DomainError> {
        *self.streak.write().await = Some(*streak);
        Ok(())
    }

    async fn legacy_spent_points(&self) -> Result<Option<i64>, DomainError> {
        Ok(*self.legacy_spent.read().await)
    }

    async fn clear_legacy_spent_points(&self) -> Result<(), DomainError> {
        *self.legacy_spent.write().await = None;
        Ok(())
    }
}

#[derive(Default)]
struct MockEventBus {
    event_count: tokio::sync::RwLock<usize>,
}

impl MockEventBus {
    async fn get_event_count(&self) -> usize {
        *self.event_count.read().await
    }
}

#[async_trait]
impl EventBus for MockEventBus {
    async fn publish(&self, _event: Box<dyn DomainEvent>) -> Result<(), DomainError> {
        let mut count = self.event_count.write().await;
        *count += 1;
        Ok(())
    }
}

#[derive(Default)]
struct MockProfileRepository {
    profiles: tokio::sync::RwLock<Vec<UserProfile>>,
}

#[async_trait]
impl ProfileRepository for MockProfileRepository {
    async fn find_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<UserProfile>, DomainError> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.account_id() == account_id)
            .cloned())
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        profiles.retain(|p| p.account_id() != profile.account_id());
        profiles.push(profile.clone());
        Ok(())
    }
}

struct NoFrames;

#[async_trait]
impl FrameSource for NoFrames {
    async fn capture_frame(&self) -> Result<Option<Frame>, DomainError> {
        Ok(None)
    }
}

struct FixedClassifier {
    label: String,
}

#[async_trait]
impl PoseClassifier for FixedClassifier {
    async fn classify(&self, _frame: &Frame) -> Result<Classification, DomainError> {
        Ok(Classification {
            pose_class: self.label.clone(),
            confidence_score: 0.9,
        })
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn sample_history(owner: &str) -> DailyBuckets {
    DailyBuckets::from_remote_value(
        &AccountId::from_string(owner),
        &json!({
            "2024-01-01": { "a": { "score": 10 } },
            "2024-01-02": { "b": { "score": 5 }, "c": { "score": 7 } },
        }),
    )
}

fn tally(score: u32, waves: u32) -> RoundTally {
    RoundTally {
        score,
        waves_cleared: waves,
        time_spent_seconds: 42.0,
    }
}

// Session recorder

#[tokio::test]
async fn test_record_requires_signed_in_account() {
    let repo = Arc::new(MockHistoryRepository::default());
    let recorder = SessionRecorder::new(
        Arc::new(MockAccountService::signed_out()),
        repo.clone(),
        Arc::new(MockEventBus::default()),
    );

    let result = recorder.record(&tally(50, 2)).await;
    assert!(matches!(result, Err(DomainError::Unauthenticated(_))));
    assert!(repo.appended_sessions().await.is_empty());
}

#[tokio::test]
async fn test_record_appends_to_todays_bucket() {
    let repo = Arc::new(MockHistoryRepository::default());
    let bus = Arc::new(MockEventBus::default());
    let recorder = SessionRecorder::new(
        Arc::new(MockAccountService::signed_in("user-1")),
        repo.clone(),
        bus.clone(),
    );

    let key = recorder
        .record_on(&tally(50, 2), date("2024-01-02"))
        .await
        .expect("record succeeds");

    let appended = repo.appended_sessions().await;
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].key(), &key);
    assert_eq!(appended[0].score(), 50);
    assert_eq!(appended[0].waves_cleared(), 2);
    assert_eq!(appended[0].local_date(), date("2024-01-02"));
    assert_eq!(appended[0].owner_id().as_str(), "user-1");

    assert_eq!(bus.get_event_count().await, 1);
}

#[tokio::test]
async fn test_record_rejects_malformed_time() {
    let recorder = SessionRecorder::new(
        Arc::new(MockAccountService::signed_in("user-1")),
        Arc::new(MockHistoryRepository::default()),
        Arc::new(MockEventBus::default()),
    );

    let bad = RoundTally {
        score: 10,
        waves_cleared: 1,
        time_spent_seconds: -3.0,
    };
    assert!(matches!(
        recorder.record(&bad).await,
        Err(DomainError::Validation(_))
    ));
}

// Stats service

#[tokio::test]
async fn test_stats_for_two_day_history() {
    let local_state = Arc::new(MockLocalState::default());
    let bus = Arc::new(MockEventBus::default());
    let service = StatsService::new(
        Arc::new(MockHistoryRepository::with_history(sample_history("user-1"))),
        local_state.clone(),
        bus.clone(),
    );

    let stats = service
        .stats_at(&AccountId::from_string("user-1"), date("2024-01-02"))
        .await
        .expect("stats");

    assert_eq!(stats.total_score, 22);
    assert_eq!(stats.max_score, 10);
    assert_eq!(stats.streak_days, 2);
    assert_eq!(stats.last_play_date.as_deref(), Some("2024-01-02"));
    assert!(!stats.from_cache);

    // The recomputation replaced the cache and announced itself
    let cached = local_state.cached_streak().await.unwrap().unwrap();
    assert_eq!(cached.days, 2);
    assert_eq!(bus.get_event_count().await, 1);
}

#[tokio::test]
async fn test_stats_falls_back_to_cache_when_remote_unreachable() {
    let service = StatsService::new(
        Arc::new(MockHistoryRepository::failing()),
        Arc::new(MockLocalState::with_cached_streak(6)),
        Arc::new(MockEventBus::default()),
    );

    let stats = service
        .stats_at(&AccountId::from_string("user-1"), date("2024-01-02"))
        .await
        .expect("degrades instead of failing");

    assert!(stats.from_cache);
    assert_eq!(stats.streak_days, 6);
    assert_eq!(stats.total_score, 0);
    assert_eq!(stats.max_score, 0);
}

#[tokio::test]
async fn test_cached_streak_defaults_to_zero() {
    let service = StatsService::new(
        Arc::new(MockHistoryRepository::default()),
        Arc::new(MockLocalState::default()),
        Arc::new(MockEventBus::default()),
    );

    let streak = service.cached_streak().await.expect("cached streak");
    assert_eq!(streak.days, 0);
    assert!(streak.last_play_date.is_none());
}

#[tokio::test]
async fn test_daily_trend_fills_missing_days_with_zeros() {
    let service = StatsService::new(
        Arc::new(MockHistoryRepository::with_history(sample_history("user-1"))),
        Arc::new(MockLocalState::default()),
        Arc::new(MockEventBus::default()),
    );

    let trend = service
        .daily_trend_at(&AccountId::from_string("user-1"), 3, date("2024-01-02"))
        .await
        .expect("trend");

    assert_eq!(trend.len(), 3);
    assert_eq!(trend[0].date, "2023-12-31");
    assert_eq!(trend[0].points, 0);
    assert_eq!(trend[0].session_count, 0);
    assert_eq!(trend[1].date, "2024-01-01");
    assert_eq!(trend[1].points, 10);
    assert_eq!(trend[2].date, "2024-01-02");
    assert_eq!(trend[2].points, 12);
    assert_eq!(trend[2].session_count, 2);
}

// Ledger service

fn ledger_service(
    history: DailyBuckets,
    ledger_repo: Arc<MockLedgerRepository>,
    local_state: Arc<MockLocalState>,
    bus: Arc<MockEventBus>,
) -> LedgerService {
    LedgerService::new(
        Arc::new(MockHistoryRepository::with_history(history)),
        ledger_repo,
        local_state,
        bus,
    )
}

#[tokio::test]
async fn test_ledger_available_from_remote_spent() {
    let service = ledger_service(
        sample_history("user-1"),
        Arc::new(MockLedgerRepository::with_spent(5)),
        Arc::new(MockLocalState::default()),
        Arc::new(MockEventBus::default()),
    );

    let ledger = service
        .ledger(&AccountId::from_string("user-1"))
        .await
        .expect("ledger");

    assert_eq!(ledger.total, 22);
    assert_eq!(ledger.spent, 5);
    assert_eq!(ledger.available, 17);
}

#[tokio::test]
async fn test_ledger_available_clamps_when_overspent() {
    let service = ledger_service(
        sample_history("user-1"),
        Arc::new(MockLedgerRepository::with_spent(100)),
        Arc::new(MockLocalState::default()),
        Arc::new(MockEventBus::default()),
    );

    let ledger = service
        .ledger(&AccountId::from_string("user-1"))
        .await
        .expect("ledger");

    assert_eq!(ledger.total, 22);
    assert_eq!(ledger.spent, 100);
    assert_eq!(ledger.available, 0);
}

#[tokio::test]
async fn test_ledger_migrates_legacy_spent_once() {
    let ledger_repo = Arc::new(MockLedgerRepository::default());
    let local_state = Arc::new(MockLocalState::with_legacy_spent(8));
    let service = ledger_service(
        sample_history("user-1"),
        ledger_repo.clone(),
        local_state.clone(),
        Arc::new(MockEventBus::default()),
    );
    let owner = AccountId::from_string("user-1");

    let ledger = service.ledger(&owner).await.expect("ledger");
    assert_eq!(ledger.spent, 8);
    assert_eq!(ledger.available, 14);

    // Migrated into the remote counter, legacy value gone
    assert_eq!(ledger_repo.stored_spent().await, Some(8));
    assert!(local_state.legacy_spent_points().await.unwrap().is_none());

    // Second read comes straight from remote
    let ledger = service.ledger(&owner).await.expect("ledger");
    assert_eq!(ledger.spent, 8);
}

#[tokio::test]
async fn test_ledger_negative_legacy_value_clamped_before_persist() {
    let ledger_repo = Arc::new(MockLedgerRepository::default());
    let service = ledger_service(
        sample_history("user-1"),
        ledger_repo.clone(),
        Arc::new(MockLocalState::with_legacy_spent(-40)),
        Arc::new(MockEventBus::default()),
    );

    let ledger = service
        .ledger(&AccountId::from_string("user-1"))
        .await
        .expect("ledger");

    assert_eq!(ledger.spent, 0);
    assert_eq!(ledger_repo.stored_spent().await, Some(0));
}

#[tokio::test]
async fn test_redeem_updates_spent_and_publishes() {
    let ledger_repo = Arc::new(MockLedgerRepository::with_spent(2));
    let bus = Arc::new(MockEventBus::default());
    let service = ledger_service(
        sample_history("user-1"),
        ledger_repo.clone(),
        Arc::new(MockLocalState::default()),
        bus.clone(),
    );

    let ledger = service
        .redeem(&AccountId::from_string("user-1"), 10)
        .await
        .expect("redeem");

    assert_eq!(ledger.spent, 12);
    assert_eq!(ledger.available, 10);
    assert_eq!(ledger_repo.stored_spent().await, Some(12));
    assert_eq!(bus.get_event_count().await, 1);
}

#[tokio::test]
async fn test_redeem_more_than_available_rejected() {
    let ledger_repo = Arc::new(MockLedgerRepository::with_spent(20));
    let service = ledger_service(
        sample_history("user-1"),
        ledger_repo.clone(),
        Arc::new(MockLocalState::default()),
        Arc::new(MockEventBus::default()),
    );

    let result = service.redeem(&AccountId::from_string("user-1"), 5).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
    // Nothing persisted
    assert_eq!(ledger_repo.stored_spent().await, Some(20));
}

#[tokio::test]
async fn test_overwrite_spent_clamps_negative() {
    let ledger_repo = Arc::new(MockLedgerRepository::default());
    let service = ledger_service(
        DailyBuckets::new(),
        ledger_repo.clone(),
        Arc::new(MockLocalState::default()),
        Arc::new(MockEventBus::default()),
    );

    service
        .overwrite_spent(&AccountId::from_string("user-1"), -99)
        .await
        .expect("overwrite");

    assert_eq!(ledger_repo.stored_spent().await, Some(0));
}

// Profile service

#[tokio::test]
async fn test_get_or_create_uses_email_local_part() {
    let repo = Arc::new(MockProfileRepository::default());
    let service = ProfileService::new(repo.clone());
    let account = Account::new(
        AccountId::from_string("user-1"),
        "flexer@example.com".to_string(),
        true,
    )
    .unwrap();

    let profile = service.get_or_create(&account).await.expect("profile");
    assert_eq!(profile.username(), "flexer");

    // Second call returns the stored document unchanged
    service
        .rename(&account, "Wavemaster".to_string())
        .await
        .expect("rename");
    let profile = service.get_or_create(&account).await.expect("profile");
    assert_eq!(profile.username(), "Wavemaster");
}

// Round controller

fn controller_with(
    classifier_label: &str,
    tick: Duration,
    capture: Duration,
) -> (RoundController, Arc<MockHistoryRepository>) {
    let history = Arc::new(MockHistoryRepository::default());
    let recorder = Arc::new(SessionRecorder::new(
        Arc::new(MockAccountService::signed_in("user-1")),
        history.clone(),
        Arc::new(MockEventBus::default()),
    ));

    let controller = RoundController::with_intervals(
        RoundConfig::default(),
        Arc::new(FixedClassifier {
            label: classifier_label.to_string(),
        }),
        Arc::new(NoFrames),
        recorder,
        tick,
        capture,
    );

    (controller, history)
}

const NEVER: Duration = Duration::from_secs(86400);

/// Advance paused time tick by tick until the round reaches the wanted
/// phase.
async fn drive_to_phase(controller: &RoundController, tick: Duration, phase: &str) {
    for _ in 0..64 {
        if controller.snapshot().phase == phase {
            return;
        }
        tokio::time::sleep(tick).await;
    }
    panic!("round never reached phase {}", phase);
}

#[tokio::test(start_paused = true)]
async fn test_round_times_out_and_records_session() {
    let tick = Duration::from_millis(10);
    let (controller, history) = controller_with("tree", tick, NEVER);

    controller.start();
    drive_to_phase(&controller, tick, "gameplay").await;
    drive_to_phase(&controller, tick, "game_over").await;

    // The tick task hands the tally to the recorder before exiting
    for _ in 0..50 {
        if !history.appended_sessions().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let appended = history.appended_sessions().await;
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].score(), 0);
    assert_eq!(appended[0].waves_cleared(), 0);

    controller.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_stale_classification_after_reset_changes_nothing() {
    let tick = Duration::from_millis(10);
    let (controller, _history) = controller_with("tree", tick, NEVER);

    controller.start();
    drive_to_phase(&controller, tick, "gameplay").await;
    let stale_epoch = controller.epoch();
    let expected = controller.snapshot().expected_pose.expect("in gameplay");

    // Reset while the classification is notionally in flight, then bring
    // the new round back into gameplay so only the epoch fence can block it
    controller.reset();
    drive_to_phase(&controller, tick, "gameplay").await;
    assert_eq!(controller.snapshot().score, 0);

    controller.deliver_classification(
        stale_epoch,
        Classification {
            pose_class: expected.clone(),
            confidence_score: 0.9,
        },
    );
    assert_eq!(controller.snapshot().score, 0, "stale response must be dropped");

    // The same response under the live epoch scores normally
    let live = controller.snapshot().expected_pose.expect("in gameplay");
    controller.deliver_classification(
        controller.epoch(),
        Classification {
            pose_class: live,
            confidence_score: 0.9,
        },
    );
    assert_eq!(controller.snapshot().score, 10);

    controller.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_round_until_resume() {
    let tick = Duration::from_millis(10);
    let (controller, _history) = controller_with("tree", tick, NEVER);

    controller.start();
    drive_to_phase(&controller, tick, "gameplay").await;

    controller.pause();
    let frozen = controller.snapshot();
    for _ in 0..20 {
        tokio::time::sleep(tick).await;
    }
    let still = controller.snapshot();
    assert_eq!(still.phase, "gameplay");
    assert_eq!(still.pose_ticks_left, frozen.pose_ticks_left);

    controller.resume();
    drive_to_phase(&controller, tick, "game_over").await;

    controller.shutdown();
}
