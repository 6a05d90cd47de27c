use std::sync::Arc;

use anyhow::Context;
use log::info;

use posewave_domain::account::AccountService;
use posewave_domain::events::EventBus;
use posewave_domain::ledger::LedgerRepository;
use posewave_domain::local_state::LocalStateRepository;
use posewave_domain::profile::ProfileRepository;
use posewave_domain::round::PoseClassifier;
use posewave_domain::session::SessionHistoryRepository;

use posewave_infrastructure::camera::{ExclusiveCamera, NullCamera};
use posewave_infrastructure::config::ServiceConfig;
use posewave_infrastructure::events::LoggingEventBus;
use posewave_infrastructure::http::{DataServiceClient, HttpPoseClassifier};
use posewave_infrastructure::logging;
use posewave_infrastructure::persistence::{Database, SqliteLocalStateRepository};
use posewave_infrastructure::remote::{
    RemoteLedgerRepository, RemoteProfileRepository, RemoteSessionHistoryRepository,
};

use crate::application::services::{LedgerService, ProfileService, SessionRecorder, StatsService};

/// Everything the host shell needs, wired once at startup.
pub struct AppContext {
    pub config: ServiceConfig,
    pub accounts: Arc<dyn AccountService>,
    pub history_repo: Arc<dyn SessionHistoryRepository>,
    pub ledger_repo: Arc<dyn LedgerRepository>,
    pub local_state: Arc<dyn LocalStateRepository>,
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub classifier: Arc<dyn PoseClassifier>,
    pub camera: Arc<ExclusiveCamera>,
    pub event_bus: Arc<dyn EventBus>,
    pub recorder: Arc<SessionRecorder>,
    pub stats: Arc<StatsService>,
    pub ledger: Arc<LedgerService>,
    pub profiles: Arc<ProfileService>,
}

pub async fn bootstrap() -> anyhow::Result<AppContext> {
    let config = ServiceConfig::from_env();

    logging::init_logger(config.log_dir.clone()).context("Failed to initialize logging")?;

    let db = Database::new(&config.local_db_path.to_string_lossy())
        .await
        .context("Failed to open local cache database")?;
    db.init_schema()
        .await
        .context("Failed to initialize local cache schema")?;

    let local_state: Arc<dyn LocalStateRepository> = Arc::new(SqliteLocalStateRepository::new(
        Arc::new(db.pool().clone()),
    ));

    let client = DataServiceClient::new(config.data_service_url.clone())
        .context("Failed to create data service client")?;
    let accounts: Arc<dyn AccountService> = Arc::new(client.clone());
    let history_repo: Arc<dyn SessionHistoryRepository> =
        Arc::new(RemoteSessionHistoryRepository::new(client.clone()));
    let ledger_repo: Arc<dyn LedgerRepository> =
        Arc::new(RemoteLedgerRepository::new(client.clone()));
    let profile_repo: Arc<dyn ProfileRepository> =
        Arc::new(RemoteProfileRepository::new(client.clone()));

    let classifier: Arc<dyn PoseClassifier> = Arc::new(
        HttpPoseClassifier::new(config.classifier_url.clone())
            .context("Failed to create classifier client")?,
    );
    let camera = Arc::new(ExclusiveCamera::new(Arc::new(NullCamera)));

    let event_bus: Arc<dyn EventBus> = Arc::new(LoggingEventBus::new());

    let recorder = Arc::new(SessionRecorder::new(
        accounts.clone(),
        history_repo.clone(),
        event_bus.clone(),
    ));
    let stats = Arc::new(StatsService::new(
        history_repo.clone(),
        local_state.clone(),
        event_bus.clone(),
    ));
    let ledger = Arc::new(LedgerService::new(
        history_repo.clone(),
        ledger_repo.clone(),
        local_state.clone(),
        event_bus.clone(),
    ));
    let profiles = Arc::new(ProfileService::new(profile_repo.clone()));

    info!(
        "PoseWave core ready (data service: {}, classifier: {})",
        config.data_service_url, config.classifier_url
    );

    Ok(AppContext {
        config,
        accounts,
        history_repo,
        ledger_repo,
        local_state,
        profile_repo,
        classifier,
        camera,
        event_bus,
        recorder,
        stats,
        ledger,
        profiles,
    })
}
