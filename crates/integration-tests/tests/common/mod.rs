//! Shared wiring over a real SQLite database

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use coldline_api_rpc::Services;
use coldline_core::application::{
    ContactService, ImportRequest, ImportService, ImportSummary, LeadService, ListService,
    NavigationService, SessionSyncConfig, SessionSyncService, TemplateService,
};
use coldline_core::port::id_provider::SequentialIdProvider;
use coldline_core::port::time_provider::FixedTimeProvider;
use coldline_core::port::{Maintenance, MaintenanceConfig, TimeProvider};
use coldline_infra_sqlite::{
    create_pool, run_migrations, SqliteKeyValueStore, SqliteLeadRepository, SqliteMaintenance,
    SqliteSessionRepository,
};
use sqlx::SqlitePool;

/// 2024-03-05 12:00:00 UTC
pub const START: i64 = 1_709_640_000_000;
pub const HOUR_MS: i64 = 60 * 60 * 1000;

pub const SAMPLE_CSV: &str = "\
Full Name,Phone Number,Company,E-mail,Mobile
\"Lovelace, Ada\",(415) 555-0100,Analytical Engines,ada@example.com,
Grace Hopper,212-555-0199,\"Navy \"\"Labs\"\"\",grace@example.com,212 555 0123; 646-555-0100
Alan Turing,,Bletchley,alan@example.com,
,312.555.0142,Acme Corp,,
Katherine Johnson,+1 808 555 0111,NASA,,
";

pub struct Harness {
    pub pool: SqlitePool,
    pub time: Arc<FixedTimeProvider>,
    pub import: Arc<ImportService>,
    pub lists: Arc<ListService>,
    pub leads: Arc<LeadService>,
    pub navigation: Arc<NavigationService>,
    pub sync: Arc<SessionSyncService>,
    pub templates: Arc<TemplateService>,
    pub contact: Arc<ContactService>,
    pub maintenance: Arc<dyn Maintenance>,
}

impl Harness {
    pub async fn in_memory() -> Self {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();
        Self::wire(pool)
    }

    fn wire(pool: SqlitePool) -> Self {
        let time = Arc::new(FixedTimeProvider::new(START));
        let time_provider: Arc<dyn TimeProvider> = time.clone();

        let lead_repo = Arc::new(SqliteLeadRepository::new(pool.clone()));
        let kv_store = Arc::new(SqliteKeyValueStore::new(
            pool.clone(),
            time_provider.clone(),
        ));
        let session_repo = Arc::new(SqliteSessionRepository::new(pool.clone()));

        let templates = Arc::new(TemplateService::new(kv_store.clone()));
        let sync = Arc::new(SessionSyncService::new(
            kv_store,
            session_repo,
            time_provider.clone(),
            SessionSyncConfig::default(),
        ));

        Self {
            import: Arc::new(ImportService::new(
                lead_repo.clone(),
                Arc::new(SequentialIdProvider::new("id")),
                time_provider.clone(),
            )),
            lists: Arc::new(ListService::new(lead_repo.clone())),
            leads: Arc::new(LeadService::new(
                lead_repo.clone(),
                lead_repo.clone(),
                time_provider.clone(),
            )),
            navigation: Arc::new(NavigationService::new(
                lead_repo.clone(),
                lead_repo.clone(),
                sync.clone(),
                time_provider.clone(),
            )),
            sync,
            templates: templates.clone(),
            contact: Arc::new(ContactService::new(
                lead_repo.clone(),
                lead_repo,
                templates,
                time_provider.clone(),
            )),
            maintenance: Arc::new(SqliteMaintenance::new(pool.clone(), time_provider)),
            pool,
            time,
        }
    }

    pub fn services(&self) -> Services {
        Services {
            import: self.import.clone(),
            lists: self.lists.clone(),
            leads: self.leads.clone(),
            navigation: self.navigation.clone(),
            sync: self.sync.clone(),
            templates: self.templates.clone(),
            contact: self.contact.clone(),
            maintenance: self.maintenance.clone(),
            maintenance_config: MaintenanceConfig::default(),
            time_provider: self.time.clone(),
        }
    }

    pub async fn import_sample(&self, user_id: &str) -> ImportSummary {
        self.import
            .import(ImportRequest {
                user_id: user_id.to_string(),
                name: None,
                file_name: "prospects.csv".to_string(),
                content: SAMPLE_CSV.to_string(),
            })
            .await
            .unwrap()
    }
}

/// Fresh database file under the temp dir
pub fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("coldline-test-{}.db", uuid::Uuid::new_v4()))
}
