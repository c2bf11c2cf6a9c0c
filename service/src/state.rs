// review_service/src/state.rs
use crate::config::AppConfig;
use crate::services::{JsonPayloadBuilder, MockReviewProvider};
use crate::store::{PgCaseStore, PgOrderGateway};
use review_gate::memory::{InMemoryCaseStore, InMemoryOrderGateway, StaticReviewConfig, StaticStoreResolver};
use review_gate::{CaseStore, Collaborators, EventDispatcher, OrderGateway, SubmissionOrchestrator};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
  Postgres,
  Memory,
}

impl StorageKind {
  pub fn as_str(self) -> &'static str {
    match self {
      StorageKind::Postgres => "postgres",
      StorageKind::Memory => "memory",
    }
  }
}

#[derive(Clone)]
pub struct AppState {
  pub dispatcher: Arc<EventDispatcher>,
  pub cases: Arc<dyn CaseStore>,
  pub config: Arc<AppConfig>,
  pub storage: StorageKind,
}

impl AppState {
  pub fn with_postgres(config: Arc<AppConfig>, pool: PgPool) -> Self {
    Self::assemble(
      config,
      Arc::new(PgOrderGateway::new(pool.clone())),
      Arc::new(PgCaseStore::new(pool)),
      StorageKind::Postgres,
    )
  }

  pub fn in_memory(config: Arc<AppConfig>) -> Self {
    Self::assemble(
      config,
      Arc::new(InMemoryOrderGateway::new()),
      Arc::new(InMemoryCaseStore::new()),
      StorageKind::Memory,
    )
  }

  fn assemble(
    config: Arc<AppConfig>,
    orders: Arc<dyn OrderGateway>,
    cases: Arc<dyn CaseStore>,
    storage: StorageKind,
  ) -> Self {
    let deps = Collaborators {
      orders,
      stores: Arc::new(StaticStoreResolver::default()),
      config: Arc::new(StaticReviewConfig::from_settings(
        &config.review,
        config.enabled_stores.clone(),
      )),
      cases: cases.clone(),
      payloads: Arc::new(JsonPayloadBuilder),
      submitter: Arc::new(MockReviewProvider::new(
        config.mock_provider_latency,
        config.mock_provider_fail_total_cents,
      )),
    };
    let orchestrator = Arc::new(SubmissionOrchestrator::new(&config.review, deps));

    Self {
      dispatcher: Arc::new(EventDispatcher::with_default_routes(orchestrator)),
      cases,
      config,
      storage,
    }
  }
}
