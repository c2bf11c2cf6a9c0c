// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use review_gate::memory::{InMemoryCaseStore, InMemoryOrderGateway, StaticReviewConfig, StaticStoreResolver};
use review_gate::{
  Case, CasePayload, CaseStore, CaseSubmitter, Collaborators, InsertOutcome, Order, OrderAttributes, OrderGateway,
  OrderState, PayloadBuilder, ReviewSettings, SubmissionOrchestrator,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Orders ---
pub fn order(id: &str, method: &str) -> Order {
  let mut order = Order::new(id, "default", method);
  order.grand_total_cents = 12_500;
  order.customer_email = Some(format!("{}@example.com", id.to_lowercase()));
  order
}

pub fn order_in_state(id: &str, method: &str, state: OrderState) -> Order {
  order(id, method).with_state(state)
}

// --- Provider ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
  Code,
  NoCode,
  Fail,
}

/// Counts submissions and answers according to `mode`.
pub struct RecordingSubmitter {
  pub calls: AtomicUsize,
  pub mode: SubmitMode,
  pub delay: Duration,
}

impl RecordingSubmitter {
  pub fn new(mode: SubmitMode) -> Self {
    Self {
      calls: AtomicUsize::new(0),
      mode,
      delay: Duration::ZERO,
    }
  }

  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl CaseSubmitter for RecordingSubmitter {
  async fn submit(&self, order: &Order, _payload: &CasePayload) -> anyhow::Result<Option<String>> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    match self.mode {
      SubmitMode::Code => Ok(Some(format!("CASE-{}", order.id))),
      SubmitMode::NoCode => Ok(None),
      SubmitMode::Fail => anyhow::bail!("provider unavailable"),
    }
  }
}

// --- Payloads ---
pub struct JsonPayloads;

impl PayloadBuilder for JsonPayloads {
  fn build(&self, order: &Order) -> anyhow::Result<CasePayload> {
    Ok(CasePayload(serde_json::json!({
      "order_id": order.id,
      "total_cents": order.grand_total_cents,
      "payment_method": order.payment_method,
    })))
  }
}

pub struct BrokenPayloads;

impl PayloadBuilder for BrokenPayloads {
  fn build(&self, _order: &Order) -> anyhow::Result<CasePayload> {
    anyhow::bail!("order has no billing address")
  }
}

// --- Failing collaborators ---
/// Order gateway whose writes always fail.
#[derive(Default)]
pub struct FailingOrderGateway {
  pub attempts: AtomicUsize,
}

#[async_trait]
impl OrderGateway for FailingOrderGateway {
  async fn stored_attributes(&self, _order_id: &str) -> anyhow::Result<OrderAttributes> {
    Ok(OrderAttributes::default())
  }

  async fn save_attributes(&self, _order: &Order) -> anyhow::Result<()> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    anyhow::bail!("orders table is locked")
  }

  async fn hold(&self, _order: &Order) -> anyhow::Result<()> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    anyhow::bail!("orders table is locked")
  }
}

/// Case store that inserts normally but cannot record a submission.
#[derive(Default)]
pub struct UpdateFailingStore {
  pub inner: InMemoryCaseStore,
}

#[async_trait]
impl CaseStore for UpdateFailingStore {
  async fn exists(&self, order_id: &str) -> anyhow::Result<bool> {
    self.inner.exists(order_id).await
  }

  async fn insert_new(&self, case: &Case) -> anyhow::Result<InsertOutcome> {
    self.inner.insert_new(case).await
  }

  async fn find(&self, order_id: &str) -> anyhow::Result<Option<Case>> {
    self.inner.find(order_id).await
  }

  async fn record_submission(&self, _case: &Case) -> anyhow::Result<bool> {
    anyhow::bail!("connection reset during update")
  }
}

// --- Harness ---
/// An orchestrator wired to in-memory collaborators, with handles kept for assertions.
pub struct Harness {
  pub cases: Arc<InMemoryCaseStore>,
  pub orders: Arc<InMemoryOrderGateway>,
  pub submitter: Arc<RecordingSubmitter>,
  pub orchestrator: Arc<SubmissionOrchestrator>,
}

impl Harness {
  pub fn new() -> Self {
    Self::with_submitter(RecordingSubmitter::new(SubmitMode::Code))
  }

  pub fn with_submitter(submitter: RecordingSubmitter) -> Self {
    Self::build(submitter, None, Arc::new(JsonPayloads))
  }

  pub fn with_enabled_stores(stores: &[&str]) -> Self {
    let enabled: BTreeSet<String> = stores.iter().map(|s| s.to_string()).collect();
    Self::build(RecordingSubmitter::new(SubmitMode::Code), Some(enabled), Arc::new(JsonPayloads))
  }

  pub fn with_payloads(payloads: Arc<dyn PayloadBuilder>) -> Self {
    Self::build(RecordingSubmitter::new(SubmitMode::Code), None, payloads)
  }

  fn build(
    submitter: RecordingSubmitter,
    enabled_stores: Option<BTreeSet<String>>,
    payloads: Arc<dyn PayloadBuilder>,
  ) -> Self {
    let settings = ReviewSettings::default();
    let cases = Arc::new(InMemoryCaseStore::new());
    let orders = Arc::new(InMemoryOrderGateway::new());
    let submitter = Arc::new(submitter);
    let deps = Collaborators {
      orders: orders.clone(),
      stores: Arc::new(StaticStoreResolver::default()),
      config: Arc::new(StaticReviewConfig::from_settings(&settings, enabled_stores)),
      cases: cases.clone(),
      payloads,
      submitter: submitter.clone(),
    };
    let orchestrator = Arc::new(SubmissionOrchestrator::new(&settings, deps));
    Self {
      cases,
      orders,
      submitter,
      orchestrator,
    }
  }
}
