// review_gate/examples/submit_order.rs

use async_trait::async_trait;
use review_gate::memory::{InMemoryCaseStore, InMemoryOrderGateway, StaticReviewConfig, StaticStoreResolver};
use review_gate::{
  CasePayload, CaseSubmitter, Collaborators, EventDispatcher, EventKind, Order, OrderEvent, PayloadBuilder,
  RequestArea, RequestInfo, ReviewSettings, SubmissionOrchestrator,
};
use std::sync::Arc;
use tracing::info;

// 1. A provider client. Real deployments post the payload over HTTP.
struct PrintingSubmitter;

#[async_trait]
impl CaseSubmitter for PrintingSubmitter {
  async fn submit(&self, order: &Order, payload: &CasePayload) -> anyhow::Result<Option<String>> {
    info!(order_id = %order.id, payload = %payload.0, "Posting case.");
    Ok(Some(format!("DEMO-{}", order.id)))
  }
}

// 2. A payload builder.
struct TotalsPayload;

impl PayloadBuilder for TotalsPayload {
  fn build(&self, order: &Order) -> anyhow::Result<CasePayload> {
    Ok(CasePayload(serde_json::json!({
      "order_id": order.id,
      "amount": order.grand_total_cents,
      "currency": order.currency,
    })))
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

  info!("--- Submit Order Example ---");

  // 3. Wire the orchestrator against in-memory collaborators.
  let settings = ReviewSettings::default();
  let cases = Arc::new(InMemoryCaseStore::new());
  let orders = Arc::new(InMemoryOrderGateway::new());
  let orchestrator = SubmissionOrchestrator::new(
    &settings,
    Collaborators {
      orders: orders.clone(),
      stores: Arc::new(StaticStoreResolver::default()),
      config: Arc::new(StaticReviewConfig::default()),
      cases: cases.clone(),
      payloads: Arc::new(TotalsPayload),
      submitter: Arc::new(PrintingSubmitter),
    },
  );
  let dispatcher = EventDispatcher::with_default_routes(Arc::new(orchestrator));

  // 4. Deliver the same checkout event twice, then an offline-payment order.
  let mut card = Order::new("100000042", "default", "braintree");
  card.grand_total_cents = 8_999;
  let request = RequestInfo {
    area: RequestArea::Storefront,
    forwarded_for: Some("203.0.113.7".to_string()),
  };

  for attempt in 1..=2 {
    let event = OrderEvent::new(EventKind::OrderPlaced, card.clone()).with_request(request.clone());
    let outcome = dispatcher.dispatch(event).await;
    info!(attempt, outcome = outcome.label(), "Delivered order_placed.");
  }

  let cash = Order::new("100000043", "default", "cashondelivery");
  let outcome = dispatcher.dispatch(OrderEvent::new(EventKind::OrderPlaced, cash)).await;
  info!(outcome = ?outcome, "Delivered offline-payment order.");

  // 5. Inspect what was stored.
  if let Some(case) = cases.get("100000042") {
    info!(status = %case.status, code = ?case.code, "Stored case.");
  }
  if let Some(order) = orders.get("100000042") {
    info!(state = %order.state, ip = ?order.x_forwarded_for, "Stored order.");
  }
  info!(cases = cases.len(), "Done.");
}
