// review_service/src/services/provider_mock.rs
use async_trait::async_trait;
use review_gate::{CasePayload, CaseSubmitter, Order};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Stand-in for the fraud review provider's case endpoint.
#[derive(Debug, Clone)]
pub struct MockReviewProvider {
  pub latency: Duration,
  /// Submissions for orders with exactly this grand total fail.
  pub fail_total_cents: Option<i64>,
}

impl MockReviewProvider {
  pub fn new(latency: Duration, fail_total_cents: Option<i64>) -> Self {
    Self {
      latency,
      fail_total_cents,
    }
  }
}

#[async_trait]
impl CaseSubmitter for MockReviewProvider {
  #[instrument(name = "MockReviewProvider::submit", skip_all, fields(order_id = %order.id))]
  async fn submit(&self, order: &Order, payload: &CasePayload) -> anyhow::Result<Option<String>> {
    info!(payload_bytes = payload.0.to_string().len(), "Simulating case submission.");
    tokio::time::sleep(self.latency).await; // Simulate network latency

    if self.fail_total_cents == Some(order.grand_total_cents) {
      info!("Mock provider rejected the case.");
      anyhow::bail!("mock provider rejected case for order '{}' (test trigger)", order.id);
    }

    let code = format!("mock_case_{}", Uuid::new_v4().simple());
    info!(case_code = %code, "Mock provider opened case.");
    Ok(Some(code))
  }
}
