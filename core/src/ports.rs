// review_gate/src/ports.rs

//! Collaborator traits the review pipeline is wired against.
//!
//! The platform (orders, stores, configuration), the review provider and the
//! case storage all live behind these seams. Implementations report failures as
//! `anyhow::Error`; the pipeline attaches the order identifier and decides
//! whether the failure stops anything.

use async_trait::async_trait;
use serde::Serialize;

use crate::model::{Case, CaseAction, Order, OrderAttributes, RequestArea};

/// Read/write access to platform orders.
#[async_trait]
pub trait OrderGateway: Send + Sync {
  /// The write-once attributes currently persisted for the order. Unknown
  /// orders have none.
  async fn stored_attributes(&self, order_id: &str) -> anyhow::Result<OrderAttributes>;

  /// Persists the backfilled attributes (`origin_store_code`, `x_forwarded_for`).
  ///
  /// Only attributes still unset in storage are written. The stored state and
  /// every other field are left alone.
  async fn save_attributes(&self, order: &Order) -> anyhow::Result<()>;

  /// Moves the stored order to the held state. Nothing else is written.
  async fn hold(&self, order: &Order) -> anyhow::Result<()>;

  /// Platform policy for "may this order be held right now".
  ///
  /// Must report `false` for an order that is already held.
  fn can_hold(&self, order: &Order) -> bool {
    order.can_hold()
  }
}

/// Resolves the code of the store a request was made against.
pub trait StoreResolver: Send + Sync {
  fn origin_store_code(&self, area: RequestArea, order: &Order) -> Option<String>;
}

/// Per-store review settings owned by the platform configuration.
pub trait ReviewConfig: Send + Sync {
  fn is_enabled(&self, order: &Order) -> bool;

  /// Directives stored on a new case for positive and negative decisions.
  fn case_actions(&self, order: &Order) -> (CaseAction, CaseAction);
}

/// Payload sent to the review provider. Opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CasePayload(pub serde_json::Value);

/// Builds the provider payload (amounts, items, customer, payment) from an order.
pub trait PayloadBuilder: Send + Sync {
  fn build(&self, order: &Order) -> anyhow::Result<CasePayload>;
}

/// Client of the third-party review provider.
///
/// Timeouts belong to the implementation.
#[async_trait]
pub trait CaseSubmitter: Send + Sync {
  /// Returns the provider case code, or `None` when the provider accepted the
  /// payload without assigning one.
  async fn submit(&self, order: &Order, payload: &CasePayload) -> anyhow::Result<Option<String>>;
}

/// Result of an insert into the case store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
  Inserted,
  /// A case for this order already exists; nothing was written.
  Conflict,
}

/// Durable case storage keyed by order identifier.
///
/// `insert_new` is the serialization point for concurrent deliveries: it must
/// be atomic and report `Conflict` instead of writing a second row.
#[async_trait]
pub trait CaseStore: Send + Sync {
  async fn exists(&self, order_id: &str) -> anyhow::Result<bool>;
  async fn insert_new(&self, case: &Case) -> anyhow::Result<InsertOutcome>;
  async fn find(&self, order_id: &str) -> anyhow::Result<Option<Case>>;

  /// Writes `code`, `status` and `updated_at` of `case`, but only while the
  /// stored case is still `new`. Returns `false` when nothing was written.
  async fn record_submission(&self, case: &Case) -> anyhow::Result<bool>;
}
