// review_gate/src/memory.rs

//! In-process implementations of the collaborator traits.
//!
//! Used by the service when no database is configured, and by tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::ReviewSettings;
use crate::model::{Case, CaseAction, CaseStatus, Order, OrderAttributes, OrderState, RequestArea};
use crate::ports::{CaseStore, InsertOutcome, OrderGateway, ReviewConfig, StoreResolver};

/// Case store backed by a map. `insert_new` checks and inserts under one lock.
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
  cases: Mutex<HashMap<String, Case>>,
}

impl InMemoryCaseStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.cases.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.cases.lock().is_empty()
  }

  pub fn get(&self, order_id: &str) -> Option<Case> {
    self.cases.lock().get(order_id).cloned()
  }

  /// Overwrites a case directly, bypassing the insert-once rule. Test setup only.
  pub fn put(&self, case: Case) {
    self.cases.lock().insert(case.order_id.clone(), case);
  }
}

#[async_trait]
impl CaseStore for InMemoryCaseStore {
  async fn exists(&self, order_id: &str) -> anyhow::Result<bool> {
    Ok(self.cases.lock().contains_key(order_id))
  }

  async fn insert_new(&self, case: &Case) -> anyhow::Result<InsertOutcome> {
    let mut cases = self.cases.lock();
    if cases.contains_key(&case.order_id) {
      return Ok(InsertOutcome::Conflict);
    }
    cases.insert(case.order_id.clone(), case.clone());
    Ok(InsertOutcome::Inserted)
  }

  async fn find(&self, order_id: &str) -> anyhow::Result<Option<Case>> {
    Ok(self.cases.lock().get(order_id).cloned())
  }

  async fn record_submission(&self, case: &Case) -> anyhow::Result<bool> {
    let mut cases = self.cases.lock();
    let Some(existing) = cases.get_mut(&case.order_id) else {
      anyhow::bail!("no case stored for order '{}'", case.order_id);
    };
    if existing.status != CaseStatus::New {
      return Ok(false);
    }
    existing.code = case.code.clone();
    existing.status = case.status;
    existing.updated_at = case.updated_at;
    Ok(true)
  }
}

/// Order gateway that keeps a persisted copy of every order it saw.
///
/// The first write of an order stores the snapshot. Later writes only fill
/// unset attributes or move the state to held.
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
  orders: Mutex<HashMap<String, Order>>,
  attribute_saves: Mutex<HashMap<String, usize>>,
}

impl InMemoryOrderGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, order_id: &str) -> Option<Order> {
    self.orders.lock().get(order_id).cloned()
  }

  pub fn attribute_saves(&self, order_id: &str) -> usize {
    self.attribute_saves.lock().get(order_id).copied().unwrap_or(0)
  }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
  async fn stored_attributes(&self, order_id: &str) -> anyhow::Result<OrderAttributes> {
    Ok(self.orders.lock().get(order_id).map(Order::attributes).unwrap_or_default())
  }

  async fn save_attributes(&self, order: &Order) -> anyhow::Result<()> {
    {
      let mut orders = self.orders.lock();
      let stored = orders.entry(order.id.clone()).or_insert_with(|| order.clone());
      let mut attributes = stored.attributes();
      attributes.fill_from(&order.attributes());
      stored.origin_store_code = attributes.origin_store_code;
      stored.x_forwarded_for = attributes.x_forwarded_for;
    }
    *self.attribute_saves.lock().entry(order.id.clone()).or_default() += 1;
    Ok(())
  }

  async fn hold(&self, order: &Order) -> anyhow::Result<()> {
    self
      .orders
      .lock()
      .entry(order.id.clone())
      .or_insert_with(|| order.clone())
      .state = OrderState::Held;
    Ok(())
  }
}

/// Review configuration from static settings.
///
/// `enabled_stores` of `None` enables review for every store.
#[derive(Debug, Clone)]
pub struct StaticReviewConfig {
  pub enabled_stores: Option<BTreeSet<String>>,
  pub positive_action: CaseAction,
  pub negative_action: CaseAction,
}

impl StaticReviewConfig {
  pub fn from_settings(settings: &ReviewSettings, enabled_stores: Option<BTreeSet<String>>) -> Self {
    Self {
      enabled_stores,
      positive_action: settings.positive_action,
      negative_action: settings.negative_action,
    }
  }
}

impl Default for StaticReviewConfig {
  fn default() -> Self {
    Self::from_settings(&ReviewSettings::default(), None)
  }
}

impl ReviewConfig for StaticReviewConfig {
  fn is_enabled(&self, order: &Order) -> bool {
    self
      .enabled_stores
      .as_ref()
      .map_or(true, |stores| stores.contains(&order.store_code))
  }

  fn case_actions(&self, _order: &Order) -> (CaseAction, CaseAction) {
    (self.positive_action, self.negative_action)
  }
}

/// Admin requests resolve to `admin_code`; storefront requests to the order's own store.
#[derive(Debug, Clone)]
pub struct StaticStoreResolver {
  pub admin_code: String,
}

impl Default for StaticStoreResolver {
  fn default() -> Self {
    Self {
      admin_code: "admin".to_string(),
    }
  }
}

impl StoreResolver for StaticStoreResolver {
  fn origin_store_code(&self, area: RequestArea, order: &Order) -> Option<String> {
    match area {
      RequestArea::Admin => Some(self.admin_code.clone()),
      RequestArea::Storefront => Some(order.store_code.clone()),
    }
  }
}
