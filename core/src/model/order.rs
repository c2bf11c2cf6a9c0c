// review_gate/src/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform lifecycle state of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
  New,
  PendingPayment,
  Processing,
  Canceled,
  PaymentReview,
  Complete,
  Closed,
  #[serde(alias = "holded")]
  Held,
  /// A state this crate does not know about. Treated as holdable.
  #[serde(untagged)]
  Other(String),
}

impl OrderState {
  /// States in which the platform refuses to put an order on hold.
  pub const NOT_HOLDABLE: [OrderState; 5] = [
    OrderState::Canceled,
    OrderState::PaymentReview,
    OrderState::Complete,
    OrderState::Closed,
    OrderState::Held,
  ];

  pub fn is_holdable(&self) -> bool {
    !Self::NOT_HOLDABLE.contains(self)
  }

  pub fn as_str(&self) -> &str {
    match self {
      OrderState::New => "new",
      OrderState::PendingPayment => "pending_payment",
      OrderState::Processing => "processing",
      OrderState::Canceled => "canceled",
      OrderState::PaymentReview => "payment_review",
      OrderState::Complete => "complete",
      OrderState::Closed => "closed",
      OrderState::Held => "held",
      OrderState::Other(s) => s.as_str(),
    }
  }
}

impl fmt::Display for OrderState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The platform's "hold" action flag. Unset means the platform has no opinion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldFlag {
  #[default]
  Unset,
  Allowed,
  Disallowed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
  pub sku: String,
  pub name: String,
  pub quantity: u32,
  pub unit_price_cents: i64,
}

/// The write-once attributes of an order as last persisted by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAttributes {
  pub origin_store_code: Option<String>,
  pub x_forwarded_for: Option<String>,
}

impl OrderAttributes {
  /// Fills each unset attribute from `other`. Set values are kept.
  pub fn fill_from(&mut self, other: &OrderAttributes) {
    fill_blank(&mut self.origin_store_code, &other.origin_store_code);
    fill_blank(&mut self.x_forwarded_for, &other.x_forwarded_for);
  }
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
  value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn fill_blank(slot: &mut Option<String>, candidate: &Option<String>) {
  if is_blank(slot) && !is_blank(candidate) {
    *slot = candidate.clone();
  }
}

/// Snapshot of a platform order as seen by the review pipeline.
///
/// `origin_store_code` and `x_forwarded_for` are the only fields this crate
/// writes besides the state (when holding), and each is written at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  /// Customer-facing order number; the case store keys on it.
  pub id: String,
  pub store_code: String,
  pub state: OrderState,
  pub payment_method: String,
  #[serde(default)]
  pub email_sent: bool,
  #[serde(default)]
  pub hold_flag: HoldFlag,
  #[serde(default)]
  pub origin_store_code: Option<String>,
  #[serde(default)]
  pub x_forwarded_for: Option<String>,
  pub grand_total_cents: i64,
  pub currency: String,
  #[serde(default)]
  pub customer_email: Option<String>,
  #[serde(default)]
  pub lines: Vec<OrderLine>,
  pub created_at: DateTime<Utc>,
}

impl Order {
  pub fn new(id: impl Into<String>, store_code: impl Into<String>, payment_method: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      store_code: store_code.into(),
      state: OrderState::Processing,
      payment_method: payment_method.into(),
      email_sent: false,
      hold_flag: HoldFlag::Unset,
      origin_store_code: None,
      x_forwarded_for: None,
      grand_total_cents: 0,
      currency: "USD".to_string(),
      customer_email: None,
      lines: Vec::new(),
      created_at: Utc::now(),
    }
  }

  pub fn with_state(mut self, state: OrderState) -> Self {
    self.state = state;
    self
  }

  pub fn attributes(&self) -> OrderAttributes {
    OrderAttributes {
      origin_store_code: self.origin_store_code.clone(),
      x_forwarded_for: self.x_forwarded_for.clone(),
    }
  }

  /// A snapshot is usable only with an identifier and a payment method.
  pub fn is_valid_snapshot(&self) -> bool {
    !self.id.trim().is_empty() && !self.payment_method.trim().is_empty()
  }

  /// Platform rule for whether a hold may be placed right now.
  pub fn can_hold(&self) -> bool {
    self.state.is_holdable() && self.hold_flag != HoldFlag::Disallowed
  }
}
