// review_gate/src/model/event.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use super::order::Order;

/// Which platform event triggered the delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  /// Generic "order placed" event fired by checkout.
  OrderPlaced,
  /// Generic "order saved" event, e.g. an admin edit or a payment capture.
  OrderSaved,
  /// Dedicated event fired once an asynchronous gateway has confirmed payment.
  PaymentConfirmed,
}

impl EventKind {
  pub fn as_str(self) -> &'static str {
    match self {
      EventKind::OrderPlaced => "order_placed",
      EventKind::OrderSaved => "order_saved",
      EventKind::PaymentConfirmed => "payment_confirmed",
    }
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which side of the platform the triggering request came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestArea {
  Admin,
  #[default]
  Storefront,
}

/// Metadata of the request that caused the event. Absent for cron and CLI triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
  #[serde(default)]
  pub area: RequestArea,
  #[serde(default)]
  pub forwarded_for: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
  pub kind: EventKind,
  pub request: Option<RequestInfo>,
  /// When false the own-events rule is not applied; set by the dedicated event path.
  pub check_own_events: bool,
}

impl EventContext {
  pub fn new(kind: EventKind) -> Self {
    Self {
      kind,
      request: None,
      check_own_events: true,
    }
  }

  pub fn with_request(mut self, request: RequestInfo) -> Self {
    self.request = Some(request);
    self
  }

  pub fn skip_own_events_check(mut self) -> Self {
    self.check_own_events = false;
    self
  }
}

/// A typed order lifecycle event as received from the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
  pub kind: EventKind,
  /// The platform may fire events without an order attached.
  #[serde(default)]
  pub order: Option<Order>,
  #[serde(default)]
  pub request: Option<RequestInfo>,
}

impl OrderEvent {
  pub fn new(kind: EventKind, order: Order) -> Self {
    Self {
      kind,
      order: Some(order),
      request: None,
    }
  }

  pub fn with_request(mut self, request: RequestInfo) -> Self {
    self.request = Some(request);
    self
  }

  pub fn order_id(&self) -> Option<&str> {
    self.order.as_ref().map(|o| o.id.as_str())
  }
}
