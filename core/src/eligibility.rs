// review_gate/src/eligibility.rs

//! Decides whether an order is a candidate for fraud review.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::MethodSets;
use crate::model::order::is_blank;
use crate::model::{EventContext, Order, OrderState};
use crate::ports::{OrderGateway, ReviewConfig, StoreResolver};

/// Why an order was not sent for review. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IneligibleReason {
  MissingOrder,
  InvalidSnapshot,
  ReviewDisabled,
  /// No payment attached yet; a later event will resubmit.
  PendingPayment,
  RestrictedMethod(String),
  /// The method is reviewed from its dedicated payment-confirmed event instead.
  AwaitsOwnEvent(String),
}

impl fmt::Display for IneligibleReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IneligibleReason::MissingOrder => f.write_str("no order attached to the event"),
      IneligibleReason::InvalidSnapshot => f.write_str("order snapshot is missing its id or payment method"),
      IneligibleReason::ReviewDisabled => f.write_str("fraud review is disabled for the store"),
      IneligibleReason::PendingPayment => f.write_str("order is pending payment"),
      IneligibleReason::RestrictedMethod(m) => write!(f, "payment method '{}' is never reviewed", m),
      IneligibleReason::AwaitsOwnEvent(m) => write!(f, "payment method '{}' is reviewed on its own event", m),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
  Eligible,
  Ineligible(IneligibleReason),
}

impl Eligibility {
  pub fn is_eligible(&self) -> bool {
    matches!(self, Eligibility::Eligible)
  }
}

pub struct EligibilityGate {
  methods: MethodSets,
  config: Arc<dyn ReviewConfig>,
  stores: Arc<dyn StoreResolver>,
  orders: Arc<dyn OrderGateway>,
}

impl EligibilityGate {
  pub fn new(
    methods: MethodSets,
    config: Arc<dyn ReviewConfig>,
    stores: Arc<dyn StoreResolver>,
    orders: Arc<dyn OrderGateway>,
  ) -> Self {
    Self {
      methods,
      config,
      stores,
      orders,
    }
  }

  pub async fn is_eligible(&self, order: Option<&mut Order>, ctx: &EventContext) -> bool {
    self.evaluate(order, ctx).await.is_eligible()
  }

  /// Applies the eligibility rules in order and stops at the first rejection.
  ///
  /// Once the store is known to have review enabled, missing origin store code
  /// and forwarded IP are backfilled onto `order` and saved. Attributes already
  /// persisted for the order are copied onto the snapshot and never replaced.
  /// A failed read or save is logged and ignored.
  pub async fn evaluate(&self, order: Option<&mut Order>, ctx: &EventContext) -> Eligibility {
    let Some(order) = order else {
      return Eligibility::Ineligible(IneligibleReason::MissingOrder);
    };
    if !order.is_valid_snapshot() {
      return Eligibility::Ineligible(IneligibleReason::InvalidSnapshot);
    }
    if !self.config.is_enabled(order) {
      return Eligibility::Ineligible(IneligibleReason::ReviewDisabled);
    }

    self.backfill_attributes(order, ctx).await;

    if order.state == OrderState::PendingPayment {
      return Eligibility::Ineligible(IneligibleReason::PendingPayment);
    }

    let method = order.payment_method.as_str();
    debug!(order_id = %order.id, payment_method = method, "Checking payment method.");

    if self.methods.is_restricted(method) {
      return Eligibility::Ineligible(IneligibleReason::RestrictedMethod(method.to_string()));
    }
    if ctx.check_own_events && self.methods.uses_own_events(method) {
      return Eligibility::Ineligible(IneligibleReason::AwaitsOwnEvent(method.to_string()));
    }

    Eligibility::Eligible
  }

  async fn backfill_attributes(&self, order: &mut Order, ctx: &EventContext) {
    let stored = match self.orders.stored_attributes(&order.id).await {
      Ok(stored) => stored,
      Err(e) => {
        warn!(order_id = %order.id, error = %e, "Could not read stored order attributes; backfill skipped.");
        return;
      }
    };

    // Persisted values win over the event snapshot, which may predate them.
    let mut attributes = stored;
    attributes.fill_from(&order.attributes());

    // Cron and CLI triggers carry no request; they resolve like a storefront request.
    let request = ctx.request.clone().unwrap_or_default();
    let mut changed = false;

    if is_blank(&attributes.origin_store_code) {
      if let Some(code) = self.stores.origin_store_code(request.area, order).filter(|c| !c.trim().is_empty()) {
        attributes.origin_store_code = Some(code);
        changed = true;
      }
    }

    // The platform drops the forwarded IP between quote and order.
    if is_blank(&attributes.x_forwarded_for) {
      if let Some(ip) = request.forwarded_for.filter(|ip| !ip.trim().is_empty()) {
        attributes.x_forwarded_for = Some(ip);
        changed = true;
      }
    }

    order.origin_store_code = attributes.origin_store_code;
    order.x_forwarded_for = attributes.x_forwarded_for;

    if changed {
      if let Err(e) = self.orders.save_attributes(order).await {
        warn!(order_id = %order.id, error = %e, "Could not persist backfilled order attributes.");
      }
    }
  }
}
