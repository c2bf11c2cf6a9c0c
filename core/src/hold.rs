// review_gate/src/hold.rs

//! Decides whether an order goes on hold while its review case is open.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::MethodSets;
use crate::error::{ReviewError, ReviewResult};
use crate::ledger::CaseLedger;
use crate::model::{HoldFlag, Order, OrderState};
use crate::ports::OrderGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotHoldableReason {
  State(OrderState),
  HoldFlagDisallowed,
  Unknown,
}

impl fmt::Display for NotHoldableReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NotHoldableReason::State(state) => write!(f, "order is on {} state", state),
      NotHoldableReason::HoldFlagDisallowed => f.write_str("order action flag is set to do not hold"),
      NotHoldableReason::Unknown => f.write_str("unknown reason"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  CaseMissing,
  NoActionRequired,
  NotHoldable(NotHoldableReason),
  AwaitingConfirmationEmail,
  Guaranteed,
}

impl SkipReason {
  pub fn code(&self) -> &'static str {
    match self {
      SkipReason::CaseMissing => "case-missing",
      SkipReason::NoActionRequired => "no-action-required",
      SkipReason::NotHoldable(_) => "not-holdable",
      SkipReason::AwaitingConfirmationEmail => "awaiting-confirmation-email",
      SkipReason::Guaranteed => "guaranteed",
    }
  }
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SkipReason::NotHoldable(reason) => write!(f, "{}: {}", self.code(), reason),
      _ => f.write_str(self.code()),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldOutcome {
  Held,
  Skipped(SkipReason),
}

impl HoldOutcome {
  pub fn is_held(&self) -> bool {
    matches!(self, HoldOutcome::Held)
  }
}

pub struct HoldPolicy {
  methods: MethodSets,
  ledger: Arc<CaseLedger>,
  orders: Arc<dyn OrderGateway>,
}

impl HoldPolicy {
  pub fn new(methods: MethodSets, ledger: Arc<CaseLedger>, orders: Arc<dyn OrderGateway>) -> Self {
    Self { methods, ledger, orders }
  }

  /// Evaluates the hold decision for `order` against its current case and, when
  /// warranted, holds it. Performs at most one mutation.
  ///
  /// On `Held`, `order.state` reflects the persisted held state. Evaluating again
  /// afterwards is a no-op because a held order cannot be held.
  #[instrument(skip_all, fields(order_id = %order.id))]
  pub async fn apply(&self, order: &mut Order) -> ReviewResult<HoldOutcome> {
    let Some(case) = self.ledger.fetch(order).await? else {
      return Ok(skipped(order, SkipReason::CaseMissing));
    };

    if case.requires_no_action() {
      return Ok(skipped(order, SkipReason::NoActionRequired));
    }

    if !self.orders.can_hold(order) {
      return Ok(skipped(order, SkipReason::NotHoldable(not_holdable_reason(order))));
    }

    let guaranteed = case.has_guarantee();

    if self.methods.is_special(&order.payment_method) {
      if !order.email_sent {
        return Ok(skipped(order, SkipReason::AwaitingConfirmationEmail));
      }
      if guaranteed {
        return Ok(skipped(order, SkipReason::Guaranteed));
      }
    }

    if guaranteed {
      return Ok(skipped(order, SkipReason::Guaranteed));
    }

    debug!("Placing order on hold.");
    self.orders.hold(order).await.map_err(|source| ReviewError::OrderGateway {
      order_id: order.id.clone(),
      source,
    })?;
    order.state = OrderState::Held;
    Ok(HoldOutcome::Held)
  }
}

fn not_holdable_reason(order: &Order) -> NotHoldableReason {
  if !order.state.is_holdable() {
    NotHoldableReason::State(order.state.clone())
  } else if order.hold_flag == HoldFlag::Disallowed {
    NotHoldableReason::HoldFlagDisallowed
  } else {
    NotHoldableReason::Unknown
  }
}

fn skipped(order: &Order, reason: SkipReason) -> HoldOutcome {
  debug!(order_id = %order.id, reason = %reason, "Order can not be held.");
  HoldOutcome::Skipped(reason)
}
