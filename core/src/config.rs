// review_gate/src/config.rs

//! Payment-method rule sets and review defaults passed to the gate and the hold policy.

use std::collections::BTreeSet;

use crate::error::{ReviewError, ReviewResult};
use crate::model::CaseAction;

/// Named payment-method sets driving eligibility and hold decisions.
///
/// Defaults:
/// - `restricted`: offline/cash methods that are never reviewed
///   (`checkmo`, `banktransfer`, `purchaseorder`, `cashondelivery`).
/// - `own_events`: methods whose review waits for the dedicated payment-confirmed
///   event (`authorizenet_directpost`).
/// - `special`: hosted gateways that must send the confirmation email before the
///   order can be held (`payflow_express`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSets {
  pub restricted: BTreeSet<String>,
  pub own_events: BTreeSet<String>,
  pub special: BTreeSet<String>,
}

impl MethodSets {
  pub const DEFAULT_RESTRICTED: [&'static str; 4] = ["checkmo", "banktransfer", "purchaseorder", "cashondelivery"];
  pub const DEFAULT_OWN_EVENTS: [&'static str; 1] = ["authorizenet_directpost"];
  pub const DEFAULT_SPECIAL: [&'static str; 1] = ["payflow_express"];

  pub fn is_restricted(&self, method: &str) -> bool {
    self.restricted.contains(method)
  }

  pub fn uses_own_events(&self, method: &str) -> bool {
    self.own_events.contains(method)
  }

  pub fn is_special(&self, method: &str) -> bool {
    self.special.contains(method)
  }

  /// Parses a comma separated method list, ignoring blanks.
  pub fn parse_list(raw: &str) -> BTreeSet<String> {
    raw
      .split(',')
      .map(str::trim)
      .filter(|m| !m.is_empty())
      .map(str::to_string)
      .collect()
  }

  /// A method may not be both restricted and handled by its own event; the
  /// own-events path would never be reached.
  pub fn validate(&self) -> ReviewResult<()> {
    if let Some(method) = self.restricted.intersection(&self.own_events).next() {
      return Err(ReviewError::Configuration(format!(
        "payment method '{}' is both restricted and own-events",
        method
      )));
    }
    Ok(())
  }
}

impl Default for MethodSets {
  fn default() -> Self {
    let to_set = |methods: &[&str]| methods.iter().map(|m| m.to_string()).collect();
    Self {
      restricted: to_set(&Self::DEFAULT_RESTRICTED),
      own_events: to_set(&Self::DEFAULT_OWN_EVENTS),
      special: to_set(&Self::DEFAULT_SPECIAL),
    }
  }
}

/// Settings for a review-gate deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSettings {
  pub methods: MethodSets,
  /// Directive stored on new cases for an approving decision.
  pub positive_action: CaseAction,
  /// Directive stored on new cases for a declining decision.
  pub negative_action: CaseAction,
}

impl Default for ReviewSettings {
  fn default() -> Self {
    Self {
      methods: MethodSets::default(),
      positive_action: CaseAction::Unhold,
      negative_action: CaseAction::Hold,
    }
  }
}
