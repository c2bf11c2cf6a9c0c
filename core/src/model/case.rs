// review_gate/src/model/case.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReviewError;

/// Local bookkeeping status of a review case.
///
/// Moves forward only: `New -> InReview -> Resolved | Closed`. `Error` is
/// terminal as well. Going back is reserved for an external reconciliation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
  New,
  InReview,
  Resolved,
  Closed,
  Error,
}

impl CaseStatus {
  pub fn is_terminal(self) -> bool {
    matches!(self, CaseStatus::Resolved | CaseStatus::Closed | CaseStatus::Error)
  }

  fn rank(self) -> u8 {
    match self {
      CaseStatus::New => 0,
      CaseStatus::InReview => 1,
      CaseStatus::Resolved | CaseStatus::Closed | CaseStatus::Error => 2,
    }
  }

  /// Whether moving from `self` to `next` keeps the status moving forward.
  pub fn can_advance_to(self, next: CaseStatus) -> bool {
    if self.is_terminal() {
      return self == next;
    }
    next.rank() >= self.rank()
  }

  pub fn as_str(self) -> &'static str {
    match self {
      CaseStatus::New => "new",
      CaseStatus::InReview => "in_review",
      CaseStatus::Resolved => "resolved",
      CaseStatus::Closed => "closed",
      CaseStatus::Error => "error",
    }
  }
}

impl fmt::Display for CaseStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CaseStatus {
  type Err = ReviewError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "new" => Ok(CaseStatus::New),
      "in_review" => Ok(CaseStatus::InReview),
      "resolved" => Ok(CaseStatus::Resolved),
      "closed" => Ok(CaseStatus::Closed),
      "error" => Ok(CaseStatus::Error),
      other => Err(ReviewError::Configuration(format!("unknown case status '{}'", other))),
    }
  }
}

/// What to do with the order once the provider decides, for a positive or a negative decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseAction {
  Hold,
  Unhold,
  Cancel,
  Nothing,
}

impl CaseAction {
  pub fn as_str(self) -> &'static str {
    match self {
      CaseAction::Hold => "hold",
      CaseAction::Unhold => "unhold",
      CaseAction::Cancel => "cancel",
      CaseAction::Nothing => "nothing",
    }
  }
}

impl fmt::Display for CaseAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for CaseAction {
  type Err = ReviewError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "hold" => Ok(CaseAction::Hold),
      "unhold" => Ok(CaseAction::Unhold),
      "cancel" => Ok(CaseAction::Cancel),
      "nothing" => Ok(CaseAction::Nothing),
      other => Err(ReviewError::Configuration(format!("unknown case action '{}'", other))),
    }
  }
}

/// Provider guarantee disposition. Its presence means the provider has already ruled on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guarantee {
  Approved,
  Declined,
}

impl Guarantee {
  pub fn as_str(self) -> &'static str {
    match self {
      Guarantee::Approved => "approved",
      Guarantee::Declined => "declined",
    }
  }
}

impl FromStr for Guarantee {
  type Err = ReviewError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "approved" => Ok(Guarantee::Approved),
      "declined" => Ok(Guarantee::Declined),
      other => Err(ReviewError::Configuration(format!("unknown guarantee disposition '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
  pub order_id: String,
  /// Provider case code; `None` until a submission succeeds.
  pub code: Option<String>,
  pub status: CaseStatus,
  pub positive_action: CaseAction,
  pub negative_action: CaseAction,
  pub guarantee: Option<Guarantee>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Case {
  pub fn new(order_id: impl Into<String>, positive_action: CaseAction, negative_action: CaseAction) -> Self {
    let now = Utc::now();
    Self {
      order_id: order_id.into(),
      code: None,
      status: CaseStatus::New,
      positive_action,
      negative_action,
      guarantee: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn has_guarantee(&self) -> bool {
    self.guarantee.is_some()
  }

  /// True when neither decision would change the order.
  pub fn requires_no_action(&self) -> bool {
    self.positive_action == CaseAction::Nothing && self.negative_action == CaseAction::Nothing
  }

  pub fn advance(&mut self, next: CaseStatus, at: DateTime<Utc>) -> Result<(), ReviewError> {
    if !self.status.can_advance_to(next) {
      return Err(ReviewError::StatusRegression {
        order_id: self.order_id.clone(),
        from: self.status,
        to: next,
      });
    }
    self.status = next;
    self.updated_at = at;
    Ok(())
  }

  /// Records a successful provider submission.
  pub fn mark_submitted(&mut self, code: impl Into<String>, at: DateTime<Utc>) -> Result<(), ReviewError> {
    self.advance(CaseStatus::InReview, at)?;
    self.code = Some(code.into());
    Ok(())
  }
}
