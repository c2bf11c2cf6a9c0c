// review_service/src/models/event_dto.rs

use chrono::{DateTime, Utc};
use review_gate::{Case, CaseAction, CaseStatus, EventKind, Guarantee, HoldOutcome, SubmissionOutcome};
use serde::Serialize;

/// Body of the `202 Accepted` answer to an order event.
#[derive(Debug, Clone, Serialize)]
pub struct EventAccepted {
  pub event_kind: EventKind,
  pub order_id: Option<String>,
  /// `ineligible`, `already_tracked`, `submitted`, `unrouted` or `failed`.
  pub outcome: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub case: Option<CaseView>,
  /// `held`, or the code of the reason the hold was skipped.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hold: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub submit_error: Option<String>,
}

impl EventAccepted {
  pub fn new(event_kind: EventKind, order_id: Option<String>, outcome: &SubmissionOutcome) -> Self {
    let mut accepted = Self {
      event_kind,
      order_id,
      outcome: outcome.label(),
      reason: None,
      case: None,
      hold: None,
      submit_error: None,
    };
    match outcome {
      SubmissionOutcome::Ineligible(reason) => accepted.reason = Some(reason.to_string()),
      SubmissionOutcome::Failed { reason } => accepted.reason = Some(reason.clone()),
      SubmissionOutcome::Submitted {
        case,
        hold,
        submit_error,
      } => {
        accepted.case = Some(CaseView::from(case));
        accepted.hold = hold.as_ref().map(|h| match h {
          HoldOutcome::Held => "held".to_string(),
          HoldOutcome::Skipped(reason) => reason.code().to_string(),
        });
        accepted.submit_error = submit_error.clone();
      }
      SubmissionOutcome::AlreadyTracked | SubmissionOutcome::Unrouted => {}
    }
    accepted
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
  pub order_id: String,
  pub code: Option<String>,
  pub status: CaseStatus,
  pub positive_action: CaseAction,
  pub negative_action: CaseAction,
  pub guarantee: Option<Guarantee>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl From<&Case> for CaseView {
  fn from(case: &Case) -> Self {
    Self {
      order_id: case.order_id.clone(),
      code: case.code.clone(),
      status: case.status,
      positive_action: case.positive_action,
      negative_action: case.negative_action,
      guarantee: case.guarantee,
      created_at: case.created_at,
      updated_at: case.updated_at,
    }
  }
}
