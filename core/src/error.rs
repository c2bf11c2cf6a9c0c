// review_gate/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::model::case::CaseStatus;

#[derive(Debug, Error)]
pub enum ReviewError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Order collaborator failed for order '{order_id}'. Source: {source}")]
  OrderGateway {
    order_id: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Case store failed for order '{order_id}'. Source: {source}")]
  CaseStore {
    order_id: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Review provider submission failed for order '{order_id}'. Source: {source}")]
  Provider {
    order_id: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Could not build review payload for order '{order_id}'. Source: {source}")]
  Payload {
    order_id: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Case for order '{order_id}' cannot move from {from} to {to}")]
  StatusRegression {
    order_id: String,
    from: CaseStatus,
    to: CaseStatus,
  },

  #[error("Error in a step handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error: {0}")]
  Configuration(String),

  #[error("Internal review-gate error: {0}")]
  Internal(String),
}

impl ReviewError {
  /// Order this error relates to, when there is one.
  pub fn order_id(&self) -> Option<&str> {
    match self {
      ReviewError::OrderGateway { order_id, .. }
      | ReviewError::CaseStore { order_id, .. }
      | ReviewError::Provider { order_id, .. }
      | ReviewError::Payload { order_id, .. }
      | ReviewError::StatusRegression { order_id, .. } => Some(order_id.as_str()),
      _ => None,
    }
  }
}

impl From<AnyhowError> for ReviewError {
  fn from(err: AnyhowError) -> Self {
    // A ReviewError that went through anyhow keeps its identity as the source.
    ReviewError::HandlerError { source: err }
  }
}

pub type ReviewResult<T, E = ReviewError> = std::result::Result<T, E>;
