// review_gate/src/ledger.rs

//! Idempotent bookkeeping of review cases: one case per order, ever.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, instrument};

use crate::error::{ReviewError, ReviewResult};
use crate::model::{Case, Order};
use crate::ports::{CaseStore, InsertOutcome, ReviewConfig};

/// Result of trying to open a case for an order.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseClaim {
  /// This delivery created the case and owns the submission.
  Created(Case),
  /// Another delivery got there first.
  AlreadyTracked,
}

pub struct CaseLedger {
  store: Arc<dyn CaseStore>,
  config: Arc<dyn ReviewConfig>,
}

impl CaseLedger {
  pub fn new(store: Arc<dyn CaseStore>, config: Arc<dyn ReviewConfig>) -> Self {
    Self { store, config }
  }

  /// Asks the durable store, never a cache, so restarts cannot cause a resubmission.
  pub async fn exists(&self, order: &Order) -> ReviewResult<bool> {
    self.store.exists(&order.id).await.map_err(|source| ReviewError::CaseStore {
      order_id: order.id.clone(),
      source,
    })
  }

  /// Persists a `new` case for the order before anything is sent to the provider.
  ///
  /// A uniqueness conflict means a concurrent delivery already claimed the order
  /// and is reported as `AlreadyTracked`.
  #[instrument(skip_all, fields(order_id = %order.id))]
  pub async fn create(&self, order: &Order) -> ReviewResult<CaseClaim> {
    let (positive, negative) = self.config.case_actions(order);
    let case = Case::new(order.id.clone(), positive, negative);

    let outcome = self.store.insert_new(&case).await.map_err(|source| ReviewError::CaseStore {
      order_id: order.id.clone(),
      source,
    })?;

    match outcome {
      InsertOutcome::Inserted => {
        debug!(positive_action = %positive, negative_action = %negative, "Case created.");
        Ok(CaseClaim::Created(case))
      }
      InsertOutcome::Conflict => {
        debug!("Case already claimed by another delivery.");
        Ok(CaseClaim::AlreadyTracked)
      }
    }
  }

  pub async fn fetch(&self, order: &Order) -> ReviewResult<Option<Case>> {
    self.store.find(&order.id).await.map_err(|source| ReviewError::CaseStore {
      order_id: order.id.clone(),
      source,
    })
  }

  /// Stores the provider code, moves the case to in-review and stamps it.
  ///
  /// Works on a fresh read of the stored case so a status or guarantee written
  /// elsewhere while the provider call was in flight is kept. On success `case`
  /// is replaced by the saved case.
  #[instrument(skip_all, fields(order_id = %case.order_id))]
  pub async fn record_submission(&self, case: &mut Case, code: &str) -> ReviewResult<()> {
    let store_err = |source: anyhow::Error| ReviewError::CaseStore {
      order_id: case.order_id.clone(),
      source,
    };

    let mut fresh = self
      .store
      .find(&case.order_id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| store_err(anyhow!("case disappeared before the submission was recorded")))?;

    fresh.mark_submitted(code, Utc::now())?;

    if !self.store.record_submission(&fresh).await.map_err(store_err)? {
      return Err(store_err(anyhow!("case left status 'new' before the submission was recorded")));
    }
    debug!(case_code = code, "Case saved.");
    *case = fresh;
    Ok(())
  }
}
