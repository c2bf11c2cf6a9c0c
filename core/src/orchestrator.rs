// review_gate/src/orchestrator.rs

//! Drives one order event through eligibility, case creation, provider
//! submission and the hold decision.
//!
//! The sequence is a `Pipeline<SubmissionCtx, ReviewError>`:
//!
//! | step                  | stops when                          | on failure            |
//! |-----------------------|-------------------------------------|-----------------------|
//! | `check_eligibility`   | the order is not a review candidate | n/a                   |
//! | `check_existing_case` | a case already exists               | run fails             |
//! | `build_payload`       |                                     | run fails             |
//! | `create_case`         | another delivery claimed the order  | run fails             |
//! | `submit_case`         |                                     | logged, case stays new|
//! | `apply_hold`          |                                     | logged                |
//! | `record_submission`   | skipped without a provider code     | logged                |
//!
//! `handle` is the error boundary: whatever happens, the caller (the order
//! processing flow) gets a `SubmissionOutcome` and never an error.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::config::ReviewSettings;
use crate::core::{ContextData, StepControl, StepDef};
use crate::eligibility::{Eligibility, EligibilityGate, IneligibleReason};
use crate::error::{ReviewError, ReviewResult};
use crate::hold::{HoldOutcome, HoldPolicy};
use crate::ledger::{CaseClaim, CaseLedger};
use crate::model::{Case, EventContext, Order};
use crate::pipeline::Pipeline;
use crate::ports::{CasePayload, CaseStore, CaseSubmitter, OrderGateway, PayloadBuilder, ReviewConfig, StoreResolver};

/// Step names of the submission pipeline, in execution order.
pub mod steps {
  pub const CHECK_ELIGIBILITY: &str = "check_eligibility";
  pub const CHECK_EXISTING_CASE: &str = "check_existing_case";
  pub const BUILD_PAYLOAD: &str = "build_payload";
  pub const CREATE_CASE: &str = "create_case";
  pub const SUBMIT_CASE: &str = "submit_case";
  pub const APPLY_HOLD: &str = "apply_hold";
  pub const RECORD_SUBMISSION: &str = "record_submission";

  pub const ALL: [&str; 7] = [
    CHECK_ELIGIBILITY,
    CHECK_EXISTING_CASE,
    BUILD_PAYLOAD,
    CREATE_CASE,
    SUBMIT_CASE,
    APPLY_HOLD,
    RECORD_SUBMISSION,
  ];
}

/// Everything the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
  pub orders: Arc<dyn OrderGateway>,
  pub stores: Arc<dyn StoreResolver>,
  pub config: Arc<dyn ReviewConfig>,
  pub cases: Arc<dyn CaseStore>,
  pub payloads: Arc<dyn PayloadBuilder>,
  pub submitter: Arc<dyn CaseSubmitter>,
}

/// State of one submission run, shared by the pipeline steps.
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
  pub event: EventContext,
  pub order: Option<Order>,
  pub ineligible: Option<IneligibleReason>,
  pub already_tracked: bool,
  pub payload: Option<CasePayload>,
  pub case: Option<Case>,
  pub case_code: Option<String>,
  pub submit_error: Option<String>,
  pub hold: Option<HoldOutcome>,
}

impl SubmissionCtx {
  pub fn new(order: Option<Order>, event: EventContext) -> Self {
    Self {
      event,
      order,
      ineligible: None,
      already_tracked: false,
      payload: None,
      case: None,
      case_code: None,
      submit_error: None,
      hold: None,
    }
  }

  fn outcome(&self) -> SubmissionOutcome {
    if let Some(reason) = &self.ineligible {
      return SubmissionOutcome::Ineligible(reason.clone());
    }
    if self.already_tracked {
      return SubmissionOutcome::AlreadyTracked;
    }
    match &self.case {
      Some(case) => SubmissionOutcome::Submitted {
        case: case.clone(),
        hold: self.hold.clone(),
        submit_error: self.submit_error.clone(),
      },
      None => SubmissionOutcome::Failed {
        reason: "submission pipeline finished without a case".to_string(),
      },
    }
  }
}

/// What handling one event amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
  Ineligible(IneligibleReason),
  /// A case exists already (earlier delivery or a concurrent one).
  AlreadyTracked,
  /// A case was created by this delivery. Without a provider code the case is
  /// left `new` for a later reconciliation pass.
  Submitted {
    case: Case,
    hold: Option<HoldOutcome>,
    submit_error: Option<String>,
  },
  /// The event kind has no route.
  Unrouted,
  /// An unexpected fault; logged and swallowed.
  Failed { reason: String },
}

impl SubmissionOutcome {
  pub fn label(&self) -> &'static str {
    match self {
      SubmissionOutcome::Ineligible(_) => "ineligible",
      SubmissionOutcome::AlreadyTracked => "already_tracked",
      SubmissionOutcome::Submitted { .. } => "submitted",
      SubmissionOutcome::Unrouted => "unrouted",
      SubmissionOutcome::Failed { .. } => "failed",
    }
  }

  pub fn case(&self) -> Option<&Case> {
    match self {
      SubmissionOutcome::Submitted { case, .. } => Some(case),
      _ => None,
    }
  }
}

pub struct SubmissionOrchestrator {
  pipeline: Pipeline<SubmissionCtx, ReviewError>,
  ledger: Arc<CaseLedger>,
  hold_policy: Arc<HoldPolicy>,
}

impl SubmissionOrchestrator {
  pub fn new(settings: &ReviewSettings, deps: Collaborators) -> Self {
    let gate = Arc::new(EligibilityGate::new(
      settings.methods.clone(),
      deps.config.clone(),
      deps.stores.clone(),
      deps.orders.clone(),
    ));
    let ledger = Arc::new(CaseLedger::new(deps.cases.clone(), deps.config.clone()));
    let hold_policy = Arc::new(HoldPolicy::new(
      settings.methods.clone(),
      ledger.clone(),
      deps.orders.clone(),
    ));

    let pipeline = build_pipeline(gate, ledger.clone(), hold_policy.clone(), deps.payloads, deps.submitter);

    Self {
      pipeline,
      ledger,
      hold_policy,
    }
  }

  pub fn ledger(&self) -> &Arc<CaseLedger> {
    &self.ledger
  }

  pub fn hold_policy(&self) -> &Arc<HoldPolicy> {
    &self.hold_policy
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.pipeline.step_names()
  }

  /// Handles one order event. Never fails: unexpected faults are logged and
  /// reported as `SubmissionOutcome::Failed`.
  #[instrument(
    name = "SubmissionOrchestrator::handle",
    skip_all,
    fields(
      order_id = order.as_ref().map_or("", |o| o.id.as_str()),
      event_kind = %event.kind,
    )
  )]
  pub async fn handle(&self, order: Option<Order>, event: EventContext) -> SubmissionOutcome {
    let ctx = ContextData::new(SubmissionCtx::new(order, event));

    match self.pipeline.run(ctx.clone()).await {
      Ok(_) => {
        let outcome = ctx.with(SubmissionCtx::outcome);
        debug!(outcome = outcome.label(), "Order event handled.");
        outcome
      }
      Err(e) => {
        error!(error = %e, details = ?e, "Fraud review submission failed; order processing is not affected.");
        SubmissionOutcome::Failed { reason: e.to_string() }
      }
    }
  }
}

fn current_order(ctx: &ContextData<SubmissionCtx>) -> ReviewResult<Order> {
  ctx
    .with(|c| c.order.clone())
    .ok_or_else(|| ReviewError::Internal("order missing after eligibility check".to_string()))
}

fn build_pipeline(
  gate: Arc<EligibilityGate>,
  ledger: Arc<CaseLedger>,
  hold_policy: Arc<HoldPolicy>,
  payloads: Arc<dyn PayloadBuilder>,
  submitter: Arc<dyn CaseSubmitter>,
) -> Pipeline<SubmissionCtx, ReviewError> {
  let mut p = Pipeline::<SubmissionCtx, ReviewError>::from_steps(vec![
    StepDef::new(steps::CHECK_ELIGIBILITY),
    StepDef::new(steps::CHECK_EXISTING_CASE),
    StepDef::new(steps::BUILD_PAYLOAD),
    StepDef::new(steps::CREATE_CASE),
    StepDef::new(steps::SUBMIT_CASE),
    StepDef::new(steps::APPLY_HOLD),
    StepDef::new(steps::RECORD_SUBMISSION).skip_if(|ctx: ContextData<SubmissionCtx>| ctx.read().case_code.is_none()),
  ]);

  p.on_root(steps::CHECK_ELIGIBILITY, move |ctx: ContextData<SubmissionCtx>| {
    let gate = gate.clone();
    async move {
      let (mut order, event) = ctx.with(|c| (c.order.clone(), c.event.clone()));
      let verdict = gate.evaluate(order.as_mut(), &event).await;
      // Keep the backfilled attributes for the remaining steps.
      ctx.update(|c| c.order = order);

      match verdict {
        Eligibility::Eligible => Ok::<_, ReviewError>(StepControl::Continue),
        Eligibility::Ineligible(reason) => {
          debug!(reason = %reason, "Order is not eligible for review.");
          ctx.update(|c| c.ineligible = Some(reason));
          Ok(StepControl::Stop)
        }
      }
    }
  });

  let exists_ledger = ledger.clone();
  p.on_root(steps::CHECK_EXISTING_CASE, move |ctx: ContextData<SubmissionCtx>| {
    let ledger = exists_ledger.clone();
    async move {
      let order = current_order(&ctx)?;
      if ledger.exists(&order).await? {
        debug!("Case already exists for order.");
        ctx.update(|c| c.already_tracked = true);
        return Ok(StepControl::Stop);
      }
      Ok::<_, ReviewError>(StepControl::Continue)
    }
  });

  p.on_root(steps::BUILD_PAYLOAD, move |ctx: ContextData<SubmissionCtx>| {
    let payloads = payloads.clone();
    async move {
      let order = current_order(&ctx)?;
      let payload = payloads.build(&order).map_err(|source| ReviewError::Payload {
        order_id: order.id.clone(),
        source,
      })?;
      ctx.update(|c| c.payload = Some(payload));
      Ok::<_, ReviewError>(StepControl::Continue)
    }
  });

  let create_ledger = ledger.clone();
  p.on_root(steps::CREATE_CASE, move |ctx: ContextData<SubmissionCtx>| {
    let ledger = create_ledger.clone();
    async move {
      let order = current_order(&ctx)?;
      match ledger.create(&order).await? {
        CaseClaim::Created(case) => {
          ctx.update(|c| c.case = Some(case));
          Ok::<_, ReviewError>(StepControl::Continue)
        }
        CaseClaim::AlreadyTracked => {
          ctx.update(|c| c.already_tracked = true);
          Ok(StepControl::Stop)
        }
      }
    }
  });

  p.on_root(steps::SUBMIT_CASE, move |ctx: ContextData<SubmissionCtx>| {
    let submitter = submitter.clone();
    async move {
      let order = current_order(&ctx)?;
      let payload = ctx
        .with(|c| c.payload.clone())
        .ok_or_else(|| ReviewError::Internal("payload missing before submission".to_string()))?;

      match submitter.submit(&order, &payload).await {
        Ok(code) => {
          let code = code.filter(|c| !c.trim().is_empty());
          info!(case_code = code.as_deref().unwrap_or(""), "Case posted to review provider.");
          ctx.update(|c| c.case_code = code);
        }
        Err(source) => {
          let err = ReviewError::Provider {
            order_id: order.id.clone(),
            source,
          };
          warn!(error = %err, "Provider submission failed; case left for reconciliation.");
          ctx.update(|c| c.submit_error = Some(err.to_string()));
        }
      }
      Ok::<_, ReviewError>(StepControl::Continue)
    }
  });

  p.on_root(steps::APPLY_HOLD, move |ctx: ContextData<SubmissionCtx>| {
    let hold_policy = hold_policy.clone();
    async move {
      let mut order = current_order(&ctx)?;
      match hold_policy.apply(&mut order).await {
        Ok(outcome) => {
          ctx.update(|c| {
            c.order = Some(order);
            c.hold = Some(outcome);
          });
        }
        Err(e) => warn!(error = %e, "Hold policy failed; order left as is."),
      }
      Ok::<_, ReviewError>(StepControl::Continue)
    }
  });

  p.on_root(steps::RECORD_SUBMISSION, move |ctx: ContextData<SubmissionCtx>| {
    let ledger = ledger.clone();
    async move {
      let (case, code) = ctx.with(|c| (c.case.clone(), c.case_code.clone()));
      let (Some(mut case), Some(code)) = (case, code) else {
        return Ok::<_, ReviewError>(StepControl::Continue);
      };

      match ledger.record_submission(&mut case, &code).await {
        Ok(()) => ctx.update(|c| c.case = Some(case)),
        Err(e) => error!(error = %e, "Could not save case after submission; hold decision stands."),
      }
      Ok(StepControl::Continue)
    }
  });

  p
}
