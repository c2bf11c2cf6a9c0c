// src/lib.rs

//! review-gate: submits e-commerce orders for third-party fraud review exactly
//! once and decides whether to hold them while the review is open.
//!
//! For every order lifecycle event it:
//!  - Filters out orders that are not review candidates (disabled store, pending
//!    payment, offline payment methods, gateways reviewed on their own event).
//!  - Opens at most one local case per order, even under duplicate or concurrent delivery.
//!  - Posts the case to the review provider and records the returned case code.
//!  - Holds the order unless its state, payment method or a provider guarantee says otherwise.
//!
//! Failures never propagate to the order-processing flow; they degrade to "no
//! case created" or "no hold applied" and are logged through `tracing`.

pub mod config;
pub mod core;
pub mod eligibility;
pub mod error;
pub mod hold;
pub mod ledger;
pub mod memory;
pub mod model;
pub mod orchestrator;
pub mod pipeline;
pub mod ports;
pub mod registry;

// --- Re-exports for the Public API ---

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{RunOutcome, StepControl};
pub use crate::core::step::StepDef;

pub use crate::pipeline::definition::Pipeline;

pub use crate::config::{MethodSets, ReviewSettings};
pub use crate::eligibility::{Eligibility, EligibilityGate, IneligibleReason};
pub use crate::error::{ReviewError, ReviewResult};
pub use crate::hold::{HoldOutcome, HoldPolicy, NotHoldableReason, SkipReason};
pub use crate::ledger::{CaseClaim, CaseLedger};
pub use crate::model::{
  Case, CaseAction, CaseStatus, EventContext, EventKind, Guarantee, HoldFlag, Order, OrderAttributes, OrderEvent,
  OrderLine, OrderState, RequestArea, RequestInfo,
};
pub use crate::orchestrator::{Collaborators, SubmissionCtx, SubmissionOrchestrator, SubmissionOutcome};
pub use crate::ports::{
  CasePayload, CaseStore, CaseSubmitter, InsertOutcome, OrderGateway, PayloadBuilder, ReviewConfig, StoreResolver,
};
pub use crate::registry::{EventDispatcher, Route};

/*
    Wiring:
    1. Implement (or pick from `memory`) the collaborators: OrderGateway, StoreResolver,
       ReviewConfig, CaseStore, PayloadBuilder, CaseSubmitter.
    2. Build `SubmissionOrchestrator::new(&ReviewSettings, Collaborators { .. })`.
    3. Wrap it in `EventDispatcher::with_default_routes(Arc::new(orchestrator))`.
    4. Feed each platform event as an `OrderEvent` to `dispatcher.dispatch(event).await`.
*/
