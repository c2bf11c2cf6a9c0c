// review_gate/src/model/mod.rs

//! Data carried through the review pipeline: order snapshots, review cases and inbound events.

pub mod case;
pub mod event;
pub mod order;

pub use case::{Case, CaseAction, CaseStatus, Guarantee};
pub use event::{EventContext, EventKind, OrderEvent, RequestArea, RequestInfo};
pub use order::{HoldFlag, Order, OrderAttributes, OrderLine, OrderState};
