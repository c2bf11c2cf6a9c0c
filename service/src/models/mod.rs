// review_service/src/models/mod.rs

//! Database rows and HTTP payloads.

pub mod case_record;
pub mod event_dto;

pub use case_record::CaseRecord;
pub use event_dto::{CaseView, EventAccepted};
