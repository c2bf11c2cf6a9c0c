// review_service/src/web/handlers/mod.rs

pub mod case_handlers;
pub mod event_handlers;
