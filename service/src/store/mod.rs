// review_service/src/store/mod.rs

//! Storage adapters for the review engine's collaborator traits.

pub mod postgres;

pub use postgres::{ensure_schema, PgCaseStore, PgOrderGateway};
