// review_service/src/lib.rs

//! HTTP front end for the review engine: accepts order events, exposes the
//! stored review cases, and wires Postgres or in-memory adapters.

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::{AppState, StorageKind};
