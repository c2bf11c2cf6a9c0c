// review_service/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use review_gate::{CaseAction, MethodSets, ReviewSettings};
use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Postgres adapters when set; in-memory adapters otherwise.
  pub database_url: Option<String>,

  /// Stores with review enabled. `None` enables every store.
  pub enabled_stores: Option<BTreeSet<String>>,
  pub review: ReviewSettings,

  // Mock review provider
  pub mock_provider_latency: Duration,
  /// Orders with exactly this grand total (in cents) fail submission.
  pub mock_provider_fail_total_cents: Option<i64>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source. Blank values count as unset.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get("DATABASE_URL");

    let enabled_stores = get("REVIEW_ENABLED_STORES").map(|raw| MethodSets::parse_list(&raw));

    let mut methods = MethodSets::default();
    if let Some(raw) = get("REVIEW_RESTRICTED_METHODS") {
      methods.restricted = MethodSets::parse_list(&raw);
    }
    if let Some(raw) = get("REVIEW_OWN_EVENT_METHODS") {
      methods.own_events = MethodSets::parse_list(&raw);
    }
    if let Some(raw) = get("REVIEW_SPECIAL_METHODS") {
      methods.special = MethodSets::parse_list(&raw);
    }
    methods.validate().map_err(|e| AppError::Config(e.to_string()))?;

    let defaults = ReviewSettings::default();
    let positive_action = parse_action(get("REVIEW_POSITIVE_ACTION"), defaults.positive_action)?;
    let negative_action = parse_action(get("REVIEW_NEGATIVE_ACTION"), defaults.negative_action)?;

    let latency_ms = get("MOCK_PROVIDER_LATENCY_MS")
      .unwrap_or_else(|| "50".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid MOCK_PROVIDER_LATENCY_MS: {}", e)))?;
    let mock_provider_fail_total_cents = get("MOCK_PROVIDER_FAIL_TOTAL_CENTS")
      .map(|raw| raw.parse::<i64>())
      .transpose()
      .map_err(|e| AppError::Config(format!("Invalid MOCK_PROVIDER_FAIL_TOTAL_CENTS: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      enabled_stores,
      review: ReviewSettings {
        methods,
        positive_action,
        negative_action,
      },
      mock_provider_latency: Duration::from_millis(latency_ms),
      mock_provider_fail_total_cents,
    })
  }
}

fn parse_action(raw: Option<String>, default: CaseAction) -> Result<CaseAction> {
  match raw {
    Some(raw) => raw.parse::<CaseAction>().map_err(|e| AppError::Config(e.to_string())),
    None => Ok(default),
  }
}
