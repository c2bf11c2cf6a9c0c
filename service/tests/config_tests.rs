// review_service/tests/config_tests.rs

use review_gate::{CaseAction, MethodSets};
use review_service::{AppConfig, AppError};
use std::collections::HashMap;
use std::time::Duration;

fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
  let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
  AppConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn test_defaults() {
  let config = load(&[]).unwrap();
  assert_eq!(config.server_host, "127.0.0.1");
  assert_eq!(config.server_port, 8080);
  assert_eq!(config.database_url, None);
  assert_eq!(config.enabled_stores, None);
  assert_eq!(config.review.methods, MethodSets::default());
  assert_eq!(config.review.positive_action, CaseAction::Unhold);
  assert_eq!(config.review.negative_action, CaseAction::Hold);
  assert_eq!(config.mock_provider_latency, Duration::from_millis(50));
  assert_eq!(config.mock_provider_fail_total_cents, None);
}

#[test]
fn test_overrides() {
  let config = load(&[
    ("SERVER_PORT", "9090"),
    ("DATABASE_URL", "postgres://review@localhost/review"),
    ("REVIEW_ENABLED_STORES", "default, eu"),
    ("REVIEW_RESTRICTED_METHODS", "checkmo"),
    ("REVIEW_SPECIAL_METHODS", "payflow_express,paypal_express"),
    ("REVIEW_POSITIVE_ACTION", "nothing"),
    ("REVIEW_NEGATIVE_ACTION", "Cancel"),
    ("MOCK_PROVIDER_FAIL_TOTAL_CENTS", "1313"),
  ])
  .unwrap();

  assert_eq!(config.server_port, 9090);
  assert!(config.database_url.is_some());
  assert_eq!(config.enabled_stores.unwrap().len(), 2);
  assert!(config.review.methods.is_restricted("checkmo"));
  assert!(!config.review.methods.is_restricted("banktransfer"));
  assert!(config.review.methods.is_special("paypal_express"));
  assert_eq!(config.review.positive_action, CaseAction::Nothing);
  assert_eq!(config.review.negative_action, CaseAction::Cancel);
  assert_eq!(config.mock_provider_fail_total_cents, Some(1313));
}

#[test]
fn test_invalid_values_are_config_errors() {
  assert!(matches!(load(&[("SERVER_PORT", "http")]), Err(AppError::Config(_))));
  assert!(matches!(load(&[("REVIEW_POSITIVE_ACTION", "maybe")]), Err(AppError::Config(_))));
  assert!(matches!(
    load(&[("REVIEW_OWN_EVENT_METHODS", "checkmo")]),
    Err(AppError::Config(_))
  ));
}
