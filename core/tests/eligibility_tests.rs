// tests/eligibility_tests.rs
mod common;

use common::*;
use review_gate::memory::{InMemoryOrderGateway, StaticReviewConfig, StaticStoreResolver};
use review_gate::{
  Eligibility, EligibilityGate, EventContext, EventKind, IneligibleReason, MethodSets, OrderGateway, OrderState,
  RequestArea, RequestInfo, ReviewSettings,
};
use serial_test::serial;
use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn gate_with(orders: Arc<InMemoryOrderGateway>, enabled_stores: Option<&[&str]>) -> EligibilityGate {
  let settings = ReviewSettings::default();
  let enabled = enabled_stores.map(|s| s.iter().map(|c| c.to_string()).collect::<BTreeSet<_>>());
  EligibilityGate::new(
    MethodSets::default(),
    Arc::new(StaticReviewConfig::from_settings(&settings, enabled)),
    Arc::new(StaticStoreResolver::default()),
    orders,
  )
}

fn gate() -> EligibilityGate {
  gate_with(Arc::new(InMemoryOrderGateway::new()), None)
}

fn placed() -> EventContext {
  EventContext::new(EventKind::OrderPlaced)
}

fn storefront(ip: &str) -> RequestInfo {
  RequestInfo {
    area: RequestArea::Storefront,
    forwarded_for: Some(ip.to_string()),
  }
}

#[tokio::test]
#[serial]
async fn test_card_order_is_eligible() {
  setup_tracing();
  let mut o = order("100000001", "braintree");
  assert_eq!(gate().evaluate(Some(&mut o), &placed()).await, Eligibility::Eligible);
  assert!(gate().is_eligible(Some(&mut o), &placed()).await);
}

#[tokio::test]
#[serial]
async fn test_missing_order_is_ineligible() {
  setup_tracing();
  let verdict = gate().evaluate(None, &placed()).await;
  assert_eq!(verdict, Eligibility::Ineligible(IneligibleReason::MissingOrder));
}

#[tokio::test]
#[serial]
async fn test_snapshot_without_payment_method_is_ineligible() {
  setup_tracing();
  let mut o = order("100000002", "  ");
  let verdict = gate().evaluate(Some(&mut o), &placed()).await;
  assert_eq!(verdict, Eligibility::Ineligible(IneligibleReason::InvalidSnapshot));

  let mut blank_id = order("", "braintree");
  let verdict = gate().evaluate(Some(&mut blank_id), &placed()).await;
  assert_eq!(verdict, Eligibility::Ineligible(IneligibleReason::InvalidSnapshot));
}

#[tokio::test]
#[serial]
async fn test_disabled_store_is_ineligible_and_not_backfilled() {
  setup_tracing();
  let orders = Arc::new(InMemoryOrderGateway::new());
  let gate = gate_with(orders.clone(), Some(&["eu"]));
  let mut o = order("100000003", "braintree");
  let ctx = placed().with_request(storefront("203.0.113.9"));

  let verdict = gate.evaluate(Some(&mut o), &ctx).await;

  assert_eq!(verdict, Eligibility::Ineligible(IneligibleReason::ReviewDisabled));
  assert_eq!(o.x_forwarded_for, None);
  assert_eq!(orders.attribute_saves("100000003"), 0);
}

#[tokio::test]
#[serial]
async fn test_pending_payment_is_ineligible_after_backfill() {
  setup_tracing();
  let orders = Arc::new(InMemoryOrderGateway::new());
  let gate = gate_with(orders.clone(), None);
  let mut o = order_in_state("100000004", "braintree", OrderState::PendingPayment);
  let ctx = placed().with_request(storefront("203.0.113.10"));

  let verdict = gate.evaluate(Some(&mut o), &ctx).await;

  assert_eq!(verdict, Eligibility::Ineligible(IneligibleReason::PendingPayment));
  // Backfill happens before the payment checks.
  assert_eq!(o.x_forwarded_for.as_deref(), Some("203.0.113.10"));
  assert_eq!(orders.attribute_saves("100000004"), 1);
}

#[tokio::test]
#[serial]
async fn test_restricted_methods_are_ineligible() {
  setup_tracing();
  for method in MethodSets::DEFAULT_RESTRICTED {
    let mut o = order("100000005", method);
    let verdict = gate().evaluate(Some(&mut o), &placed()).await;
    assert_eq!(
      verdict,
      Eligibility::Ineligible(IneligibleReason::RestrictedMethod(method.to_string())),
      "method {} should be restricted",
      method
    );
  }
}

#[tokio::test]
#[serial]
async fn test_own_event_method_waits_for_dedicated_event() {
  setup_tracing();
  let mut o = order("100000006", "authorizenet_directpost");

  let generic = gate().evaluate(Some(&mut o), &placed()).await;
  assert_eq!(
    generic,
    Eligibility::Ineligible(IneligibleReason::AwaitsOwnEvent("authorizenet_directpost".to_string()))
  );

  let dedicated = EventContext::new(EventKind::PaymentConfirmed).skip_own_events_check();
  assert_eq!(gate().evaluate(Some(&mut o), &dedicated).await, Eligibility::Eligible);
}

#[tokio::test]
#[serial]
async fn test_backfill_fills_missing_attributes_once() {
  setup_tracing();
  let orders = Arc::new(InMemoryOrderGateway::new());
  let gate = gate_with(orders.clone(), None);
  let ctx = placed().with_request(RequestInfo {
    area: RequestArea::Admin,
    forwarded_for: Some("198.51.100.4".to_string()),
  });

  let mut first = order("100000007", "braintree");
  assert!(gate.is_eligible(Some(&mut first), &ctx).await);
  assert_eq!(first.origin_store_code.as_deref(), Some("admin"));
  assert_eq!(first.x_forwarded_for.as_deref(), Some("198.51.100.4"));
  assert_eq!(orders.get("100000007").unwrap().x_forwarded_for.as_deref(), Some("198.51.100.4"));

  // A fresh snapshot of the same order finds the stored values and does not save again.
  let mut second = order("100000007", "braintree");
  assert!(gate.is_eligible(Some(&mut second), &ctx).await);
  assert_eq!(second.origin_store_code.as_deref(), Some("admin"));
  assert_eq!(orders.attribute_saves("100000007"), 1);
}

#[tokio::test]
#[serial]
async fn test_stored_attributes_survive_later_deliveries_from_other_areas() {
  setup_tracing();
  let orders = Arc::new(InMemoryOrderGateway::new());
  let gate = gate_with(orders.clone(), None);

  let admin = placed().with_request(RequestInfo {
    area: RequestArea::Admin,
    forwarded_for: Some("10.0.0.1".to_string()),
  });
  let mut first = order_in_state("100000012", "braintree", OrderState::PendingPayment);
  let verdict = gate.evaluate(Some(&mut first), &admin).await;
  assert_eq!(verdict, Eligibility::Ineligible(IneligibleReason::PendingPayment));

  let saved = placed().with_request(storefront("10.9.9.9"));
  let mut second = order("100000012", "braintree");
  assert_eq!(gate.evaluate(Some(&mut second), &saved).await, Eligibility::Eligible);

  let stored = orders.get("100000012").unwrap();
  assert_eq!(stored.origin_store_code.as_deref(), Some("admin"));
  assert_eq!(stored.x_forwarded_for.as_deref(), Some("10.0.0.1"));
  assert_eq!(second.origin_store_code.as_deref(), Some("admin"));
  assert_eq!(second.x_forwarded_for.as_deref(), Some("10.0.0.1"));
  assert_eq!(orders.attribute_saves("100000012"), 1);
}

#[tokio::test]
#[serial]
async fn test_attribute_save_does_not_touch_stored_state() {
  setup_tracing();
  let orders = Arc::new(InMemoryOrderGateway::new());
  let gate = gate_with(orders.clone(), None);

  orders.hold(&order("100000013", "braintree")).await.unwrap();

  // A stale snapshot still in processing arrives with a new forwarded IP.
  let mut stale = order("100000013", "braintree");
  let ctx = placed().with_request(storefront("203.0.113.77"));
  assert!(gate.is_eligible(Some(&mut stale), &ctx).await);

  let stored = orders.get("100000013").unwrap();
  assert_eq!(stored.state, OrderState::Held);
  assert_eq!(stored.x_forwarded_for.as_deref(), Some("203.0.113.77"));
}

#[tokio::test]
#[serial]
async fn test_backfill_keeps_existing_attributes() {
  setup_tracing();
  let orders = Arc::new(InMemoryOrderGateway::new());
  let gate = gate_with(orders.clone(), None);
  let mut o = order("100000008", "braintree");
  o.origin_store_code = Some("default".to_string());
  o.x_forwarded_for = Some("192.0.2.1".to_string());

  let ctx = placed().with_request(storefront("203.0.113.99"));
  assert!(gate.is_eligible(Some(&mut o), &ctx).await);

  assert_eq!(o.x_forwarded_for.as_deref(), Some("192.0.2.1"));
  assert_eq!(orders.attribute_saves("100000008"), 0);
}

#[tokio::test]
#[serial]
async fn test_no_request_resolves_origin_store_like_storefront() {
  setup_tracing();
  let orders = Arc::new(InMemoryOrderGateway::new());
  let gate = gate_with(orders.clone(), None);
  let mut o = order("100000009", "braintree");

  assert!(gate.is_eligible(Some(&mut o), &placed()).await);
  assert_eq!(o.origin_store_code.as_deref(), Some("default"));
  assert_eq!(o.x_forwarded_for, None);
  assert_eq!(orders.attribute_saves("100000009"), 1);
}

#[tokio::test]
#[serial]
async fn test_backfill_save_failure_does_not_change_verdict() {
  setup_tracing();
  let failing = Arc::new(FailingOrderGateway::default());
  let gate = EligibilityGate::new(
    MethodSets::default(),
    Arc::new(StaticReviewConfig::default()),
    Arc::new(StaticStoreResolver::default()),
    failing.clone(),
  );
  let mut o = order("100000010", "braintree");
  let ctx = placed().with_request(storefront("203.0.113.20"));

  assert_eq!(gate.evaluate(Some(&mut o), &ctx).await, Eligibility::Eligible);
  assert_eq!(failing.attempts.load(Ordering::SeqCst), 1);
}

#[test]
fn test_method_lists_parse_and_validate() {
  let parsed = MethodSets::parse_list(" checkmo, ,banktransfer,");
  assert_eq!(parsed.len(), 2);
  assert!(parsed.contains("checkmo"));

  let mut sets = MethodSets::default();
  assert!(sets.validate().is_ok());
  sets.own_events.insert("checkmo".to_string());
  assert!(sets.validate().is_err());
}
