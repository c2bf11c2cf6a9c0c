// tests/dispatch_tests.rs
mod common;

use common::*;
use review_gate::{EventDispatcher, EventKind, IneligibleReason, OrderEvent, Route, SubmissionOutcome};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_default_routes() {
  setup_tracing();
  let h = Harness::new();
  let dispatcher = EventDispatcher::with_default_routes(h.orchestrator.clone());

  assert_eq!(dispatcher.route_for(EventKind::OrderPlaced), Some(Route::GENERIC));
  assert_eq!(dispatcher.route_for(EventKind::OrderSaved), Some(Route::GENERIC));
  assert_eq!(dispatcher.route_for(EventKind::PaymentConfirmed), Some(Route::DEDICATED));
}

#[tokio::test]
#[serial]
async fn test_own_event_method_submits_only_on_dedicated_event() {
  setup_tracing();
  let h = Harness::new();
  let dispatcher = EventDispatcher::with_default_routes(h.orchestrator.clone());
  let o = order("100000001", "authorizenet_directpost");

  let placed = dispatcher.dispatch(OrderEvent::new(EventKind::OrderPlaced, o.clone())).await;
  assert_eq!(
    placed,
    SubmissionOutcome::Ineligible(IneligibleReason::AwaitsOwnEvent("authorizenet_directpost".to_string()))
  );
  assert_eq!(h.submitter.calls(), 0);

  let confirmed = dispatcher
    .dispatch(OrderEvent::new(EventKind::PaymentConfirmed, o.clone()))
    .await;
  assert_eq!(confirmed.label(), "submitted");

  // A later generic save does not resubmit.
  let saved = dispatcher.dispatch(OrderEvent::new(EventKind::OrderSaved, o)).await;
  assert!(matches!(saved, SubmissionOutcome::Ineligible(_)));
  assert_eq!(h.submitter.calls(), 1);
}

#[tokio::test]
#[serial]
async fn test_unregistered_kind_is_unrouted() {
  setup_tracing();
  let h = Harness::new();
  let dispatcher = EventDispatcher::new(h.orchestrator.clone());

  let outcome = dispatcher
    .dispatch(OrderEvent::new(EventKind::OrderPlaced, order("100000002", "braintree")))
    .await;
  assert_eq!(outcome, SubmissionOutcome::Unrouted);

  dispatcher.register(EventKind::OrderPlaced, Route::GENERIC);
  let outcome = dispatcher
    .dispatch(OrderEvent::new(EventKind::OrderPlaced, order("100000002", "braintree")))
    .await;
  assert_eq!(outcome.label(), "submitted");

  assert_eq!(dispatcher.unregister(EventKind::OrderPlaced), Some(Route::GENERIC));
  assert_eq!(dispatcher.route_for(EventKind::OrderPlaced), None);
}

#[tokio::test]
#[serial]
async fn test_event_without_order_is_ineligible() {
  setup_tracing();
  let h = Harness::new();
  let dispatcher = EventDispatcher::with_default_routes(h.orchestrator.clone());
  let event: OrderEvent = serde_json::from_value(serde_json::json!({ "kind": "order_saved" })).unwrap();

  assert_eq!(
    dispatcher.dispatch(event).await,
    SubmissionOutcome::Ineligible(IneligibleReason::MissingOrder)
  );
}
