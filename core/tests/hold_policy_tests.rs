// tests/hold_policy_tests.rs
mod common;

use common::*;
use review_gate::memory::{InMemoryCaseStore, InMemoryOrderGateway, StaticReviewConfig};
use review_gate::{
  Case, CaseAction, CaseLedger, Guarantee, HoldFlag, HoldOutcome, HoldPolicy, MethodSets, NotHoldableReason, Order,
  OrderGateway, OrderState, ReviewError, SkipReason,
};
use serial_test::serial;
use std::sync::Arc;

struct Fixture {
  cases: Arc<InMemoryCaseStore>,
  orders: Arc<InMemoryOrderGateway>,
  policy: HoldPolicy,
}

fn fixture() -> Fixture {
  let cases = Arc::new(InMemoryCaseStore::new());
  let orders = Arc::new(InMemoryOrderGateway::new());
  let ledger = Arc::new(CaseLedger::new(cases.clone(), Arc::new(StaticReviewConfig::default())));
  let policy = HoldPolicy::new(MethodSets::default(), ledger, orders.clone());
  Fixture { cases, orders, policy }
}

fn open_case(order: &Order) -> Case {
  Case::new(order.id.clone(), CaseAction::Unhold, CaseAction::Hold)
}

#[tokio::test]
#[serial]
async fn test_processing_card_order_is_held() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000001", "braintree");
  f.cases.put(open_case(&o));

  let outcome = f.policy.apply(&mut o).await.unwrap();

  assert_eq!(outcome, HoldOutcome::Held);
  assert_eq!(o.state, OrderState::Held);
  assert_eq!(f.orders.get("100000001").unwrap().state, OrderState::Held);
}

#[tokio::test]
#[serial]
async fn test_missing_case_skips_hold() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000002", "braintree");

  let outcome = f.policy.apply(&mut o).await.unwrap();

  assert_eq!(outcome, HoldOutcome::Skipped(SkipReason::CaseMissing));
  assert_eq!(o.state, OrderState::Processing);
  assert!(f.orders.get("100000002").is_none());
}

#[tokio::test]
#[serial]
async fn test_case_with_nothing_actions_is_not_held() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000003", "braintree");
  f.cases.put(Case::new(o.id.clone(), CaseAction::Nothing, CaseAction::Nothing));

  let outcome = f.policy.apply(&mut o).await.unwrap();
  assert_eq!(outcome, HoldOutcome::Skipped(SkipReason::NoActionRequired));

  // One non-nothing action is enough to hold.
  f.cases.put(Case::new(o.id.clone(), CaseAction::Nothing, CaseAction::Cancel));
  assert!(f.policy.apply(&mut o).await.unwrap().is_held());
}

#[tokio::test]
#[serial]
async fn test_terminal_states_are_not_holdable() {
  setup_tracing();
  let f = fixture();
  for state in [
    OrderState::Canceled,
    OrderState::PaymentReview,
    OrderState::Complete,
    OrderState::Closed,
  ] {
    let mut o = order_in_state("100000004", "braintree", state.clone());
    f.cases.put(open_case(&o));

    let outcome = f.policy.apply(&mut o).await.unwrap();

    assert_eq!(
      outcome,
      HoldOutcome::Skipped(SkipReason::NotHoldable(NotHoldableReason::State(state.clone())))
    );
    assert_eq!(o.state, state);
  }
}

#[tokio::test]
#[serial]
async fn test_hold_flag_disallowed_is_not_holdable() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000005", "braintree");
  o.hold_flag = HoldFlag::Disallowed;
  f.cases.put(open_case(&o));

  let outcome = f.policy.apply(&mut o).await.unwrap();
  assert_eq!(
    outcome,
    HoldOutcome::Skipped(SkipReason::NotHoldable(NotHoldableReason::HoldFlagDisallowed))
  );
  if let HoldOutcome::Skipped(reason) = outcome {
    assert_eq!(reason.to_string(), "not-holdable: order action flag is set to do not hold");
  }
}

#[tokio::test]
#[serial]
async fn test_special_method_waits_for_confirmation_email() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000006", "payflow_express");
  f.cases.put(open_case(&o));

  let outcome = f.policy.apply(&mut o).await.unwrap();
  assert_eq!(outcome, HoldOutcome::Skipped(SkipReason::AwaitingConfirmationEmail));

  o.email_sent = true;
  let outcome = f.policy.apply(&mut o).await.unwrap();
  assert_eq!(outcome, HoldOutcome::Held);
}

#[tokio::test]
#[serial]
async fn test_special_method_with_guarantee_is_not_held() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000007", "payflow_express");
  o.email_sent = true;
  let mut case = open_case(&o);
  case.guarantee = Some(Guarantee::Approved);
  f.cases.put(case);

  let outcome = f.policy.apply(&mut o).await.unwrap();
  assert_eq!(outcome, HoldOutcome::Skipped(SkipReason::Guaranteed));
}

#[tokio::test]
#[serial]
async fn test_guaranteed_case_is_not_held() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000008", "braintree");
  let mut case = open_case(&o);
  case.guarantee = Some(Guarantee::Declined);
  f.cases.put(case);

  let outcome = f.policy.apply(&mut o).await.unwrap();
  assert_eq!(outcome, HoldOutcome::Skipped(SkipReason::Guaranteed));
  assert_eq!(o.state, OrderState::Processing);
}

#[tokio::test]
#[serial]
async fn test_second_evaluation_after_hold_is_no_op() {
  setup_tracing();
  let f = fixture();
  let mut o = order("100000009", "braintree");
  f.cases.put(open_case(&o));

  assert!(f.policy.apply(&mut o).await.unwrap().is_held());
  let again = f.policy.apply(&mut o).await.unwrap();

  assert_eq!(
    again,
    HoldOutcome::Skipped(SkipReason::NotHoldable(NotHoldableReason::State(OrderState::Held)))
  );
}

#[tokio::test]
#[serial]
async fn test_unknown_state_is_holdable() {
  setup_tracing();
  let f = fixture();
  let mut o = order_in_state("100000010", "braintree", OrderState::Other("fraud_check".to_string()));
  f.cases.put(open_case(&o));

  assert!(f.policy.apply(&mut o).await.unwrap().is_held());
}

#[tokio::test]
#[serial]
async fn test_hold_failure_is_reported() {
  setup_tracing();
  let cases = Arc::new(InMemoryCaseStore::new());
  let ledger = Arc::new(CaseLedger::new(cases.clone(), Arc::new(StaticReviewConfig::default())));
  let failing = Arc::new(FailingOrderGateway::default());
  let policy = HoldPolicy::new(MethodSets::default(), ledger, failing.clone());
  let mut o = order("100000011", "braintree");
  cases.put(open_case(&o));

  assert!(failing.can_hold(&o));
  let result = policy.apply(&mut o).await;

  match result {
    Err(e @ ReviewError::OrderGateway { .. }) => assert_eq!(e.order_id(), Some("100000011")),
    other => panic!("Expected ReviewError::OrderGateway, got {:?}", other),
  }
  assert_eq!(o.state, OrderState::Processing);
}

#[tokio::test]
#[serial]
async fn test_hold_on_positive_with_nothing_on_negative_is_held() {
  setup_tracing();
  let f = fixture();
  let mut o = order("O1", "standard_card");
  f.cases.put(Case::new(o.id.clone(), CaseAction::Hold, CaseAction::Nothing));

  assert_eq!(f.policy.apply(&mut o).await.unwrap(), HoldOutcome::Held);
  assert_eq!(f.orders.get("O1").unwrap().state, OrderState::Held);
}
