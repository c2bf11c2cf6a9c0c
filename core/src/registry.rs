// review_gate/src/registry.rs

//! `EventDispatcher`: a registry of routes keyed by `EventKind` that feeds
//! typed order events to the `SubmissionOrchestrator`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{event, instrument, Level};

use crate::model::{EventContext, EventKind, OrderEvent};
use crate::orchestrator::{SubmissionOrchestrator, SubmissionOutcome};

/// How events of one kind are handed to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
  /// Apply the own-events rule. Off only for the dedicated payment-confirmed path.
  pub check_own_events: bool,
}

impl Route {
  pub const GENERIC: Route = Route { check_own_events: true };
  pub const DEDICATED: Route = Route {
    check_own_events: false,
  };
}

pub struct EventDispatcher {
  orchestrator: Arc<SubmissionOrchestrator>,
  routes: RwLock<HashMap<EventKind, Route>>,
}

impl EventDispatcher {
  /// A dispatcher with no routes; every event is `Unrouted` until registered.
  pub fn new(orchestrator: Arc<SubmissionOrchestrator>) -> Self {
    Self {
      orchestrator,
      routes: RwLock::new(HashMap::new()),
    }
  }

  /// Routes `order_placed` and `order_saved` as generic events and
  /// `payment_confirmed` as the dedicated own-events path.
  pub fn with_default_routes(orchestrator: Arc<SubmissionOrchestrator>) -> Self {
    let dispatcher = Self::new(orchestrator);
    dispatcher.register(EventKind::OrderPlaced, Route::GENERIC);
    dispatcher.register(EventKind::OrderSaved, Route::GENERIC);
    dispatcher.register(EventKind::PaymentConfirmed, Route::DEDICATED);
    dispatcher
  }

  pub fn register(&self, kind: EventKind, route: Route) {
    event!(Level::DEBUG, event_kind = %kind, check_own_events = route.check_own_events, "Registering route.");
    self.routes.write().insert(kind, route);
  }

  pub fn unregister(&self, kind: EventKind) -> Option<Route> {
    self.routes.write().remove(&kind)
  }

  pub fn route_for(&self, kind: EventKind) -> Option<Route> {
    self.routes.read().get(&kind).copied()
  }

  pub fn orchestrator(&self) -> &Arc<SubmissionOrchestrator> {
    &self.orchestrator
  }

  #[instrument(name = "EventDispatcher::dispatch", skip_all, fields(event_kind = %order_event.kind))]
  pub async fn dispatch(&self, order_event: OrderEvent) -> SubmissionOutcome {
    let Some(route) = self.route_for(order_event.kind) else {
      event!(Level::DEBUG, "No route registered for event kind; ignoring.");
      return SubmissionOutcome::Unrouted;
    };

    let mut ctx = EventContext::new(order_event.kind);
    if let Some(request) = order_event.request {
      ctx = ctx.with_request(request);
    }
    if !route.check_own_events {
      ctx = ctx.skip_own_events_check();
    }

    self.orchestrator.handle(order_event.order, ctx).await
  }
}
