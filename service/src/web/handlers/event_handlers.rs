// review_service/src/web/handlers/event_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use review_gate::{OrderEvent, RequestInfo};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::EventAccepted;
use crate::state::AppState;

#[instrument(
    name = "handler::order_event",
    skip_all,
    fields(event_kind = %body.kind, order_id = body.order_id().unwrap_or_default())
)]
pub async fn order_event_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Json<OrderEvent>,
) -> Result<HttpResponse, AppError> {
  let mut event = body.into_inner();
  fill_forwarded_for(&mut event, &req);

  let kind = event.kind;
  let order_id = event.order_id().map(str::to_string);

  // The dispatcher never fails; every outcome is acknowledged.
  let outcome = app_state.dispatcher.dispatch(event).await;
  info!(outcome = outcome.label(), "Order event processed.");

  Ok(HttpResponse::Accepted().json(EventAccepted::new(kind, order_id, &outcome)))
}

/// Uses the inbound `X-Forwarded-For` header when the body carries no client IP.
fn fill_forwarded_for(event: &mut OrderEvent, req: &HttpRequest) {
  let header = req
    .headers()
    .get("x-forwarded-for")
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.split(',').next())
    .map(str::trim)
    .filter(|value| !value.is_empty());
  let Some(header) = header else {
    return;
  };

  let request = event.request.get_or_insert_with(RequestInfo::default);
  if request.forwarded_for.as_deref().map_or(true, |v| v.trim().is_empty()) {
    request.forwarded_for = Some(header.to_string());
  }
}
