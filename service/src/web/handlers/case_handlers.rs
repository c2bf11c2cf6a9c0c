// review_service/src/web/handlers/case_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::models::CaseView;
use crate::state::AppState;

#[instrument(name = "handler::get_case", skip(app_state), fields(order_id = %order_id))]
pub async fn get_case_handler(
  app_state: web::Data<AppState>,
  order_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = order_id.into_inner();
  let case = app_state
    .cases
    .find(&order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No review case for order '{}'", order_id)))?;

  Ok(HttpResponse::Ok().json(CaseView::from(&case)))
}
