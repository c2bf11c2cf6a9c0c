// review_service/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::state::AppState;

async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({
    "status": "ok",
    "storage": app_state.storage.as_str(),
  }))
}

// Malformed event bodies answer with the same JSON error shape as every other failure.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .app_data(json_config())
      .route("/health", web::get().to(health_check_handler))
      .service(web::scope("/events").route(
        "/order",
        web::post().to(crate::web::handlers::event_handlers::order_event_handler),
      ))
      .service(web::scope("/cases").route(
        "/{order_id}",
        web::get().to(crate::web::handlers::case_handlers::get_case_handler),
      )),
  );
}
