// review_service/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use review_service::store::ensure_schema;
use review_service::web::configure_app_routes;
use review_service::{AppConfig, AppState};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting review service...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  let app_state = match app_config.database_url.as_deref() {
    Some(database_url) => {
      let db_pool = PgPool::connect(database_url).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to connect to the database.");
        std::io::Error::other(e.to_string())
      })?;
      ensure_schema(&db_pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create the review schema.");
        std::io::Error::other(e.to_string())
      })?;
      tracing::info!("Successfully connected to the database.");
      AppState::with_postgres(app_config.clone(), db_pool)
    }
    None => {
      tracing::warn!("DATABASE_URL not set; cases are kept in memory and lost on restart.");
      AppState::in_memory(app_config.clone())
    }
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!(storage = app_state.storage.as_str(), "Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
