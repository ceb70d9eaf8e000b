use actix_web::{web, HttpResponse};
use crate::auth::handlers::{authenticate, create_user, list_users, show_user};
use crate::error::AppError;
use crate::AppState;
use tracing::error;

/// Largest accepted JSON request body.
pub const JSON_BODY_LIMIT: usize = 1 << 20;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body("server is working.")
}

/// Health check endpoint handler
/// Reports database reachability alongside a timestamp
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match crate::db::ping(&state.db_pool).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "up",
            "timestamp": timestamp,
        })),
        Err(e) => {
            error!("Health check database ping failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "database": "down",
                "timestamp": timestamp,
            }))
        }
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// Registers every route and the JSON body settings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/users")
                .route("", web::post().to(create_user))
                .route("", web::get().to(list_users))
                .route("/authenticate", web::post().to(authenticate))
                .route("/{id}", web::get().to(show_user)),
        );
}
