use actix_web::{test, web, App};
use chrono::DateTime;
use storefront_backend::{AppState, Settings};

mod common;

#[actix_web::test]
async fn test_health_check_reports_database_down() {
    let mut config: Settings = common::test_settings();
    // Nothing listens on port 1
    config.postgres.port = 1;
    let state = web::Data::new(AppState::new(config).expect("state"));

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(storefront_backend::health_check)),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 503);

    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["database"], "down");
    assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
}

#[actix_web::test]
#[ignore = "requires a running Postgres (docker compose up -d)"]
async fn test_health_check_reports_database_up() {
    let state = web::Data::new(AppState::new(common::test_settings()).expect("state"));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/health", web::get().to(storefront_backend::health_check)),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "up");
}
