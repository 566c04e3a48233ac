pub mod tasks;
pub mod users;

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::error::AppError;

/// Health check endpoint.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}

/// Registers every route plus the extractor error handlers.
///
/// `/users/profile` must be registered before `/users/{id}`, otherwise the
/// literal segment would be captured as an id.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::NotFound("Not found".into()).into()),
    )
    .service(health)
    .service(users::register)
    .service(users::login)
    .service(users::logout)
    .service(users::logout_all)
    .service(users::profile)
    .service(users::edit_account)
    .service(users::delete_account)
    .service(users::upload_avatar)
    .service(users::delete_avatar)
    .service(users::get_avatar)
    .service(users::get_user)
    .service(tasks::list_tasks)
    .service(tasks::create_task)
    .service(tasks::get_task)
    .service(tasks::update_task)
    .service(tasks::delete_task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(actix_web::App::new().configure(config)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].is_string());
    }
}
