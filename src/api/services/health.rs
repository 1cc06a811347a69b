use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::trace;

/// 存活探针，不访问任何后端
pub async fn health() -> impl Responder {
    trace!("Received health check request");
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(health))
        .route("", web::head().to(health))
}
