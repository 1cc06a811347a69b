//! minter 服务的 HTTP 路由

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::error;

use super::IdMinter;

pub async fn issue_id(minter: web::Data<Arc<dyn IdMinter>>) -> impl Responder {
    match minter.generate_id().await {
        Ok(id) => HttpResponse::Ok().json(json!({ "id": id })),
        Err(e) => {
            error!("Failed to issue id: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": e.format_simple(),
                "code": e.code(),
            }))
        }
    }
}

pub fn minter_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/ids", web::post().to(issue_id))
        .route("/health", web::get().to(crate::api::services::health::health));
}
