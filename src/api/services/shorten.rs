use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{ApiSettings, error_response};
use crate::errors::TinylinkError;
use crate::services::LinkService;

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
}

pub struct ShortenService;

impl ShortenService {
    pub async fn shorten(
        body: web::Json<ShortenRequest>,
        links: web::Data<Arc<LinkService>>,
        settings: web::Data<ApiSettings>,
    ) -> impl Responder {
        match links.create(&body.url).await {
            Ok(code) => HttpResponse::Ok().json(ShortenResponse {
                short_url: settings.short_url(&code),
                code,
            }),
            Err(e) => {
                if !matches!(e, TinylinkError::Validation(_)) {
                    error!("Failed to create short link: {}", e);
                }
                error_response(&e)
            }
        }
    }
}

pub fn shorten_routes() -> actix_web::Resource {
    web::resource("/shorten").route(web::post().to(ShortenService::shorten))
}
