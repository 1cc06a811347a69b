use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{error, trace};

use super::ApiSettings;
use crate::analytics::{AnalyticsPublisher, ClickEvent};
use crate::codec::is_valid_code;
use crate::errors::TinylinkError;
use crate::services::LinkService;
use crate::utils::ip::extract_client_ip;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        links: web::Data<Arc<LinkService>>,
        publisher: web::Data<Arc<AnalyticsPublisher>>,
        settings: web::Data<ApiSettings>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_code(&code) {
            // 非法短码，直接 404，不访问任何后端
            trace!("Invalid short code rejected: {}", &code);
            return Self::not_found_response();
        }

        match links.resolve(&code).await {
            Ok(long_url) => {
                Self::record_click(&req, &code, &long_url, &publisher, &settings);
                HttpResponse::Found()
                    .insert_header((header::LOCATION, long_url))
                    .finish()
            }
            Err(TinylinkError::NotFound(_)) => Self::not_found_response(),
            Err(e) => {
                error!("Redirect lookup failed for {}: {}", &code, e);
                Self::unavailable_response()
            }
        }
    }

    /// 投递点击事件，立即返回
    fn record_click(
        req: &HttpRequest,
        code: &str,
        long_url: &str,
        publisher: &AnalyticsPublisher,
        settings: &ApiSettings,
    ) {
        let ip = extract_client_ip(req, &settings.trusted_proxies).unwrap_or_default();
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        publisher.publish(ClickEvent::new(code, long_url, ip, user_agent));
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .body("Not Found")
    }

    #[inline]
    fn unavailable_response() -> HttpResponse {
        HttpResponse::build(StatusCode::SERVICE_UNAVAILABLE)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .insert_header(("Retry-After", "1"))
            .body("Service Temporarily Unavailable")
    }
}

pub fn redirect_routes() -> actix_web::Resource {
    web::resource("/{code}").route(web::get().to(RedirectService::handle_redirect))
}
