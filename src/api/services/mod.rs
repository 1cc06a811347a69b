pub mod health;
pub mod redirect;
pub mod shorten;

pub use health::health_routes;
pub use redirect::{RedirectService, redirect_routes};
pub use shorten::{ShortenService, shorten_routes};

use actix_web::HttpResponse;
use serde_json::json;

use crate::errors::TinylinkError;
use crate::utils::ip::TrustedProxies;

/// 处理器共享的只读设置
#[derive(Clone, Debug)]
pub struct ApiSettings {
    /// 短链前缀，保证以 `/` 结尾
    pub base_url: String,
    pub trusted_proxies: TrustedProxies,
}

impl ApiSettings {
    pub fn new(base_url: &str, trusted_proxies: &[String]) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Self {
            base_url,
            trusted_proxies: TrustedProxies::parse(trusted_proxies),
        }
    }

    pub fn short_url(&self, code: &str) -> String {
        format!("{}{}", self.base_url, code)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::new("http://localhost:8080/", &[])
    }
}

/// 错误统一转成 JSON 响应；调用方只看到 400 / 404 / 503 三种
pub(crate) fn error_response(err: &TinylinkError) -> HttpResponse {
    let body = json!({
        "error": err.format_simple(),
        "code": err.code(),
    });
    match err {
        TinylinkError::Validation(_) => HttpResponse::BadRequest().json(body),
        TinylinkError::NotFound(_) | TinylinkError::MalformedCode(_) => {
            HttpResponse::NotFound().json(body)
        }
        _ => HttpResponse::ServiceUnavailable().json(json!({
            "error": "Service temporarily unavailable",
            "code": err.code(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let settings = ApiSettings::new("https://t.example", &[]);
        assert_eq!(settings.short_url("abc"), "https://t.example/abc");
        let settings = ApiSettings::new("https://t.example/s/", &[]);
        assert_eq!(settings.short_url("abc"), "https://t.example/s/abc");
    }

    #[test]
    fn test_error_status_mapping() {
        use actix_web::http::StatusCode;
        assert_eq!(
            error_response(&TinylinkError::validation("x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&TinylinkError::not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&TinylinkError::storage_unavailable("x")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
