//! HTTP 前端
//!
//! 只负责请求与响应的转换，解析和创建逻辑在 [`crate::services::LinkService`]。

pub mod services;

use actix_web::web;

pub use services::{ApiSettings, health_routes, redirect_routes, shorten_routes};

/// 注册全部路由；`/{code}` 是兜底路由，必须最后注册
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_routes())
        .service(shorten_routes())
        .service(redirect_routes());
}
