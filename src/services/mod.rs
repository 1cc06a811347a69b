//! Service layer for business logic
//!
//! HTTP handlers only translate requests; the read and write paths live here.

mod link_service;

pub use link_service::*;
