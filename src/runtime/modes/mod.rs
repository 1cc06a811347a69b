//! Mode routing
//!
//! - serve: 短链 HTTP 服务（默认）
//! - minter: 独立发号服务

#[cfg(feature = "server")]
pub mod minter;
#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "server")]
pub use minter::run_minter;
#[cfg(feature = "server")]
pub use server::run_server;
