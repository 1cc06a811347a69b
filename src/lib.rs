//! tinylink - a short-link resolver
//!
//! # Architecture
//! - `codec`: base-62 id <-> short code
//! - `minter`: unique id generation (local tickets table or remote service)
//! - `cache`: existence filter and object cache in front of the store
//! - `storage`: durable links / tickets tables (sea-orm)
//! - `analytics`: fire-and-forget click events
//! - `services`: the create / resolve pipeline
//! - `api`: HTTP handlers
//! - `config`, `runtime`, `system`: configuration, lifecycle, logging

pub mod analytics;
pub mod api;
pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod errors;
pub mod minter;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
