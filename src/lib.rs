//! # WeChat Notice Gateway Library
//!
//! Accepts "send a notice" requests and delivers them as WeChat
//! official-account template messages, caching the provider access token
//! between calls.
//!
//! Modules:
//! - `config` — service configuration, loading and validation
//! - `cache` — access token cache
//! - `provider` — WeChat token exchange and template message endpoints
//! - `notice` — request validation, template mapping and dispatch
//! - `server` — HTTP surface for the notice operation and metrics

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod notice;
pub mod observability;
pub mod provider;
pub mod server;
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use crate::config::provider::{ProviderConfig, ServiceConfig};
pub use crate::error::NoticeError;
pub use crate::notice::dispatcher::NoticeDispatcher;
pub use crate::notice::request::{NoticeRequest, NoticeResponse};
