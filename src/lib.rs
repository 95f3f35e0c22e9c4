//! atelier - backend for an artist portfolio website
//!
//! This crate provides the public gallery/series API, the admin back office,
//! and contact-form relay with:
//! - Swappable blob storage backends (local filesystem, Bunny storage zone)
//! - redb embedded database for records (ACID, MVCC, crash-safe)
//! - Explicit drag-and-drop ordering re-stamped in bulk
//! - JWT admin gate, CAPTCHA-checked SMTP contact relay

pub mod api;
pub mod auth;
pub mod config;
pub mod email;
pub mod media;
pub mod object_store;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
    /// Shared client for outbound calls (CAPTCHA verification).
    pub http: reqwest::Client,
    pub mailer: Option<email::Mailer>,
}
