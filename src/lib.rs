//! NMS Sentinel Console
//!
//! Operator console for the NMSSentinel authentication/proxy backend:
//! - Admin login and session lifecycle with auto-logout on 401
//! - API key listing, creation, reveal and clipboard copy
//! - Backend health check and NMS proxy test
//! - Timestamped operator log of every action

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use infrastructure::backend::{BackendClient, HttpBackendClient};
use infrastructure::clipboard::SystemClipboard;
use infrastructure::services::{ConsoleService, ConsoleServiceConfig};
use tracing::info;

/// Create the console service with default configuration
pub fn create_console_service() -> anyhow::Result<ConsoleService> {
    create_console_service_with_config(&AppConfig::default())
}

/// Create the console service against the configured backend
pub fn create_console_service_with_config(config: &AppConfig) -> anyhow::Result<ConsoleService> {
    let backend: Arc<dyn BackendClient> = match config.api.timeout() {
        Some(timeout) => Arc::new(HttpBackendClient::with_timeout(&config.api.base_url, timeout)?),
        None => Arc::new(HttpBackendClient::new(&config.api.base_url)),
    };

    info!("Backend: {}", config.api.base_url);

    let service_config = ConsoleServiceConfig {
        reject_concurrent: config.console.reject_concurrent,
        log_capacity: config.console.log_capacity,
    };

    Ok(ConsoleService::with_config(
        backend,
        Arc::new(SystemClipboard::new()),
        service_config,
    ))
}
