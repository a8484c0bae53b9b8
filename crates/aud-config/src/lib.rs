//! aud-config
//!
//! Environment-variable driven settings for the audit core. No file-based
//! layering here — the service reads a small, fixed set of env vars at
//! startup and fails fast if the database URL is missing.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub auth_service_url: String,
    pub inventory_service_url: String,
    pub location_service_url: String,
    pub notification_service_url: String,
    pub notification_internal_token: String,
    pub system_admin_role: String,
    pub audit_auditor_role: String,
    pub audit_supervisor_role: String,
    pub daemon_addr: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Settings {
    /// Load from the process environment. `.env.local` should already have
    /// been loaded by the caller (see `aud-daemon::main`) before this runs.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("AUDIT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .context("AUDIT_DATABASE_URL or DATABASE_URL must be set")?;

        Ok(Self {
            database_url,
            auth_service_url: std::env::var("AUTH_SERVICE_URL")
                .context("AUTH_SERVICE_URL must be set")?,
            inventory_service_url: std::env::var("INVENTORY_SERVICE_URL")
                .context("INVENTORY_SERVICE_URL must be set")?,
            location_service_url: std::env::var("LOCATION_SERVICE_URL")
                .context("LOCATION_SERVICE_URL must be set")?,
            notification_service_url: std::env::var("NOTIFICATION_SERVICE_URL")
                .context("NOTIFICATION_SERVICE_URL must be set")?,
            notification_internal_token: env_or("NOTIFICATION_INTERNAL_TOKEN", ""),
            system_admin_role: env_or("SYSTEM_ADMIN_ROLE", "system_admin"),
            audit_auditor_role: env_or("AUDIT_AUDITOR_ROLE", "inventory_auditor"),
            audit_supervisor_role: env_or("AUDIT_SUPERVISOR_ROLE", "inventory_audit_supervisor"),
            daemon_addr: env_or("AUDIT_DAEMON_ADDR", "127.0.0.1:8899"),
        })
    }
}
