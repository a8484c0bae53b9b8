//! Shared runtime state for aud-daemon. Cloneable (`Arc`) handle passed to
//! every Axum handler: the DB pool plus one client per collaborator.

use std::sync::Arc;

use aud_collab::{AuthClient, InventoryClient, LocationClient, NotificationClient};
use aud_config::Settings;
use aud_engine::RoleNames;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: AuthClient,
    pub location: LocationClient,
    pub inventory: InventoryClient,
    pub notification: NotificationClient,
    pub role_names: Arc<RoleNames>,
}

impl AppState {
    pub fn new(pool: PgPool, settings: &Settings) -> Self {
        Self {
            pool,
            auth: AuthClient::new(&settings.auth_service_url),
            location: LocationClient::new(&settings.location_service_url),
            inventory: InventoryClient::new(&settings.inventory_service_url),
            notification: NotificationClient::new(&settings.notification_service_url, &settings.notification_internal_token),
            role_names: Arc::new(RoleNames {
                system_admin: settings.system_admin_role.clone(),
                auditor: settings.audit_auditor_role.clone(),
                supervisor: settings.audit_supervisor_role.clone(),
            }),
        }
    }
}
