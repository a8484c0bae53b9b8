//! aud-collab
//!
//! Bounded HTTP clients for the audit core's collaborators: auth,
//! location, inventory, notifications. Every client owns a fixed timeout and
//! a uniform status-code-to-error mapping; notifications are best-effort.

pub mod auth;
pub mod error;
pub mod inventory;
pub mod location;
pub mod notification;

pub use auth::{AuthClient, AuthUser};
pub use error::CollabError;
pub use inventory::{BulkMoveResponsible, InventoryClient, InventoryItem};
pub use location::LocationClient;
pub use notification::NotificationClient;
