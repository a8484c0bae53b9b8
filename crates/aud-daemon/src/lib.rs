//! aud-daemon library target. Exposes the router and state for integration
//! tests; the `aud-daemon` binary (`main.rs`) depends on this library.

pub mod api_types;
pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
