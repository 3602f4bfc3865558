//! # Valuya Kit
//!
//! Valuya Kit gates serverless handlers behind entitlements managed by a remote
//! Valuya service.
//!
//! It bundles the pieces a deployment needs:
//!
//! - **[`types`]**, **[`service`]**, **[`errors`]**: the wire types, the
//!   [`EntitlementService`](service::EntitlementService) seam and the error enum.
//! - **[`guard`]**: the gating middleware from `valuya-guard`.
//! - **[`client`]**: [`RemoteClient`](client::RemoteClient), the HTTP implementation of
//!   the entitlement service (feature `remote-client`, on by default).
//! - **[`config`]**: [`RemoteEndpointConfig`](config::RemoteEndpointConfig), where the
//!   remote service lives and how to authenticate against it.
//!
//! ## Guarding a handler
//!
//! ```no_run
//! use serde_json::{Value, json};
//! use valuya_kit::{
//!     client::RemoteClient,
//!     guard::guard::{GuardConfig, guard},
//! };
//!
//! # async fn run() -> Result<(), valuya_kit::client::RemoteClientError> {
//! let protected = guard(
//!     RemoteClient::from_env(),
//!     GuardConfig::builder()
//!         .resource("aws:lambda:demo:api:v1")
//!         .plan("pro")
//!         .build(),
//!     |_event: Value, _context: ()| async { json!({"ok": true, "data": [1, 2, 3]}) },
//! );
//!
//! let event = json!({
//!     "headers": {"x-valuya-anon-id": "visitor-1"},
//!     "requestContext": {"http": {"method": "GET", "path": "/data"}}
//! });
//!
//! let response = protected.call(event, ()).await?;
//! println!("{}", response.status_code);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment
//!
//! - `BASE_URL`: base URL of the Valuya service. Required.
//! - `SITE_TOKEN`: bearer token sent to the service. Optional.
//! - `DEFAULT_PLAN`: plan used when a guard names none. Falls back to `pro`.

pub mod errors {
    pub use valuya_core::errors::*;
}

pub mod service {
    pub use valuya_core::service::*;
}

pub mod types {
    pub use valuya_core::types::*;
}

pub mod guard {
    pub use valuya_guard::*;
}

pub mod config;

#[cfg(feature = "remote-client")]
pub mod client;
