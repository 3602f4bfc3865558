//! # Valuya Guard
//!
//! Entitlement gating for serverless request handlers.
//!
//! This crate provides [`Guard`](guard::Guard), a middleware that wraps a handler and
//! only lets entitled callers through. Everyone else receives a `402 Payment Required`
//! response pointing at a freshly created checkout session.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use serde_json::json;
//! use valuya_guard::guard::{GuardConfig, guard};
//! use valuya_kit::client::RemoteClient;
//!
//! let protected = guard(
//!     RemoteClient::from_env(),
//!     GuardConfig::builder()
//!         .resource("aws:lambda:demo:api:v1")
//!         .plan("pro")
//!         .success_url("https://example.com/thanks")
//!         .build(),
//!     |event, context| async move { json!({"ok": true}) },
//! );
//!
//! let response = protected.call(event, context).await?;
//! ```
//!
//! ## Modules
//!
//! - [`guard`]: [`Guard`](guard::Guard), [`GuardConfig`](guard::GuardConfig) and the
//!   [`guard`](guard::guard) wrapper.
//! - [`processor`]: The gating states a single invocation moves through.
//! - [`subject`]: Caller identity resolution.
//! - [`event`]: The typed view over inbound events and header normalization.
//! - [`resource`]: Route-derived resource names.
//! - [`response`]: Handler output and proxy response shaping.
//!
//! ## Gating Flow
//!
//! 1. **Resolve**: plan, resource and subject for the event.
//! 2. **Evaluate**: query the remote service for an active entitlement.
//! 3. **Allow**: run the handler. A structured response is returned unchanged, a bare
//!    value is wrapped in a `200` JSON envelope.
//! 4. **Deny**: create a checkout session and answer `402` with
//!    `x-valuya-payment-url` and `x-valuya-session-id` headers.
//!
//! ## Error Handling
//!
//! The guard does not recover from anything. Configuration errors, remote error
//! statuses and malformed checkout sessions are returned to the caller and the
//! handler is never invoked. Turning them into a response is the host runtime's job.

pub mod event;
pub mod guard;
pub mod processor;
pub mod resource;
pub mod response;
pub mod subject;
