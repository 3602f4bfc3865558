//! Core types used across the Valuya guard.

mod checkout;
mod common;
mod entitlements;
mod responses;
mod subject;

pub use checkout::*;
pub use common::*;
pub use entitlements::*;
pub use responses::*;
pub use subject::*;
