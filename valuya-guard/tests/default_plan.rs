//! `DEFAULT_PLAN` is read on every guarded call.
//!
//! Kept in its own test binary with a single test: it mutates the process
//! environment.

use serde_json::json;
use valuya_core::{
    errors::Error,
    service::EntitlementService,
    types::{CheckoutRequest, CheckoutSession, EntitlementRequest, Entitlements},
};
use valuya_guard::guard::{DEFAULT_PLAN_ENV, Guard, GuardConfig};

/// Resolution never reaches the service.
struct Unreachable;

impl EntitlementService for Unreachable {
    type Error = Error;

    async fn entitlements(&self, _request: EntitlementRequest) -> Result<Entitlements, Error> {
        Err(Error::Config("unexpected entitlement query".to_string()))
    }

    async fn checkout_session(&self, _request: CheckoutRequest) -> Result<CheckoutSession, Error> {
        Err(Error::Config("unexpected checkout".to_string()))
    }
}

#[test]
fn test_default_plan_read_per_call() {
    let implicit = Guard::new(
        Unreachable,
        GuardConfig::builder().resource("aws:lambda:demo").build(),
    );
    let explicit = Guard::new(
        Unreachable,
        GuardConfig::builder().resource("aws:lambda:demo").plan("team").build(),
    );

    unsafe { std::env::remove_var(DEFAULT_PLAN_ENV) };
    assert_eq!(implicit.resolve(json!({})).unwrap().plan, "pro");

    unsafe { std::env::set_var(DEFAULT_PLAN_ENV, "basic") };
    assert_eq!(implicit.resolve(json!({})).unwrap().plan, "basic");
    assert_eq!(explicit.resolve(json!({})).unwrap().plan, "team");

    unsafe { std::env::set_var(DEFAULT_PLAN_ENV, " enterprise ") };
    assert_eq!(implicit.resolve(json!({})).unwrap().plan, "enterprise");

    unsafe { std::env::remove_var(DEFAULT_PLAN_ENV) };
    assert_eq!(implicit.resolve(json!({})).unwrap().plan, "pro");
}
