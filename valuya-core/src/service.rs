//! The remote entitlement service interface.

use crate::types::{CheckoutRequest, CheckoutSession, EntitlementRequest, Entitlements};

/// Remote entitlement and checkout service.
///
/// Each call is a single round trip: implementations must not retry and must not
/// cache decisions across calls.
pub trait EntitlementService {
    type Error: std::error::Error;

    /// Ask whether the subject is entitled to the resource under the plan.
    fn entitlements(
        &self,
        request: EntitlementRequest,
    ) -> impl Future<Output = Result<Entitlements, Self::Error>> + Send;

    /// Obtain a checkout session for a denied subject.
    ///
    /// A session lacking a payment URL or session id is an error, never a value.
    fn checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> impl Future<Output = Result<CheckoutSession, Self::Error>> + Send;
}
