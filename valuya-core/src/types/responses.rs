use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::types::JsonObject;

/// The `error` code carried by every payment required body.
pub const PAYMENT_REQUIRED_ERROR: &str = "payment_required";

/// Reason reported when the remote service denies without giving one.
pub const DEFAULT_DENIAL_REASON: &str = "subscription_inactive";

/// JSON body of a `402 Payment Required` response.
///
/// ```
/// use valuya_core::types::{PaymentRequiredBody, default_required};
///
/// let body = PaymentRequiredBody::builder()
///     .reason("trial_expired")
///     .required(default_required("pro"))
///     .evaluated_plan("pro")
///     .resource("aws:lambda:demo")
///     .payment_url("https://pay/x")
///     .session_id("s1")
///     .build();
///
/// assert_eq!(body.error, "payment_required");
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequiredBody {
    #[builder(skip = PAYMENT_REQUIRED_ERROR.to_string())]
    pub error: String,
    #[builder(into)]
    pub reason: String,
    pub required: JsonObject,
    #[builder(into)]
    pub evaluated_plan: String,
    /// The resource the caller asked for.
    #[builder(into)]
    pub resource: String,
    #[builder(into)]
    pub payment_url: String,
    #[builder(into)]
    pub session_id: String,
}
