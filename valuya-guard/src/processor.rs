//! The per-invocation gating states.
//!
//! [`Guard::handle`](crate::guard::Guard::handle) walks these in order. Each state
//! owns everything later states need, so nothing outlives one invocation.

use valuya_core::{
    errors::Error,
    service::EntitlementService,
    types::{
        AnyJson, CheckoutRequest, CheckoutSession, DEFAULT_DENIAL_REASON, EntitlementRequest,
        Entitlements, JsonObject, PaymentRequiredBody, Subject,
    },
};

use crate::{
    event::GuardEvent,
    guard::Guard,
    response::{GuardResponse, HandlerOutput},
};

/// Plan, resource and subject are known; nothing has been sent yet.
pub struct SubjectResolved<'g, S: EntitlementService> {
    pub guard: &'g Guard<S>,
    /// The raw event, handed to the wrapped handler unchanged.
    pub event: AnyJson,
    pub view: GuardEvent,
    pub plan: String,
    pub resource: String,
    pub subject: Subject,
}

impl<'g, S> SubjectResolved<'g, S>
where
    S: EntitlementService,
    S::Error: From<Error>,
{
    /// Ask the remote service for the subject's entitlement.
    pub async fn evaluate(self) -> Result<EntitlementEvaluated<'g, S>, S::Error> {
        let entitlements = self
            .guard
            .service
            .entitlements(EntitlementRequest {
                plan: self.plan.clone(),
                resource: self.resource.clone(),
                subject: self.subject.clone(),
            })
            .await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Entitlement evaluated: subject='{}', resource='{}', plan='{}', active={}, reason='{}'",
            self.subject,
            self.resource,
            self.plan,
            entitlements.active,
            entitlements.reason
        );

        Ok(EntitlementEvaluated {
            resolved: self,
            entitlements,
        })
    }
}

/// The remote decision is in.
pub struct EntitlementEvaluated<'g, S: EntitlementService> {
    pub resolved: SubjectResolved<'g, S>,
    pub entitlements: Entitlements,
}

impl<'g, S> EntitlementEvaluated<'g, S>
where
    S: EntitlementService,
    S::Error: From<Error>,
{
    pub fn is_allowed(&self) -> bool {
        self.entitlements.active
    }

    /// Run the wrapped handler with the original event and context.
    pub async fn run_handler<H, C, Fut>(self, context: C, handler: H) -> GuardResponse
    where
        H: FnOnce(AnyJson, C) -> Fut,
        Fut: Future,
        Fut::Output: Into<HandlerOutput>,
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Access allowed: subject='{}', resource='{}'",
            self.resolved.subject,
            self.resolved.resource
        );

        let output: HandlerOutput = handler(self.resolved.event, context).await.into();
        output.into_response()
    }

    /// The requirement presented at checkout and in the denial body.
    pub fn required(&self) -> JsonObject {
        self.entitlements.required_or_default(&self.resolved.plan)
    }

    /// Obtain a checkout session for the denied subject.
    pub async fn checkout(self) -> Result<CheckoutObtained<'g, S>, S::Error> {
        let required = self.required();
        let config = &self.resolved.guard.config;

        let session = self
            .resolved
            .guard
            .service
            .checkout_session(CheckoutRequest {
                plan: self.resolved.plan.clone(),
                resource: self.resolved.resource.clone(),
                subject: self.resolved.subject.clone(),
                required: required.clone(),
                success_url: config.success_url.clone(),
                cancel_url: config.cancel_url.clone(),
            })
            .await?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Checkout session created: subject='{}', resource='{}', session='{}'",
            self.resolved.subject,
            self.resolved.resource,
            session.session_id
        );

        Ok(CheckoutObtained {
            evaluated: self,
            required,
            session,
        })
    }
}

/// Access was denied and a checkout session is available.
pub struct CheckoutObtained<'g, S: EntitlementService> {
    pub evaluated: EntitlementEvaluated<'g, S>,
    pub required: JsonObject,
    pub session: CheckoutSession,
}

impl<S> CheckoutObtained<'_, S>
where
    S: EntitlementService,
    S::Error: From<Error>,
{
    /// The denial: a `402` JSON body, or a redirect for browsers when enabled.
    pub fn response(self) -> Result<GuardResponse, S::Error> {
        let resolved = &self.evaluated.resolved;

        if resolved.guard.config.redirect_browsers && wants_html(&resolved.view) {
            return Ok(GuardResponse::checkout_redirect(&self.session));
        }

        let reason = match self.evaluated.entitlements.reason.as_str() {
            "" => DEFAULT_DENIAL_REASON,
            reason => reason,
        };

        let body = PaymentRequiredBody::builder()
            .reason(reason)
            .required(self.required)
            .evaluated_plan(resolved.plan.as_str())
            .resource(resolved.resource.as_str())
            .payment_url(self.session.payment_url.as_str())
            .session_id(self.session.session_id.as_str())
            .build();

        Ok(GuardResponse::payment_required(&body)?)
    }
}

fn wants_html(view: &GuardEvent) -> bool {
    view.headers()
        .get("accept")
        .is_some_and(|accept| accept.contains("text/html"))
}
