//! Entitlement gate around a serverless handler.
//!
//! For details, see the [`Guard`] struct documentation.

use std::sync::Arc;

use bon::Builder;
use valuya_core::{errors::Error, service::EntitlementService, types::AnyJson};

use crate::{
    event::GuardEvent,
    processor::SubjectResolved,
    resource::resolve_resource,
    response::{GuardResponse, HandlerOutput},
    subject::{DefaultSubjectResolver, SubjectResolver},
};

/// Environment variable holding the process-wide default plan.
pub const DEFAULT_PLAN_ENV: &str = "DEFAULT_PLAN";

/// Plan used when neither the caller nor the environment names one.
pub const FALLBACK_PLAN: &str = "pro";

/// What a guard protects and where checkout should send the caller afterwards.
#[derive(Builder, Debug, Clone, Default)]
pub struct GuardConfig {
    /// The protected resource. When empty it is derived from the request route.
    #[builder(into, default)]
    pub resource: String,
    /// Explicit plan. Falls back to `DEFAULT_PLAN`, then `"pro"`.
    #[builder(into)]
    pub plan: Option<String>,
    #[builder(into, default)]
    pub success_url: String,
    #[builder(into, default)]
    pub cancel_url: String,
    /// Answer browsers (`accept: text/html`) with a redirect to checkout instead of a `402`.
    #[builder(default, with = || true)]
    pub redirect_browsers: bool,
}

/// Pick the plan for one guarded call.
///
/// The first non-empty of `explicit` and `process_default` is trimmed; if nothing
/// is left, [`FALLBACK_PLAN`] is used.
pub fn resolve_plan(explicit: Option<&str>, process_default: Option<&str>) -> String {
    [explicit, process_default]
        .into_iter()
        .flatten()
        .find(|plan| !plan.is_empty())
        .map(str::trim)
        .filter(|plan| !plan.is_empty())
        .unwrap_or(FALLBACK_PLAN)
        .to_string()
}

/// An entitlement gate backed by a remote [`EntitlementService`].
///
/// Every call to [`handle`](Guard::handle) runs one pass of the gating states in
/// [`processor`](crate::processor):
///
/// 1. **Resolve** ([`resolve`](Guard::resolve)): plan, resource and [`Subject`](valuya_core::types::Subject).
/// 2. **Evaluate** ([`SubjectResolved::evaluate`]): one entitlement query.
/// 3. **Allow** ([`run_handler`](crate::processor::EntitlementEvaluated::run_handler)):
///    when active, run the handler and normalize its output.
/// 4. **Deny** ([`checkout`](crate::processor::EntitlementEvaluated::checkout), then
///    [`response`](crate::processor::CheckoutObtained::response)): otherwise obtain
///    a checkout session and answer `402 Payment Required`.
///
/// Errors from any step are returned as is. The handler never runs after an error.
#[derive(Clone)]
pub struct Guard<S: EntitlementService> {
    pub service: S,
    pub config: GuardConfig,
    pub resolver: Arc<dyn SubjectResolver>,
}

impl<S> Guard<S>
where
    S: EntitlementService,
    S::Error: From<Error>,
{
    pub fn new(service: S, config: GuardConfig) -> Self {
        Guard {
            service,
            config,
            resolver: Arc::new(DefaultSubjectResolver),
        }
    }

    /// Replace the default subject resolution.
    pub fn with_resolver(mut self, resolver: impl SubjectResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Wrap `handler`, producing a guarded handler.
    pub fn wrap<H>(self, handler: H) -> Guarded<S, H> {
        Guarded {
            guard: self,
            handler,
        }
    }

    /// Entrypoint of a guarded invocation.
    ///
    /// Resolves plan, resource and subject. Plan resolution reads the
    /// environment on every call.
    pub fn resolve(&self, event: AnyJson) -> Result<SubjectResolved<'_, S>, Error> {
        let process_default = std::env::var(DEFAULT_PLAN_ENV).ok();
        let plan = resolve_plan(self.config.plan.as_deref(), process_default.as_deref());

        let view = GuardEvent::from_json(&event);
        let resource = resolve_resource(&self.config.resource, &view)?;
        let subject = self.resolver.resolve(&view);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Subject resolved: subject='{subject}', resource='{resource}', plan='{plan}'"
        );

        Ok(SubjectResolved {
            guard: self,
            event,
            view,
            plan,
            resource,
            subject,
        })
    }

    /// Standard guarded invocation.
    ///
    /// Runs `handler` only when the subject is entitled; otherwise answers with a
    /// checkout-backed denial.
    pub async fn handle<H, C, Fut>(
        &self,
        event: AnyJson,
        context: C,
        handler: H,
    ) -> Result<GuardResponse, S::Error>
    where
        H: FnOnce(AnyJson, C) -> Fut,
        Fut: Future,
        Fut::Output: Into<HandlerOutput>,
    {
        let evaluated = self.resolve(event)?.evaluate().await?;

        if evaluated.is_allowed() {
            return Ok(evaluated.run_handler(context, handler).await);
        }

        evaluated.checkout().await?.response()
    }
}

/// A handler wrapped by a [`Guard`].
#[derive(Clone)]
pub struct Guarded<S: EntitlementService, H> {
    pub guard: Guard<S>,
    pub handler: H,
}

impl<S, H> Guarded<S, H>
where
    S: EntitlementService,
    S::Error: From<Error>,
{
    /// Invoke the guarded handler.
    pub async fn call<C, Fut>(&self, event: AnyJson, context: C) -> Result<GuardResponse, S::Error>
    where
        H: Fn(AnyJson, C) -> Fut,
        Fut: Future,
        Fut::Output: Into<HandlerOutput>,
    {
        self.guard.handle(event, context, &self.handler).await
    }
}

/// Wrap `handler` so it only runs for subjects entitled under `config`.
///
/// ```no_run
/// # async fn run<S>(service: S) -> Result<(), S::Error>
/// # where S: valuya_core::service::EntitlementService, S::Error: From<valuya_core::errors::Error> {
/// use serde_json::json;
/// use valuya_guard::guard::{GuardConfig, guard};
///
/// let protected = guard(
///     service,
///     GuardConfig::builder().resource("aws:lambda:demo:api:v1").plan("pro").build(),
///     |_event: serde_json::Value, _context: ()| async { json!({"ok": true}) },
/// );
///
/// let _response = protected.call(json!({}), ()).await?;
/// # Ok(())
/// # }
/// ```
pub fn guard<S, H>(service: S, config: GuardConfig, handler: H) -> Guarded<S, H>
where
    S: EntitlementService,
    S::Error: From<Error>,
{
    Guard::new(service, config).wrap(handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_precedence() {
        assert_eq!(resolve_plan(Some("team"), Some("basic")), "team");
        assert_eq!(resolve_plan(None, Some("basic")), "basic");
        assert_eq!(resolve_plan(Some(""), Some("basic")), "basic");
        assert_eq!(resolve_plan(None, None), "pro");
        assert_eq!(resolve_plan(Some(" team "), None), "team");
        assert_eq!(resolve_plan(Some("   "), Some("basic")), "pro");
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = GuardConfig::builder().resource("aws:lambda:demo").build();
        assert_eq!(config.resource, "aws:lambda:demo");
        assert_eq!(config.plan, None);
        assert_eq!(config.success_url, "");
        assert!(!config.redirect_browsers);

        let config = GuardConfig::builder()
            .resource("r")
            .plan("team")
            .redirect_browsers()
            .build();
        assert_eq!(config.plan.as_deref(), Some("team"));
        assert!(config.redirect_browsers);
    }
}
