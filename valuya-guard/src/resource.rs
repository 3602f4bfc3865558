//! Resource naming for guarded routes.

use valuya_core::errors::Error;

use crate::event::GuardEvent;

/// Build the canonical resource for an HTTP route, `http:route:<METHOD>:<path>`.
///
/// The method is trimmed and upper-cased; the path is kept exactly but must not
/// contain whitespace.
///
/// ```
/// use valuya_guard::resource::http_route_resource;
///
/// assert_eq!(
///     http_route_resource("get", "/reports/").unwrap(),
///     "http:route:GET:/reports/"
/// );
/// ```
pub fn http_route_resource(method: &str, path: &str) -> Result<String, Error> {
    let method = method.trim().to_uppercase();
    if method.is_empty() {
        return Err(Error::Config("HTTP method required".to_string()));
    }
    if path.is_empty() {
        return Err(Error::Config("HTTP path required".to_string()));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(Error::Config(format!(
            "Invalid HTTP path (contains whitespace): {path}"
        )));
    }

    Ok(format!("http:route:{method}:{path}"))
}

/// The resource to evaluate: the configured one, or the route the event targets.
pub fn resolve_resource(configured: &str, event: &GuardEvent) -> Result<String, Error> {
    let configured = configured.trim();
    if !configured.is_empty() {
        return Ok(configured.to_string());
    }

    match (event.http_method(), event.http_path()) {
        (Some(method), Some(path)) => http_route_resource(method, path),
        _ => Err(Error::Config("missing resource".to_string())),
    }
}
