//! Subject resolution.
//!
//! See [`DefaultSubjectResolver`] for the resolution order.

use sha2::{Digest, Sha256};
use valuya_core::types::Subject;

use crate::event::GuardEvent;

/// Header carrying a caller-supplied anonymous identifier.
pub const ANON_ID_HEADER: &str = "x-valuya-anon-id";

/// Identity used when nothing about the caller is known.
pub const EPHEMERAL_ANON_ID: &str = "anon_ephemeral";

/// Derives the caller identity for an inbound event.
///
/// Resolution is total: an implementation always returns a [`Subject`].
pub trait SubjectResolver: Send + Sync {
    fn resolve(&self, event: &GuardEvent) -> Subject;
}

/// The default resolution order. First match wins:
///
/// 1. Authorizer identity: lambda `user_id`, JWT `sub`, then `principalId` (user).
/// 2. The `x-valuya-anon-id` header, matched case-insensitively (anon).
/// 3. A fingerprint of source IP and `user-agent` (anon, `anon_<32 hex>`).
/// 4. [`EPHEMERAL_ANON_ID`].
///
/// ```
/// use serde_json::json;
/// use valuya_core::types::Subject;
/// use valuya_guard::{event::GuardEvent, subject::{DefaultSubjectResolver, SubjectResolver}};
///
/// let event = GuardEvent::from_json(&json!({"headers": {"X-Valuya-Anon-Id": "abc"}}));
/// assert_eq!(DefaultSubjectResolver.resolve(&event), Subject::anon("abc"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSubjectResolver;

impl SubjectResolver for DefaultSubjectResolver {
    fn resolve(&self, event: &GuardEvent) -> Subject {
        if let Some(user_id) = event.authorizer_user_id() {
            return Subject::user(user_id);
        }

        let headers = event.headers();
        if let Some(anon_id) = headers.get(ANON_ID_HEADER).filter(|v| !v.is_empty()) {
            return Subject::anon(anon_id.as_str());
        }

        let ip = event.source_ip().unwrap_or_default();
        let user_agent = headers.get("user-agent").map(String::as_str).unwrap_or_default();

        fingerprint_id(ip, user_agent)
            .map(Subject::anon)
            .unwrap_or_else(|| Subject::anon(EPHEMERAL_ANON_ID))
    }
}

/// Deterministic anonymous id for an (ip, user-agent) pair.
///
/// Returns `None` when both parts are empty.
pub fn fingerprint_id(ip: &str, user_agent: &str) -> Option<String> {
    if ip.trim().is_empty() && user_agent.trim().is_empty() {
        return None;
    }

    let base = format!("{ip}|{user_agent}");
    let digest = hex::encode(Sha256::digest(base.trim().as_bytes()));
    Some(format!("anon_{}", &digest[..32]))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use valuya_core::types::SubjectType;

    use super::*;

    fn resolve(event: serde_json::Value) -> Subject {
        DefaultSubjectResolver.resolve(&GuardEvent::from_json(&event))
    }

    #[test]
    fn test_authorizer_wins_over_anon_header() {
        let subject = resolve(json!({
            "headers": {"x-valuya-anon-id": "abc"},
            "requestContext": {"authorizer": {"jwt": {"claims": {"sub": "user-42"}}}}
        }));
        assert_eq!(subject, Subject::user("user-42"));
    }

    #[test]
    fn test_authorizer_survives_mistyped_method() {
        let subject = resolve(json!({
            "requestContext": {"authorizer": {"principalId": "u1"}, "httpMethod": 5}
        }));
        assert_eq!(subject, Subject::user("u1"));
    }

    #[test]
    fn test_anon_header_any_casing() {
        for name in ["x-valuya-anon-id", "X-VALUYA-ANON-ID", "X-Valuya-Anon-Id"] {
            let subject = resolve(json!({
                "headers": {name: "abc", "user-agent": "curl/8"},
                "requestContext": {"http": {"sourceIp": "1.2.3.4"}}
            }));
            assert_eq!(subject, Subject::anon("abc"), "header name {name}");
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let event = json!({
            "headers": {"User-Agent": "Mozilla/5.0"},
            "requestContext": {"http": {"sourceIp": "203.0.113.7"}}
        });

        let first = resolve(event.clone());
        let second = resolve(event);

        assert_eq!(first, second);
        assert_eq!(first.subject_type, SubjectType::Anon);
        assert!(first.id.starts_with("anon_"));
        assert_eq!(first.id.len(), "anon_".len() + 32);
        assert!(first.id["anon_".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_matches_sha256_prefix() {
        let expected = hex::encode(Sha256::digest(b"203.0.113.7|Mozilla/5.0"));
        assert_eq!(
            fingerprint_id("203.0.113.7", "Mozilla/5.0"),
            Some(format!("anon_{}", &expected[..32]))
        );
    }

    #[test]
    fn test_different_callers_get_different_ids() {
        assert_ne!(
            fingerprint_id("203.0.113.7", "Mozilla/5.0"),
            fingerprint_id("203.0.113.8", "Mozilla/5.0")
        );
        assert_ne!(
            fingerprint_id("203.0.113.7", "Mozilla/5.0"),
            fingerprint_id("203.0.113.7", "curl/8")
        );
    }

    #[test]
    fn test_only_user_agent_still_fingerprints() {
        let subject = resolve(json!({"headers": {"user-agent": "curl/8"}}));
        assert_ne!(subject.id, EPHEMERAL_ANON_ID);
        assert!(subject.id.starts_with("anon_"));
    }

    #[test]
    fn test_nothing_known_is_ephemeral() {
        assert_eq!(resolve(json!({})), Subject::anon(EPHEMERAL_ANON_ID));
        assert_eq!(
            resolve(json!({"headers": {"user-agent": "  "}})),
            Subject::anon(EPHEMERAL_ANON_ID)
        );
    }
}
