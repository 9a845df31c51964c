//! Audit trail for account changes, emitted on the `audit` tracing target.
//!
//! ```ignore
//! AuditEvent::new(Some(caller.id), "user.update", AuditOutcome::Success)
//!     .with_resource("user", id)
//!     .with_request(&headers)
//!     .log();
//! ```

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
    Denied,
}

#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// Acting user, `None` for anonymous actions such as sign-up
    pub actor: Option<i32>,
    pub action: &'static str,
    /// e.g. `user:42`
    pub resource: Option<String>,
    pub outcome: AuditOutcome,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(actor: Option<i32>, action: &'static str, outcome: AuditOutcome) -> Self {
        Self {
            actor,
            action,
            resource: None,
            outcome,
            ip_address: None,
            user_agent: None,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn with_resource(mut self, kind: &str, id: impl Display) -> Self {
        self.resource = Some(format!("{kind}:{id}"));
        self
    }

    /// Client address and user agent from proxy-aware request headers
    pub fn with_request(mut self, headers: &HeaderMap) -> Self {
        self.ip_address = client_ip(headers);
        self.user_agent = header_str(headers, "user-agent").map(str::to_string);
        self
    }

    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    pub fn log(self) {
        tracing::info!(
            target: "audit",
            actor = self.actor,
            action = self.action,
            resource = self.resource.as_deref(),
            outcome = ?self.outcome,
            ip = self.ip_address.as_deref(),
            user_agent = self.user_agent.as_deref(),
            timestamp = %self.timestamp,
            details = ?self.details,
            "audit event"
        );
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// First `X-Forwarded-For` hop, falling back to `X-Real-IP`
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "x-forwarded-for")
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| header_str(headers, "x-real-ip").map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_request_context() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        headers.insert("user-agent", "curl/8.5".parse().unwrap());

        let event = AuditEvent::new(Some(3), "user.update", AuditOutcome::Success)
            .with_resource("user", 3)
            .with_request(&headers)
            .with_details(serde_json::json!({ "fields": ["email"] }));

        assert_eq!(event.resource.as_deref(), Some("user:3"));
        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(event.user_agent.as_deref(), Some("curl/8.5"));
        assert_eq!(event.details.as_ref().unwrap()["fields"][0], "email");
        event.log();
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.4".parse().unwrap());
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
