//! Proxy entries, delay outcomes and per-proxy reports

use crate::error::{AppError, Result};
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind tag of a proxy entry as reported by the daemon.
///
/// Only the tags that mark non-leaf entries get their own variant; every
/// other tag (ss, vmess, trojan, ...) is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyKind {
    Direct,
    Reject,
    Selector,
    UrlTest,
    Relay,
    Fallback,
    Other(String),
}

impl ProxyKind {
    /// Parse a kind tag. Matching is case-sensitive; both the control API
    /// spelling (`URLTest`) and the profile spelling (`url-test`) are known.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Direct" | "direct" => Self::Direct,
            "Reject" | "reject" => Self::Reject,
            "Selector" | "selector" => Self::Selector,
            "URLTest" | "url-test" => Self::UrlTest,
            "Relay" | "relay" => Self::Relay,
            "Fallback" | "fallback" => Self::Fallback,
            other => Self::Other(other.to_string()),
        }
    }

    /// True for entries that cannot be measured on their own
    pub fn is_excluded(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// True for entries whose delay is worth checking
    pub fn is_leaf(&self) -> bool {
        !self.is_excluded()
    }
}

/// Details of one proxy entry, returned verbatim by the daemon
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyDetails {
    name: String,
    kind: ProxyKind,
    raw: Value,
}

impl ProxyDetails {
    /// Wrap a decoded `GET /proxies/{name}` body
    pub fn from_json(name: &str, raw: Value) -> Result<Self> {
        let tag = raw
            .as_object()
            .ok_or_else(|| AppError::upstream(format!("details for '{}' are not a JSON object", name)))?
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::upstream(format!("details for '{}' have no string 'type' field", name)))?;

        Ok(Self {
            name: name.to_string(),
            kind: ProxyKind::from_tag(tag),
            raw,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ProxyKind {
        &self.kind
    }

    /// The `type` tag exactly as the daemon sent it
    pub fn tag(&self) -> &str {
        self.raw.get("type").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }
}

/// Result of a delay check as reported by the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayOutcome {
    /// Round-trip time in milliseconds
    Delay(u64),
    /// The daemon's failure message (timeout, connection error, ...)
    Failed(String),
}

impl DelayOutcome {
    /// Decode a delay response body.
    ///
    /// A `delay` field wins whenever it holds a number, including 0; the
    /// `message` field is only consulted when no delay is present.
    pub fn from_response(body: &Value) -> Self {
        let delay = body.get("delay").and_then(|value| {
            value
                .as_u64()
                .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        });

        if let Some(delay) = delay {
            return Self::Delay(delay);
        }

        match body.get("message") {
            Some(Value::String(message)) => Self::Failed(message.clone()),
            Some(Value::Null) | None => Self::Failed("no delay or message in response".to_string()),
            Some(other) => Self::Failed(other.to_string()),
        }
    }

    pub fn delay_ms(&self) -> Option<u64> {
        match self {
            Self::Delay(ms) => Some(*ms),
            Self::Failed(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Delay(_))
    }
}

impl fmt::Display for DelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delay(ms) => write!(f, "{}", ms),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

/// What happened when one proxy was checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// The daemon answered the delay check
    Measured(DelayOutcome),
    /// The request itself failed and the failure was isolated to this proxy
    Error(String),
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Measured(outcome) => outcome.fmt(f),
            Self::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyReport {
    /// Position in the list returned by the daemon
    pub index: usize,
    pub name: String,
    pub outcome: CheckOutcome,
    pub severity: Severity,
}

impl ProxyReport {
    /// Report for a delay check the daemon answered
    pub fn measured(index: usize, name: String, outcome: DelayOutcome) -> Self {
        let severity = Severity::from_outcome(&outcome);
        Self {
            index,
            name,
            outcome: CheckOutcome::Measured(outcome),
            severity,
        }
    }

    /// Report for a delay check that failed before the daemon could answer
    pub fn errored(index: usize, name: String, error: &AppError) -> Self {
        Self {
            index,
            name,
            outcome: CheckOutcome::Error(error.to_string()),
            severity: Severity::Bad,
        }
    }

    /// Numeric delay, if the daemon returned one
    pub fn delay_ms(&self) -> Option<u64> {
        match &self.outcome {
            CheckOutcome::Measured(outcome) => outcome.delay_ms(),
            CheckOutcome::Error(_) => None,
        }
    }

    /// Proxies with a numeric delay are the ones worth saving
    pub fn is_healthy(&self) -> bool {
        self.delay_ms().is_some()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_daemon_and_profile_tags() {
        for tag in ["Direct", "Reject", "Selector", "URLTest", "Relay", "Fallback"] {
            assert!(ProxyKind::from_tag(tag).is_excluded(), "{} should be excluded", tag);
        }
        for tag in ["direct", "reject", "selector", "url-test", "relay", "fallback"] {
            assert!(ProxyKind::from_tag(tag).is_excluded(), "{} should be excluded", tag);
        }
        assert_eq!(ProxyKind::from_tag("Shadowsocks"), ProxyKind::Other("Shadowsocks".to_string()));
        assert!(ProxyKind::from_tag("Vmess").is_leaf());
    }

    #[test]
    fn test_kind_matching_is_case_sensitive() {
        assert!(ProxyKind::from_tag("SELECTOR").is_leaf());
        assert!(ProxyKind::from_tag("urltest").is_leaf());
    }

    #[test]
    fn test_details_from_json() {
        let raw = json!({"type": "Trojan", "name": "JP", "udp": true, "history": []});
        let details = ProxyDetails::from_json("JP", raw.clone()).unwrap();
        assert_eq!(details.name(), "JP");
        assert_eq!(details.tag(), "Trojan");
        assert!(details.kind().is_leaf());
        assert_eq!(details.into_raw(), raw);
    }

    #[test]
    fn test_details_without_type_is_upstream_error() {
        let err = ProxyDetails::from_json("x", json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        let err = ProxyDetails::from_json("x", json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn test_delay_outcome_decoding() {
        assert_eq!(DelayOutcome::from_response(&json!({"delay": 320})), DelayOutcome::Delay(320));
        assert_eq!(
            DelayOutcome::from_response(&json!({"message": "timeout"})),
            DelayOutcome::Failed("timeout".to_string())
        );
        assert_eq!(
            DelayOutcome::from_response(&json!({})),
            DelayOutcome::Failed("no delay or message in response".to_string())
        );
    }

    #[test]
    fn test_zero_delay_is_numeric() {
        let outcome = DelayOutcome::from_response(&json!({"delay": 0, "message": "ignored"}));
        assert_eq!(outcome, DelayOutcome::Delay(0));
        assert!(outcome.is_numeric());
    }

    #[test]
    fn test_report_helpers() {
        let report = ProxyReport::measured(0, "A".to_string(), DelayOutcome::Delay(650));
        assert_eq!(report.severity, Severity::Degraded);
        assert!(report.is_healthy());
        assert_eq!(report.outcome.to_string(), "650");

        let report = ProxyReport::errored(1, "B".to_string(), &AppError::upstream("refused"));
        assert_eq!(report.severity, Severity::Bad);
        assert!(!report.is_healthy());
        assert!(report.is_error());
        assert!(report.outcome.to_string().starts_with("error: "));
    }
}
