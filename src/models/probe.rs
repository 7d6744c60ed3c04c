// src/models/probe.rs

//! Connectivity probe result structures.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which query the probe sends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// `query Probe { __typename }`
    #[default]
    Minimal,
    /// Same `DiscoverDaily` shape the finder uses
    Discover,
}

impl ProbeMode {
    /// Parse a mode name; anything other than `discover` means minimal.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "discover" => ProbeMode::Discover,
            "minimal" => ProbeMode::Minimal,
            other => {
                log::warn!("Unknown probe mode {:?}, using minimal", other);
                ProbeMode::Minimal
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeMode::Minimal => "minimal",
            ProbeMode::Discover => "discover",
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic bucket for one probe outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    BlockedByEdgeAccessRules,
    UpstreamServerError,
    ClientOrAccessError,
    RequestReachedEndpoint,
    RuntimeNetworkOrEnvironmentError,
    Unknown,
}

impl Classification {
    pub fn description(&self) -> &'static str {
        match self {
            Classification::BlockedByEdgeAccessRules => "blocked by edge access rules",
            Classification::UpstreamServerError => "upstream server error",
            Classification::ClientOrAccessError => "client or access error",
            Classification::RequestReachedEndpoint => "request reached endpoint",
            Classification::RuntimeNetworkOrEnvironmentError => {
                "runtime network or environment error"
            }
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Classification plus the signals it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    /// Response came through a Cloudflare-style edge proxy
    pub is_edge_proxy: bool,

    /// Body carries the edge "error code: 1010" marker
    pub is_known_block_code: bool,

    pub classification: Classification,

    /// Suggested follow-up for the operator
    pub next_step: String,
}

/// What happened on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 2xx response; GraphQL-level errors may still be present
    Success {
        http_status: u16,
        response_headers: BTreeMap<String, String>,
        body_preview: String,
        graphql_errors: Option<Value>,
    },
    /// Any non-2xx response
    HttpFailure {
        http_status: u16,
        reason: Option<String>,
        response_headers: BTreeMap<String, String>,
        body_preview: String,
    },
    /// No response at all
    TransportFailure {
        exception_type: String,
        message: String,
    },
}

impl ProbeOutcome {
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Success { http_status, .. }
            | ProbeOutcome::HttpFailure { http_status, .. } => Some(*http_status),
            ProbeOutcome::TransportFailure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

/// Output of one probe invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    pub ok: bool,
    pub started_at: DateTime<Utc>,
    pub endpoint: String,
    pub mode: ProbeMode,

    #[serde(flatten)]
    pub outcome: ProbeOutcome,

    pub diagnosis: Diagnosis,

    /// Trigger payload of a hosted invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_echo: Option<Value>,
}

impl ProbeResult {
    /// Attach the trigger payload.
    pub fn with_event_echo(mut self, event: Value) -> Self {
        self.event_echo = Some(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(ProbeMode::parse_lenient(" DISCOVER "), ProbeMode::Discover);
        assert_eq!(ProbeMode::parse_lenient("minimal"), ProbeMode::Minimal);
        assert_eq!(ProbeMode::parse_lenient("full"), ProbeMode::Minimal);
    }

    #[test]
    fn test_result_flattens_outcome() {
        let result = ProbeResult {
            ok: false,
            started_at: Utc::now(),
            endpoint: "https://example.com/graphql".to_string(),
            mode: ProbeMode::Minimal,
            outcome: ProbeOutcome::TransportFailure {
                exception_type: "Timeout".to_string(),
                message: "timed out".to_string(),
            },
            diagnosis: Diagnosis {
                is_edge_proxy: false,
                is_known_block_code: false,
                classification: Classification::RuntimeNetworkOrEnvironmentError,
                next_step: "compare".to_string(),
            },
            event_echo: None,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["outcome"], "transport_failure");
        assert_eq!(value["exception_type"], "Timeout");
        assert_eq!(value["mode"], "minimal");
        assert_eq!(
            value["diagnosis"]["classification"],
            "runtime_network_or_environment_error"
        );
        assert!(value.get("event_echo").is_none());
    }
}
