// src/services/probe.rs

//! Connectivity probe.
//!
//! Sends a single GraphQL request and reports what came back, classified into
//! a small diagnostic taxonomy. The probe never returns an error: transport
//! failures, error statuses and unparseable bodies all become data, so the
//! output can be compared across runtimes.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use crate::error::AppError;
use crate::models::{
    Classification, Config, Diagnosis, FinderConfig, ProbeConfig, ProbeMode, ProbeOutcome,
    ProbeResult,
};
use crate::services::query;
use crate::utils::http::{GraphQlRequest, GraphQlTransport, HttpTransport, RawResponse};

/// Marker the edge proxy puts in bodies of access-rule denials.
const BLOCK_CODE_MARKER: &str = "error code: 1010";

const NEXT_STEP_DEFAULT: &str =
    "Collect this output from local and hosted runs and compare their egress behavior.";
const NEXT_STEP_BLOCKED: &str = "The request is denied before GraphQL executes. Try a different \
     egress IP or runtime, or ask the endpoint owner for allowlisting or official API access.";
const NEXT_STEP_TRANSPORT: &str =
    "Check local DNS, proxy and firewall settings and compare them with the hosted runtime.";

/// Classify a probe outcome. First matching rule wins.
pub fn diagnose(
    http_status: Option<u16>,
    body: &str,
    headers: &BTreeMap<String, String>,
) -> Diagnosis {
    let is_known_block_code = body.to_lowercase().contains(BLOCK_CODE_MARKER);
    let is_edge_proxy = is_edge_proxy(headers);

    let (classification, next_step) = match http_status {
        Some(403) if is_known_block_code => {
            (Classification::BlockedByEdgeAccessRules, NEXT_STEP_BLOCKED)
        }
        Some(status) if status >= 500 => (Classification::UpstreamServerError, NEXT_STEP_DEFAULT),
        Some(400..=499) => (Classification::ClientOrAccessError, NEXT_STEP_DEFAULT),
        Some(200..=299) => (Classification::RequestReachedEndpoint, NEXT_STEP_DEFAULT),
        Some(_) => (Classification::Unknown, NEXT_STEP_DEFAULT),
        None => (
            Classification::RuntimeNetworkOrEnvironmentError,
            NEXT_STEP_TRANSPORT,
        ),
    };

    Diagnosis {
        is_edge_proxy,
        is_known_block_code,
        classification,
        next_step: next_step.to_string(),
    }
}

/// `Server: cloudflare` or any `CF-*` header.
fn is_edge_proxy(headers: &BTreeMap<String, String>) -> bool {
    headers.iter().any(|(name, value)| {
        let name = name.to_ascii_lowercase();
        (name == "server" && value.to_lowercase().contains("cloudflare")) || name.starts_with("cf-")
    })
}

/// First `max_chars` characters of `body`.
fn preview(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

/// `errors` member of a JSON object body, if any.
fn graphql_errors(body: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut map)) => map.remove("errors"),
        _ => None,
    }
}

/// Short name for the kind of failure that prevented a response.
fn exception_type(err: &AppError) -> &'static str {
    match err {
        AppError::Http(e) if e.is_timeout() => "Timeout",
        AppError::Http(e) if e.is_connect() => "ConnectError",
        AppError::Http(e) if e.is_builder() => "BuilderError",
        AppError::Http(e) if e.is_body() || e.is_decode() => "BodyError",
        AppError::Http(_) => "RequestError",
        AppError::Io(_) => "IoError",
        AppError::Json(_) => "JsonError",
        AppError::Url(_) => "UrlError",
        _ => "Error",
    }
}

/// Single-request endpoint diagnostic.
pub struct ConnectivityProbe {
    transport: Arc<dyn GraphQlTransport>,
    finder: FinderConfig,
    probe: ProbeConfig,
}

impl ConnectivityProbe {
    pub fn new(transport: Arc<dyn GraphQlTransport>, config: &Config) -> Self {
        Self {
            transport,
            finder: config.finder.clone(),
            probe: config.probe.clone(),
        }
    }

    /// Build an HTTP transport from `config` and probe with it.
    ///
    /// A client that cannot be built is reported like any other transport
    /// failure.
    pub async fn run_with_config(config: &Config) -> ProbeResult {
        let timeout = Duration::from_secs(config.probe.timeout_secs);
        match HttpTransport::new(&config.endpoint, timeout) {
            Ok(transport) => Self::new(Arc::new(transport), config).run().await,
            Err(e) => {
                log::error!("Failed to build HTTP client: {}", e);
                transport_failure_result(&config.endpoint.url, config.probe.mode, &e)
            }
        }
    }

    /// Request for the configured mode.
    pub fn request(&self) -> GraphQlRequest {
        match self.probe.mode {
            ProbeMode::Minimal => query::probe_minimal_request(),
            ProbeMode::Discover => query::probe_discover_request(&self.finder, self.probe.limit),
        }
    }

    /// Issue the request and classify the outcome.
    pub async fn run(&self) -> ProbeResult {
        let started_at = Utc::now();
        let request = self.request();

        log::info!(
            "Probing {} (mode={}, operation={})",
            self.transport.endpoint(),
            self.probe.mode,
            request.operation_name
        );

        let mut result = match self.transport.post(&request).await {
            Ok(response) => self.response_result(response),
            Err(e) => {
                log::warn!("Probe transport failure: {}", e);
                transport_failure_result(self.transport.endpoint(), self.probe.mode, &e)
            }
        };
        result.started_at = started_at;

        log::info!(
            "Probe finished: status={:?} classification={}",
            result.outcome.http_status(),
            result.diagnosis.classification
        );

        result
    }

    fn response_result(&self, response: RawResponse) -> ProbeResult {
        let diagnosis = diagnose(Some(response.status), &response.body, &response.headers);

        let outcome = if response.is_success() {
            ProbeOutcome::Success {
                http_status: response.status,
                body_preview: preview(&response.body, self.probe.success_preview_chars),
                graphql_errors: graphql_errors(&response.body),
                response_headers: response.headers,
            }
        } else {
            ProbeOutcome::HttpFailure {
                http_status: response.status,
                reason: response.reason,
                body_preview: preview(&response.body, self.probe.error_preview_chars),
                response_headers: response.headers,
            }
        };

        ProbeResult {
            ok: outcome.is_success(),
            started_at: Utc::now(),
            endpoint: self.transport.endpoint().to_string(),
            mode: self.probe.mode,
            outcome,
            diagnosis,
            event_echo: None,
        }
    }
}

fn transport_failure_result(endpoint: &str, mode: ProbeMode, err: &AppError) -> ProbeResult {
    ProbeResult {
        ok: false,
        started_at: Utc::now(),
        endpoint: endpoint.to_string(),
        mode,
        outcome: ProbeOutcome::TransportFailure {
            exception_type: exception_type(err).to_string(),
            message: err.to_string(),
        },
        diagnosis: diagnose(None, "", &BTreeMap::new()),
        event_echo: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::finder::tests::FakeTransport;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_blocked_by_edge_rules() {
        let d = diagnose(Some(403), "Error code: 1010", &BTreeMap::new());
        assert_eq!(d.classification, Classification::BlockedByEdgeAccessRules);
        assert!(d.is_known_block_code);
        assert!(d.next_step.contains("allowlisting"));
    }

    #[test]
    fn test_403_without_block_code_is_client_error() {
        let d = diagnose(Some(403), "forbidden", &BTreeMap::new());
        assert_eq!(d.classification, Classification::ClientOrAccessError);
        assert!(!d.is_known_block_code);
    }

    #[test]
    fn test_status_ranges() {
        let none = BTreeMap::new();
        assert_eq!(
            diagnose(Some(503), "error code: 1010", &none).classification,
            Classification::UpstreamServerError
        );
        assert_eq!(
            diagnose(Some(404), "", &none).classification,
            Classification::ClientOrAccessError
        );
        assert_eq!(
            diagnose(Some(200), "{\"data\":{}}", &none).classification,
            Classification::RequestReachedEndpoint
        );
        assert_eq!(
            diagnose(Some(301), "", &none).classification,
            Classification::Unknown
        );
        assert_eq!(
            diagnose(None, "", &none).classification,
            Classification::RuntimeNetworkOrEnvironmentError
        );
    }

    #[test]
    fn test_edge_proxy_detection_is_informational() {
        let d = diagnose(Some(200), "{}", &headers(&[("server", "Cloudflare")]));
        assert!(d.is_edge_proxy);
        assert_eq!(d.classification, Classification::RequestReachedEndpoint);

        assert!(diagnose(Some(200), "{}", &headers(&[("cf-ray", "8a1b")])).is_edge_proxy);
        assert!(diagnose(Some(200), "{}", &headers(&[("CF-Cache-Status", "HIT")])).is_edge_proxy);
        assert!(!diagnose(Some(200), "{}", &headers(&[("server", "nginx")])).is_edge_proxy);
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        assert_eq!(preview("ééééé", 3), "ééé");
        assert_eq!(preview("ab", 10), "ab");
    }

    #[tokio::test]
    async fn test_probe_success_reports_graphql_errors() {
        let body = r#"{"errors":[{"message":"not allowed"}]}"#;
        let transport = Arc::new(FakeTransport::ok(200, body));
        let probe = ConnectivityProbe::new(transport, &Config::default());

        let result = probe.run().await;
        assert!(result.ok);
        assert_eq!(
            result.diagnosis.classification,
            Classification::RequestReachedEndpoint
        );
        match result.outcome {
            ProbeOutcome::Success {
                http_status,
                graphql_errors,
                ..
            } => {
                assert_eq!(http_status, 200);
                assert_eq!(graphql_errors.unwrap()[0]["message"], "not allowed");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_success_with_non_json_body() {
        let transport = Arc::new(FakeTransport::ok(200, "<html>ok</html>"));
        let probe = ConnectivityProbe::new(transport, &Config::default());

        let result = probe.run().await;
        assert!(result.ok);
        assert!(matches!(
            result.outcome,
            ProbeOutcome::Success { graphql_errors: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_probe_blocked_response() {
        let body = format!("error code: 1010{}", "x".repeat(2000));
        let response = RawResponse {
            status: 403,
            reason: Some("Forbidden".to_string()),
            headers: headers(&[("server", "cloudflare"), ("cf-ray", "abc")]),
            body,
        };
        let probe = ConnectivityProbe::new(
            Arc::new(FakeTransport::with_response(response)),
            &Config::default(),
        );

        let result = probe.run().await;
        assert!(!result.ok);
        assert!(result.diagnosis.is_edge_proxy);
        assert_eq!(
            result.diagnosis.classification,
            Classification::BlockedByEdgeAccessRules
        );
        match result.outcome {
            ProbeOutcome::HttpFailure {
                http_status,
                reason,
                body_preview,
                ..
            } => {
                assert_eq!(http_status, 403);
                assert_eq!(reason.as_deref(), Some("Forbidden"));
                assert_eq!(body_preview.chars().count(), 1000);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_transport_failure_is_data() {
        let transport = Arc::new(FakeTransport::failing("connection reset"));
        let probe = ConnectivityProbe::new(transport, &Config::default());

        let result = probe.run().await;
        assert!(!result.ok);
        assert_eq!(
            result.diagnosis.classification,
            Classification::RuntimeNetworkOrEnvironmentError
        );
        match result.outcome {
            ProbeOutcome::TransportFailure {
                exception_type,
                message,
            } => {
                assert_eq!(exception_type, "IoError");
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_mode_selects_query() {
        let transport = Arc::new(FakeTransport::ok(200, "{}"));
        let mut config = Config::default();

        ConnectivityProbe::new(transport.clone(), &config).run().await;
        config.probe.mode = ProbeMode::Discover;
        let result = ConnectivityProbe::new(transport.clone(), &config).run().await;

        assert_eq!(result.mode, ProbeMode::Discover);
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].operation_name, "Probe");
        assert_eq!(requests[1].operation_name, "DiscoverDaily");
        assert_eq!(requests[1].variables["limit"], 10);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_data() {
        let mut config = Config::default();
        config.endpoint.url = "http://127.0.0.1:9/graphql".to_string();
        config.probe.timeout_secs = 2;

        let result = ConnectivityProbe::run_with_config(&config).await;
        assert!(!result.ok);
        assert_eq!(result.outcome.http_status(), None);
        assert_eq!(
            result.diagnosis.classification,
            Classification::RuntimeNetworkOrEnvironmentError
        );
    }
}
