// src/utils/http.rs

//! GraphQL-over-HTTP transport.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::EndpointConfig;

/// Header asserting the unauthenticated role.
pub const ROLE_HEADER: &str = "x-hasura-role";

/// A single GraphQL operation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub operation_name: String,
    pub query: String,
    pub variables: Value,
}

impl GraphQlRequest {
    pub fn new(
        operation_name: impl Into<String>,
        query: impl Into<String>,
        variables: Value,
    ) -> Self {
        Self {
            operation_name: operation_name.into(),
            query: query.into(),
            variables,
        }
    }
}

/// A response as received, whatever its status.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts GraphQL operations to the configured endpoint.
///
/// Implementations must return non-2xx responses as `Ok` with their body and
/// headers intact; only failures that produce no response are errors.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    /// Endpoint the transport talks to.
    fn endpoint(&self) -> &str;

    async fn post(&self, request: &GraphQlRequest) -> Result<RawResponse>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(user_agent: Option<&str>, timeout: Duration) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(agent) = user_agent {
        builder = builder.user_agent(agent);
    }
    Ok(builder.build()?)
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    role: String,
}

impl HttpTransport {
    /// Create a transport with its own client.
    pub fn new(config: &EndpointConfig, timeout: Duration) -> Result<Self> {
        let client = create_async_client(config.user_agent.as_deref(), timeout)?;
        Ok(Self::with_client(client, config))
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: Client, config: &EndpointConfig) -> Self {
        Self {
            client,
            endpoint: config.url.clone(),
            role: config.role.clone(),
        }
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &GraphQlRequest) -> Result<RawResponse> {
        let payload = serde_json::to_vec(request)?;

        log::debug!(
            "POST {} operation={}",
            self.endpoint,
            request.operation_name
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ROLE_HEADER, &self.role)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let headers = flatten_headers(response.headers());
        let bytes = response.bytes().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Collapse a header map into one string per name, joining repeats.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}
