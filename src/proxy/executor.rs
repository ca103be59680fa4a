//! Outbound request execution.
//!
//! Performs the call described by a validated `RequestConfig` and always
//! yields an envelope. Transport failures become synthesized envelopes with
//! status code 0; 4xx/5xx replies from the target are ordinary results.

use super::response_builder::{build_failure, build_response};
use super::types::{RawResponse, RequestConfig, ResponseEnvelope};
use crate::config::DEFAULT_TIMEOUT_MS;
use crate::error::ExecutionError;
use crate::shared::RequestTimer;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Executes outbound calls with a fixed timeout.
///
/// The client carries no default headers, so only caller-supplied headers are
/// forwarded. Redirects follow reqwest's default policy.
#[derive(Clone)]
pub struct ProxyExecutor {
    client: reqwest::Client,
    timeout: Duration,
}

impl ProxyExecutor {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs the call and returns the normalized envelope.
    pub async fn execute(&self, config: &RequestConfig) -> ResponseEnvelope {
        let target = match build_target_url(&config.url, &config.query_params) {
            Ok(url) => url,
            Err(e) => return build_failure(&e, 0),
        };

        let mut timer = RequestTimer::start();
        let outcome = self.dispatch(config, target).await;
        timer.stop();

        match outcome {
            Ok(raw) => {
                tracing::debug!(
                    status = raw.status,
                    elapsed_ms = timer.elapsed_ms(),
                    "Target responded"
                );
                build_response(raw, timer.elapsed_ms())
            }
            Err(e) => {
                tracing::warn!(
                    code = e.code(),
                    error = %e,
                    url = %config.url,
                    "Outbound request failed"
                );
                build_failure(&e, timer.elapsed_ms())
            }
        }
    }

    async fn dispatch(
        &self,
        config: &RequestConfig,
        target: Url,
    ) -> Result<RawResponse, ExecutionError> {
        let json_body = match config.body.as_deref() {
            Some(body) if config.method.allows_body() && !body.is_empty() => {
                Some(serde_json::from_str::<Value>(body)?)
            }
            _ => None,
        };

        let mut builder = self
            .client
            .request(config.method.to_reqwest(), target)
            .headers(build_header_map(&config.headers));

        if let Some(body) = &json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body_bytes = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body_bytes,
        })
    }
}

impl Default for ProxyExecutor {
    fn default() -> Self {
        let timeout = Duration::from_millis(DEFAULT_TIMEOUT_MS);
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }
}

/// Appends every non-empty query parameter to `url`, in key order.
///
/// The stored `url` is left untouched; only the dispatched URL changes.
pub fn build_target_url(
    url: &str,
    query_params: &HashMap<String, String>,
) -> Result<Url, ExecutionError> {
    let mut target =
        Url::parse(url).map_err(|e| ExecutionError::Other(format!("Invalid URL: {}", e)))?;

    let mut params: Vec<(&String, &String)> =
        query_params.iter().filter(|(_, v)| !v.is_empty()).collect();
    if params.is_empty() {
        return Ok(target);
    }
    params.sort();

    {
        let mut pairs = target.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    Ok(target)
}

/// Converts caller headers, skipping any that are not valid HTTP.
///
/// Names that collide case-insensitively resolve in sorted key order: the
/// last spelling wins.
fn build_header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut keys: Vec<&String> = headers.keys().collect();
    keys.sort();

    let mut map = HeaderMap::with_capacity(headers.len());
    for key in keys {
        let value = &headers[key];
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                if map.insert(name, value).is_some() {
                    tracing::warn!(header = %key, "Request header given more than once, keeping last");
                }
            }
            _ => tracing::warn!(header = %key, "Skipping invalid request header"),
        }
    }
    map
}

/// Flattens response headers; repeated names are joined with ", ".
fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = HashMap::with_capacity(headers.len());
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).to_string();
        out.entry(name.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}
