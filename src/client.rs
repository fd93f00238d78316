//! Control API client for the proxy daemon

#[cfg(test)]
mod integration_tests;

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::{
        config::controller_base_url,
        DelayOutcome, ProxyDetails, Settings,
    },
};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, StatusCode, Url,
};
use serde_json::Value;

/// Operations the checker needs from the daemon's control API
#[async_trait]
pub trait ControlApi: Send + Sync {
    /// Names of every leaf proxy, in the order the daemon lists them
    async fn list_proxy_names(&self) -> Result<Vec<String>>;

    /// Decoded `GET /proxies/{name}` body
    async fn get_proxy_details(&self, name: &str) -> Result<ProxyDetails>;

    /// Ask the daemon to measure one proxy against the probe URL
    async fn get_proxy_delay(&self, name: &str) -> Result<DelayOutcome>;

    /// False for groups and built-ins that cannot be measured on their own
    async fn is_leaf_proxy(&self, name: &str) -> Result<bool> {
        let details = self.get_proxy_details(name).await?;
        Ok(details.kind().is_leaf())
    }
}

/// reqwest-backed control API client
pub struct ControllerClient {
    client: Client,
    base_url: Url,
    timeout_ms: u64,
    probe_url: String,
    concurrency: usize,
    logger: Logger,
}

impl ControllerClient {
    /// Create a client for the daemon listening on `controller` (`host:port`)
    pub fn new(controller: &str, secret: &str, timeout_ms: u64) -> Result<Self> {
        let base_url = controller_base_url(controller)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", secret))
            .map_err(|e| AppError::config(format!("Secret cannot be sent as a header: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        // No request timeout: the daemon bounds each delay check with `timeout_ms`
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout_ms,
            probe_url: crate::defaults::PROBE_URL.to_string(),
            concurrency: 1,
            logger: Logger::disabled(),
        })
    }

    /// Create a client from runtime settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(&settings.controller, &settings.secret, settings.timeout_ms)?
            .with_concurrency(settings.effective_concurrency()))
    }

    /// Fetch up to `concurrency` proxy details at once while listing
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Route this client's diagnostics through `logger`
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn probe_url(&self) -> &str {
        &self.probe_url
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Build `{base}/seg/seg...` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("Controller URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn delay_endpoint(&self, name: &str) -> Result<Url> {
        let mut url = self.endpoint(&["proxies", name, "delay"])?;
        url.query_pairs_mut()
            .append_pair("url", &self.probe_url)
            .append_pair("timeout", &self.timeout_ms.to_string());
        Ok(url)
    }

    /// Issue a GET and decode the body as JSON.
    ///
    /// Non-JSON bodies decode to `Value::Null` unless the status is a success,
    /// in which case the response is malformed.
    async fn get_json(&self, url: Url) -> Result<(StatusCode, Value)> {
        self.logger.debug("control API request")
            .field("url", url.as_str())
            .log();

        let response = self.client.get(url.clone()).send().await
            .map_err(|e| AppError::upstream(format!("GET {} failed: {}", url.path(), e)))?;

        let status = response.status();
        let body = response.text().await
            .map_err(|e| AppError::upstream(format!("Failed to read response from {}: {}", url.path(), e)))?;

        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&body) {
                Ok(value) => value,
                Err(e) if status.is_success() => {
                    return Err(AppError::upstream(format!("malformed JSON from {}: {}", url.path(), e)));
                }
                Err(_) => Value::Null,
            }
        };

        self.logger.trace("control API response")
            .field("url", url.as_str())
            .field("status", status.as_u16())
            .log();

        Ok((status, value))
    }
}

/// The daemon's `message` field, or the status text
fn daemon_message(status: StatusCode, body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.to_string())
}

/// Map statuses every endpoint treats the same way
fn reject_common_statuses(status: StatusCode, body: &Value, name: &str) -> Result<()> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(AppError::auth(format!("{}: {}", status, daemon_message(status, body))))
        }
        StatusCode::NOT_FOUND => Err(AppError::proxy_not_found(name)),
        _ => Ok(()),
    }
}

#[async_trait]
impl ControlApi for ControllerClient {
    async fn list_proxy_names(&self) -> Result<Vec<String>> {
        let (status, body) = self.get_json(self.endpoint(&["proxies"])?).await?;

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AppError::auth(format!("{}: {}", status, daemon_message(status, &body))));
        }
        if !status.is_success() {
            return Err(AppError::upstream(format!(
                "listing proxies failed with {}: {}", status, daemon_message(status, &body)
            )));
        }

        let members = body
            .get("proxies")
            .and_then(|proxies| proxies.get(crate::defaults::GLOBAL_GROUP))
            .and_then(|global| global.get("all"))
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::upstream("proxy table has no proxies.GLOBAL.all list"))?;

        let candidates = members
            .iter()
            .map(|member| {
                member.as_str().ok_or_else(|| {
                    AppError::upstream(format!("non-string entry in proxies.GLOBAL.all: {}", member))
                })
            })
            .collect::<Result<Vec<&str>>>()?;

        // `buffered` yields in input order whatever order the fetches finish in
        let leaf_checks: Vec<_> = candidates.iter().map(|name| self.is_leaf_proxy(name)).collect();
        let leaves: Vec<bool> = stream::iter(leaf_checks)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut names = Vec::with_capacity(candidates.len());
        for (name, is_leaf) in candidates.into_iter().zip(leaves) {
            if is_leaf {
                names.push(name.to_string());
            } else {
                self.logger.debug("skipping non-leaf entry")
                    .field("name", name)
                    .log();
            }
        }

        self.logger.info("listed leaf proxies")
            .field("total", members.len())
            .field("leaves", names.len())
            .log();

        Ok(names)
    }

    async fn get_proxy_details(&self, name: &str) -> Result<ProxyDetails> {
        let (status, body) = self.get_json(self.endpoint(&["proxies", name])?).await?;

        reject_common_statuses(status, &body, name)?;
        if !status.is_success() {
            return Err(AppError::upstream(format!(
                "details for '{}' failed with {}: {}", name, status, daemon_message(status, &body)
            )));
        }

        ProxyDetails::from_json(name, body)
    }

    async fn get_proxy_delay(&self, name: &str) -> Result<DelayOutcome> {
        let (status, body) = self.get_json(self.delay_endpoint(name)?).await?;

        reject_common_statuses(status, &body, name)?;

        // Failed checks come back as 408/503/504 with a `message`, which is an outcome
        if !body.is_object() {
            return Err(AppError::upstream(format!(
                "delay check for '{}' returned {} without a JSON object", name, status
            )));
        }

        let outcome = DelayOutcome::from_response(&body);
        self.logger.debug("delay checked")
            .field("name", name)
            .field("status", status.as_u16())
            .field("outcome", outcome.to_string())
            .log();

        Ok(outcome)
    }
}
