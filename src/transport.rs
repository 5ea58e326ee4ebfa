//! HTTP transports for the node and explorer services
//!
//! The node speaks JSON command arrays over POST; the explorer is a
//! lookup-by-hash GET. Both are behind traits so the facade and pipeline
//! can be exercised against test doubles. Connection failures, timeouts,
//! and HTTP error statuses each surface as their own error kind and are
//! never collapsed into "empty" results.

use crate::config::{ExplorerConfig, NodeConfig};
use crate::error::{ClientError, ClientResult};

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Write/read path to the live node
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// POST a command array and return the raw JSON reply
    async fn call(&self, command: Value) -> ClientResult<Value>;
}

/// Historical lookup path to the explorer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExplorerTransport: Send + Sync {
    /// Fetch a transaction record by hash; `None` when the explorer has no
    /// record for it (an expected outcome, not an error)
    async fn fetch_tx(&self, hash: &str) -> ClientResult<Option<Value>>;
}

/// Node transport over HTTP with multiple endpoints and failover
#[derive(Debug)]
pub struct HttpNodeTransport {
    http: reqwest::Client,
    urls: Vec<String>,
}

impl HttpNodeTransport {
    pub fn new(config: &NodeConfig) -> ClientResult<Self> {
        if config.urls.is_empty() {
            return Err(ClientError::Config(
                "no node URLs configured".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            urls: config.urls.clone(),
        })
    }
}

#[async_trait]
impl NodeTransport for HttpNodeTransport {
    async fn call(&self, command: Value) -> ClientResult<Value> {
        let mut last_error = None;

        for url in &self.urls {
            let result: ClientResult<Value> = async {
                let response = self
                    .http
                    .post(url)
                    .json(&command)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.json().await?)
            }
            .await;

            match result {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(url = %url, error = %e, "Node request failed, trying next endpoint");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ClientError::Transport("all node endpoints failed".to_string())))
    }
}

/// Explorer transport over HTTP
pub struct HttpExplorerTransport {
    http: reqwest::Client,
    url: String,
}

impl HttpExplorerTransport {
    pub fn new(config: &ExplorerConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn tx_url(&self, hash: &str) -> String {
        // hashes are base64 and can carry '/' and '+'
        format!(
            "{}/tx/{}",
            self.url,
            urlencode(hash)
        )
    }
}

#[async_trait]
impl ExplorerTransport for HttpExplorerTransport {
    async fn fetch_tx(&self, hash: &str) -> ClientResult<Option<Value>> {
        let response = self.http.get(self.tx_url(hash)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(hash = %hash, "Explorer has no record yet");
            return Ok(None);
        }

        let response = response.error_for_status()?;
        Ok(Some(response.json().await?))
    }
}

fn urlencode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_config(urls: Vec<String>) -> NodeConfig {
        NodeConfig {
            urls,
            request_timeout_secs: 1,
        }
    }

    #[test]
    fn test_requires_at_least_one_url() {
        let err = HttpNodeTransport::new(&node_config(vec![])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_tx_url_escapes_base64_hashes() {
        let transport = HttpExplorerTransport::new(&ExplorerConfig {
            url: "http://explorer:8080/".to_string(),
            request_timeout_secs: 1,
        })
        .unwrap();

        assert_eq!(
            transport.tx_url("cQui/wY2+dqc="),
            "http://explorer:8080/tx/cQui%2FwY2%2Bdqc%3D"
        );
    }

    #[test]
    fn test_unreachable_node_surfaces_transport_error() {
        let transport =
            HttpNodeTransport::new(&node_config(vec!["http://127.0.0.1:1".to_string()])).unwrap();

        let err = tokio_test::block_on(transport.call(serde_json::json!(["height"]))).unwrap_err();
        assert!(err.is_transport());
    }
}
