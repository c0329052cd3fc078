//! CDP browser control implementation
//!
//! Talks to the DevTools HTTP endpoint of a browser started with
//! `--remote-debugging-port` and opens WebSocket clients on its targets.

use super::client::CdpClientImpl;
use super::connection::{CdpTimeoutConfig, CdpWebSocketConnection};
use super::traits::*;
use crate::Error;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// CDP browser implementation
#[derive(Debug)]
pub struct CdpBrowserImpl {
    /// Browser endpoint (e.g., "ws://localhost:9222")
    endpoint: String,
    /// HTTP client for the discovery endpoints
    http: reqwest::Client,
    /// Command timeouts applied to new connections
    timeout_config: CdpTimeoutConfig,
    /// Active connections (target URL -> connection)
    connections: tokio::sync::Mutex<HashMap<String, Arc<dyn CdpConnection>>>,
}

impl CdpBrowserImpl {
    /// Create a new CDP browser controller
    ///
    /// # Arguments
    /// * `endpoint` - Browser endpoint (e.g., "ws://localhost:9222")
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self::with_timeouts(endpoint, CdpTimeoutConfig::default())
    }

    /// Create a controller whose connections use the given command timeouts
    pub fn with_timeouts<S: Into<String>>(endpoint: S, timeout_config: CdpTimeoutConfig) -> Self {
        let endpoint = endpoint.into();
        info!("Creating CDP browser controller for endpoint: {}", endpoint);
        Self {
            endpoint,
            http: reqwest::Client::new(),
            timeout_config,
            connections: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// HTTP form of the endpoint
    fn http_endpoint(&self) -> String {
        self.endpoint
            .trim_end_matches('/')
            .replace("ws://", "http://")
            .replace("wss://", "https://")
    }

    /// Fetch a discovery document
    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<serde_json::Value, Error> {
        let response = request.send().await.map_err(|e| {
            Error::session(format!(
                "Failed to reach CDP endpoint at {}. Start the browser with \
                 --remote-debugging-port=9222. Original error: {}",
                self.endpoint, e
            ))
        })?;

        let text = response.error_for_status()?.text().await?;
        debug!("CDP discovery response: {}", text);

        serde_json::from_str(&text)
            .map_err(|e| Error::session(format!("Invalid discovery response: {} ({})", e, text)))
    }

    fn str_field(json: &serde_json::Value, key: &str) -> String {
        json.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

#[async_trait]
impl CdpBrowser for CdpBrowserImpl {
    async fn create_client(&self, target_url: &str) -> Result<Arc<dyn CdpClient>, Error> {
        info!("Creating CDP client for target: {}", target_url);

        let connection = CdpWebSocketConnection::connect(target_url, self.timeout_config.clone()).await?;

        self.connections
            .lock()
            .await
            .insert(target_url.to_string(), Arc::clone(&connection) as Arc<dyn CdpConnection>);

        let client = Arc::new(CdpClientImpl::new(connection));

        for domain in ["Page", "Runtime", "Network", "DOM"] {
            client.enable_domain(domain).await?;
        }

        Ok(client)
    }

    async fn close(&self) -> Result<(), Error> {
        let mut connections = self.connections.lock().await;
        if connections.is_empty() {
            debug!("CdpBrowser::close: No active connections to close");
            return Ok(());
        }

        info!("CdpBrowser::close: Closing {} CDP connections", connections.len());

        for (target, connection) in connections.drain() {
            if let Err(e) = connection.close().await {
                warn!("CdpBrowser::close: Failed to close connection to {}: {}", target, e);
            }
        }

        Ok(())
    }

    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        let url = format!("{}/json/version", self.http_endpoint());
        let version_json = self.get_json(self.http.get(&url)).await?;

        Ok(BrowserVersion {
            protocol_version: Self::str_field(&version_json, "Protocol-Version"),
            product: Self::str_field(&version_json, "Browser"),
            user_agent: Self::str_field(&version_json, "User-Agent"),
        })
    }

    /// Create a new page target through the `/json/new` endpoint
    async fn create_target(&self, url: &str) -> Result<TargetInfo, Error> {
        let new_url = format!("{}/json/new?{}", self.http_endpoint(), url);
        debug!("Creating new page via HTTP API: {}", new_url);

        let target_json = self.get_json(self.http.put(&new_url)).await?;

        let ws_url = target_json
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::session("No webSocketDebuggerUrl in new target response"))?;

        Ok(TargetInfo {
            target_id: Self::str_field(&target_json, "id"),
            url: Self::str_field(&target_json, "url"),
            ws_url: ws_url.to_string(),
        })
    }

    async fn close_target(&self, target_id: &str) -> Result<(), Error> {
        let url = format!("{}/json/close/{}", self.http_endpoint(), target_id);
        debug!("Closing target via HTTP API: {}", url);

        self.http.get(&url).send().await?.error_for_status()?;
        Ok(())
    }
}
