//! CDP WebSocket connection implementation
//!
//! This module provides WebSocket-based connection to Chrome DevTools Protocol.

use super::traits::{CdpConnection, CdpError as CdpErrorResponse, CdpResponse};
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingMap = Arc<Mutex<HashMap<u64, PendingCommand>>>;

/// CDP timeout configuration
#[derive(Debug, Clone)]
pub struct CdpTimeoutConfig {
    /// Default timeout for most commands (milliseconds)
    pub default_timeout_ms: u64,
    /// Timeout for screenshot commands (milliseconds)
    pub screenshot_timeout_ms: u64,
    /// Timeout for page navigation commands (milliseconds)
    pub navigation_timeout_ms: u64,
}

impl Default for CdpTimeoutConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            screenshot_timeout_ms: 90_000,
            navigation_timeout_ms: 60_000,
        }
    }
}

impl CdpTimeoutConfig {
    /// Scale every timeout from a single command budget
    pub fn from_command_timeout(command_timeout_ms: u64) -> Self {
        Self {
            default_timeout_ms: command_timeout_ms,
            screenshot_timeout_ms: command_timeout_ms * 3,
            navigation_timeout_ms: command_timeout_ms * 2,
        }
    }

    /// Get timeout duration for a specific command method
    fn get_timeout_for_command(&self, method: &str) -> tokio::time::Duration {
        let method_lower = method.to_lowercase();

        let ms = if method_lower.contains("screenshot") || method_lower.contains("capture") {
            self.screenshot_timeout_ms
        } else if method_lower.contains("navigate") || method_lower.contains("reload") {
            self.navigation_timeout_ms
        } else {
            self.default_timeout_ms
        };

        tokio::time::Duration::from_millis(ms)
    }
}

/// Pending command response
#[derive(Debug)]
struct PendingCommand {
    /// Response channel sender
    sender: oneshot::Sender<CdpResponse>,
    /// Command method (for logging)
    method: String,
}

/// CDP WebSocket connection implementation
#[derive(Debug)]
pub struct CdpWebSocketConnection {
    /// WebSocket URL
    url: String,
    /// Write half of the socket
    sink: Mutex<SplitSink<WsStream, Message>>,
    /// Next command ID
    next_id: AtomicU64,
    /// Pending commands (ID -> response sender)
    pending_commands: PendingMap,
    /// Is connection active
    is_active: Arc<AtomicBool>,
    /// Timeout configuration
    timeout_config: CdpTimeoutConfig,
}

impl CdpWebSocketConnection {
    /// Connect to a target WebSocket URL
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://localhost:9222/devtools/page/ABC123")
    pub async fn connect<S: Into<String>>(
        url: S,
        timeout_config: CdpTimeoutConfig,
    ) -> Result<Arc<Self>, Error> {
        let url = url.into();
        info!("Connecting to WebSocket: {}", url);

        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::session(format!("Failed to connect to {}: {}", url, e)))?;

        let (sink, stream) = ws_stream.split();
        let pending_commands: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let is_active = Arc::new(AtomicBool::new(true));

        tokio::spawn(Self::read_loop(
            stream,
            Arc::clone(&pending_commands),
            Arc::clone(&is_active),
        ));

        info!("WebSocket connection established");

        Ok(Arc::new(Self {
            url,
            sink: Mutex::new(sink),
            next_id: AtomicU64::new(1),
            pending_commands,
            is_active,
            timeout_config,
        }))
    }

    /// Target URL this connection is attached to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Reader task: routes replies to their waiters until the socket closes
    async fn read_loop(mut stream: SplitStream<WsStream>, pending: PendingMap, is_active: Arc<AtomicBool>) {
        debug!("CDP read loop started");

        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => Self::handle_message(&text, &pending).await,
                Ok(Message::Close(_)) => {
                    info!("WebSocket close frame received");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket read error, deactivating connection: {}", e);
                    break;
                }
            }
        }

        is_active.store(false, Ordering::SeqCst);

        // Dropping the senders wakes every waiter with a closed-channel error
        let dropped = pending.lock().await.drain().count();
        if dropped > 0 {
            warn!("{} CDP commands abandoned by closed connection", dropped);
        }
        debug!("CDP read loop exited");
    }

    /// Handle incoming WebSocket message
    async fn handle_message(text: &str, pending: &PendingMap) {
        // Events carry no id and are not consumed by this crate
        let response = match serde_json::from_str::<CdpRpcResponse>(text) {
            Ok(response) => response,
            Err(_) => {
                debug!("Ignoring CDP event: {}", text);
                return;
            }
        };

        let Some(pending_cmd) = pending.lock().await.remove(&response.id) else {
            warn!("Received response for unknown command ID: {}", response.id);
            return;
        };

        debug!("Response for command {}: {}", response.id, pending_cmd.method);

        let cdp_response = CdpResponse {
            id: response.id,
            result: Some(response.result),
            error: response.error.map(|e| CdpErrorResponse {
                code: e.code,
                message: e.message,
                data: e.data,
            }),
        };

        let _ = pending_cmd.sender.send(cdp_response);
    }
}

#[async_trait]
impl CdpConnection for CdpWebSocketConnection {
    /// Send a CDP command and wait for response
    async fn send_command(&self, method: &str, params: serde_json::Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::session("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        };

        let json = serde_json::to_string(&request)?;
        debug!("Sending CDP command {}: {}", id, method);

        let (sender, receiver) = oneshot::channel();
        self.pending_commands.lock().await.insert(
            id,
            PendingCommand {
                sender,
                method: method.to_string(),
            },
        );

        if let Err(e) = self.sink.lock().await.send(Message::Text(json)).await {
            self.pending_commands.lock().await.remove(&id);
            error!("Failed to send CDP command {}: {}", method, e);
            return Err(e.into());
        }

        let timeout_duration = self.timeout_config.get_timeout_for_command(method);

        match tokio::time::timeout(timeout_duration, receiver).await {
            Ok(Ok(response)) => {
                if let Some(error) = &response.error {
                    return Err(Error::cdp(format!(
                        "{}: {} (code: {})",
                        method, error.message, error.code
                    )));
                }
                Ok(response)
            }
            Ok(Err(_)) => Err(Error::session(format!(
                "Connection closed while waiting for {}",
                method
            ))),
            Err(_) => {
                self.pending_commands.lock().await.remove(&id);
                Err(Error::session(format!(
                    "Command {} timed out after {:?}",
                    method, timeout_duration
                )))
            }
        }
    }

    /// Close the connection
    async fn close(&self) -> Result<(), Error> {
        if !self.is_active.swap(false, Ordering::SeqCst) {
            debug!("CDP connection to {} already closed", self.url);
            return Ok(());
        }

        info!("Closing CDP WebSocket connection to {}", self.url);

        if let Err(e) = self.sink.lock().await.close().await {
            warn!("Failed to close WebSocket cleanly: {}", e);
        }

        Ok(())
    }

    /// Check if connection is active
    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::SeqCst)
    }
}
