//! Stub Chrome DevTools Protocol server
//!
//! Answers the commands a `RemoteSession` sends over a real WebSocket, so the
//! transport, client and session layers run end to end without a browser.
//! Page scripts are recognised by the markers they carry rather than executed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};

use storefront_pom::cdp::{
    CdpClient, CdpClientImpl, CdpConnection, CdpTimeoutConfig, CdpWebSocketConnection,
};
use storefront_pom::session::RemoteSession;
use storefront_pom::{Browser, BrowserKind, Config};

/// Node id the stub hands out for `#checkout`
pub const CHECKOUT_NODE: &str = "stub-1";

#[derive(Debug, Default)]
struct StubState {
    url: String,
    methods: Vec<String>,
    mouse_events: Vec<String>,
    inserted_text: String,
}

/// Stub server bound to a local port
pub struct MockChromeServer {
    addr: String,
    state: Arc<Mutex<StubState>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockChromeServer {
    /// Start the stub server
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = format!("ws://{}", listener.local_addr()?);
        let state = Arc::new(Mutex::new(StubState {
            url: "about:blank".to_string(),
            ..Default::default()
        }));

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let accept_state = Arc::clone(&state);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => match result {
                        Ok((stream, _)) => {
                            tokio::spawn(Self::handle_connection(stream, Arc::clone(&accept_state)));
                        }
                        Err(e) => {
                            tracing::error!("Stub Chrome: accept error: {}", e);
                            break;
                        }
                    },
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    async fn handle_connection(stream: TcpStream, state: Arc<Mutex<StubState>>) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                tracing::error!("Stub Chrome: handshake error: {}", e);
                return;
            }
        };
        let (mut sender, mut receiver) = ws_stream.split();

        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    let Ok(request) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    let reply = Self::respond(&request, &state);
                    if sender.send(Message::Text(reply.to_string())).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    }

    fn respond(request: &Value, state: &Mutex<StubState>) -> Value {
        let id = request["id"].as_u64().unwrap_or(0);
        let method = request["method"].as_str().unwrap_or_default();
        let params = &request["params"];
        let mut state = state.lock().unwrap();
        state.methods.push(method.to_string());

        let result = match method {
            "Page.navigate" => {
                state.url = params["url"].as_str().unwrap_or_default().to_string();
                json!({ "frameId": "stub-frame", "loaderId": "stub-loader" })
            }
            "Runtime.evaluate" => {
                let expression = params["expression"].as_str().unwrap_or_default();
                json!({ "result": Self::evaluate(expression, &state) })
            }
            "Input.dispatchMouseEvent" => {
                let kind = params["type"].as_str().unwrap_or_default().to_string();
                state.mouse_events.push(kind);
                json!({})
            }
            "Input.insertText" => {
                let text = params["text"].as_str().unwrap_or_default().to_string();
                state.inserted_text.push_str(&text);
                json!({})
            }
            "Input.dispatchKeyEvent" | "Browser.setWindowBounds" | "Network.clearBrowserCookies" => {
                json!({})
            }
            "Browser.getWindowForTarget" => json!({ "windowId": 1 }),
            "Network.getCookies" => json!({
                "cookies": [{ "name": "cart", "value": "3", "domain": "example.test", "path": "/" }]
            }),
            "Page.captureScreenshot" => json!({
                "data": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg=="
            }),
            _ => {
                return json!({
                    "id": id,
                    "error": { "code": -32601, "message": format!("'{}' wasn't found", method) }
                })
            }
        };
        json!({ "id": id, "result": result })
    }

    fn evaluate(expression: &str, state: &StubState) -> Value {
        if expression == "document.readyState" {
            return json!({ "type": "string", "value": "complete" });
        }
        if expression == "window.location.href" {
            return json!({ "type": "string", "value": state.url });
        }
        if expression == "document.title" {
            return json!({ "type": "string", "value": "Stub Shop" });
        }
        if expression.contains("__pomSeq") {
            let found: Vec<&str> = if expression.contains("#checkout") {
                vec![CHECKOUT_NODE]
            } else {
                Vec::new()
            };
            return json!({ "type": "object", "subtype": "array", "value": found });
        }
        if expression.contains("{stale: true}") {
            if !expression.contains(CHECKOUT_NODE) {
                return json!({ "type": "object", "value": { "stale": true } });
            }
            let value = if expression.contains("tag: el.tagName") {
                json!({ "x": 120.0, "y": 40.0, "width": 80.0, "height": 24.0, "tag": "button" })
            } else if expression.contains("innerText") {
                json!("Checkout")
            } else {
                json!(true)
            };
            return json!({ "type": "object", "value": { "stale": false, "value": value } });
        }
        json!({ "type": "undefined" })
    }

    /// WebSocket endpoint of the stub
    pub fn ws_endpoint(&self) -> &str {
        &self.addr
    }

    /// CDP methods received so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.state.lock().unwrap().methods.clone()
    }

    pub fn mouse_events(&self) -> Vec<String> {
        self.state.lock().unwrap().mouse_events.clone()
    }

    pub fn inserted_text(&self) -> String {
        self.state.lock().unwrap().inserted_text.clone()
    }

    /// Browser handle over a session connected to this stub
    pub async fn browser(&self, config: &Config) -> anyhow::Result<Browser> {
        let connection: Arc<dyn CdpConnection> = CdpWebSocketConnection::connect(
            self.ws_endpoint(),
            CdpTimeoutConfig::from_command_timeout(2_000),
        )
        .await?;
        let client: Arc<dyn CdpClient> = Arc::new(CdpClientImpl::new(connection));
        let session = RemoteSession::new(BrowserKind::Chrome, client);
        Ok(Browser::new(Arc::new(session), config))
    }
}

impl Drop for MockChromeServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storefront_pom::{By, Error, Locators};

    fn config() -> Config {
        Config {
            base_url: "https://example.test".to_string(),
            wait_timeout_ms: 300,
            poll_interval_ms: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_mock_chrome_startup() {
        let server = MockChromeServer::start().await.unwrap();
        assert!(server.ws_endpoint().starts_with("ws://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_navigate_and_read_url() {
        let server = MockChromeServer::start().await.unwrap();
        let browser = server.browser(&config()).await.unwrap();

        browser.navigate("https://example.test/cart").await.unwrap();
        assert_eq!(browser.current_url().await.unwrap(), "https://example.test/cart");
        assert_eq!(browser.title().await.unwrap(), "Stub Shop");
        assert!(server.methods().contains(&"Page.navigate".to_string()));
    }

    #[tokio::test]
    async fn test_native_click_dispatches_mouse_events() {
        let server = MockChromeServer::start().await.unwrap();
        let browser = server.browser(&config()).await.unwrap();
        let checkout = Locators::new(&browser).button(By::css("#checkout"), "checkoutButton");

        let button = checkout.get();
        assert_eq!(button.text().await.unwrap(), "Checkout");
        button.click().await.unwrap();

        assert_eq!(server.mouse_events(), vec!["mousePressed", "mouseReleased"]);
    }

    #[tokio::test]
    async fn test_missing_element_over_the_wire() {
        let server = MockChromeServer::start().await.unwrap();
        let browser = server.browser(&config()).await.unwrap();
        let coupon = Locators::new(&browser).component(By::css("#coupon"), "couponField");

        assert!(!coupon.get().is_displayed().await);
        assert!(matches!(coupon.get().text().await, Err(Error::ElementNotFound(_))));
    }

    #[tokio::test]
    async fn test_typing_and_cookies() {
        let server = MockChromeServer::start().await.unwrap();
        let browser = server.browser(&config()).await.unwrap();
        let field = Locators::new(&browser).text_input(By::css("#checkout"), "checkoutField");

        field.get().type_text("SAVE10").await.unwrap();
        assert_eq!(server.inserted_text(), "SAVE10");

        let cart = browser.get_cookie("cart").await.unwrap().unwrap();
        assert_eq!(cart.value, "3");
    }

    #[tokio::test]
    async fn test_screenshot_and_close() {
        let server = MockChromeServer::start().await.unwrap();
        let browser = server.browser(&config()).await.unwrap();
        let dir = std::env::temp_dir().join(format!("pom-stub-{}", std::process::id()));
        let path = dir.join("shots").join("cart.png");

        browser.take_screenshot(&path).await.unwrap();
        assert!(tokio::fs::metadata(&path).await.unwrap().len() > 0);
        let _ = tokio::fs::remove_dir_all(&dir).await;

        browser.close().await.unwrap();
        browser.close().await.unwrap();
        assert!(browser.is_closed());
        assert!(matches!(
            browser
                .wait_any(storefront_pom::wait::url_contains_value("cart"), Some(Duration::from_millis(50)), None)
                .await,
            Err(Error::Session(_))
        ));
    }
}
