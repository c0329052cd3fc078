//! CDP-backed browser session
//!
//! Drives one browser tab over the DevTools protocol. Element lookups run as
//! page scripts that tag matched nodes, and input goes through the `Input`
//! domain so clicks and keystrokes look like a user's.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cdp::traits::{CdpBrowser, CdpClient, ScreenshotFormat};
use crate::cdp::{CdpBrowserImpl, CdpTimeoutConfig};
use crate::config::{BrowserKind, Config};
use crate::session::keys::{self, KeyInput};
use crate::session::scripts;
use crate::session::selector::By;
use crate::session::traits::{BrowserSession, Cookie, NodeId};
use crate::Error;

#[derive(Debug, Deserialize)]
struct NodeReply {
    stale: bool,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct ClickPoint {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    tag: String,
}

/// Browser session over a CDP client
#[derive(Debug)]
pub struct RemoteSession {
    kind: BrowserKind,
    client: Arc<dyn CdpClient>,
    browser: Option<Arc<dyn CdpBrowser>>,
    target_id: Option<String>,
    tag_prefix: String,
    closed: AtomicBool,
}

impl RemoteSession {
    /// Wrap an already connected client
    pub fn new(kind: BrowserKind, client: Arc<dyn CdpClient>) -> Self {
        Self {
            kind,
            client,
            browser: None,
            target_id: None,
            tag_prefix: Uuid::new_v4().simple().to_string()[..8].to_string(),
            closed: AtomicBool::new(false),
        }
    }

    /// Session owning its tab; closing the session closes the tab too
    pub fn attached(
        kind: BrowserKind,
        client: Arc<dyn CdpClient>,
        browser: Arc<dyn CdpBrowser>,
        target_id: String,
    ) -> Self {
        Self {
            browser: Some(browser),
            target_id: Some(target_id),
            ..Self::new(kind, client)
        }
    }

    /// Open a new tab on the configured debugging endpoint
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let timeouts = CdpTimeoutConfig::from_command_timeout(config.command_timeout_ms);
        let browser: Arc<dyn CdpBrowser> =
            Arc::new(CdpBrowserImpl::with_timeouts(config.cdp_endpoint.clone(), timeouts));
        Self::open(config, browser).await
    }

    /// Open a new tab through an existing browser connection
    pub async fn open(config: &Config, browser: Arc<dyn CdpBrowser>) -> Result<Self, Error> {
        let version = browser.get_version().await?;
        if !version.product.starts_with(config.browser.product_prefix()) {
            warn!(
                "Configured browser {} but endpoint reports {}",
                config.browser, version.product
            );
        }

        let target = browser.create_target("about:blank").await?;
        let client = browser.create_client(&target.ws_url).await?;
        info!(
            "Session opened on {} (target {})",
            version.product, target.target_id
        );

        let session = Self::attached(config.browser, client, browser, target.target_id);
        if let Err(e) = session
            .set_window_size(config.window_width, config.window_height)
            .await
        {
            debug!("Window resize not supported: {}", e);
        }
        Ok(session)
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::session("Browser session is closed"));
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, Error> {
        self.ensure_open()?;
        Ok(self.client.evaluate(script, false).await?.into_value())
    }

    async fn on_node(&self, node: &NodeId, body: &str) -> Result<Value, Error> {
        let raw = self.evaluate(&scripts::on_node(node, body)).await?;
        let reply: NodeReply = serde_json::from_value(raw)
            .map_err(|e| Error::script(format!("Unexpected node reply: {}", e)))?;
        if reply.stale {
            return Err(Error::stale_element(node.as_str()));
        }
        Ok(reply.value)
    }

    async fn click_point(&self, node: &NodeId) -> Result<ClickPoint, Error> {
        let value = self.on_node(node, scripts::CLICK_POINT).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::script(format!("Unexpected box reply: {}", e)))
    }

    async fn mouse(&self, kind: &str, x: f64, y: f64) -> Result<(), Error> {
        let mut params = json!({ "type": kind, "x": x, "y": y });
        if kind != "mouseMoved" {
            params["button"] = json!("left");
            params["clickCount"] = json!(1);
        }
        self.client
            .call_method("Input.dispatchMouseEvent", params)
            .await?;
        Ok(())
    }

    async fn press(&self, key: keys::Key) -> Result<(), Error> {
        let (dom_key, code, key_code) = key.descriptor();
        let mut down = json!({
            "type": "keyDown",
            "key": dom_key,
            "code": code,
            "windowsVirtualKeyCode": key_code,
        });
        if let Some(text) = key.text() {
            down["text"] = json!(text);
        }
        self.client.call_method("Input.dispatchKeyEvent", down).await?;
        self.client
            .call_method(
                "Input.dispatchKeyEvent",
                json!({
                    "type": "keyUp",
                    "key": dom_key,
                    "code": code,
                    "windowsVirtualKeyCode": key_code,
                }),
            )
            .await?;
        Ok(())
    }

    async fn window_id(&self) -> Result<i64, Error> {
        let reply = self
            .client
            .call_method("Browser.getWindowForTarget", json!({}))
            .await?;
        reply
            .get("windowId")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| Error::cdp("Browser.getWindowForTarget returned no windowId"))
    }
}

#[async_trait]
impl BrowserSession for RemoteSession {
    fn kind(&self) -> BrowserKind {
        self.kind
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        self.ensure_open()?;
        debug!("Navigating to {}", url);
        let result = self.client.navigate(url).await?;
        if !result.is_loaded {
            debug!("{} still loading after navigation", url);
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, Error> {
        match self.evaluate("window.location.href").await? {
            Value::String(url) => Ok(url),
            other => Err(Error::script(format!("Unexpected URL value: {}", other))),
        }
    }

    async fn title(&self) -> Result<String, Error> {
        match self.evaluate("document.title").await? {
            Value::String(title) => Ok(title),
            _ => Ok(String::new()),
        }
    }

    async fn refresh(&self) -> Result<(), Error> {
        self.ensure_open()?;
        self.client.call_method("Page.reload", json!({})).await?;
        Ok(())
    }

    async fn back(&self) -> Result<(), Error> {
        self.evaluate("history.back()").await?;
        Ok(())
    }

    async fn find_nodes(&self, selector: &By, scope: Option<&NodeId>) -> Result<Vec<NodeId>, Error> {
        let script = scripts::find_nodes(selector, scope, &self.tag_prefix);
        match self.evaluate(&script).await? {
            Value::Null => match scope {
                Some(node) => Err(Error::stale_element(node.as_str())),
                None => Ok(Vec::new()),
            },
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|v| v.as_str().map(NodeId::new))
                .collect()),
            other => Err(Error::script(format!("Unexpected lookup result: {}", other))),
        }
    }

    async fn click(&self, node: &NodeId) -> Result<(), Error> {
        let point = self.click_point(node).await?;

        if point.tag == "option" {
            self.on_node(node, scripts::SELECT_OPTION).await?;
            return Ok(());
        }
        if point.width <= 0.0 || point.height <= 0.0 {
            return Err(Error::script(format!("Element {} has no size", node)));
        }

        self.mouse("mousePressed", point.x, point.y).await?;
        self.mouse("mouseReleased", point.x, point.y).await
    }

    async fn execute_on(&self, node: &NodeId, body: &str) -> Result<Value, Error> {
        self.on_node(node, body).await
    }

    async fn execute_script(&self, script: &str) -> Result<Value, Error> {
        self.evaluate(script).await
    }

    async fn send_keys(&self, node: &NodeId, keys: &str) -> Result<(), Error> {
        self.on_node(node, scripts::FOCUS).await?;

        for chunk in keys::decode(keys) {
            match chunk {
                KeyInput::Text(text) => {
                    self.client
                        .call_method("Input.insertText", json!({ "text": text }))
                        .await?;
                }
                KeyInput::Key(key) => self.press(key).await?,
            }
        }
        Ok(())
    }

    async fn clear(&self, node: &NodeId) -> Result<(), Error> {
        self.on_node(node, scripts::CLEAR).await?;
        Ok(())
    }

    async fn text(&self, node: &NodeId) -> Result<String, Error> {
        match self.on_node(node, scripts::TEXT).await? {
            Value::String(text) => Ok(text),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>, Error> {
        match self.on_node(node, &scripts::attribute(name)).await? {
            Value::String(value) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    async fn property(&self, node: &NodeId, name: &str) -> Result<Value, Error> {
        self.on_node(node, &scripts::property(name)).await
    }

    async fn is_displayed(&self, node: &NodeId) -> Result<bool, Error> {
        Ok(self.on_node(node, scripts::IS_DISPLAYED).await?.as_bool().unwrap_or(false))
    }

    async fn is_selected(&self, node: &NodeId) -> Result<bool, Error> {
        Ok(self.on_node(node, scripts::IS_SELECTED).await?.as_bool().unwrap_or(false))
    }

    async fn hover(&self, node: &NodeId) -> Result<(), Error> {
        let point = self.click_point(node).await?;
        self.mouse("mouseMoved", point.x, point.y).await
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, Error> {
        self.ensure_open()?;
        let reply = self.client.call_method("Network.getCookies", json!({})).await?;
        let cookies = reply.get("cookies").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(cookies)?)
    }

    async fn add_cookie(&self, cookie: &Cookie) -> Result<(), Error> {
        let mut params = serde_json::to_value(cookie)?;
        if cookie.domain.is_none() {
            params["url"] = json!(self.current_url().await?);
        }
        let reply = self.client.call_method("Network.setCookie", params).await?;
        if reply.get("success").and_then(|v| v.as_bool()) == Some(false) {
            return Err(Error::cdp(format!("Browser rejected cookie {}", cookie.name)));
        }
        Ok(())
    }

    async fn delete_cookie(&self, name: &str) -> Result<(), Error> {
        let url = self.current_url().await?;
        self.client
            .call_method("Network.deleteCookies", json!({ "name": name, "url": url }))
            .await?;
        Ok(())
    }

    async fn delete_all_cookies(&self) -> Result<(), Error> {
        self.ensure_open()?;
        self.client
            .call_method("Network.clearBrowserCookies", json!({}))
            .await?;
        Ok(())
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<(), Error> {
        self.ensure_open()?;
        let window_id = self.window_id().await?;
        self.client
            .call_method(
                "Browser.setWindowBounds",
                json!({
                    "windowId": window_id,
                    "bounds": { "windowState": "normal", "width": width, "height": height },
                }),
            )
            .await?;
        Ok(())
    }

    async fn maximize_window(&self) -> Result<(), Error> {
        self.ensure_open()?;
        let window_id = self.window_id().await?;
        self.client
            .call_method(
                "Browser.setWindowBounds",
                json!({
                    "windowId": window_id,
                    "bounds": { "windowState": "maximized" },
                }),
            )
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        self.ensure_open()?;
        self.client.screenshot(ScreenshotFormat::Png).await
    }

    async fn close(&self) -> Result<(), Error> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut result = self.client.close().await;
        if let (Some(browser), Some(target_id)) = (&self.browser, &self.target_id) {
            if let Err(e) = browser.close_target(target_id).await {
                warn!("Failed to close target {}: {}", target_id, e);
            }
            if let Err(e) = browser.close().await {
                result = result.and(Err(e));
            }
        }
        info!("Session closed");
        result
    }

    fn is_active(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.client.is_active()
    }
}
