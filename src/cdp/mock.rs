//! Mock CDP implementation for testing
//!
//! `MockCdpClient` records every command it receives and answers evaluations
//! from a list of scripted replies, so the CDP-backed session can be tested
//! without a browser.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cdp::traits::*;
use crate::Error;

/// Minimal 1x1 PNG returned by mock screenshots
pub const MOCK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xDE,
];

type Reply = Result<EvaluationResult, String>;

// A panicking test must not poison the recorder for the assertions after it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Mock CDP client
#[derive(Debug, Default)]
pub struct MockCdpClient {
    closed: AtomicBool,
    url: Mutex<Option<String>>,
    calls: Mutex<Vec<(String, serde_json::Value)>>,
    scripts: Mutex<Vec<String>>,
    // (fragment, reply); first registered fragment contained in the script wins
    replies: Mutex<Vec<(String, Reply)>>,
    method_replies: Mutex<Vec<(String, Result<serde_json::Value, String>)>>,
}

impl MockCdpClient {
    /// Create a new mock CDP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer scripts containing `fragment` with `result`
    pub fn reply_to(&self, fragment: &str, result: EvaluationResult) -> &Self {
        lock(&self.replies).push((fragment.to_string(), Ok(result)));
        self
    }

    /// Make scripts containing `fragment` throw
    pub fn throw_on(&self, fragment: &str, message: &str) -> &Self {
        lock(&self.replies).push((fragment.to_string(), Err(message.to_string())));
        self
    }

    /// Answer a raw CDP method with `result`
    pub fn reply_to_method(&self, method: &str, result: serde_json::Value) -> &Self {
        lock(&self.method_replies).push((method.to_string(), Ok(result)));
        self
    }

    /// Make a raw CDP method fail with a protocol error
    pub fn fail_method(&self, method: &str, message: &str) -> &Self {
        lock(&self.method_replies).push((method.to_string(), Err(message.to_string())));
        self
    }

    /// Raw method calls received so far
    pub fn calls(&self) -> Vec<(String, serde_json::Value)> {
        lock(&self.calls).clone()
    }

    /// Calls of one method
    pub fn calls_to(&self, method: &str) -> Vec<serde_json::Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }

    /// Scripts evaluated so far
    pub fn scripts(&self) -> Vec<String> {
        lock(&self.scripts).clone()
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::session("Connection is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl CdpClient for MockCdpClient {
    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        self.ensure_open()?;
        lock(&self.calls).push(("Page.navigate".to_string(), serde_json::json!({ "url": url })));
        *lock(&self.url) = Some(url.to_string());

        Ok(NavigationResult {
            loader_id: Some(uuid::Uuid::new_v4().to_string()),
            url: url.to_string(),
            is_loaded: true,
        })
    }

    async fn evaluate(&self, script: &str, _await_promise: bool) -> Result<EvaluationResult, Error> {
        self.ensure_open()?;
        lock(&self.scripts).push(script.to_string());

        let scripted = lock(&self.replies)
            .iter()
            .find(|(fragment, _)| script.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        match scripted {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(Error::script(message)),
            None if script.contains("window.location.href") => Ok(EvaluationResult::String(
                lock(&self.url).clone().unwrap_or_default(),
            )),
            None => Ok(EvaluationResult::Null),
        }
    }

    async fn screenshot(&self, _format: ScreenshotFormat) -> Result<Vec<u8>, Error> {
        self.ensure_open()?;
        Ok(MOCK_PNG.to_vec())
    }

    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        self.call_method(&format!("{}.enable", domain), serde_json::json!({}))
            .await
            .map(|_| ())
    }

    async fn call_method(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        self.ensure_open()?;
        lock(&self.calls).push((method.to_string(), params));

        let scripted = lock(&self.method_replies)
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, reply)| reply.clone());

        match scripted {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(Error::cdp(format!("{}: {}", method, message))),
            None => Ok(serde_json::json!({})),
        }
    }

    async fn close(&self) -> Result<(), Error> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

/// Mock CDP browser
#[derive(Debug)]
pub struct MockCdpBrowser {
    is_active: AtomicBool,
    product: String,
}

impl MockCdpBrowser {
    /// Create a new mock CDP browser reporting a Chrome product
    pub fn new() -> Self {
        Self::with_product("Chrome/120.0.0.0")
    }

    /// Create a mock browser reporting the given product string
    pub fn with_product(product: &str) -> Self {
        Self {
            is_active: AtomicBool::new(true),
            product: product.to_string(),
        }
    }
}

impl Default for MockCdpBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpBrowser for MockCdpBrowser {
    async fn create_client(&self, _target_url: &str) -> Result<Arc<dyn CdpClient>, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::session("Browser is closed"));
        }
        Ok(Arc::new(MockCdpClient::new()))
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn get_version(&self) -> Result<BrowserVersion, Error> {
        Ok(BrowserVersion {
            protocol_version: "1.3".to_string(),
            product: self.product.clone(),
            user_agent: format!("Mock {}", self.product),
        })
    }

    async fn create_target(&self, url: &str) -> Result<TargetInfo, Error> {
        if !self.is_active.load(Ordering::SeqCst) {
            return Err(Error::session("Browser is closed"));
        }

        let target_id = uuid::Uuid::new_v4().to_string();
        let ws_url = format!("ws://localhost:9222/devtools/page/{}", target_id);
        tracing::debug!("Mock: Created target {} for {}", target_id, url);

        Ok(TargetInfo {
            target_id,
            url: url.to_string(),
            ws_url,
        })
    }

    async fn close_target(&self, _target_id: &str) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_scripted_replies() {
        let client = MockCdpClient::new();
        client
            .reply_to("document.title", EvaluationResult::String("Cart".to_string()))
            .throw_on("broken()", "ReferenceError: broken is not defined");

        assert_eq!(
            client.evaluate("document.title", false).await.unwrap(),
            EvaluationResult::String("Cart".to_string())
        );
        assert!(matches!(
            client.evaluate("broken()", false).await,
            Err(Error::Script(_))
        ));
        assert_eq!(client.scripts().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_client_tracks_url() {
        let client = MockCdpClient::new();
        client.navigate("https://example.test/cart").await.unwrap();

        assert_eq!(
            client.evaluate("window.location.href", false).await.unwrap(),
            EvaluationResult::String("https://example.test/cart".to_string())
        );
        assert_eq!(client.calls_to("Page.navigate").len(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_closed() {
        let client = MockCdpClient::new();
        client.close().await.unwrap();
        assert!(!client.is_active());
        assert!(matches!(
            client.call_method("Page.reload", serde_json::json!({})).await,
            Err(Error::Session(_))
        ));
    }

    #[test]
    fn test_mock_client_survives_poisoned_lock() {
        let client = Arc::new(MockCdpClient::new());
        let poisoner = Arc::clone(&client);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.scripts.lock().unwrap();
            panic!("recorder poisoned");
        })
        .join();

        assert!(client.scripts.is_poisoned());
        assert!(client.scripts().is_empty());
        client.reply_to("document.title", EvaluationResult::String("Cart".to_string()));
        assert_eq!(
            tokio_test::block_on(client.evaluate("document.title", false)).unwrap(),
            EvaluationResult::String("Cart".to_string())
        );
        assert_eq!(client.scripts().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_browser() {
        let browser = MockCdpBrowser::new();
        let target = browser.create_target("about:blank").await.unwrap();
        assert!(target.ws_url.ends_with(&target.target_id));

        let version = browser.get_version().await.unwrap();
        assert_eq!(version.product, "Chrome/120.0.0.0");

        browser.close().await.unwrap();
        assert!(browser.create_client(&target.ws_url).await.is_err());
    }
}
