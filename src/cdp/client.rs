//! CDP client implementation
//!
//! This module provides a high-level CDP client with typed methods for common operations.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Number of `document.readyState` probes after a navigation
const READY_STATE_ATTEMPTS: u32 = 50;

/// Delay between two `document.readyState` probes
const READY_STATE_INTERVAL: Duration = Duration::from_millis(100);

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    ///
    /// # Arguments
    /// * `connection` - CDP connection instance
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        debug!("Creating CDP client");
        Self { connection }
    }

    /// Parse remote object value to evaluation result
    fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            "number" => EvaluationResult::Number(
                obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0),
            ),
            "boolean" => EvaluationResult::Bool(
                obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false),
            ),
            "object" if obj.subtype.as_deref() == Some("null") => EvaluationResult::Null,
            "object" => EvaluationResult::Object(obj.value.clone().unwrap_or(serde_json::Value::Null)),
            _ => EvaluationResult::Null,
        }
    }

    /// Poll `document.readyState` until `complete`
    async fn wait_for_ready_state(&self) -> bool {
        for attempt in 0..READY_STATE_ATTEMPTS {
            tokio::time::sleep(READY_STATE_INTERVAL).await;

            match self.evaluate("document.readyState", false).await {
                Ok(EvaluationResult::String(state)) if state == "complete" => {
                    debug!("Page loaded on attempt {}", attempt + 1);
                    return true;
                }
                Ok(state) => debug!("Document ready state on attempt {}: {:?}", attempt + 1, state),
                // The execution context is swapped during navigation
                Err(e) => debug!("Ready state probe {} failed: {}", attempt + 1, e),
            }
        }
        false
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        info!("Navigating to {}", url);

        let params = NavigateParams {
            url: url.to_string(),
            referrer: None,
        };

        let result = self
            .call_method("Page.navigate", serde_json::to_value(params)?)
            .await
            .map_err(|e| match e {
                Error::Cdp(msg) => Error::navigation(format!("{}: {}", url, msg)),
                other => other,
            })?;

        let reply: NavigateResponse = serde_json::from_value(result).unwrap_or_default();
        if let Some(error_text) = reply.error_text {
            return Err(Error::navigation(format!("{}: {}", url, error_text)));
        }

        let is_loaded = self.wait_for_ready_state().await;
        if !is_loaded {
            warn!("Page load polling timed out for {} - continuing anyway", url);
        }

        Ok(NavigationResult {
            loader_id: reply.loader_id,
            url: url.to_string(),
            is_loaded,
        })
    }

    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        let eval_response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse EvaluateResponse: {}", e)))?;

        if let Some(exception) = eval_response.exception_details {
            return Err(Error::script(exception.describe()));
        }

        Ok(Self::parse_remote_object(&eval_response.result))
    }

    async fn screenshot(&self, format: ScreenshotFormat) -> Result<Vec<u8>, Error> {
        debug!("Capturing screenshot");

        let params = match format {
            ScreenshotFormat::Png => serde_json::json!({ "format": "png" }),
            ScreenshotFormat::Jpeg(q) => serde_json::json!({ "format": "jpeg", "quality": q }),
        };

        let result = self.call_method("Page.captureScreenshot", params).await?;

        let data = result
            .get("data")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::cdp("No data in screenshot result"))?;

        BASE64
            .decode(data)
            .map_err(|e| Error::cdp(format!("Failed to decode screenshot: {}", e)))
    }

    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        debug!("Enabling domain: {}", domain);
        self.call_method(&format!("{}.enable", domain), serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn call_method(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;
        response.result.ok_or_else(|| Error::cdp("No result in response"))
    }

    async fn close(&self) -> Result<(), Error> {
        self.connection.close().await
    }

    fn is_active(&self) -> bool {
        self.connection.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(kind: &str, subtype: Option<&str>, value: Option<serde_json::Value>) -> RemoteObject {
        RemoteObject {
            r#type: kind.to_string(),
            subtype: subtype.map(str::to_string),
            value,
            description: None,
        }
    }

    #[test]
    fn test_parse_remote_object_string() {
        let result = CdpClientImpl::parse_remote_object(&remote("string", None, Some(serde_json::json!("cart"))));
        assert_eq!(result, EvaluationResult::String("cart".to_string()));
    }

    #[test]
    fn test_parse_remote_object_number() {
        let result = CdpClientImpl::parse_remote_object(&remote("number", None, Some(serde_json::json!(42.5))));
        assert_eq!(result, EvaluationResult::Number(42.5));
    }

    #[test]
    fn test_parse_remote_object_null_subtype() {
        let result = CdpClientImpl::parse_remote_object(&remote("object", Some("null"), None));
        assert_eq!(result, EvaluationResult::Null);
    }

    #[test]
    fn test_parse_remote_object_array() {
        let result = CdpClientImpl::parse_remote_object(&remote(
            "object",
            Some("array"),
            Some(serde_json::json!(["a", "b"])),
        ));
        assert_eq!(result, EvaluationResult::Object(serde_json::json!(["a", "b"])));
    }

    #[test]
    fn test_parse_remote_object_undefined() {
        let result = CdpClientImpl::parse_remote_object(&remote("undefined", None, None));
        assert_eq!(result, EvaluationResult::Null);
    }
}
