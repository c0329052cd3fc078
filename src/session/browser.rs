//! Browser handle
//!
//! `Browser` is the one handle a scenario holds. It wraps a `BrowserSession`,
//! hands out lazy element references, and runs the polling loop behind every
//! explicit wait.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::{BrowserKind, Config};
use crate::session::element::{ElementList, ElementRef};
use crate::session::remote::RemoteSession;
use crate::session::selector::By;
use crate::session::traits::{BrowserSession, Cookie};
use crate::wait::Condition;
use crate::{Error, Result};

/// Timing used by explicit waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    pub timeout: Duration,
    pub long_timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.wait_timeout(),
            long_timeout: config.long_wait_timeout(),
            poll_interval: config.poll_interval(),
        }
    }
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug)]
struct BrowserInner {
    session: Arc<dyn BrowserSession>,
    settings: WaitSettings,
    closed: AtomicBool,
}

/// Handle to the browser driving a scenario
#[derive(Debug, Clone)]
pub struct Browser {
    inner: Arc<BrowserInner>,
}

impl Browser {
    /// Wrap an existing session
    pub fn new(session: Arc<dyn BrowserSession>, config: &Config) -> Self {
        Self::with_settings(session, WaitSettings::from_config(config))
    }

    pub fn with_settings(session: Arc<dyn BrowserSession>, settings: WaitSettings) -> Self {
        Self {
            inner: Arc::new(BrowserInner {
                session,
                settings,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Open a tab on the configured debugging endpoint
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let session = RemoteSession::connect(config).await?;
        info!("Browser {} connected at {}", config.browser, config.cdp_endpoint);
        Ok(Self::new(Arc::new(session), config))
    }

    pub fn session(&self) -> &Arc<dyn BrowserSession> {
        &self.inner.session
    }

    pub fn settings(&self) -> WaitSettings {
        self.inner.settings
    }

    pub fn kind(&self) -> BrowserKind {
        self.inner.session.kind()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Load an absolute URL
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigate: {}", url);
        self.inner
            .session
            .navigate(url)
            .await
            .map_err(|e| match e {
                Error::Navigation(_) | Error::Session(_) => e,
                other => Error::navigation(format!("{}: {}", url, other)),
            })
    }

    /// Lazy reference to the first element matching `selector`
    pub fn find_element(&self, selector: By) -> ElementRef {
        let label = selector.label_for(selector.value());
        ElementRef::new(self.clone(), selector, label)
    }

    /// Lazy reference with a caller-chosen diagnostic label
    pub fn find_element_labeled(&self, selector: By, label: impl Into<String>) -> ElementRef {
        ElementRef::new(self.clone(), selector, label.into())
    }

    /// Lazy lookup of every element matching `selector`
    pub fn find_elements(&self, selector: By) -> ElementList {
        let label = selector.label_for(selector.value());
        ElementList::new(self.clone(), selector, label)
    }

    pub fn find_elements_labeled(&self, selector: By, label: impl Into<String>) -> ElementList {
        ElementList::new(self.clone(), selector, label.into())
    }

    pub async fn current_url(&self) -> Result<String> {
        self.inner.session.current_url().await
    }

    pub async fn title(&self) -> Result<String> {
        self.inner.session.title().await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.inner.session.refresh().await
    }

    pub async fn back(&self) -> Result<()> {
        self.inner.session.back().await
    }

    pub async fn execute_script(&self, script: &str) -> Result<serde_json::Value> {
        self.inner.session.execute_script(script).await
    }

    pub async fn maximize_window(&self) -> Result<()> {
        self.inner.session.maximize_window().await
    }

    pub async fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        self.inner.session.set_window_size(width, height).await
    }

    /// End the session; later calls are no-ops
    pub async fn close(&self) -> Result<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            trace!("Browser already closed");
            return Ok(());
        }
        self.inner.session.close().await
    }

    pub async fn clear_cookies(&self) -> Result<()> {
        self.inner.session.delete_all_cookies().await
    }

    pub async fn add_cookie(&self, cookie: &Cookie) -> Result<()> {
        self.inner.session.add_cookie(cookie).await
    }

    pub async fn delete_cookie(&self, name: &str) -> Result<()> {
        self.inner.session.delete_cookie(name).await
    }

    pub async fn get_cookie(&self, name: &str) -> Result<Option<Cookie>> {
        Ok(self
            .inner
            .session
            .cookies()
            .await?
            .into_iter()
            .find(|c| c.name == name))
    }

    pub async fn get_cookies(&self) -> Result<Vec<Cookie>> {
        self.inner.session.cookies().await
    }

    /// Unconditional pause
    pub async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Write a PNG screenshot, creating parent directories as needed
    pub async fn take_screenshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let png = self.inner.session.screenshot().await?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, png).await?;
        info!("Screenshot saved to {}", path.display());
        Ok(())
    }

    /// Poll `condition` until it holds
    ///
    /// Errors raised by the condition count as "not yet". On expiry the error
    /// carries `message`, or the condition's name when no message is given.
    #[instrument(level = "debug", skip(self, condition), fields(condition = condition.name()))]
    pub async fn wait(
        &self,
        condition: Condition,
        timeout: Option<Duration>,
        message: Option<&str>,
    ) -> Result<()> {
        self.poll(std::slice::from_ref(&condition), timeout, message).await
    }

    /// Poll until any of `conditions` holds, checking them in order each tick
    #[instrument(level = "debug", skip(self, conditions))]
    pub async fn wait_any(
        &self,
        conditions: impl Into<Vec<Condition>>,
        timeout: Option<Duration>,
        message: Option<&str>,
    ) -> Result<()> {
        let conditions: Vec<Condition> = conditions.into();
        if conditions.is_empty() {
            return Err(Error::configuration("wait_any needs at least one condition"));
        }
        self.poll(&conditions, timeout, message).await
    }

    async fn poll(
        &self,
        conditions: &[Condition],
        timeout: Option<Duration>,
        message: Option<&str>,
    ) -> Result<()> {
        if self.is_closed() {
            return Err(Error::session("Browser session is closed"));
        }

        let settings = self.inner.settings;
        let timeout = timeout.unwrap_or(settings.timeout);
        let deadline = Instant::now() + timeout;

        loop {
            for condition in conditions {
                match condition.evaluate(self).await {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(e) if e.is_session_fatal() => {
                        warn!("Condition '{}' raised a session error: {}", condition.name(), e)
                    }
                    Err(e) => trace!("Condition '{}' raised: {}", condition.name(), e),
                }
            }

            let now = Instant::now();
            if now >= deadline {
                let message = match message {
                    Some(m) => m.to_string(),
                    None => conditions
                        .iter()
                        .map(|c| c.name())
                        .collect::<Vec<_>>()
                        .join(" or "),
                };
                warn!("Wait timed out after {:?}: {}", timeout, message);
                return Err(Error::timeout(timeout.as_millis() as u64, message));
            }
            tokio::time::sleep(settings.poll_interval.min(deadline - now)).await;
        }
    }
}
