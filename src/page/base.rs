//! Page base and the `Page` trait

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::components::Locators;
use crate::config::Config;
use crate::page::header::Header;
use crate::session::browser::Browser;
use crate::wait::{self, Condition};
use crate::{Error, Result};

/// State every page object embeds
#[derive(Debug, Clone)]
pub struct PageBase {
    browser: Browser,
    name: String,
    url: Option<String>,
    header: Header,
    load_timeout: Option<Duration>,
}

impl PageBase {
    /// Page without a URL, composing the default header
    pub fn new<S: Into<String>>(browser: &Browser, name: S) -> Self {
        Self {
            browser: browser.clone(),
            name: name.into(),
            url: None,
            header: Header::new(browser),
            load_timeout: None,
        }
    }

    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.set_url(url);
        self
    }

    /// URL built from the configured base URL and `path`
    pub fn with_path(self, config: &Config, path: &str) -> Result<Self> {
        let url = config.page_url(path)?;
        Ok(self.with_url(url))
    }

    /// Override the load wait; defaults to the long wait timeout
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn set_url<S: Into<String>>(&mut self, url: S) {
        self.url = Some(url.into());
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn load_timeout(&self) -> Duration {
        self.load_timeout
            .unwrap_or_else(|| self.browser.settings().long_timeout)
    }

    /// Slot factory over this page's browser
    pub fn locators(&self) -> Locators {
        Locators::new(&self.browser)
    }
}

/// Page object contract
#[async_trait]
pub trait Page: Send + Sync {
    fn base(&self) -> &PageBase;

    /// What "this page is ready" means
    fn load_condition(&self) -> Condition;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn browser(&self) -> &Browser {
        self.base().browser()
    }

    fn header(&self) -> &Header {
        self.base().header()
    }

    /// Load the page URL and wait for the load condition
    ///
    /// Fails with `Error::MissingUrl` before any remote call when no URL is set.
    async fn navigate(&self) -> Result<()> {
        let base = self.base();
        let url = base
            .url()
            .ok_or_else(|| Error::missing_url(base.name()))?;

        info!("Opening {} at {}", base.name(), url);
        base.browser().navigate(url).await?;

        let message = format!("{} did not finish loading", base.name());
        base.browser()
            .wait(
                wait::page_has_loaded(self),
                Some(base.load_timeout()),
                Some(&message),
            )
            .await
    }

    /// Evaluate the load condition once; errors read as not loaded
    async fn is_loaded(&self) -> bool {
        self.load_condition()
            .evaluate(self.browser())
            .await
            .unwrap_or(false)
    }
}
