//! Base component
//!
//! Every wrapper owns one `Component`, which owns one lazy `ElementRef`.

use std::time::Duration;
use tracing::{debug, warn};

use crate::session::element::ElementRef;
use crate::session::selector::By;
use crate::wait::Condition;
use crate::{Error, Result};

/// Element wrapper with tolerant visibility and a fallback click
#[derive(Debug, Clone)]
pub struct Component {
    element: ElementRef,
}

impl Component {
    pub fn new(element: ElementRef) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn label(&self) -> &str {
        self.element.label()
    }

    /// Whether the element is shown; lookup and query failures read as `false`
    pub async fn is_displayed(&self) -> bool {
        match self.element.is_displayed().await {
            Ok(displayed) => displayed,
            Err(e) => {
                debug!("{} not displayed: {}", self.label(), e);
                false
            }
        }
    }

    /// Whether the element exists in the DOM
    pub async fn is_present(&self) -> bool {
        self.element.node().await.is_ok()
    }

    /// Click, falling back to a script-dispatched click once
    ///
    /// When both fail, the error carries the label and the native click's error.
    pub async fn click(&self) -> Result<()> {
        let native = match self.element.click().await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!("Native click on {} failed ({}), retrying from script", self.label(), native);
        match self.element.script_click().await {
            Ok(()) => Ok(()),
            Err(fallback) => {
                debug!("Script click on {} failed: {}", self.label(), fallback);
                Err(Error::click(self.label(), native))
            }
        }
    }

    pub async fn text(&self) -> Result<String> {
        self.element.text().await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element.attribute(name).await
    }

    pub async fn scroll_into_view(&self) -> Result<()> {
        self.element.scroll_into_view().await
    }

    pub async fn hover(&self) -> Result<()> {
        self.element.hover().await
    }

    /// Wait for the element to be shown, re-resolving it on every poll
    pub async fn wait_until_visible(&self, timeout: Option<Duration>) -> Result<()> {
        let element = self.element.clone();
        let condition = Condition::new(format!("{} is visible", self.label()), move |_| {
            let probe = Component::new(element.fresh());
            async move { Ok(probe.is_displayed().await) }
        });
        self.element
            .browser()
            .wait(condition, timeout, Some(&format!("{} never became visible", self.label())))
            .await
    }

    /// Child elements below this one
    pub async fn children(&self, selector: By, name: &str) -> Result<Vec<Component>> {
        let label = selector.label_for(name);
        Ok(self
            .element
            .find_all(selector, &label)
            .await?
            .into_iter()
            .map(Component::new)
            .collect())
    }
}
