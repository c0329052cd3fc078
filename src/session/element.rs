//! Deferred element references
//!
//! An `ElementRef` is a selector plus a label. The DOM lookup happens on the
//! first operation and the resulting node handle is reused by the operations
//! that follow on the same reference. A fresh reference looks the node up again.

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{instrument, trace};

use crate::session::browser::Browser;
use crate::session::scripts;
use crate::session::selector::By;
use crate::session::traits::NodeId;
use crate::{Error, Result};

/// Reference to a single element, resolved on first use
#[derive(Debug, Clone)]
pub struct ElementRef {
    browser: Browser,
    selector: By,
    label: String,
    node: OnceCell<NodeId>,
    pinned: bool,
}

impl ElementRef {
    pub(crate) fn new(browser: Browser, selector: By, label: String) -> Self {
        Self {
            browser,
            selector,
            label,
            node: OnceCell::new(),
            pinned: false,
        }
    }

    /// Reference to a node already found by a list lookup
    pub(crate) fn pinned(browser: Browser, selector: By, label: String, node: NodeId) -> Self {
        Self {
            browser,
            selector,
            label,
            node: OnceCell::from(node),
            pinned: true,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn selector(&self) -> &By {
        &self.selector
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Whether the lookup has already happened
    pub fn is_resolved(&self) -> bool {
        self.node.initialized()
    }

    /// Unresolved copy that will look the element up again
    ///
    /// References produced by a list lookup stay bound to their node.
    pub fn fresh(&self) -> Self {
        if self.pinned {
            return self.clone();
        }
        Self {
            browser: self.browser.clone(),
            selector: self.selector.clone(),
            label: self.label.clone(),
            node: OnceCell::new(),
            pinned: false,
        }
    }

    /// Resolve the node, querying the DOM on first use
    pub async fn node(&self) -> Result<&NodeId> {
        self.node
            .get_or_try_init(|| async {
                trace!("Looking up {}", self.label);
                let nodes = self
                    .browser
                    .session()
                    .find_nodes(&self.selector, None)
                    .await?;
                nodes
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::element_not_found(self.label.clone()))
            })
            .await
    }

    /// Native click
    pub async fn click(&self) -> Result<()> {
        let node = self.node().await?;
        self.browser.session().click(node).await
    }

    /// Click dispatched from a page script
    pub async fn script_click(&self) -> Result<()> {
        self.execute(scripts::SCRIPT_CLICK).await.map(|_| ())
    }

    /// Run a function body with the element bound to `el`
    pub async fn execute(&self, body: &str) -> Result<Value> {
        let node = self.node().await?;
        self.browser.session().execute_on(node, body).await
    }

    pub async fn text(&self) -> Result<String> {
        let node = self.node().await?;
        self.browser.session().text(node).await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let node = self.node().await?;
        self.browser.session().attribute(node, name).await
    }

    pub async fn property(&self, name: &str) -> Result<Value> {
        let node = self.node().await?;
        self.browser.session().property(node, name).await
    }

    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        let node = self.node().await?;
        self.browser.session().send_keys(node, keys).await
    }

    pub async fn clear(&self) -> Result<()> {
        let node = self.node().await?;
        self.browser.session().clear(node).await
    }

    pub async fn is_displayed(&self) -> Result<bool> {
        let node = self.node().await?;
        self.browser.session().is_displayed(node).await
    }

    pub async fn is_selected(&self) -> Result<bool> {
        let node = self.node().await?;
        self.browser.session().is_selected(node).await
    }

    pub async fn hover(&self) -> Result<()> {
        let node = self.node().await?;
        self.browser.session().hover(node).await
    }

    pub async fn scroll_into_view(&self) -> Result<()> {
        self.execute(scripts::SCROLL_INTO_VIEW).await.map(|_| ())
    }

    /// Descendants matching `selector`, each bound to its node
    pub async fn find_all(&self, selector: By, label: &str) -> Result<Vec<ElementRef>> {
        let parent = self.node().await?;
        let nodes = self
            .browser
            .session()
            .find_nodes(&selector, Some(parent))
            .await?;
        Ok(pin_all(&self.browser, &selector, label, nodes))
    }
}

/// Lazy lookup of every element matching a selector
#[derive(Debug, Clone)]
pub struct ElementList {
    browser: Browser,
    selector: By,
    label: String,
}

impl ElementList {
    pub(crate) fn new(browser: Browser, selector: By, label: String) -> Self {
        Self {
            browser,
            selector,
            label,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn selector(&self) -> &By {
        &self.selector
    }

    /// Query the DOM; an empty result is not an error
    #[instrument(level = "trace", skip(self), fields(label = %self.label))]
    pub async fn resolve(&self) -> Result<Vec<ElementRef>> {
        let nodes = self.browser.session().find_nodes(&self.selector, None).await?;
        trace!("{} matched {} nodes", self.label, nodes.len());
        Ok(pin_all(&self.browser, &self.selector, &self.label, nodes))
    }
}

fn pin_all(browser: &Browser, selector: &By, label: &str, nodes: Vec<NodeId>) -> Vec<ElementRef> {
    nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            ElementRef::pinned(
                browser.clone(),
                selector.clone(),
                format!("{}[{}]", label, i),
                node,
            )
        })
        .collect()
}
