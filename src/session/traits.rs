//! Session traits
//!
//! `BrowserSession` is the remote-automation surface the browser handle drives.
//! The CDP-backed session talks to a real browser; the mock session answers
//! from programmed state so page objects can be exercised without one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::BrowserKind;
use crate::session::selector::By;

/// Opaque handle to a DOM node held by the remote browser
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// Browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Expiry as seconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

impl Cookie {
    /// Session cookie for the current page's host
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_expiry(mut self, expires: chrono::DateTime<chrono::Utc>) -> Self {
        self.expires = Some(expires.timestamp() as f64);
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    pub fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }
}

/// Remote browser session
///
/// Node handles returned by `find_nodes` stay valid until the page replaces the
/// node; operations on a replaced node fail with `Error::StaleElement`.
#[async_trait]
pub trait BrowserSession: Send + Sync + fmt::Debug {
    /// Browser variant behind the session
    fn kind(&self) -> BrowserKind;

    /// Load a URL in the current tab
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Current document URL
    async fn current_url(&self) -> Result<String, crate::Error>;

    /// Current document title
    async fn title(&self) -> Result<String, crate::Error>;

    /// Reload the current document
    async fn refresh(&self) -> Result<(), crate::Error>;

    /// Go back in history
    async fn back(&self) -> Result<(), crate::Error>;

    /// All nodes matching `selector`, in document order
    ///
    /// With `scope`, only descendants of that node are searched. An empty
    /// result is not an error.
    async fn find_nodes(&self, selector: &By, scope: Option<&NodeId>) -> Result<Vec<NodeId>, crate::Error>;

    /// Native (input-event) click
    async fn click(&self, node: &NodeId) -> Result<(), crate::Error>;

    /// Run a function body with the node bound to `el`, returning its result
    async fn execute_on(&self, node: &NodeId, body: &str) -> Result<serde_json::Value, crate::Error>;

    /// Evaluate a script in the page
    async fn execute_script(&self, script: &str) -> Result<serde_json::Value, crate::Error>;

    /// Type an encoded keystroke string into the node
    async fn send_keys(&self, node: &NodeId, keys: &str) -> Result<(), crate::Error>;

    /// Clear an editable node
    async fn clear(&self, node: &NodeId) -> Result<(), crate::Error>;

    /// Rendered text of the node
    async fn text(&self, node: &NodeId) -> Result<String, crate::Error>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>, crate::Error>;

    /// DOM property value
    async fn property(&self, node: &NodeId, name: &str) -> Result<serde_json::Value, crate::Error>;

    /// Whether the node is rendered and visible
    async fn is_displayed(&self, node: &NodeId) -> Result<bool, crate::Error>;

    /// Whether a checkbox, radio or option node is selected
    async fn is_selected(&self, node: &NodeId) -> Result<bool, crate::Error>;

    /// Move the pointer over the node
    async fn hover(&self, node: &NodeId) -> Result<(), crate::Error>;

    /// Cookies visible to the current document
    async fn cookies(&self) -> Result<Vec<Cookie>, crate::Error>;

    async fn add_cookie(&self, cookie: &Cookie) -> Result<(), crate::Error>;

    async fn delete_cookie(&self, name: &str) -> Result<(), crate::Error>;

    async fn delete_all_cookies(&self) -> Result<(), crate::Error>;

    async fn set_window_size(&self, width: u32, height: u32) -> Result<(), crate::Error>;

    async fn maximize_window(&self) -> Result<(), crate::Error>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// End the session; closing twice is not an error
    async fn close(&self) -> Result<(), crate::Error>;

    /// Whether the session still accepts commands
    fn is_active(&self) -> bool;
}
