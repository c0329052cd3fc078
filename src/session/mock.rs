//! Mock session implementation for testing
//!
//! `MockSession` holds a programmable DOM: nodes registered per selector, a
//! URL, a cookie jar and per-node counters for lookups, native clicks and
//! script runs. Clones share state, so a test can keep one clone for
//! inspection while the browser handle drives another.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::cdp::mock::MOCK_PNG;
use crate::config::BrowserKind;
use crate::session::browser::{Browser, WaitSettings};
use crate::session::keys::{self, KeyInput};
use crate::session::scripts;
use crate::session::selector::By;
use crate::session::traits::{BrowserSession, Cookie, NodeId};
use crate::Error;

/// Programmable DOM node
#[derive(Debug, Clone)]
pub struct MockNode {
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub value: String,
    pub displayed: bool,
    /// `Some` for nodes that have a checked/selected state
    pub selected: Option<bool>,
    /// Selecting this node deselects its siblings (options, radios)
    pub exclusive: bool,
    pub click_error: Option<String>,
    pub script_error: Option<String>,
    pub display_error: Option<String>,
    /// URL loaded when the node is clicked
    pub navigates_to: Option<String>,
    pub detached: bool,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            text: String::new(),
            attributes: HashMap::new(),
            value: String::new(),
            displayed: true,
            selected: None,
            exclusive: false,
            click_error: None,
            script_error: None,
            display_error: None,
            navigates_to: None,
            detached: false,
        }
    }
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<option value=..>text</option>`
    pub fn option(value: &str, text: &str) -> Self {
        Self {
            selected: Some(false),
            exclusive: true,
            ..Self::new().text(text).attr("value", value)
        }
    }

    pub fn checkbox(checked: bool) -> Self {
        Self {
            selected: Some(checked),
            ..Self::new()
        }
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn refuse_click(mut self, message: &str) -> Self {
        self.click_error = Some(message.to_string());
        self
    }

    pub fn refuse_script(mut self, message: &str) -> Self {
        self.script_error = Some(message.to_string());
        self
    }

    pub fn failing_display_check(mut self, message: &str) -> Self {
        self.display_error = Some(message.to_string());
        self
    }

    pub fn navigates_to(mut self, url: &str) -> Self {
        self.navigates_to = Some(url.to_string());
        self
    }
}

#[derive(Debug)]
struct Match {
    selector: By,
    scope: Option<NodeId>,
    node: NodeId,
}

#[derive(Debug)]
struct MockState {
    url: String,
    title: String,
    history: Vec<String>,
    nodes: HashMap<NodeId, MockNode>,
    matches: Vec<Match>,
    next_id: usize,
    lookups: Vec<By>,
    native_clicks: HashMap<NodeId, usize>,
    scripts: Vec<(NodeId, String)>,
    typed: HashMap<NodeId, String>,
    redirects: HashMap<String, String>,
    navigation_error: Option<String>,
    lookup_error: Option<String>,
    cookies: Vec<Cookie>,
    window: Option<(u32, u32)>,
    maximized: bool,
    close_calls: usize,
    closed: bool,
}

impl MockState {
    fn node_mut(&mut self, node: &NodeId) -> Result<&mut MockNode, Error> {
        match self.nodes.get_mut(node) {
            Some(n) if !n.detached => Ok(n),
            _ => Err(Error::stale_element(node.as_str())),
        }
    }

    fn apply_click(&mut self, node: &NodeId) -> Result<(), Error> {
        let target = self.node_mut(node)?;
        let exclusive = target.exclusive;
        let navigates_to = target.navigates_to.clone();
        match target.selected {
            Some(_) if exclusive => target.selected = Some(true),
            Some(checked) => target.selected = Some(!checked),
            None => {}
        }

        if exclusive {
            let scope = self
                .matches
                .iter()
                .find(|m| &m.node == node)
                .and_then(|m| m.scope.clone());
            let siblings: Vec<NodeId> = self
                .matches
                .iter()
                .filter(|m| m.scope == scope && &m.node != node)
                .map(|m| m.node.clone())
                .collect();
            for sibling in siblings {
                if let Some(n) = self.nodes.get_mut(&sibling) {
                    if n.exclusive {
                        n.selected = Some(false);
                    }
                }
            }
        }

        if let Some(url) = navigates_to {
            self.load(&url);
        }
        Ok(())
    }

    fn load(&mut self, url: &str) {
        let url = self.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        self.history.push(url.clone());
        self.url = url;
    }
}

/// Mock browser session
#[derive(Debug, Clone)]
pub struct MockSession {
    kind: BrowserKind,
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::with_kind(BrowserKind::Chrome)
    }

    pub fn with_kind(kind: BrowserKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(MockState {
                url: "about:blank".to_string(),
                title: String::new(),
                history: Vec::new(),
                nodes: HashMap::new(),
                matches: Vec::new(),
                next_id: 0,
                lookups: Vec::new(),
                native_clicks: HashMap::new(),
                scripts: Vec::new(),
                typed: HashMap::new(),
                redirects: HashMap::new(),
                navigation_error: None,
                lookup_error: None,
                cookies: Vec::new(),
                window: None,
                maximized: false,
                close_calls: 0,
                closed: false,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn open_state(&self) -> Result<MutexGuard<'_, MockState>, Error> {
        let state = self.state();
        if state.closed {
            return Err(Error::session("Browser session is closed"));
        }
        Ok(state)
    }

    /// Browser handle over this session with short waits
    pub fn browser(&self) -> Browser {
        self.browser_with(WaitSettings {
            timeout: Duration::from_millis(200),
            long_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(10),
        })
    }

    pub fn browser_with(&self, settings: WaitSettings) -> Browser {
        Browser::with_settings(Arc::new(self.clone()), settings)
    }

    /// Register a node matched by `selector` at document level
    pub fn add(&self, selector: By, node: MockNode) -> NodeId {
        self.insert(selector, None, node)
    }

    /// Register a node matched by `selector` below `parent`
    pub fn add_child(&self, parent: &NodeId, selector: By, node: MockNode) -> NodeId {
        self.insert(selector, Some(parent.clone()), node)
    }

    fn insert(&self, selector: By, scope: Option<NodeId>, node: MockNode) -> NodeId {
        let mut state = self.state();
        state.next_id += 1;
        let id = NodeId::new(format!("mock-{}", state.next_id));
        state.nodes.insert(id.clone(), node);
        state.matches.push(Match {
            selector,
            scope,
            node: id.clone(),
        });
        id
    }

    /// Drop every match of `selector`; existing handles go stale
    pub fn remove(&self, selector: &By) {
        let mut state = self.state();
        let removed: Vec<NodeId> = state
            .matches
            .iter()
            .filter(|m| &m.selector == selector)
            .map(|m| m.node.clone())
            .collect();
        state.matches.retain(|m| &m.selector != selector);
        for node in removed {
            if let Some(n) = state.nodes.get_mut(&node) {
                n.detached = true;
            }
        }
    }

    /// Edit a registered node in place
    pub fn update<F: FnOnce(&mut MockNode)>(&self, node: &NodeId, f: F) {
        if let Some(n) = self.state().nodes.get_mut(node) {
            f(n);
        }
    }

    pub fn node(&self, node: &NodeId) -> Option<MockNode> {
        self.state().nodes.get(node).cloned()
    }

    pub fn set_url(&self, url: &str) {
        self.state().url = url.to_string();
    }

    pub fn set_title(&self, title: &str) {
        self.state().title = title.to_string();
    }

    /// Land on `to` whenever `from` is requested
    pub fn redirect(&self, from: &str, to: &str) {
        self.state()
            .redirects
            .insert(from.to_string(), to.to_string());
    }

    pub fn fail_navigation(&self, message: &str) {
        self.state().navigation_error = Some(message.to_string());
    }

    pub fn fail_lookups(&self, message: Option<&str>) {
        self.state().lookup_error = message.map(str::to_string);
    }

    /// Number of DOM queries made
    pub fn lookups(&self) -> usize {
        self.state().lookups.len()
    }

    pub fn lookups_for(&self, selector: &By) -> usize {
        self.state().lookups.iter().filter(|s| *s == selector).count()
    }

    /// Native click attempts on a node, failed ones included
    pub fn native_clicks(&self, node: &NodeId) -> usize {
        self.state().native_clicks.get(node).copied().unwrap_or(0)
    }

    pub fn total_native_clicks(&self) -> usize {
        self.state().native_clicks.values().sum()
    }

    /// Script-dispatched click attempts on a node
    pub fn script_clicks(&self, node: &NodeId) -> usize {
        self.state()
            .scripts
            .iter()
            .filter(|(n, body)| n == node && body == scripts::SCRIPT_CLICK)
            .count()
    }

    pub fn scripts_on(&self, node: &NodeId) -> Vec<String> {
        self.state()
            .scripts
            .iter()
            .filter(|(n, _)| n == node)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Raw keystroke strings sent to a node
    pub fn typed(&self, node: &NodeId) -> String {
        self.state().typed.get(node).cloned().unwrap_or_default()
    }

    /// URLs loaded so far, after redirects
    pub fn navigations(&self) -> Vec<String> {
        self.state().history.clone()
    }

    pub fn window(&self) -> Option<(u32, u32)> {
        self.state().window
    }

    pub fn is_maximized(&self) -> bool {
        self.state().maximized
    }

    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    fn kind(&self) -> BrowserKind {
        self.kind
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        let mut state = self.open_state()?;
        if let Some(message) = &state.navigation_error {
            return Err(Error::navigation(format!("{}: {}", url, message)));
        }
        state.load(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String, Error> {
        Ok(self.open_state()?.url.clone())
    }

    async fn title(&self) -> Result<String, Error> {
        Ok(self.open_state()?.title.clone())
    }

    async fn refresh(&self) -> Result<(), Error> {
        self.open_state().map(drop)?;
        Ok(())
    }

    async fn back(&self) -> Result<(), Error> {
        let mut state = self.open_state()?;
        if state.history.len() > 1 {
            state.history.pop();
            if let Some(previous) = state.history.last().cloned() {
                state.url = previous;
            }
        }
        Ok(())
    }

    async fn find_nodes(&self, selector: &By, scope: Option<&NodeId>) -> Result<Vec<NodeId>, Error> {
        let mut state = self.open_state()?;
        state.lookups.push(selector.clone());
        if let Some(message) = &state.lookup_error {
            return Err(Error::cdp(message.clone()));
        }
        if let Some(parent) = scope {
            state.node_mut(parent)?;
        }

        let found = state
            .matches
            .iter()
            .filter(|m| &m.selector == selector && m.scope.as_ref() == scope)
            .map(|m| m.node.clone())
            .filter(|node| state.nodes.get(node).map(|n| !n.detached).unwrap_or(false))
            .collect();
        Ok(found)
    }

    async fn click(&self, node: &NodeId) -> Result<(), Error> {
        let mut state = self.open_state()?;
        *state.native_clicks.entry(node.clone()).or_insert(0) += 1;
        if let Some(message) = state.node_mut(node)?.click_error.clone() {
            return Err(Error::cdp(message));
        }
        state.apply_click(node)
    }

    async fn execute_on(&self, node: &NodeId, body: &str) -> Result<Value, Error> {
        let mut state = self.open_state()?;
        state.scripts.push((node.clone(), body.to_string()));
        if let Some(message) = state.node_mut(node)?.script_error.clone() {
            return Err(Error::script(message));
        }
        if body == scripts::SCRIPT_CLICK {
            state.apply_click(node)?;
        }
        Ok(Value::Bool(true))
    }

    async fn execute_script(&self, _script: &str) -> Result<Value, Error> {
        self.open_state().map(drop)?;
        Ok(Value::Null)
    }

    async fn send_keys(&self, node: &NodeId, keys: &str) -> Result<(), Error> {
        let mut state = self.open_state()?;
        let target = state.node_mut(node)?;
        for chunk in keys::decode(keys) {
            if let KeyInput::Text(text) = chunk {
                target.value.push_str(&text);
            }
        }
        state
            .typed
            .entry(node.clone())
            .or_default()
            .push_str(keys);
        Ok(())
    }

    async fn clear(&self, node: &NodeId) -> Result<(), Error> {
        self.open_state()?.node_mut(node)?.value.clear();
        Ok(())
    }

    async fn text(&self, node: &NodeId) -> Result<String, Error> {
        Ok(self.open_state()?.node_mut(node)?.text.clone())
    }

    async fn attribute(&self, node: &NodeId, name: &str) -> Result<Option<String>, Error> {
        Ok(self.open_state()?.node_mut(node)?.attributes.get(name).cloned())
    }

    async fn property(&self, node: &NodeId, name: &str) -> Result<Value, Error> {
        let mut state = self.open_state()?;
        let target = state.node_mut(node)?;
        Ok(match name {
            "value" => Value::String(target.value.clone()),
            "checked" | "selected" => Value::Bool(target.selected.unwrap_or(false)),
            _ => target
                .attributes
                .get(name)
                .map(|v| Value::String(v.clone()))
                .unwrap_or(Value::Null),
        })
    }

    async fn is_displayed(&self, node: &NodeId) -> Result<bool, Error> {
        let mut state = self.open_state()?;
        let target = state.node_mut(node)?;
        if let Some(message) = &target.display_error {
            return Err(Error::script(message.clone()));
        }
        Ok(target.displayed)
    }

    async fn is_selected(&self, node: &NodeId) -> Result<bool, Error> {
        Ok(self.open_state()?.node_mut(node)?.selected.unwrap_or(false))
    }

    async fn hover(&self, node: &NodeId) -> Result<(), Error> {
        self.open_state()?.node_mut(node)?;
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, Error> {
        Ok(self.open_state()?.cookies.clone())
    }

    async fn add_cookie(&self, cookie: &Cookie) -> Result<(), Error> {
        let mut state = self.open_state()?;
        state.cookies.retain(|c| c.name != cookie.name);
        state.cookies.push(cookie.clone());
        Ok(())
    }

    async fn delete_cookie(&self, name: &str) -> Result<(), Error> {
        self.open_state()?.cookies.retain(|c| c.name != name);
        Ok(())
    }

    async fn delete_all_cookies(&self) -> Result<(), Error> {
        self.open_state()?.cookies.clear();
        Ok(())
    }

    async fn set_window_size(&self, width: u32, height: u32) -> Result<(), Error> {
        let mut state = self.open_state()?;
        state.window = Some((width, height));
        state.maximized = false;
        Ok(())
    }

    async fn maximize_window(&self) -> Result<(), Error> {
        self.open_state()?.maximized = true;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        self.open_state().map(drop)?;
        Ok(MOCK_PNG.to_vec())
    }

    async fn close(&self) -> Result<(), Error> {
        let mut state = self.state();
        state.close_calls += 1;
        state.closed = true;
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.state().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_filters_by_scope() {
        let mock = MockSession::new();
        let select = mock.add(By::id("size"), MockNode::new());
        mock.add_child(&select, By::css("option"), MockNode::option("s", "Small"));
        mock.add(By::css("option"), MockNode::option("x", "Elsewhere"));

        let scoped = mock.find_nodes(&By::css("option"), Some(&select)).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(mock.lookups(), 1);
    }

    #[tokio::test]
    async fn test_exclusive_selection() {
        let mock = MockSession::new();
        let select = mock.add(By::id("size"), MockNode::new());
        let small = mock.add_child(&select, By::css("option"), MockNode::option("s", "Small"));
        let large = mock.add_child(&select, By::css("option"), MockNode::option("l", "Large"));

        mock.click(&small).await.unwrap();
        mock.click(&large).await.unwrap();
        assert_eq!(mock.node(&small).unwrap().selected, Some(false));
        assert_eq!(mock.node(&large).unwrap().selected, Some(true));
    }

    #[tokio::test]
    async fn test_removed_nodes_go_stale() {
        let mock = MockSession::new();
        let banner = mock.add(By::class("banner"), MockNode::new().text("Sale"));
        mock.remove(&By::class("banner"));

        assert!(matches!(mock.text(&banner).await, Err(Error::StaleElement(_))));
        assert!(mock.find_nodes(&By::class("banner"), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_keys_records_value() {
        let mock = MockSession::new();
        let input = mock.add(By::name("q"), MockNode::new());
        let keys = keys::encode([KeyInput::from("boots"), keys::Key::Enter.into()]);

        mock.send_keys(&input, &keys).await.unwrap();
        assert_eq!(mock.node(&input).unwrap().value, "boots");
        assert_eq!(mock.typed(&input), "boots\u{E007}");
    }

    #[tokio::test]
    async fn test_closed_session_rejects_commands() {
        let mock = MockSession::new();
        mock.close().await.unwrap();
        assert!(matches!(mock.current_url().await, Err(Error::Session(_))));
        assert!(matches!(mock.refresh().await, Err(Error::Session(_))));
        assert!(matches!(mock.execute_script("1").await, Err(Error::Session(_))));
        assert!(matches!(mock.screenshot().await, Err(Error::Session(_))));
        assert!(!mock.is_active());
    }
}
