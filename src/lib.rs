//! storefront-pom: Page Object Model core for storefront UI tests
//!
//! Scenarios drive a real browser over the Chrome DevTools Protocol through a
//! shared `Browser` handle. Pages declare their elements as typed locators that
//! look the DOM up lazily, and synchronize on named wait conditions.

pub mod error;
pub mod config;
pub mod logging;

pub mod cdp;
pub mod session;
pub mod components;
pub mod wait;
pub mod page;

// Re-exports
pub use error::{Error, Result};
pub use config::{BrowserKind, Config, Credentials};
pub use session::{Browser, By, Cookie, Key, KeyInput, MockNode, MockSession, WaitSettings};
pub use components::{
    AsComponent, Button, Checkbox, Collection, Component, Dropdown, Locator, Locators, TextInput,
};
pub use wait::Condition;
pub use page::{Header, Page, PageBase};

/// storefront-pom library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
