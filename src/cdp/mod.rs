//! # Chrome DevTools Protocol (CDP) layer
//!
//! WebSocket transport to a browser started with remote debugging. This is
//! the outbound side of the browser session: commands go out, replies come
//! back, and nothing here knows about pages or components.
//!
//! ## Module structure
//! - `traits`: connection, client and browser interfaces
//! - `types`: JSON-RPC wire structures
//! - `connection`: WebSocket connection with a pending-command table
//! - `client`: typed client (navigate, evaluate, screenshot)
//! - `browser`: HTTP discovery and target management
//! - `mock`: scripted client and browser for tests
//!
//! ## Example
//! ```rust,no_run
//! use storefront_pom::cdp::{CdpBrowser, CdpBrowserImpl, CdpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let browser = CdpBrowserImpl::new("ws://localhost:9222");
//! let target = browser.create_target("about:blank").await?;
//! let client = browser.create_client(&target.ws_url).await?;
//!
//! let result = client.navigate("https://example.com").await?;
//! println!("Navigated to: {}", result.url);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod types;
pub mod connection;
pub mod client;
pub mod browser;
pub mod mock;

#[cfg(test)]
pub mod tests;

pub use traits::{
    CdpConnection, CdpClient, CdpBrowser, CdpResponse, CdpError,
    NavigationResult, EvaluationResult, ScreenshotFormat,
    BrowserVersion, TargetInfo,
};

pub use connection::{CdpTimeoutConfig, CdpWebSocketConnection};
pub use client::CdpClientImpl;
pub use browser::CdpBrowserImpl;

pub use mock::{MockCdpClient, MockCdpBrowser};
